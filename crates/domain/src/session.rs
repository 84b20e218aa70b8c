use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use derive_more::{AsRef, Display, From, Into};

use crate::{CreateError, DeleteError, ExerciseID, ReadError, UpdateError, catalog};

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn read_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn read_session(&self, id: SessionID) -> Result<Option<WorkoutSession>, ReadError>;
    /// Upserts by session id. The stored collection is kept sorted by
    /// descending session number.
    async fn save_session(&self, session: WorkoutSession) -> Result<WorkoutSession, UpdateError>;
    async fn delete_sessions(&self) -> Result<(), DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn get_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn get_session(&self, id: SessionID) -> Result<Option<WorkoutSession>, ReadError>;
    async fn save_session(&self, session: WorkoutSession) -> Result<WorkoutSession, UpdateError>;
    /// Creates and persists a session with the next free session number.
    async fn start_session(&self) -> Result<WorkoutSession, CreateError>;
    async fn get_active_session(&self) -> Result<Option<WorkoutSession>, ReadError>;
    async fn get_next_session_number(&self) -> Result<SessionNumber, ReadError>;
    async fn get_completed_session_count(&self) -> Result<usize, ReadError>;
    async fn get_last_workout_date(&self) -> Result<Option<NaiveDate>, ReadError>;
    async fn clear_sessions(&self) -> Result<(), DeleteError>;
}

#[derive(AsRef, Debug, Display, From, Into, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionID(String);

impl SessionID {
    #[must_use]
    pub fn from_instant(started_at: DateTime<Utc>) -> Self {
        Self(format!("session_{}", started_at.timestamp_millis()))
    }
}

impl From<&str> for SessionID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Display, Default, Clone, Copy, Into, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionNumber(u32);

impl SessionNumber {
    pub const FIRST: SessionNumber = SessionNumber(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for SessionNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Per-session record of one program slot. Carries a denormalized copy of
/// the exercise name so history stays displayable if the definition later
/// changes or disappears.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseLog {
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub weight_kg: Option<f64>,
    pub weight_lb: Option<f64>,
    pub height_inches: Option<f64>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExerciseLog {
    fn for_exercise(exercise: &crate::Exercise) -> Self {
        Self {
            exercise_id: exercise.id.clone(),
            exercise_name: exercise.name.to_string(),
            weight_kg: None,
            weight_lb: None,
            height_inches: None,
            completed: false,
            completed_at: None,
        }
    }

    /// The logged weight, ignoring zero entries.
    #[must_use]
    pub fn logged_weight_kg(&self) -> Option<f64> {
        self.weight_kg.filter(|w| *w > 0.0)
    }

    #[must_use]
    pub fn logged_height_inches(&self) -> Option<f64> {
        self.height_inches.filter(|h| *h > 0.0)
    }
}

/// Values attached to an exercise log at the moment it is completed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LoggedValues {
    pub weight_kg: Option<f64>,
    pub weight_lb: Option<f64>,
    pub height_inches: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: SessionID,
    pub number: SessionNumber,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub exercises: Vec<ExerciseLog>,
}

impl WorkoutSession {
    /// Starts a session: a snapshot of the built-in program, in program
    /// order, with every log incomplete.
    #[must_use]
    pub fn start(number: SessionNumber, started_at: DateTime<Utc>) -> Self {
        let time = started_at.time();
        Self {
            id: SessionID::from_instant(started_at),
            number,
            date: started_at.date_naive(),
            time: NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or_default(),
            started_at,
            completed_at: None,
            completed: false,
            exercises: catalog::EXERCISES.iter().map(ExerciseLog::for_exercise).collect(),
        }
    }

    /// Marks the log for `exercise_id` complete, attaching its values
    /// atomically. Returns `false` if the slot is unknown or was already
    /// completed; each log is mutated at most once.
    pub fn log_completion(
        &mut self,
        exercise_id: &ExerciseID,
        values: LoggedValues,
        completed_at: DateTime<Utc>,
    ) -> bool {
        let Some(log) = self
            .exercises
            .iter_mut()
            .find(|log| log.exercise_id == *exercise_id && !log.completed)
        else {
            return false;
        };
        log.weight_kg = values.weight_kg;
        log.weight_lb = values.weight_lb;
        log.height_inches = values.height_inches;
        log.completed = true;
        log.completed_at = Some(completed_at);
        true
    }

    #[must_use]
    pub fn all_exercises_completed(&self) -> bool {
        self.exercises.iter().all(|log| log.completed)
    }

    /// Marks the session completed once every log is done. Returns `false`
    /// (and leaves the session untouched) while logs remain open.
    pub fn finish(&mut self, completed_at: DateTime<Utc>) -> bool {
        if !self.all_exercises_completed() {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(completed_at);
        true
    }
}

/// One entry per session number. A number can legitimately appear twice as
/// an in-progress/completed pair left behind by interleaved saves; the
/// completed one wins, later completion wins among completed ones, and the
/// first encountered wins among in-progress ones.
#[must_use]
pub fn deduplicate_sessions(sessions: &[WorkoutSession]) -> Vec<WorkoutSession> {
    let mut result: Vec<WorkoutSession> = Vec::with_capacity(sessions.len());
    for session in sessions {
        let Some(existing) = result.iter_mut().find(|s| s.number == session.number) else {
            result.push(session.clone());
            continue;
        };
        let replace = if session.completed == existing.completed {
            session.completed && session.completed_at > existing.completed_at
        } else {
            session.completed
        };
        if replace {
            *existing = session.clone();
        }
    }
    result
}

#[must_use]
pub fn active_session(sessions: &[WorkoutSession]) -> Option<&WorkoutSession> {
    sessions.iter().find(|s| !s.completed)
}

#[must_use]
pub fn next_session_number(sessions: &[WorkoutSession]) -> SessionNumber {
    sessions
        .iter()
        .map(|s| s.number)
        .max()
        .map_or(SessionNumber::FIRST, SessionNumber::next)
}

#[must_use]
pub fn completed_session_count(sessions: &[WorkoutSession]) -> usize {
    sessions.iter().filter(|s| s.completed).count()
}

/// Date of the most recently started completed session.
#[must_use]
pub fn last_workout_date(sessions: &[WorkoutSession]) -> Option<NaiveDate> {
    sessions
        .iter()
        .filter(|s| s.completed)
        .max_by_key(|s| s.started_at)
        .map(|s| s.date)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn instant(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 42).unwrap()
    }

    fn completed_session(number: u32, completed_at: DateTime<Utc>) -> WorkoutSession {
        let mut session = WorkoutSession::start(number.into(), instant(9, 0));
        for id in session
            .exercises
            .iter()
            .map(|log| log.exercise_id.clone())
            .collect::<Vec<_>>()
        {
            session.log_completion(&id, LoggedValues::default(), completed_at);
        }
        assert!(session.finish(completed_at));
        session
    }

    #[test]
    fn test_start_snapshots_the_program() {
        let session = WorkoutSession::start(SessionNumber::FIRST, instant(9, 30));
        assert_eq!(u32::from(session.number), 1);
        assert_eq!(session.id, SessionID::from("session_1709285442000"));
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(session.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(!session.completed);
        assert_eq!(session.completed_at, None);
        assert_eq!(session.exercises.len(), 19);
        for log in &session.exercises {
            assert!(!log.completed);
            assert_eq!(log.weight_kg, None);
            assert_eq!(log.height_inches, None);
        }
        let names = session
            .exercises
            .iter()
            .map(|log| log.exercise_name.as_str())
            .collect::<Vec<_>>();
        assert!(names.contains(&"20 Minutes Jogging"));
        assert!(names.contains(&"Seated Leg Curls"));
        assert!(names.contains(&"Weighted Hip Thrusts"));
        assert!(names.contains(&"Volleyball Spike Jump onto Box"));
    }

    #[test]
    fn test_log_completion_attaches_values_once() {
        let mut session = WorkoutSession::start(SessionNumber::FIRST, instant(9, 0));
        let id = ExerciseID::from("seated-leg-curls-1");
        let values = LoggedValues {
            weight_kg: Some(50.0),
            weight_lb: Some(110.23),
            height_inches: None,
        };
        assert!(session.log_completion(&id, values, instant(9, 40)));
        let log = session.exercises.iter().find(|l| l.exercise_id == id).unwrap();
        assert!(log.completed);
        assert_eq!(log.weight_kg, Some(50.0));
        assert_eq!(log.completed_at, Some(instant(9, 40)));

        // second completion of the same slot is refused
        assert!(!session.log_completion(&id, LoggedValues::default(), instant(9, 50)));
        let log = session.exercises.iter().find(|l| l.exercise_id == id).unwrap();
        assert_eq!(log.weight_kg, Some(50.0));
    }

    #[test]
    fn test_log_completion_unknown_slot() {
        let mut session = WorkoutSession::start(SessionNumber::FIRST, instant(9, 0));
        assert!(!session.log_completion(
            &ExerciseID::from("bench-press"),
            LoggedValues::default(),
            instant(9, 40)
        ));
    }

    #[test]
    fn test_finish_requires_all_logs() {
        let mut session = WorkoutSession::start(SessionNumber::FIRST, instant(9, 0));
        assert!(!session.finish(instant(10, 0)));
        assert!(!session.completed);

        let session = completed_session(1, instant(10, 30));
        assert!(session.completed);
        assert_eq!(session.completed_at, Some(instant(10, 30)));
        assert!(session.all_exercises_completed());
    }

    #[test]
    fn test_logged_weight_ignores_zero() {
        let log = ExerciseLog {
            exercise_id: ExerciseID::from("seated-leg-curls-1"),
            exercise_name: "Seated Leg Curls".to_string(),
            weight_kg: Some(0.0),
            weight_lb: None,
            height_inches: Some(0.0),
            completed: true,
            completed_at: Some(instant(9, 0)),
        };
        assert_eq!(log.logged_weight_kg(), None);
        assert_eq!(log.logged_height_inches(), None);
    }

    #[test]
    fn test_deduplicate_prefers_completed() {
        let in_progress = WorkoutSession::start(3.into(), instant(9, 0));
        let completed = completed_session(3, instant(11, 0));
        let deduplicated = deduplicate_sessions(&[in_progress.clone(), completed.clone()]);
        assert_eq!(deduplicated, vec![completed.clone()]);
        // order of appearance does not matter
        assert_eq!(
            deduplicate_sessions(&[completed.clone(), in_progress]),
            vec![completed]
        );
    }

    #[test]
    fn test_deduplicate_prefers_later_completion() {
        let earlier = completed_session(3, instant(11, 0));
        let later = completed_session(3, instant(12, 0));
        assert_eq!(
            deduplicate_sessions(&[earlier.clone(), later.clone()]),
            vec![later.clone()]
        );
        assert_eq!(deduplicate_sessions(&[later.clone(), earlier]), vec![later]);
    }

    #[test]
    fn test_deduplicate_keeps_first_in_progress() {
        let first = WorkoutSession::start(3.into(), instant(9, 0));
        let second = WorkoutSession::start(3.into(), instant(10, 0));
        assert_eq!(
            deduplicate_sessions(&[first.clone(), second]),
            vec![first]
        );
    }

    #[test]
    fn test_deduplicate_keeps_distinct_numbers() {
        let first = completed_session(1, instant(10, 0));
        let second = WorkoutSession::start(2.into(), instant(11, 0));
        assert_eq!(
            deduplicate_sessions(&[second.clone(), first.clone()]),
            vec![second, first]
        );
    }

    #[rstest]
    #[case(&[], 1)]
    #[case(&[1, 2, 3], 4)]
    #[case(&[3, 1], 4)]
    fn test_next_session_number(#[case] numbers: &[u32], #[case] expected: u32) {
        let sessions = numbers
            .iter()
            .map(|n| WorkoutSession::start((*n).into(), instant(9, 0)))
            .collect::<Vec<_>>();
        assert_eq!(next_session_number(&sessions), expected.into());
    }

    #[test]
    fn test_active_session() {
        let completed = completed_session(1, instant(10, 0));
        let open = WorkoutSession::start(2.into(), instant(11, 0));
        assert_eq!(active_session(&[completed.clone()]), None);
        assert_eq!(
            active_session(&[open.clone(), completed]).map(|s| s.number),
            Some(SessionNumber::from(2))
        );
    }

    #[test]
    fn test_last_workout_date() {
        assert_eq!(last_workout_date(&[]), None);
        let mut early = completed_session(1, instant(10, 0));
        early.started_at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        early.date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let late = completed_session(2, instant(10, 0));
        let open = WorkoutSession::start(3.into(), instant(11, 0));
        assert_eq!(
            last_workout_date(&[early, late, open]),
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }
}
