use chrono::NaiveDate;

use crate::{
    ExerciseID, ReadError, SessionNumber, WorkoutSession, catalog, unit::kg_to_lb,
};

#[allow(async_fn_in_trait)]
pub trait ProgressionService {
    /// Chart series for one exercise name across completed sessions.
    async fn get_exercise_progression(
        &self,
        exercise_name: &str,
    ) -> Result<Vec<ProgressionPoint>, ReadError>;
    async fn get_box_jump_progression(&self) -> Result<Vec<BoxJumpPoint>, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionPoint {
    pub session_number: SessionNumber,
    pub date: NaiveDate,
    pub max_weight_kg: f64,
    pub max_weight_lb: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxJumpPoint {
    pub session_number: SessionNumber,
    pub date: NaiveDate,
    pub max_height_inches: f64,
}

/// Per completed session, the heaviest completed log matching the name
/// (the same movement can appear in several rounds of one session).
/// Sessions without a matching completed log are omitted. Ascending
/// session number.
#[must_use]
pub fn exercise_progression(
    sessions: &[WorkoutSession],
    exercise_name: &str,
) -> Vec<ProgressionPoint> {
    let mut progression = sessions
        .iter()
        .filter(|s| s.completed)
        .filter_map(|session| {
            let max_log = session
                .exercises
                .iter()
                .filter(|log| {
                    log.exercise_name == exercise_name
                        && log.completed
                        && log.logged_weight_kg().is_some()
                })
                .max_by(|a, b| {
                    a.logged_weight_kg()
                        .partial_cmp(&b.logged_weight_kg())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })?;
            let max_weight_kg = max_log.logged_weight_kg().unwrap_or(0.0);
            Some(ProgressionPoint {
                session_number: session.number,
                date: session.date,
                max_weight_kg,
                max_weight_lb: max_log.weight_lb.unwrap_or_else(|| kg_to_lb(max_weight_kg)),
            })
        })
        .collect::<Vec<_>>();
    progression.sort_by_key(|point| point.session_number);
    progression
}

/// Box-jump height per completed session, ascending session number.
#[must_use]
pub fn box_jump_progression(sessions: &[WorkoutSession]) -> Vec<BoxJumpPoint> {
    let box_jump_id = ExerciseID::from(catalog::BOX_JUMP_ID);
    let mut progression = sessions
        .iter()
        .filter(|s| s.completed)
        .filter_map(|session| {
            let log = session.exercises.iter().find(|log| {
                log.exercise_id == box_jump_id
                    && log.completed
                    && log.logged_height_inches().is_some()
            })?;
            Some(BoxJumpPoint {
                session_number: session.number,
                date: session.date,
                max_height_inches: log.logged_height_inches().unwrap_or(0.0),
            })
        })
        .collect::<Vec<_>>();
    progression.sort_by_key(|point| point.session_number);
    progression
}
