//! Repository over an abstract key-value store, one JSON document per
//! collection. Every mutation is a full read-modify-write cycle with no
//! optimistic-lock guard; interleaved saves can lose an update, which is
//! why consumers deduplicate sessions with an explicit tie-break instead
//! of relying on the store. Read failures are swallowed into safe
//! defaults so a cold or corrupted store never takes the engine down;
//! write failures are surfaced to the caller.

use chrono::Utc;
use log::warn;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use courtside_domain::{
    CreateError, CustomExercise, CustomExercisePatch, CustomExerciseRepository, DeleteError,
    ExerciseDetails, ExerciseID, Name, ReadError, SessionID, SessionRepository, Settings,
    SettingsRepository, StorageError, UnlockedBadge, UpdateError, WorkoutSession,
    BadgeRepository,
};

use crate::{
    Key, KeyValueStore,
    document::{CustomExerciseDoc, SessionDoc, SettingsDoc, UnlockedBadgeDoc},
};

pub struct KeyValueRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValueRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn read_documents<T: DeserializeOwned>(&self, key: Key, entity: &str) -> Vec<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("failed to read {entity}: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<T>(item) {
                    Ok(document) => Some(document),
                    Err(err) => {
                        warn!("dropping malformed {entity} entry: {err}");
                        None
                    }
                })
                .collect(),
            Ok(_) | Err(_) => {
                warn!("malformed {entity} document, treating as empty");
                Vec::new()
            }
        }
    }

    async fn write_documents<T: Serialize>(
        &self,
        key: Key,
        documents: &[T],
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(documents)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.set(key, raw).await
    }

    async fn read_custom_exercise_list(&self) -> Vec<CustomExercise> {
        self.read_documents::<CustomExerciseDoc>(Key::CustomExercises, "custom exercises")
            .await
            .into_iter()
            .filter_map(|doc| match CustomExercise::try_from(doc) {
                Ok(exercise) => Some(exercise),
                Err(err) => {
                    warn!("dropping custom exercise: {err}");
                    None
                }
            })
            .collect()
    }

    async fn write_custom_exercise_list(
        &self,
        exercises: &[CustomExercise],
    ) -> Result<(), StorageError> {
        let documents = exercises
            .iter()
            .map(CustomExerciseDoc::from)
            .collect::<Vec<_>>();
        self.write_documents(Key::CustomExercises, &documents).await
    }
}

impl<S: KeyValueStore> SessionRepository for KeyValueRepository<S> {
    async fn read_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError> {
        Ok(self
            .read_documents::<SessionDoc>(Key::Sessions, "sessions")
            .await
            .into_iter()
            .map(WorkoutSession::from)
            .collect())
    }

    async fn read_session(&self, id: SessionID) -> Result<Option<WorkoutSession>, ReadError> {
        let sessions = self.read_sessions().await?;
        Ok(sessions.into_iter().find(|s| s.id == id))
    }

    async fn save_session(&self, session: WorkoutSession) -> Result<WorkoutSession, UpdateError> {
        let mut sessions = self.read_sessions().await?;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        sessions.sort_by(|a, b| b.number.cmp(&a.number));
        let documents = sessions.iter().map(SessionDoc::from).collect::<Vec<_>>();
        self.write_documents(Key::Sessions, &documents)
            .await
            .map_err(UpdateError::from)?;
        Ok(session)
    }

    async fn delete_sessions(&self) -> Result<(), DeleteError> {
        self.store
            .remove(Key::Sessions)
            .await
            .map_err(DeleteError::from)
    }
}

impl<S: KeyValueStore> CustomExerciseRepository for KeyValueRepository<S> {
    async fn read_custom_exercises(&self) -> Result<Vec<CustomExercise>, ReadError> {
        Ok(self.read_custom_exercise_list().await)
    }

    async fn create_custom_exercise(
        &self,
        name: Name,
        details: ExerciseDetails,
    ) -> Result<CustomExercise, CreateError> {
        let created_at = Utc::now();
        let exercise = CustomExercise::new(
            ExerciseID::generate_custom(created_at),
            name,
            details,
            created_at,
        );
        let mut exercises = self.read_custom_exercise_list().await;
        exercises.push(exercise.clone());
        self.write_custom_exercise_list(&exercises)
            .await
            .map_err(CreateError::from)?;
        Ok(exercise)
    }

    async fn update_custom_exercise(
        &self,
        id: ExerciseID,
        patch: CustomExercisePatch,
    ) -> Result<Option<CustomExercise>, UpdateError> {
        let mut exercises = self.read_custom_exercise_list().await;
        let Some(exercise) = exercises.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        exercise.apply(patch);
        let updated = exercise.clone();
        self.write_custom_exercise_list(&exercises)
            .await
            .map_err(UpdateError::from)?;
        Ok(Some(updated))
    }

    async fn delete_custom_exercise(&self, id: ExerciseID) -> Result<bool, DeleteError> {
        let exercises = self.read_custom_exercise_list().await;
        let remaining = exercises
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect::<Vec<_>>();
        if remaining.len() == exercises.len() {
            return Ok(false);
        }
        self.write_custom_exercise_list(&remaining)
            .await
            .map_err(DeleteError::from)?;
        Ok(true)
    }
}

impl<S: KeyValueStore> BadgeRepository for KeyValueRepository<S> {
    async fn read_unlocked_badges(&self) -> Result<Vec<UnlockedBadge>, ReadError> {
        Ok(self
            .read_documents::<UnlockedBadgeDoc>(Key::Badges, "unlocked badges")
            .await
            .into_iter()
            .filter_map(|doc| match UnlockedBadge::try_from(doc) {
                Ok(badge) => Some(badge),
                Err(err) => {
                    warn!("dropping unlocked badge: {err}");
                    None
                }
            })
            .collect())
    }

    async fn create_unlocked_badge(
        &self,
        badge: UnlockedBadge,
    ) -> Result<UnlockedBadge, CreateError> {
        let mut badges = self.read_unlocked_badges().await?;
        if badges.iter().any(|b| b.id == badge.id) {
            return Ok(badge);
        }
        badges.push(badge.clone());
        let documents = badges.iter().map(UnlockedBadgeDoc::from).collect::<Vec<_>>();
        self.write_documents(Key::Badges, &documents)
            .await
            .map_err(CreateError::from)?;
        Ok(badge)
    }
}

impl<S: KeyValueStore> SettingsRepository for KeyValueRepository<S> {
    async fn read_settings(&self) -> Result<Settings, ReadError> {
        let raw = match self.store.get(Key::Settings).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Settings::default()),
            Err(err) => {
                warn!("failed to read settings: {err}");
                return Ok(Settings::default());
            }
        };
        match serde_json::from_str::<SettingsDoc>(&raw) {
            Ok(document) => Ok(Settings::from(document)),
            Err(err) => {
                warn!("malformed settings document, using defaults: {err}");
                Ok(Settings::default())
            }
        }
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), UpdateError> {
        let raw = serde_json::to_string(&SettingsDoc::from(settings))
            .map_err(|err| StorageError::Serialization(err.to_string()))
            .map_err(UpdateError::from)?;
        self.store
            .set(Key::Settings, raw)
            .await
            .map_err(UpdateError::from)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use courtside_domain::{
        BadgeID, BadgeService, ExerciseService, ExerciseType, LoggedValues, ProgressionService,
        RecordService, RecordUnit, Service, SessionNumber, SessionService, SettingsService,
        WeightUnit, kg_to_lb,
    };
    use pretty_assertions::assert_eq;

    use crate::MemoryStore;

    use super::*;

    fn service(store: MemoryStore) -> Service<KeyValueRepository<MemoryStore>> {
        Service::new(KeyValueRepository::new(store))
    }

    fn instant(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn weight(kg: f64) -> LoggedValues {
        LoggedValues {
            weight_kg: Some(kg),
            weight_lb: Some(kg_to_lb(kg)),
            height_inches: None,
        }
    }

    fn height(inches: f64) -> LoggedValues {
        LoggedValues {
            weight_kg: None,
            weight_lb: None,
            height_inches: Some(inches),
        }
    }

    fn completed_session(number: u32, day: u32, logs: &[(&str, LoggedValues)]) -> WorkoutSession {
        let mut session = WorkoutSession::start(number.into(), instant(day, 9));
        for (id, values) in logs {
            assert!(session.log_completion(&ExerciseID::from(*id), *values, instant(day, 10)));
        }
        for id in session
            .exercises
            .iter()
            .filter(|log| !log.completed)
            .map(|log| log.exercise_id.clone())
            .collect::<Vec<_>>()
        {
            session.log_completion(&id, LoggedValues::default(), instant(day, 10));
        }
        assert!(session.finish(instant(day, 11)));
        session
    }

    #[tokio::test]
    async fn test_save_session_upserts_and_sorts_descending() {
        let service = service(MemoryStore::new());
        let first = WorkoutSession::start(1.into(), instant(1, 9));
        let third = WorkoutSession::start(3.into(), instant(5, 9));
        let mut second = WorkoutSession::start(2.into(), instant(3, 9));
        service.save_session(first.clone()).await.unwrap();
        service.save_session(third.clone()).await.unwrap();
        service.save_session(second.clone()).await.unwrap();

        let sessions = service.get_sessions().await.unwrap();
        assert_eq!(
            sessions.iter().map(|s| u32::from(s.number)).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );

        // saving again with the same id replaces the stored entry
        assert!(second.log_completion(
            &ExerciseID::from("seated-leg-curls-1"),
            weight(42.5),
            instant(3, 10)
        ));
        service.save_session(second.clone()).await.unwrap();
        let sessions = service.get_sessions().await.unwrap();
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[1], second);
    }

    #[tokio::test]
    async fn test_read_session_by_id() {
        let service = service(MemoryStore::new());
        let session = WorkoutSession::start(1.into(), instant(1, 9));
        service.save_session(session.clone()).await.unwrap();

        assert_eq!(
            service.get_session(session.id.clone()).await.unwrap(),
            Some(session)
        );
        assert_eq!(
            service.get_session(SessionID::from("session_0")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_clear_sessions() {
        let service = service(MemoryStore::new());
        service
            .save_session(WorkoutSession::start(1.into(), instant(1, 9)))
            .await
            .unwrap();
        service.clear_sessions().await.unwrap();
        assert!(service.get_sessions().await.unwrap().is_empty());
        assert_eq!(
            service.get_next_session_number().await.unwrap(),
            SessionNumber::FIRST
        );
    }

    #[tokio::test]
    async fn test_corrupt_sessions_document_reads_as_empty() {
        let store = MemoryStore::new();
        store
            .set(Key::Sessions, "definitely not json".to_string())
            .await
            .unwrap();
        let service = service(store);
        assert!(service.get_sessions().await.unwrap().is_empty());

        let store = MemoryStore::new();
        store
            .set(Key::Sessions, "{\"not\": \"an array\"}".to_string())
            .await
            .unwrap();
        let service = Service::new(KeyValueRepository::new(store));
        assert!(service.get_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_session_entries_are_dropped() {
        let store = MemoryStore::new();
        store
            .set(
                Key::Sessions,
                concat!(
                    "[{\"sessionId\":\"session_1\",\"sessionNumber\":\"2\",",
                    "\"date\":\"2024-03-01\",\"time\":\"09:00\",",
                    "\"startedAt\":\"2024-03-01T09:00:00.000Z\",\"completed\":0,",
                    "\"exercises\":[]}, 42]"
                )
                .to_string(),
            )
            .await
            .unwrap();
        let service = service(store);
        let sessions = service.get_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].number, SessionNumber::from(2));
        assert!(!sessions[0].completed);
    }

    #[tokio::test]
    async fn test_custom_exercise_crud() {
        let service = service(MemoryStore::new());
        let created = service
            .create_custom_exercise(
                Name::new("Wall Sits").unwrap(),
                ExerciseDetails {
                    exercise_type: ExerciseType::Custom,
                    duration: Some(60),
                    instructions: "Back flat against the wall.".to_string(),
                    ..ExerciseDetails::default()
                },
            )
            .await
            .unwrap();
        assert!(created.id.is_custom());

        assert_eq!(
            service.get_custom_exercises().await.unwrap(),
            vec![created.clone()]
        );
        assert_eq!(service.get_exercises().await.unwrap().len(), 20);
        assert_eq!(
            service
                .get_exercise(created.id.clone())
                .await
                .unwrap()
                .map(|e| e.name),
            Some(Name::new("Wall Sits").unwrap())
        );

        let updated = service
            .update_custom_exercise(
                created.id.clone(),
                CustomExercisePatch {
                    name: Some(Name::new("Weighted Wall Sits").unwrap()),
                    requires_weight: Some(true),
                    ..CustomExercisePatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.requires_weight);
        assert_eq!(
            service
                .get_custom_exercise(created.id.clone())
                .await
                .unwrap(),
            Some(updated)
        );

        assert_eq!(
            service
                .update_custom_exercise(
                    ExerciseID::from("custom_0_missing"),
                    CustomExercisePatch::default()
                )
                .await
                .unwrap(),
            None
        );

        assert!(service.delete_custom_exercise(created.id.clone()).await.unwrap());
        assert!(!service.delete_custom_exercise(created.id).await.unwrap());
        assert!(service.get_custom_exercises().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_exercise_without_valid_name_is_dropped_on_read() {
        let store = MemoryStore::new();
        store
            .set(
                Key::CustomExercises,
                concat!(
                    "[{\"id\":\"custom_1_a\",\"name\":\"\",\"type\":\"custom\"},",
                    "{\"id\":\"custom_2_b\",\"name\":\"Lateral Bounds\",\"type\":\"custom\"}]"
                )
                .to_string(),
            )
            .await
            .unwrap();
        let service = service(store);
        let exercises = service.get_custom_exercises().await.unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].name, Name::new("Lateral Bounds").unwrap());
    }

    #[tokio::test]
    async fn test_unlock_badge_is_idempotent() {
        let service = service(MemoryStore::new());
        assert!(service.unlock_badge(BadgeID::FirstSession).await.unwrap());
        assert!(!service.unlock_badge(BadgeID::FirstSession).await.unwrap());

        let unlocked = service.get_unlocked_badges().await.unwrap();
        assert_eq!(
            unlocked.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![BadgeID::FirstSession]
        );
        assert!(service.is_badge_unlocked(BadgeID::FirstSession).await.unwrap());
        assert!(!service.is_badge_unlocked(BadgeID::TenSessions).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_unlocked_badge_ids_are_dropped_on_read() {
        let store = MemoryStore::new();
        store
            .set(
                Key::Badges,
                concat!(
                    "[{\"id\":\"first_session\",\"unlockedAt\":\"2024-03-01T09:00:00.000Z\"},",
                    "{\"id\":\"dunk_contest\",\"unlockedAt\":\"2024-03-01T09:00:00.000Z\"}]"
                )
                .to_string(),
            )
            .await
            .unwrap();
        let service = service(store);
        let unlocked = service.get_unlocked_badges().await.unwrap();
        assert_eq!(
            unlocked.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![BadgeID::FirstSession]
        );
    }

    #[tokio::test]
    async fn test_settings_round_trip_and_defaults() {
        let service = service(MemoryStore::new());
        assert_eq!(service.get_settings().await.unwrap(), Settings::default());

        service
            .set_settings(Settings {
                default_weight_unit: WeightUnit::Lb,
            })
            .await
            .unwrap();
        assert_eq!(
            service.get_settings().await.unwrap().default_weight_unit,
            WeightUnit::Lb
        );

        let store = MemoryStore::new();
        store.set(Key::Settings, "oops".to_string()).await.unwrap();
        let service = Service::new(KeyValueRepository::new(store));
        assert_eq!(service.get_settings().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn test_check_and_unlock_badges_end_to_end() {
        let service = service(MemoryStore::new());
        let session = completed_session(
            1,
            1,
            &[
                ("seated-leg-curls-1", weight(80.0)),
                ("box-jump", height(32.0)),
            ],
        );
        service.save_session(session.clone()).await.unwrap();

        let newly = service.check_and_unlock_badges(&session).await.unwrap();
        assert_eq!(
            newly,
            vec![
                BadgeID::FirstSession,
                BadgeID::LegCurl75Kg,
                BadgeID::BoxJump30In
            ]
        );

        // re-checking the same session walks down to the next locked tier
        // of the 80 kg lift; the box jump has no tier left below 30 in
        let again = service.check_and_unlock_badges(&session).await.unwrap();
        assert_eq!(again, vec![BadgeID::LegCurl50Kg]);
        assert!(service.check_and_unlock_badges(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_strength_badge_skips_tiers_already_unlocked() {
        let service = service(MemoryStore::new());
        assert!(service.unlock_badge(BadgeID::LegCurl50Kg).await.unwrap());

        // the session is not saved: only the strength thresholds apply
        let session = completed_session(1, 1, &[("seated-leg-curls-1", weight(80.0))]);
        let newly = service.check_and_unlock_badges(&session).await.unwrap();
        assert_eq!(newly, vec![BadgeID::LegCurl75Kg]);
    }

    #[tokio::test]
    async fn test_no_downgrade_unlock_when_all_reached_tiers_are_unlocked() {
        let service = service(MemoryStore::new());
        for badge_id in [
            BadgeID::LegCurl50Kg,
            BadgeID::LegCurl75Kg,
            BadgeID::LegCurl100Kg,
        ] {
            assert!(service.unlock_badge(badge_id).await.unwrap());
        }

        let session = completed_session(1, 1, &[("seated-leg-curls-1", weight(80.0))]);
        assert!(service.check_and_unlock_badges(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_logs_do_not_unlock_strength_badges() {
        let service = service(MemoryStore::new());
        let mut session = WorkoutSession::start(1.into(), instant(1, 9));
        // a weight value on a log that was never completed
        session.exercises[4].weight_kg = Some(120.0);
        assert!(service.check_and_unlock_badges(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_for_new_prs_uses_configured_unit() {
        let service = service(MemoryStore::new());
        service
            .set_settings(Settings {
                default_weight_unit: WeightUnit::Lb,
            })
            .await
            .unwrap();

        let previous = completed_session(1, 1, &[("seated-leg-curls-1", weight(50.0))]);
        let current = completed_session(2, 3, &[("seated-leg-curls-1", weight(60.0))]);
        service.save_session(previous).await.unwrap();
        service.save_session(current.clone()).await.unwrap();

        let notifications = service.check_for_new_prs(&current).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].unit, RecordUnit::Lb);
        assert_eq!(notifications[0].new_value, kg_to_lb(60.0));
        assert_eq!(notifications[0].previous_value, kg_to_lb(50.0));
    }

    #[tokio::test]
    async fn test_strength_records_via_service() {
        let service = service(MemoryStore::new());
        service
            .save_session(completed_session(
                1,
                1,
                &[
                    ("seated-leg-curls-1", weight(50.0)),
                    ("seated-leg-curls-2", weight(55.0)),
                ],
            ))
            .await
            .unwrap();

        let records = service.get_strength_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exercise_name, "Seated Leg Curls");
        assert_eq!(records[0].max_weight_kg, 55.0);
    }

    #[tokio::test]
    async fn test_start_session_via_service() {
        let service = service(MemoryStore::new());
        let started = service.start_session().await.unwrap();
        assert_eq!(started.number, SessionNumber::FIRST);
        assert_eq!(started.exercises.len(), 19);

        assert_eq!(
            service.get_active_session().await.unwrap().map(|s| s.id),
            Some(started.id)
        );
        assert_eq!(
            service.get_next_session_number().await.unwrap(),
            SessionNumber::from(2)
        );
        assert_eq!(service.get_completed_session_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_badge_progress_via_service() {
        let service = service(MemoryStore::new());
        for number in 1..=3_u32 {
            service
                .save_session(WorkoutSession::start(number.into(), instant(number, 9)))
                .await
                .unwrap();
        }

        let progress = service
            .get_badge_progress(BadgeID::FiveSessions)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((progress.current, progress.target), (3, 5));
        assert_eq!(progress.percentage, 60.0);
        assert_eq!(
            service.get_badge_progress(BadgeID::BoxJump30In).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_progression_via_service() {
        let service = service(MemoryStore::new());
        service
            .save_session(completed_session(
                2,
                3,
                &[("seated-leg-curls-1", weight(60.0)), ("box-jump", height(34.0))],
            ))
            .await
            .unwrap();
        service
            .save_session(completed_session(
                1,
                1,
                &[("seated-leg-curls-1", weight(50.0)), ("box-jump", height(30.0))],
            ))
            .await
            .unwrap();

        let progression = service
            .get_exercise_progression("Seated Leg Curls")
            .await
            .unwrap();
        assert_eq!(
            progression
                .iter()
                .map(|p| (u32::from(p.session_number), p.max_weight_kg))
                .collect::<Vec<_>>(),
            vec![(1, 50.0), (2, 60.0)]
        );

        let box_jumps = service.get_box_jump_progression().await.unwrap();
        assert_eq!(
            box_jumps
                .iter()
                .map(|p| (u32::from(p.session_number), p.max_height_inches))
                .collect::<Vec<_>>(),
            vec![(1, 30.0), (2, 34.0)]
        );
    }
}
