use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, Utc};
use log::error;

use crate::{
    BOX_JUMP_TIERS, BadgeID, BadgeProgress, BadgeRepository, BadgeService, BoxJumpPoint,
    CreateError, CustomExercise, CustomExercisePatch, CustomExerciseRepository, DeleteError,
    Exercise, ExerciseDetails, ExerciseID, ExerciseService, ExerciseType, Name, PersonalRecord,
    PrNotification, ProgressionPoint, ProgressionService, ReadError, RecordService,
    STRENGTH_STANDARDS, SessionID, SessionNumber, SessionRepository, SessionService, Settings,
    SettingsRepository, SettingsService, StrengthRecord, UnlockedBadge, UpdateError,
    WorkoutSession, badge_progress, box_jump_progression, catalog, check_for_new_prs,
    exercise_progression, personal_records, qualifying_tier, session, session_count_badge,
    strength_records,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: literal) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            error!("failed to {} {}: {err}", $action, $entity);
        }
        result
    }};
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn get_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError> {
        log_on_error!(self.repository.read_sessions(), "get", "sessions")
    }

    async fn get_session(&self, id: SessionID) -> Result<Option<WorkoutSession>, ReadError> {
        log_on_error!(self.repository.read_session(id), "get", "session")
    }

    async fn save_session(&self, session: WorkoutSession) -> Result<WorkoutSession, UpdateError> {
        log_on_error!(self.repository.save_session(session), "save", "session")
    }

    async fn start_session(&self) -> Result<WorkoutSession, CreateError> {
        let sessions = self.get_sessions().await?;
        let number = session::next_session_number(&sessions);
        let session = WorkoutSession::start(number, Utc::now());
        Ok(self.save_session(session).await?)
    }

    async fn get_active_session(&self) -> Result<Option<WorkoutSession>, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(session::active_session(&sessions).cloned())
    }

    async fn get_next_session_number(&self) -> Result<SessionNumber, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(session::next_session_number(&sessions))
    }

    async fn get_completed_session_count(&self) -> Result<usize, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(session::completed_session_count(&sessions))
    }

    async fn get_last_workout_date(&self) -> Result<Option<NaiveDate>, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(session::last_workout_date(&sessions))
    }

    async fn clear_sessions(&self) -> Result<(), DeleteError> {
        log_on_error!(self.repository.delete_sessions(), "clear", "sessions")
    }
}

impl<R: CustomExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        let custom_exercises = self.get_custom_exercises().await?;
        Ok(catalog::combined_exercises(&custom_exercises))
    }

    async fn get_exercise(&self, id: ExerciseID) -> Result<Option<Exercise>, ReadError> {
        let custom_exercises = self.get_custom_exercises().await?;
        Ok(catalog::combined_exercise_by_id(&id, &custom_exercises))
    }

    async fn get_exercises_by_type(
        &self,
        exercise_type: ExerciseType,
    ) -> Result<Vec<Exercise>, ReadError> {
        let exercises = self.get_exercises().await?;
        Ok(exercises
            .into_iter()
            .filter(|e| e.exercise_type == exercise_type)
            .collect())
    }

    async fn get_custom_exercises(&self) -> Result<Vec<CustomExercise>, ReadError> {
        log_on_error!(
            self.repository.read_custom_exercises(),
            "get",
            "custom exercises"
        )
    }

    async fn get_custom_exercise(
        &self,
        id: ExerciseID,
    ) -> Result<Option<CustomExercise>, ReadError> {
        let custom_exercises = self.get_custom_exercises().await?;
        Ok(custom_exercises.into_iter().find(|e| e.id == id))
    }

    async fn create_custom_exercise(
        &self,
        name: Name,
        details: ExerciseDetails,
    ) -> Result<CustomExercise, CreateError> {
        log_on_error!(
            self.repository.create_custom_exercise(name, details),
            "create",
            "custom exercise"
        )
    }

    async fn update_custom_exercise(
        &self,
        id: ExerciseID,
        patch: CustomExercisePatch,
    ) -> Result<Option<CustomExercise>, UpdateError> {
        log_on_error!(
            self.repository.update_custom_exercise(id, patch),
            "update",
            "custom exercise"
        )
    }

    async fn delete_custom_exercise(&self, id: ExerciseID) -> Result<bool, DeleteError> {
        log_on_error!(
            self.repository.delete_custom_exercise(id),
            "delete",
            "custom exercise"
        )
    }
}

impl<R: SessionRepository + SettingsRepository> RecordService for Service<R> {
    async fn get_personal_records(
        &self,
    ) -> Result<BTreeMap<ExerciseID, PersonalRecord>, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(personal_records(&sessions))
    }

    async fn get_strength_records(&self) -> Result<Vec<StrengthRecord>, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(strength_records(&sessions))
    }

    async fn check_for_new_prs(
        &self,
        current: &WorkoutSession,
    ) -> Result<Vec<PrNotification>, ReadError> {
        let sessions = self.get_sessions().await?;
        let settings = self.get_settings().await?;
        Ok(check_for_new_prs(
            &sessions,
            current,
            settings.default_weight_unit,
        ))
    }
}

impl<R: BadgeRepository + SessionRepository> Service<R> {
    async fn try_unlock(
        &self,
        badge_id: Option<BadgeID>,
        unlocked: &mut HashSet<BadgeID>,
        newly_unlocked: &mut Vec<BadgeID>,
    ) -> Result<(), CreateError> {
        if let Some(badge_id) = badge_id {
            if self.unlock_badge(badge_id).await? {
                unlocked.insert(badge_id);
                newly_unlocked.push(badge_id);
            }
        }
        Ok(())
    }
}

impl<R: BadgeRepository + SessionRepository> BadgeService for Service<R> {
    async fn get_unlocked_badges(&self) -> Result<Vec<UnlockedBadge>, ReadError> {
        log_on_error!(
            self.repository.read_unlocked_badges(),
            "get",
            "unlocked badges"
        )
    }

    async fn is_badge_unlocked(&self, id: BadgeID) -> Result<bool, ReadError> {
        let badges = self.get_unlocked_badges().await?;
        Ok(badges.iter().any(|b| b.id == id))
    }

    async fn unlock_badge(&self, id: BadgeID) -> Result<bool, CreateError> {
        if self.is_badge_unlocked(id).await? {
            return Ok(false);
        }
        log_on_error!(
            self.repository.create_unlocked_badge(UnlockedBadge {
                id,
                unlocked_at: Utc::now(),
            }),
            "unlock",
            "badge"
        )?;
        Ok(true)
    }

    async fn check_and_unlock_badges(
        &self,
        current: &WorkoutSession,
    ) -> Result<Vec<BadgeID>, CreateError> {
        let sessions = self.get_sessions().await?;
        let mut unlocked = self
            .get_unlocked_badges()
            .await?
            .iter()
            .map(|b| b.id)
            .collect::<HashSet<_>>();
        let mut newly_unlocked = Vec::new();

        self.try_unlock(
            session_count_badge(sessions.len()),
            &mut unlocked,
            &mut newly_unlocked,
        )
        .await?;

        for log in current.exercises.iter().filter(|log| log.completed) {
            if let Some(weight_kg) = log.logged_weight_kg() {
                for standard in STRENGTH_STANDARDS
                    .iter()
                    .filter(|s| log.exercise_name.contains(s.movement))
                {
                    self.try_unlock(
                        qualifying_tier(weight_kg, &standard.tiers, |id| unlocked.contains(&id)),
                        &mut unlocked,
                        &mut newly_unlocked,
                    )
                    .await?;
                }
            }

            if let Some(height_inches) = log.logged_height_inches() {
                self.try_unlock(
                    qualifying_tier(height_inches, &BOX_JUMP_TIERS, |id| unlocked.contains(&id)),
                    &mut unlocked,
                    &mut newly_unlocked,
                )
                .await?;
            }
        }

        Ok(newly_unlocked)
    }

    async fn get_badge_progress(&self, id: BadgeID) -> Result<Option<BadgeProgress>, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(badge_progress(id, sessions.len()))
    }
}

impl<R: SessionRepository> ProgressionService for Service<R> {
    async fn get_exercise_progression(
        &self,
        exercise_name: &str,
    ) -> Result<Vec<ProgressionPoint>, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(exercise_progression(&sessions, exercise_name))
    }

    async fn get_box_jump_progression(&self) -> Result<Vec<BoxJumpPoint>, ReadError> {
        let sessions = self.get_sessions().await?;
        Ok(box_jump_progression(&sessions))
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    async fn get_settings(&self) -> Result<Settings, ReadError> {
        log_on_error!(self.repository.read_settings(), "get", "settings")
    }

    async fn set_settings(&self, settings: Settings) -> Result<(), UpdateError> {
        log_on_error!(self.repository.write_settings(settings), "set", "settings")
    }
}
