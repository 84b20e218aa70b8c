use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display, From, Into};
use uuid::Uuid;

use crate::{CreateError, DeleteError, Name, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait CustomExerciseRepository {
    async fn read_custom_exercises(&self) -> Result<Vec<CustomExercise>, ReadError>;
    async fn create_custom_exercise(
        &self,
        name: Name,
        details: ExerciseDetails,
    ) -> Result<CustomExercise, CreateError>;
    async fn update_custom_exercise(
        &self,
        id: ExerciseID,
        patch: CustomExercisePatch,
    ) -> Result<Option<CustomExercise>, UpdateError>;
    async fn delete_custom_exercise(&self, id: ExerciseID) -> Result<bool, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn get_exercise(&self, id: ExerciseID) -> Result<Option<Exercise>, ReadError>;
    async fn get_exercises_by_type(
        &self,
        exercise_type: ExerciseType,
    ) -> Result<Vec<Exercise>, ReadError>;
    async fn get_custom_exercises(&self) -> Result<Vec<CustomExercise>, ReadError>;
    async fn get_custom_exercise(&self, id: ExerciseID)
    -> Result<Option<CustomExercise>, ReadError>;
    async fn create_custom_exercise(
        &self,
        name: Name,
        details: ExerciseDetails,
    ) -> Result<CustomExercise, CreateError>;
    async fn update_custom_exercise(
        &self,
        id: ExerciseID,
        patch: CustomExercisePatch,
    ) -> Result<Option<CustomExercise>, UpdateError>;
    async fn delete_custom_exercise(&self, id: ExerciseID) -> Result<bool, DeleteError>;
}

#[derive(AsRef, Debug, Display, From, Into, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl ExerciseID {
    /// Generates an id for a user-created exercise, unique within the
    /// process: the creation instant plus a random suffix.
    #[must_use]
    pub fn generate_custom(created_at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "custom_{}_{}",
            created_at.timestamp_millis(),
            &suffix[..9]
        ))
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.0.starts_with("custom_")
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ExerciseType {
    Warmup,
    Stretch,
    Strength,
    Finisher,
    #[default]
    Custom,
}

impl ExerciseType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ExerciseType::Warmup => "warmup",
            ExerciseType::Stretch => "stretch",
            ExerciseType::Strength => "strength",
            ExerciseType::Finisher => "finisher",
            ExerciseType::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for ExerciseType {
    type Error = ExerciseTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "warmup" => Ok(ExerciseType::Warmup),
            "stretch" => Ok(ExerciseType::Stretch),
            "strength" => Ok(ExerciseType::Strength),
            "finisher" => Ok(ExerciseType::Finisher),
            "custom" => Ok(ExerciseType::Custom),
            _ => Err(ExerciseTypeError::Invalid),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseTypeError {
    #[error("Invalid exercise type")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub exercise_type: ExerciseType,
    pub reps: Option<u32>,
    pub duration: Option<u32>,
    pub requires_weight: bool,
    pub requires_height: bool,
    pub instructions: String,
}

/// Everything about an exercise apart from its identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExerciseDetails {
    pub exercise_type: ExerciseType,
    pub reps: Option<u32>,
    pub duration: Option<u32>,
    pub requires_weight: bool,
    pub requires_height: bool,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomExercise {
    pub id: ExerciseID,
    pub name: Name,
    pub exercise_type: ExerciseType,
    pub reps: Option<u32>,
    pub duration: Option<u32>,
    pub requires_weight: bool,
    pub requires_height: bool,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
}

impl CustomExercise {
    #[must_use]
    pub fn new(id: ExerciseID, name: Name, details: ExerciseDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            exercise_type: details.exercise_type,
            reps: details.reps,
            duration: details.duration,
            requires_weight: details.requires_weight,
            requires_height: details.requires_height,
            instructions: details.instructions,
            created_at,
        }
    }

    /// Projection into the combined catalog view.
    #[must_use]
    pub fn exercise(&self) -> Exercise {
        Exercise {
            id: self.id.clone(),
            name: self.name.clone(),
            exercise_type: self.exercise_type,
            reps: self.reps,
            duration: self.duration,
            requires_weight: self.requires_weight,
            requires_height: self.requires_height,
            instructions: self.instructions.clone(),
        }
    }

    /// Applies a partial update. `id` and `created_at` are immutable; fields
    /// absent from the patch are left unchanged.
    pub fn apply(&mut self, patch: CustomExercisePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(exercise_type) = patch.exercise_type {
            self.exercise_type = exercise_type;
        }
        if let Some(reps) = patch.reps {
            self.reps = Some(reps);
        }
        if let Some(duration) = patch.duration {
            self.duration = Some(duration);
        }
        if let Some(requires_weight) = patch.requires_weight {
            self.requires_weight = requires_weight;
        }
        if let Some(requires_height) = patch.requires_height {
            self.requires_height = requires_height;
        }
        if let Some(instructions) = patch.instructions {
            self.instructions = instructions;
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CustomExercisePatch {
    pub name: Option<Name>,
    pub exercise_type: Option<ExerciseType>,
    pub reps: Option<u32>,
    pub duration: Option<u32>,
    pub requires_weight: Option<bool>,
    pub requires_height: Option<bool>,
    pub instructions: Option<String>,
}
