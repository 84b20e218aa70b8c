//! Built-in training program: one full pass of the leg and hip sequence,
//! in workout order. Exercise names repeat across rounds; ids are unique
//! per repetition.

use std::sync::LazyLock;

use crate::{CustomExercise, Exercise, ExerciseID, ExerciseType, Name};

pub const BOX_JUMP_ID: &str = "box-jump";

struct ProgramEntry {
    id: &'static str,
    name: &'static str,
    exercise_type: ExerciseType,
    reps: Option<u32>,
    duration: Option<u32>,
    requires_weight: bool,
    requires_height: bool,
    instructions: &'static str,
}

impl ProgramEntry {
    const fn stretch(id: &'static str, name: &'static str, instructions: &'static str) -> Self {
        Self {
            id,
            name,
            exercise_type: ExerciseType::Stretch,
            reps: None,
            duration: Some(180),
            requires_weight: false,
            requires_height: false,
            instructions,
        }
    }

    const fn strength(id: &'static str, name: &'static str, instructions: &'static str) -> Self {
        Self {
            id,
            name,
            exercise_type: ExerciseType::Strength,
            reps: Some(7),
            duration: None,
            requires_weight: true,
            requires_height: false,
            instructions,
        }
    }
}

const HAMSTRING_STRETCH: (&str, &str) = (
    "Hamstring Stretches",
    "Stretch your hamstrings gently. Hold each stretch for 30 seconds.",
);
const CALF_STRETCH: (&str, &str) = (
    "Calf Stretches",
    "Stretch your calves. Hold each stretch for 30 seconds.",
);
const QUAD_STRETCH: (&str, &str) = (
    "Quad Stretches",
    "Stretch your quadriceps. Hold each stretch for 30 seconds.",
);
const LEG_CURLS: (&str, &str) = (
    "Seated Leg Curls",
    "Perform 7 reps of seated leg curls. Focus on controlled movement and full range of motion.",
);
const LEG_RAISES: (&str, &str) = (
    "Seated Leg Raises",
    "Perform 7 reps of seated leg raises. Keep your core engaged throughout the movement.",
);
const CALF_RAISES: (&str, &str) = (
    "Weighted Calf Raises",
    "Perform 7 reps of weighted calf raises. Rise up on your toes and lower slowly.",
);
const HIP_THRUSTS: (&str, &str) = (
    "Weighted Hip Thrusts",
    "Perform 7 reps of weighted hip thrusts. Drive through your heels and squeeze glutes at the top.",
);

const PROGRAM: [ProgramEntry; 19] = [
    ProgramEntry {
        id: "jogging",
        name: "20 Minutes Jogging",
        exercise_type: ExerciseType::Warmup,
        reps: None,
        duration: Some(1200),
        requires_weight: false,
        requires_height: false,
        instructions: "Light jogging to warm up your muscles. Maintain a steady, comfortable pace.",
    },
    ProgramEntry::stretch("hamstring-stretch-1", HAMSTRING_STRETCH.0, HAMSTRING_STRETCH.1),
    ProgramEntry::stretch("calf-stretch-1", CALF_STRETCH.0, CALF_STRETCH.1),
    ProgramEntry::stretch("quad-stretch-1", QUAD_STRETCH.0, QUAD_STRETCH.1),
    ProgramEntry::strength("seated-leg-curls-1", LEG_CURLS.0, LEG_CURLS.1),
    ProgramEntry::strength("seated-leg-raises-1", LEG_RAISES.0, LEG_RAISES.1),
    ProgramEntry::strength("weighted-calf-raises-1", CALF_RAISES.0, CALF_RAISES.1),
    ProgramEntry::strength("weighted-hip-thrusts-1", HIP_THRUSTS.0, HIP_THRUSTS.1),
    ProgramEntry::stretch("hamstring-stretch-2", HAMSTRING_STRETCH.0, HAMSTRING_STRETCH.1),
    ProgramEntry::stretch("calf-stretch-2", CALF_STRETCH.0, CALF_STRETCH.1),
    ProgramEntry::stretch("quad-stretch-2", QUAD_STRETCH.0, QUAD_STRETCH.1),
    ProgramEntry::strength("seated-leg-curls-2", LEG_CURLS.0, LEG_CURLS.1),
    ProgramEntry::strength("seated-leg-raises-2", LEG_RAISES.0, LEG_RAISES.1),
    ProgramEntry::strength("weighted-calf-raises-2", CALF_RAISES.0, CALF_RAISES.1),
    ProgramEntry::strength("weighted-hip-thrusts-2", HIP_THRUSTS.0, HIP_THRUSTS.1),
    ProgramEntry::stretch("hamstring-stretch-3", HAMSTRING_STRETCH.0, HAMSTRING_STRETCH.1),
    ProgramEntry::stretch("calf-stretch-3", CALF_STRETCH.0, CALF_STRETCH.1),
    ProgramEntry::stretch("quad-stretch-3", QUAD_STRETCH.0, QUAD_STRETCH.1),
    ProgramEntry {
        id: BOX_JUMP_ID,
        name: "Volleyball Spike Jump onto Box",
        exercise_type: ExerciseType::Finisher,
        reps: Some(7),
        duration: None,
        requires_weight: false,
        requires_height: true,
        instructions: "Perform 7 explosive jumps onto the box. Land softly and step down between reps. Record your box height in inches.",
    },
];

pub static EXERCISES: LazyLock<Vec<Exercise>> = LazyLock::new(|| {
    PROGRAM
        .iter()
        .map(|e| Exercise {
            id: ExerciseID::from(e.id),
            name: Name::new(e.name).expect("valid built-in exercise name"),
            exercise_type: e.exercise_type,
            reps: e.reps,
            duration: e.duration,
            requires_weight: e.requires_weight,
            requires_height: e.requires_height,
            instructions: e.instructions.to_string(),
        })
        .collect()
});

#[must_use]
pub fn exercise_by_id(id: &ExerciseID) -> Option<&'static Exercise> {
    EXERCISES.iter().find(|e| e.id == *id)
}

#[must_use]
pub fn strength_exercises() -> Vec<&'static Exercise> {
    EXERCISES.iter().filter(|e| e.requires_weight).collect()
}

/// First occurrence per name among the weight-bearing entries, for views
/// that aggregate the same movement across rounds.
#[must_use]
pub fn unique_strength_exercises() -> Vec<&'static Exercise> {
    let mut seen = std::collections::HashSet::new();
    EXERCISES
        .iter()
        .filter(|e| e.requires_weight && seen.insert(&e.name))
        .collect()
}

/// Built-in program concatenated with all custom exercises.
#[must_use]
pub fn combined_exercises(custom_exercises: &[CustomExercise]) -> Vec<Exercise> {
    EXERCISES
        .iter()
        .cloned()
        .chain(custom_exercises.iter().map(CustomExercise::exercise))
        .collect()
}

/// Lookup by id over the combined view.
#[must_use]
pub fn combined_exercise_by_id(
    id: &ExerciseID,
    custom_exercises: &[CustomExercise],
) -> Option<Exercise> {
    combined_exercises(custom_exercises)
        .into_iter()
        .find(|e| e.id == *id)
}
