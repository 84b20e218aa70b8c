use std::collections::BTreeMap;
use std::fmt::{self, Display};

use chrono::{DateTime, Utc};

use crate::{
    ExerciseID, ReadError, SessionNumber, WeightUnit, WorkoutSession, unit::kg_to_lb,
};

#[allow(async_fn_in_trait)]
pub trait RecordService {
    /// Best-ever value per exercise id over the whole stored history.
    async fn get_personal_records(
        &self,
    ) -> Result<BTreeMap<ExerciseID, PersonalRecord>, ReadError>;
    /// Stats-view aggregation: best weight per exercise *name* across
    /// completed sessions, in both units.
    async fn get_strength_records(&self) -> Result<Vec<StrengthRecord>, ReadError>;
    /// New records achieved by `current`, reported in the configured
    /// display unit.
    async fn check_for_new_prs(
        &self,
        current: &WorkoutSession,
    ) -> Result<Vec<PrNotification>, ReadError>;
}

/// Best-ever value for one exercise id. Weight and height are tracked
/// independently; in practice only one applies per exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalRecord {
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub weight_kg: Option<f64>,
    pub weight_lb: Option<f64>,
    pub height_inches: Option<f64>,
    pub session_number: SessionNumber,
    pub achieved_at: DateTime<Utc>,
}

/// Best weight for one exercise name across completed sessions, with the
/// pound value derived from the kilogram one when it was never logged.
#[derive(Debug, Clone, PartialEq)]
pub struct StrengthRecord {
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub max_weight_kg: f64,
    pub max_weight_lb: f64,
    pub session_number: SessionNumber,
    pub achieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordUnit {
    Kg,
    Lb,
    Inches,
}

impl Display for RecordUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RecordUnit::Kg => "kg",
                RecordUnit::Lb => "lb",
                RecordUnit::Inches => "in",
            }
        )
    }
}

impl From<WeightUnit> for RecordUnit {
    fn from(value: WeightUnit) -> Self {
        match value {
            WeightUnit::Kg => RecordUnit::Kg,
            WeightUnit::Lb => RecordUnit::Lb,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrNotification {
    pub exercise_name: String,
    pub new_value: f64,
    pub unit: RecordUnit,
    pub previous_value: f64,
    pub improvement_absolute: f64,
    pub improvement_percentage: f64,
}

impl PrNotification {
    fn first(exercise_name: &str, new_value: f64, unit: RecordUnit) -> Self {
        Self {
            exercise_name: exercise_name.to_string(),
            new_value,
            unit,
            previous_value: 0.0,
            improvement_absolute: new_value,
            improvement_percentage: 100.0,
        }
    }

    fn improvement(
        exercise_name: &str,
        new_value: f64,
        previous_value: f64,
        unit: RecordUnit,
    ) -> Self {
        let improvement = new_value - previous_value;
        Self {
            exercise_name: exercise_name.to_string(),
            new_value,
            unit,
            previous_value,
            improvement_absolute: improvement,
            improvement_percentage: improvement / previous_value * 100.0,
        }
    }
}

/// Max-seen-wins scan over every completed log of every session, keyed by
/// exercise id.
#[must_use]
pub fn personal_records(sessions: &[WorkoutSession]) -> BTreeMap<ExerciseID, PersonalRecord> {
    let mut records: BTreeMap<ExerciseID, PersonalRecord> = BTreeMap::new();

    for session in sessions {
        for log in &session.exercises {
            if !log.completed {
                continue;
            }

            let current = records.get(&log.exercise_id).cloned();
            let achieved_at = log.completed_at.unwrap_or(session.started_at);

            if let Some(weight_kg) = log.logged_weight_kg() {
                if current
                    .as_ref()
                    .is_none_or(|c| c.weight_kg.is_none_or(|w| weight_kg > w))
                {
                    records.insert(
                        log.exercise_id.clone(),
                        PersonalRecord {
                            exercise_id: log.exercise_id.clone(),
                            exercise_name: log.exercise_name.clone(),
                            weight_kg: Some(weight_kg),
                            weight_lb: log.weight_lb,
                            height_inches: None,
                            session_number: session.number,
                            achieved_at,
                        },
                    );
                }
            }

            if let Some(height_inches) = log.logged_height_inches() {
                if current
                    .as_ref()
                    .is_none_or(|c| c.height_inches.is_none_or(|h| height_inches > h))
                {
                    records.insert(
                        log.exercise_id.clone(),
                        PersonalRecord {
                            exercise_id: log.exercise_id.clone(),
                            exercise_name: log.exercise_name.clone(),
                            weight_kg: None,
                            weight_lb: None,
                            height_inches: Some(height_inches),
                            session_number: session.number,
                            achieved_at,
                        },
                    );
                }
            }
        }
    }

    records
}

#[must_use]
pub fn exercise_pr(
    exercise_id: &ExerciseID,
    sessions: &[WorkoutSession],
) -> Option<PersonalRecord> {
    personal_records(sessions).remove(exercise_id)
}

/// Compares the completed logs of `current` against the records derived
/// from all sessions with a strictly lower session number. A first-ever
/// value counts as a full record. Pure function of its inputs.
#[must_use]
pub fn check_for_new_prs(
    all_sessions: &[WorkoutSession],
    current: &WorkoutSession,
    unit: WeightUnit,
) -> Vec<PrNotification> {
    let previous_sessions = all_sessions
        .iter()
        .filter(|s| s.number < current.number)
        .cloned()
        .collect::<Vec<_>>();
    let previous_records = personal_records(&previous_sessions);
    let mut notifications = Vec::new();

    for log in &current.exercises {
        if !log.completed {
            continue;
        }

        let previous = previous_records.get(&log.exercise_id);

        if let Some(weight_kg) = log.logged_weight_kg() {
            let new_value = match unit {
                WeightUnit::Kg => weight_kg,
                WeightUnit::Lb => log.weight_lb.unwrap_or(0.0),
            };
            match previous.and_then(|p| p.weight_kg.map(|_| p)) {
                None => notifications.push(PrNotification::first(
                    &log.exercise_name,
                    new_value,
                    unit.into(),
                )),
                Some(previous) => {
                    let previous_value = match unit {
                        WeightUnit::Kg => previous.weight_kg.unwrap_or(0.0),
                        WeightUnit::Lb => previous.weight_lb.unwrap_or(0.0),
                    };
                    if new_value > previous_value {
                        notifications.push(PrNotification::improvement(
                            &log.exercise_name,
                            new_value,
                            previous_value,
                            unit.into(),
                        ));
                    }
                }
            }
        }

        if let Some(height_inches) = log.logged_height_inches() {
            match previous.and_then(|p| p.height_inches) {
                None => notifications.push(PrNotification::first(
                    &log.exercise_name,
                    height_inches,
                    RecordUnit::Inches,
                )),
                Some(previous_height) => {
                    if height_inches > previous_height {
                        notifications.push(PrNotification::improvement(
                            &log.exercise_name,
                            height_inches,
                            previous_height,
                            RecordUnit::Inches,
                        ));
                    }
                }
            }
        }
    }

    notifications
}

/// Best weight per exercise name over completed sessions, first-seen order.
#[must_use]
pub fn strength_records(sessions: &[WorkoutSession]) -> Vec<StrengthRecord> {
    let mut records: Vec<StrengthRecord> = Vec::new();

    for session in sessions.iter().filter(|s| s.completed) {
        for log in &session.exercises {
            let Some(weight_kg) = log.logged_weight_kg() else {
                continue;
            };
            if !log.completed {
                continue;
            }
            let achieved_at = log
                .completed_at
                .or(session.completed_at)
                .unwrap_or(session.started_at);
            let record = StrengthRecord {
                exercise_id: log.exercise_id.clone(),
                exercise_name: log.exercise_name.clone(),
                max_weight_kg: weight_kg,
                max_weight_lb: log.weight_lb.unwrap_or_else(|| kg_to_lb(weight_kg)),
                session_number: session.number,
                achieved_at,
            };
            match records
                .iter_mut()
                .find(|r| r.exercise_name == log.exercise_name)
            {
                None => records.push(record),
                Some(existing) => {
                    if weight_kg > existing.max_weight_kg {
                        *existing = record;
                    }
                }
            }
        }
    }

    records
}
