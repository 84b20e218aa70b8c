//! JSON document shapes for the persisted collections. No schema version
//! exists, so the lenient field-level decoding here is the only
//! forward-compatibility mechanism: a field that resists coercion resets
//! to its safe default instead of failing the whole load.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use courtside_domain::{
    BadgeID, BadgeIDError, CustomExercise, ExerciseID, ExerciseLog, ExerciseType, Name, NameError,
    SessionID, Settings, UnlockedBadge, WeightUnit, WorkoutSession,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    session_id: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    session_number: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    started_at: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    completed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    completed: bool,
    #[serde(default, deserialize_with = "lenient_exercise_logs")]
    exercises: Vec<ExerciseLogDoc>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExerciseLogDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    exercise_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    exercise_name: String,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    weight_kg: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    weight_lb: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    box_jump_inches: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    completed: bool,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    completed_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomExerciseDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    exercise_type: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_u32",
        skip_serializing_if = "Option::is_none"
    )]
    reps: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_u32",
        skip_serializing_if = "Option::is_none"
    )]
    duration: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    requires_weight: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    requires_height: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    instructions: String,
    #[serde(default, deserialize_with = "lenient_string")]
    created_at: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnlockedBadgeDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    unlocked_at: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SettingsDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    default_weight_unit: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_string(value.unwrap_or(Value::Null)).unwrap_or_default())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(coerce_string))
}

fn coerce_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value.unwrap_or(Value::Null) {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.as_str(), "true" | "1"),
        _ => false,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    lenient_optional_u32(deserializer).map(Option::unwrap_or_default)
}

fn lenient_optional_u32<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value.unwrap_or(Value::Null) {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value.unwrap_or(Value::Null) {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn lenient_exercise_logs<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ExerciseLogDoc>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value.unwrap_or(Value::Null) {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn parse_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_default()
}

fn parse_time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .unwrap_or_default()
}

fn parse_instant(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_default()
}

fn parse_optional_instant(value: Option<&String>) -> Option<DateTime<Utc>> {
    let value = value?;
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .ok()
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<SessionDoc> for WorkoutSession {
    fn from(doc: SessionDoc) -> Self {
        WorkoutSession {
            id: SessionID::from(doc.session_id),
            number: doc.session_number.into(),
            date: parse_date(&doc.date),
            time: parse_time(&doc.time),
            started_at: parse_instant(&doc.started_at),
            completed_at: parse_optional_instant(doc.completed_at.as_ref()),
            completed: doc.completed,
            exercises: doc.exercises.into_iter().map(ExerciseLog::from).collect(),
        }
    }
}

impl From<&WorkoutSession> for SessionDoc {
    fn from(session: &WorkoutSession) -> Self {
        SessionDoc {
            session_id: session.id.to_string(),
            session_number: session.number.into(),
            date: session.date.format("%Y-%m-%d").to_string(),
            time: session.time.format("%H:%M").to_string(),
            started_at: format_instant(session.started_at),
            completed_at: session.completed_at.map(format_instant),
            completed: session.completed,
            exercises: session.exercises.iter().map(ExerciseLogDoc::from).collect(),
        }
    }
}

impl From<ExerciseLogDoc> for ExerciseLog {
    fn from(doc: ExerciseLogDoc) -> Self {
        ExerciseLog {
            exercise_id: ExerciseID::from(doc.exercise_id),
            exercise_name: doc.exercise_name,
            weight_kg: doc.weight_kg,
            weight_lb: doc.weight_lb,
            height_inches: doc.box_jump_inches,
            completed: doc.completed,
            completed_at: parse_optional_instant(doc.completed_at.as_ref()),
        }
    }
}

impl From<&ExerciseLog> for ExerciseLogDoc {
    fn from(log: &ExerciseLog) -> Self {
        ExerciseLogDoc {
            exercise_id: log.exercise_id.to_string(),
            exercise_name: log.exercise_name.clone(),
            weight_kg: log.weight_kg,
            weight_lb: log.weight_lb,
            box_jump_inches: log.height_inches,
            completed: log.completed,
            completed_at: log.completed_at.map(format_instant),
        }
    }
}

impl TryFrom<CustomExerciseDoc> for CustomExercise {
    type Error = NameError;

    fn try_from(doc: CustomExerciseDoc) -> Result<Self, Self::Error> {
        Ok(CustomExercise {
            id: ExerciseID::from(doc.id),
            name: Name::new(&doc.name)?,
            exercise_type: ExerciseType::try_from(doc.exercise_type.as_str()).unwrap_or_default(),
            reps: doc.reps,
            duration: doc.duration,
            requires_weight: doc.requires_weight,
            requires_height: doc.requires_height,
            instructions: doc.instructions,
            created_at: parse_instant(&doc.created_at),
        })
    }
}

impl From<&CustomExercise> for CustomExerciseDoc {
    fn from(exercise: &CustomExercise) -> Self {
        CustomExerciseDoc {
            id: exercise.id.to_string(),
            name: exercise.name.to_string(),
            exercise_type: exercise.exercise_type.name().to_string(),
            reps: exercise.reps,
            duration: exercise.duration,
            requires_weight: exercise.requires_weight,
            requires_height: exercise.requires_height,
            instructions: exercise.instructions.clone(),
            created_at: format_instant(exercise.created_at),
        }
    }
}

impl TryFrom<UnlockedBadgeDoc> for UnlockedBadge {
    type Error = BadgeIDError;

    fn try_from(doc: UnlockedBadgeDoc) -> Result<Self, Self::Error> {
        Ok(UnlockedBadge {
            id: BadgeID::try_from(doc.id.as_str())?,
            unlocked_at: parse_instant(&doc.unlocked_at),
        })
    }
}

impl From<&UnlockedBadge> for UnlockedBadgeDoc {
    fn from(badge: &UnlockedBadge) -> Self {
        UnlockedBadgeDoc {
            id: badge.id.id().to_string(),
            unlocked_at: format_instant(badge.unlocked_at),
        }
    }
}

impl From<SettingsDoc> for Settings {
    fn from(doc: SettingsDoc) -> Self {
        Settings {
            default_weight_unit: match doc.default_weight_unit.as_str() {
                "lb" => WeightUnit::Lb,
                _ => WeightUnit::Kg,
            },
        }
    }
}

impl From<Settings> for SettingsDoc {
    fn from(settings: Settings) -> Self {
        SettingsDoc {
            default_weight_unit: settings.default_weight_unit.to_string(),
        }
    }
}
