#![warn(clippy::pedantic)]

use courtside_domain::StorageError;
use strum::AsRefStr;

mod document;
pub mod key_value;
pub mod memory;

pub use key_value::KeyValueRepository;
pub use memory::MemoryStore;

/// Fixed namespaced keys, one JSON document each.
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    #[strum(serialize = "@courtside_training_sessions")]
    Sessions,
    #[strum(serialize = "@courtside_training_custom_exercises")]
    CustomExercises,
    #[strum(serialize = "@courtside_training_badges")]
    Badges,
    #[strum(serialize = "@courtside_training_settings")]
    Settings,
}

/// The only persistence capability the engine requires: an async string
/// key-value store.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn get(&self, key: Key) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: Key, value: String) -> Result<(), StorageError>;
    async fn remove(&self, key: Key) -> Result<(), StorageError>;
}
