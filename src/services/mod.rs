//! Collaborators the session talks to: the tilt sensor and guess storage.

pub mod sensor;
pub mod storage;

pub use sensor::{
    Capabilities, ManualSensor, PermissionFuture, PermissionOutcome, PermissionRequest,
    ReadingSink, SensorService, SensorSubscription, SubscriptionId,
};
pub use storage::{
    FileStorage, GuessRepository, GuessStore, KeyValueStore, MemoryStorage, StorageError,
    DEFAULT_STORAGE_KEY,
};
