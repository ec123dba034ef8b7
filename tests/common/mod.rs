//! Shared helpers for session tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tilt_guesser::config::GuesserConfig;
use tilt_guesser::machine::{GuesserState, Snapshot};
use tilt_guesser::model::Guess;
use tilt_guesser::services::sensor::ManualSensor;
use tilt_guesser::services::storage::{GuessRepository, GuessStore, MemoryStorage, StorageError};
use tilt_guesser::session::{Session, SessionHandle};
use tokio::task::JoinHandle;

pub type MemoryRepository = GuessRepository<MemoryStorage>;

pub fn memory_store() -> Arc<MemoryRepository> {
    Arc::new(GuessRepository::new(MemoryStorage::new()))
}

pub fn spawn_session<G: GuessStore>(
    sensor: &ManualSensor,
    store: Arc<G>,
    config: &GuesserConfig,
) -> (SessionHandle, JoinHandle<()>) {
    Session::spawn(Arc::new(sensor.clone()), store, config)
}

/// Wait until the session publishes `state`. Fails the test if the session
/// stops first or nothing happens within a minute of (virtual) time.
pub async fn wait_for_state(handle: &SessionHandle, state: GuesserState) -> Snapshot {
    let mut rx = handle.subscribe();
    let snapshot = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(|s| s.matches(state)))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {state}"))
        .unwrap_or_else(|_| panic!("session closed before reaching {state}"))
        .clone();
    snapshot
}

/// A store whose saves always fail.
#[derive(Debug, Default)]
pub struct FailingStore;

impl GuessStore for FailingStore {
    fn load(&self) -> Vec<Guess> {
        Vec::new()
    }

    fn save(&self, _guesses: &[Guess]) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}
