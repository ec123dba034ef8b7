//! End-to-end tests of the session runtime against a host-driven sensor,
//! on a paused tokio clock.

mod common;

use common::{memory_store, spawn_session, wait_for_state, FailingStore};
use std::time::Duration;
use tilt_guesser::config::GuesserConfig;
use tilt_guesser::machine::{GuesserState, Region, DEV_ORIENTATION};
use tilt_guesser::model::{Guess, Orientation, OrientationReading};
use tilt_guesser::services::sensor::{
    Capabilities, ManualSensor, PermissionOutcome, PermissionRequest,
};
use tilt_guesser::services::storage::GuessStore;
use tilt_guesser::session::SessionError;

const PROMPT: PermissionRequest = PermissionRequest {
    user_initiated: false,
};
const GESTURE: PermissionRequest = PermissionRequest {
    user_initiated: true,
};

#[tokio::test(start_paused = true)]
async fn device_without_motion_api_is_unsupported() {
    let sensor = ManualSensor::new(Capabilities::none());
    let (handle, task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());

    let snapshot = wait_for_state(&handle, GuesserState::UnsupportedDevice).await;

    assert!(snapshot.state.is_unsupported());
    assert!(sensor.permission_requests().is_empty());
    assert_eq!(sensor.subscription_count(), 0);

    handle.shutdown().unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn denied_permission_is_terminal() {
    let sensor =
        ManualSensor::new(Capabilities::full()).with_permission_outcomes([PermissionOutcome::Denied]);
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());

    wait_for_state(&handle, GuesserState::PermissionDenied).await;
    handle.request_permission().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(handle.snapshot().state, GuesserState::PermissionDenied);
    assert_eq!(sensor.permission_requests(), vec![PROMPT]);
    assert!(!sensor.is_subscribed());
}

#[tokio::test(start_paused = true)]
async fn gesture_retries_permission_as_user_initiated() {
    let sensor = ManualSensor::new(Capabilities::full()).with_permission_outcomes([
        PermissionOutcome::NeedsUserGesture,
        PermissionOutcome::Granted,
    ]);
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());

    let waiting = wait_for_state(&handle, GuesserState::AwaitingUserGesture).await;
    assert!(waiting.in_region(Region::Capable));
    assert!(!sensor.is_subscribed());

    handle.request_permission().unwrap();
    wait_for_state(&handle, GuesserState::TestingSensor).await;

    assert_eq!(sensor.permission_requests(), vec![PROMPT, GESTURE]);
    assert!(sensor.is_subscribed());
}

#[tokio::test(start_paused = true)]
async fn implicit_access_never_prompts() {
    let sensor = ManualSensor::new(Capabilities::implicit());
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());

    wait_for_state(&handle, GuesserState::TestingSensor).await;

    assert!(sensor.permission_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn silent_sensor_times_out_after_five_seconds() {
    let sensor = ManualSensor::new(Capabilities::full());
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;
    let started = tokio::time::Instant::now();

    let snapshot = wait_for_state(&handle, GuesserState::SensorUnresponsive).await;

    assert!(started.elapsed() >= Duration::from_millis(5000));
    assert!(started.elapsed() < Duration::from_millis(5100));
    assert!(snapshot.state.is_unsupported());
    assert!(!sensor.is_subscribed());
}

#[tokio::test(start_paused = true)]
async fn reading_just_before_deadline_confirms_sensor() {
    let sensor = ManualSensor::new(Capabilities::full());
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;

    tokio::time::sleep(Duration::from_millis(4999)).await;
    assert!(sensor.push(OrientationReading::level(0.2, 0.1)));
    wait_for_state(&handle, GuesserState::Guessing).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, GuesserState::Guessing);
    assert_eq!(snapshot.orientation, None);
    assert!(sensor.is_subscribed());
}

#[tokio::test(start_paused = true)]
async fn invalid_readings_do_not_confirm_sensor() {
    let sensor = ManualSensor::new(Capabilities::full());
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;

    sensor.push(OrientationReading::new(None, Some(1.0)));
    sensor.push(OrientationReading::level(f64::NAN, 0.0));

    wait_for_state(&handle, GuesserState::SensorUnresponsive).await;
}

#[tokio::test(start_paused = true)]
async fn readings_from_cancelled_subscription_are_ignored() {
    let sensor = ManualSensor::new(Capabilities::full());
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;
    let sink = sensor.current_sink().unwrap();

    wait_for_state(&handle, GuesserState::SensorUnresponsive).await;
    assert!(sink.emit(OrientationReading::level(0.0, 0.0)));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(handle.snapshot().state, GuesserState::SensorUnresponsive);
}

#[tokio::test(start_paused = true)]
async fn committed_guess_is_persisted_and_ranked() {
    let sensor = ManualSensor::new(Capabilities::full());
    let store = memory_store();
    let (handle, _task) = spawn_session(&sensor, store.clone(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;
    sensor.push(OrientationReading::level(0.0, 0.0));
    wait_for_state(&handle, GuesserState::Guessing).await;

    sensor.push(OrientationReading::level(0.3, -0.1));
    handle.commit_guess().unwrap();
    let reviewing = wait_for_state(&handle, GuesserState::Reviewing).await;

    assert_eq!(reviewing.guesses.len(), 1);
    assert_eq!(reviewing.guesses[0].orientation(), Orientation::new(0.3, -0.1));
    assert_eq!(store.load(), reviewing.guesses);

    let board = handle.scoreboard();
    assert_eq!(board.entries.len(), 1);
    assert!(board.entries[0].is_latest);
    assert!(board.latest_outside.is_none());
}

#[tokio::test(start_paused = true)]
async fn restart_starts_a_fresh_round() {
    let sensor = ManualSensor::new(Capabilities::implicit());
    let (handle, _task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;
    sensor.push(OrientationReading::level(0.0, 0.0));
    wait_for_state(&handle, GuesserState::Guessing).await;
    sensor.push(OrientationReading::level(1.0, 1.0));
    handle.commit_guess().unwrap();
    wait_for_state(&handle, GuesserState::Reviewing).await;

    handle.restart().unwrap();
    let guessing = wait_for_state(&handle, GuesserState::Guessing).await;

    assert_eq!(guessing.orientation, None);
    assert_eq!(guessing.guesses.len(), 1);
    assert_eq!(sensor.subscription_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn saved_guesses_are_restored() {
    let store = memory_store();
    let earlier = vec![Guess::capture(Orientation::new(2.0, 2.0))];
    store.save(&earlier).unwrap();
    let sensor = ManualSensor::new(Capabilities::implicit());
    let (handle, _task) = spawn_session(&sensor, store, &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;

    sensor.push(OrientationReading::level(0.0, 0.0));
    let guessing = wait_for_state(&handle, GuesserState::Guessing).await;

    assert_eq!(guessing.guesses, earlier);
}

#[tokio::test(start_paused = true)]
async fn failed_save_keeps_session_running() {
    let sensor = ManualSensor::new(Capabilities::implicit());
    let store = std::sync::Arc::new(FailingStore);
    let (handle, _task) = spawn_session(&sensor, store, &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;
    sensor.push(OrientationReading::level(0.0, 0.0));
    wait_for_state(&handle, GuesserState::Guessing).await;

    sensor.push(OrientationReading::level(0.5, 0.5));
    handle.commit_guess().unwrap();
    let reviewing = wait_for_state(&handle, GuesserState::Reviewing).await;
    assert_eq!(reviewing.guesses.len(), 1);

    handle.restart().unwrap();
    wait_for_state(&handle, GuesserState::Guessing).await;
}

#[tokio::test(start_paused = true)]
async fn dev_mode_starts_with_dummy_orientation() {
    let config = GuesserConfig {
        dev_mode: true,
        ..GuesserConfig::default()
    };
    let sensor = ManualSensor::new(Capabilities::implicit());
    let (handle, _task) = spawn_session(&sensor, memory_store(), &config);

    let guessing = wait_for_state(&handle, GuesserState::Guessing).await;
    assert_eq!(guessing.orientation, Some(DEV_ORIENTATION));

    handle.commit_guess().unwrap();
    let reviewing = wait_for_state(&handle, GuesserState::Reviewing).await;
    assert_eq!(reviewing.guesses[0].orientation(), DEV_ORIENTATION);
}

#[tokio::test(start_paused = true)]
async fn shutdown_releases_sensor_and_closes_handle() {
    let sensor = ManualSensor::new(Capabilities::implicit());
    let (handle, task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;
    assert!(sensor.is_subscribed());

    handle.shutdown().unwrap();
    task.await.unwrap();

    assert!(!sensor.is_subscribed());
    assert!(matches!(handle.commit_guess(), Err(SessionError::Closed)));

    // The timer was cancelled along with the subscription.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(handle.snapshot().state, GuesserState::TestingSensor);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_ends_session() {
    let sensor = ManualSensor::new(Capabilities::implicit());
    let (handle, task) = spawn_session(&sensor, memory_store(), &GuesserConfig::default());
    wait_for_state(&handle, GuesserState::TestingSensor).await;
    sensor.push(OrientationReading::level(0.0, 0.0));
    wait_for_state(&handle, GuesserState::Guessing).await;

    let observer = handle.clone();
    drop(handle);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(observer.restart().is_ok());
    assert!(sensor.is_subscribed());

    drop(observer);
    tokio::time::timeout(Duration::from_secs(60), task)
        .await
        .expect("session should end once every handle is dropped")
        .unwrap();

    assert!(!sensor.is_subscribed());
    assert!(!sensor.push(OrientationReading::level(0.1, 0.1)));
}
