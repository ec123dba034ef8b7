//! Sensor service contract.
//!
//! A platform adapter exposes what the device can do, a one-shot permission
//! request, and a push-based stream of orientation readings behind an
//! explicit subscription handle.

use crate::machine::Event;
use crate::model::OrientationReading;
use crate::session::Envelope;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// What the platform offers, queried once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// A device motion API exists.
    pub device_motion: bool,
    /// The platform exposes an explicit permission request. Without one,
    /// access is granted implicitly.
    pub permission_required: bool,
}

impl Capabilities {
    /// Motion API behind an explicit permission prompt.
    pub fn full() -> Self {
        Self {
            device_motion: true,
            permission_required: true,
        }
    }

    /// Motion API with implicit access.
    pub fn implicit() -> Self {
        Self {
            device_motion: true,
            permission_required: false,
        }
    }

    /// No motion API at all.
    pub fn none() -> Self {
        Self {
            device_motion: false,
            permission_required: false,
        }
    }
}

/// Result of a permission request. Each outcome maps to exactly one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionOutcome {
    Granted,
    Denied,
    /// The platform will only prompt from inside a user gesture handler.
    NeedsUserGesture,
}

impl From<PermissionOutcome> for Event {
    fn from(outcome: PermissionOutcome) -> Self {
        match outcome {
            PermissionOutcome::Granted => Event::PermissionGranted,
            PermissionOutcome::Denied => Event::PermissionDenied,
            PermissionOutcome::NeedsUserGesture => Event::MissingPermissionReported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRequest {
    /// Set when the request is issued while handling a user gesture.
    pub user_initiated: bool,
}

pub type PermissionFuture = Pin<Box<dyn Future<Output = PermissionOutcome> + Send>>;

/// Identifies one live subscription within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Where a subscription pushes its readings.
///
/// Readings are tagged with the subscription they came from, so a reading
/// that races a cancellation is discarded instead of reaching the machine.
/// A sink does not keep the session alive.
#[derive(Debug, Clone)]
pub struct ReadingSink {
    id: SubscriptionId,
    tx: mpsc::WeakUnboundedSender<Envelope>,
}

impl ReadingSink {
    pub(crate) fn new(id: SubscriptionId, tx: mpsc::WeakUnboundedSender<Envelope>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Push a reading. Returns `false` once the session has shut down.
    pub fn emit(&self, reading: OrientationReading) -> bool {
        self.tx.upgrade().is_some_and(|tx| {
            tx.send(Envelope::Reading {
                subscription: self.id,
                reading,
            })
            .is_ok()
        })
    }
}

/// Handle to a live subscription. Cancelling runs the platform's
/// unsubscribe callback exactly once; dropping the handle cancels too.
pub struct SensorSubscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl SensorSubscription {
    pub fn new<F>(unsubscribe: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for SensorSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for SensorSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorSubscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Platform adapter for the tilt sensor.
pub trait SensorService: Send + Sync + 'static {
    fn capabilities(&self) -> Capabilities;

    /// Ask for sensor access. The call itself happens synchronously inside
    /// the session's event handler; only the answer is awaited.
    fn request_permission(&self, request: PermissionRequest) -> PermissionFuture;

    /// Start pushing readings into `sink` until the returned handle is
    /// cancelled.
    fn subscribe(&self, sink: ReadingSink) -> SensorSubscription;
}

#[derive(Debug, Default)]
struct ManualState {
    sink: Option<ReadingSink>,
    outcomes: VecDeque<PermissionOutcome>,
    requests: Vec<PermissionRequest>,
    subscriptions: usize,
}

/// A sensor driven by its host.
///
/// Hosts that receive orientation events from elsewhere (a JS bridge, a
/// replay file) push them in with [`push`](Self::push). Permission answers
/// are queued up front; once the queue runs dry every request is granted.
#[derive(Debug, Clone)]
pub struct ManualSensor {
    capabilities: Capabilities,
    state: Arc<Mutex<ManualState>>,
}

impl ManualSensor {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            state: Arc::new(Mutex::new(ManualState::default())),
        }
    }

    /// Queue answers for the next permission requests, in order.
    pub fn with_permission_outcomes(
        self,
        outcomes: impl IntoIterator<Item = PermissionOutcome>,
    ) -> Self {
        self.lock().outcomes.extend(outcomes);
        self
    }

    /// Forward a reading to the live subscription, if any. Returns whether
    /// a subscriber received it.
    pub fn push(&self, reading: OrientationReading) -> bool {
        match &self.lock().sink {
            Some(sink) => sink.emit(reading),
            None => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock().sink.is_some()
    }

    /// Number of subscriptions opened so far.
    pub fn subscription_count(&self) -> usize {
        self.lock().subscriptions
    }

    /// Every permission request received so far.
    pub fn permission_requests(&self) -> Vec<PermissionRequest> {
        self.lock().requests.clone()
    }

    /// Sink of the live subscription, for hosts that emit from elsewhere.
    pub fn current_sink(&self) -> Option<ReadingSink> {
        self.lock().sink.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SensorService for ManualSensor {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn request_permission(&self, request: PermissionRequest) -> PermissionFuture {
        let outcome = {
            let mut state = self.lock();
            state.requests.push(request);
            state
                .outcomes
                .pop_front()
                .unwrap_or(PermissionOutcome::Granted)
        };
        Box::pin(async move { outcome })
    }

    fn subscribe(&self, sink: ReadingSink) -> SensorSubscription {
        let id = sink.id();
        {
            let mut state = self.lock();
            state.subscriptions += 1;
            state.sink = Some(sink);
        }
        let state = Arc::clone(&self.state);
        SensorSubscription::new(move || {
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.sink.as_ref().map(ReadingSink::id) == Some(id) {
                state.sink = None;
            }
        })
    }
}
