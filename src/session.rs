//! The session runtime.
//!
//! A [`Session`] owns one [`GuesserMachine`] and executes the effects it
//! returns against a [`SensorService`] and a [`GuessStore`]. Everything that
//! can change the machine (UI intents, sensor readings, timer fires,
//! permission answers, restored guesses) arrives through a single queue and
//! is processed one envelope at a time, in arrival order.
//!
//! Asynchronous completions carry the id of the request that produced them.
//! A completion whose request has since been cancelled or superseded is
//! dropped before it reaches the machine.

use crate::config::GuesserConfig;
use crate::core::State;
use crate::machine::{Effect, Event, GuesserMachine, MachineOptions, Snapshot};
use crate::model::{Guess, OrientationReading};
use crate::scoring::Scoreboard;
use crate::services::sensor::{
    PermissionOutcome, PermissionRequest, ReadingSink, SensorService, SensorSubscription,
    SubscriptionId,
};
use crate::services::storage::GuessStore;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session has shut down")]
    Closed,
}

/// Everything the session queue carries.
#[derive(Debug)]
pub(crate) enum Envelope {
    Event(Event),
    Reading {
        subscription: SubscriptionId,
        reading: OrientationReading,
    },
    TimerFired {
        timer: u64,
    },
    Permission {
        ticket: u64,
        outcome: PermissionOutcome,
    },
    Restored {
        ticket: u64,
        guesses: Vec<Guess>,
    },
    Shutdown,
}

/// Cloneable UI-side handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    snapshots: watch::Receiver<Snapshot>,
    scoreboard_size: usize,
}

impl SessionHandle {
    /// The user pressed the "allow sensor" button.
    pub fn request_permission(&self) -> Result<(), SessionError> {
        self.send(Event::RequestPermission)
    }

    /// The user locked in the current orientation as a guess.
    pub fn commit_guess(&self) -> Result<(), SessionError> {
        self.send(Event::GuessCommitted)
    }

    /// The user asked for another round.
    pub fn restart(&self) -> Result<(), SessionError> {
        self.send(Event::RestartRequested)
    }

    /// Stop the session, releasing the sensor subscription and any pending
    /// timer. Events already queued are processed first.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.tx
            .send(Envelope::Shutdown)
            .map_err(|_| SessionError::Closed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch snapshots as they are published.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Scoreboard for the latest snapshot, highlighting the newest guess.
    pub fn scoreboard(&self) -> Scoreboard {
        self.snapshots.borrow().scoreboard(self.scoreboard_size)
    }

    fn send(&self, event: Event) -> Result<(), SessionError> {
        self.tx
            .send(Envelope::Event(event))
            .map_err(|_| SessionError::Closed)
    }
}

/// Executes machine effects and publishes snapshots.
///
/// Only [`SessionHandle`]s keep the queue open. Timers, permission requests
/// and sensor sinks hold weak senders, so the session ends once every
/// handle is gone.
pub struct Session<S: SensorService, G: GuessStore> {
    machine: GuesserMachine,
    sensor: Arc<S>,
    store: Arc<G>,
    tx: mpsc::WeakUnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
    snapshots: watch::Sender<Snapshot>,
    subscription: Option<(SubscriptionId, SensorSubscription)>,
    timer: Option<(u64, JoinHandle<()>)>,
    permission_ticket: Option<u64>,
    restore_ticket: Option<u64>,
    next_id: u64,
}

impl<S: SensorService, G: GuessStore> Session<S, G> {
    pub fn new(sensor: Arc<S>, store: Arc<G>, config: &GuesserConfig) -> (Self, SessionHandle) {
        let machine = GuesserMachine::new(sensor.capabilities(), MachineOptions::from(config));
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(machine.snapshot());

        let session_tx = tx.downgrade();
        let handle = SessionHandle {
            tx,
            snapshots: snapshot_rx,
            scoreboard_size: config.scoreboard_size,
        };
        let session = Self {
            machine,
            sensor,
            store,
            tx: session_tx,
            rx,
            snapshots,
            subscription: None,
            timer: None,
            permission_ticket: None,
            restore_ticket: None,
            next_id: 0,
        };
        (session, handle)
    }

    /// Build a session and run it on the current tokio runtime.
    pub fn spawn(
        sensor: Arc<S>,
        store: Arc<G>,
        config: &GuesserConfig,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (session, handle) = Self::new(sensor, store, config);
        (handle, tokio::spawn(session.run()))
    }

    pub fn machine(&self) -> &GuesserMachine {
        &self.machine
    }

    /// Run until [`SessionHandle::shutdown`] is called or every handle has
    /// been dropped.
    pub async fn run(mut self) {
        info!(capabilities = ?self.machine.capabilities(), "session started");
        self.start();

        while let Some(envelope) = self.rx.recv().await {
            if !self.handle(envelope) {
                break;
            }
        }

        self.teardown();
        info!(state = self.machine.state().name(), "session stopped");
    }

    fn start(&mut self) {
        let effects = self.machine.start();
        self.execute(effects);
        self.publish();
    }

    /// Process one envelope. Returns `false` once the session should stop.
    fn handle(&mut self, envelope: Envelope) -> bool {
        match envelope {
            Envelope::Event(event) => self.dispatch(event),
            Envelope::Reading {
                subscription,
                reading,
            } => {
                if self.subscription.as_ref().map(|(id, _)| *id) == Some(subscription) {
                    self.dispatch(Event::OrientationChanged(reading));
                } else {
                    trace!(?subscription, "dropping reading from cancelled subscription");
                }
            }
            Envelope::TimerFired { timer } => {
                if self.timer.as_ref().map(|(id, _)| *id) == Some(timer) {
                    self.timer = None;
                    self.dispatch(Event::SensorTimedOut);
                } else {
                    trace!(timer, "dropping fire from cancelled timer");
                }
            }
            Envelope::Permission { ticket, outcome } => {
                if self.permission_ticket == Some(ticket) {
                    self.permission_ticket = None;
                    debug!(?outcome, "permission answered");
                    self.dispatch(outcome.into());
                } else {
                    trace!(ticket, "dropping superseded permission answer");
                }
            }
            Envelope::Restored { ticket, guesses } => {
                if self.restore_ticket == Some(ticket) {
                    self.restore_ticket = None;
                    self.dispatch(Event::GuessesRestored { guesses });
                } else {
                    trace!(ticket, "dropping superseded restore");
                }
            }
            Envelope::Shutdown => return false,
        }
        self.publish();
        true
    }

    fn dispatch(&mut self, event: Event) {
        let effects = self.machine.send(event);
        self.execute(effects);
    }

    fn teardown(&mut self) {
        let effects = self.machine.stop();
        self.execute(effects);
        self.permission_ticket = None;
        self.restore_ticket = None;
        self.publish();
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        trace!(?effect, "executing effect");
        match effect {
            Effect::RequestPermission { user_initiated } => self.request_permission(user_initiated),
            Effect::StartSensor => self.start_sensor(),
            Effect::StopSensor => {
                if let Some((id, subscription)) = self.subscription.take() {
                    debug!(?id, "stopping sensor");
                    subscription.cancel();
                }
            }
            Effect::StartSensorTimeout { after } => self.start_timer(after),
            Effect::CancelSensorTimeout => {
                if let Some((id, task)) = self.timer.take() {
                    debug!(timer = id, "cancelling sensor timeout");
                    task.abort();
                }
            }
            Effect::RestoreGuesses => {
                let ticket = self.next_id();
                self.restore_ticket = Some(ticket);
                let guesses = self.store.load();
                self.enqueue(Envelope::Restored { ticket, guesses });
            }
            Effect::PersistGuesses { guesses } => {
                if let Err(e) = self.store.save(&guesses) {
                    error!(error = %e, count = guesses.len(), "failed to persist guesses");
                }
            }
        }
    }

    fn request_permission(&mut self, user_initiated: bool) {
        let ticket = self.next_id();
        self.permission_ticket = Some(ticket);

        let pending = self
            .sensor
            .request_permission(PermissionRequest { user_initiated });
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = pending.await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Envelope::Permission { ticket, outcome });
            }
        });
    }

    fn start_sensor(&mut self) {
        let id = SubscriptionId(self.next_id());
        let sink = ReadingSink::new(id, self.tx.clone());
        let subscription = self.sensor.subscribe(sink);
        debug!(?id, "sensor subscribed");
        self.subscription = Some((id, subscription));
    }

    fn start_timer(&mut self, after: Duration) {
        let id = self.next_id();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Envelope::TimerFired { timer: id });
            }
        });
        if let Some((_, previous)) = self.timer.replace((id, task)) {
            previous.abort();
        }
    }

    fn enqueue(&self, envelope: Envelope) {
        match self.tx.upgrade() {
            Some(tx) => {
                let _ = tx.send(envelope);
            }
            None => trace!(?envelope, "every handle dropped, not enqueueing"),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn publish(&self) {
        let context = self.machine.context();
        let state = self.machine.state();
        self.snapshots.send_if_modified(|current| {
            if current.state == state
                && current.orientation == context.orientation
                && current.guesses == context.guesses
            {
                return false;
            }
            *current = self.machine.snapshot();
            true
        });
    }
}

impl<S: SensorService, G: GuessStore> Drop for Session<S, G> {
    fn drop(&mut self) {
        if let Some((_, task)) = self.timer.take() {
            task.abort();
        }
    }
}
