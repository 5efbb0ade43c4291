//! Async host for the scan controller
//!
//! [`ScanService`] runs on tokio and is the only place that awaits: it
//! performs camera requests, paces ticks at the configured frame interval
//! and forwards user intents. The presentation layer talks to it through a
//! [`ScannerHandle`]: intents go in over a channel, state comes out of a
//! `watch` channel.

use crate::config::ScannerConfig;
use crate::controller::{AcquisitionTicket, ScanController, StateObserver};
use crate::decoder::Decoder;
use crate::error::{AcquisitionError, ServiceError};
use crate::models::{ScannerState, StateKind};
use crate::scheduler::PendingTick;
use crate::source::{Camera, Constraints, FrameHandle};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// User intents accepted by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Begin a session (only from Idle)
    Start,
    /// Leave the Error state
    Retry,
    /// Leave the Success state
    ScanAgain,
    /// Abandon the running session, releasing the camera
    Cancel,
    /// Tear down and stop the service
    Shutdown,
}

struct WatchPublisher(watch::Sender<ScannerState>);

impl StateObserver for WatchPublisher {
    fn state_changed(&mut self, state: &ScannerState) {
        self.0.send_replace(state.clone());
    }
}

type Settled<S> = (AcquisitionTicket, Result<FrameHandle<S>, AcquisitionError>);

/// Presentation-side handle to a running [`ScanService`]
#[derive(Debug, Clone)]
pub struct ScannerHandle {
    intents: mpsc::UnboundedSender<Intent>,
    state: watch::Receiver<ScannerState>,
}

impl ScannerHandle {
    /// Send an intent
    pub fn send(&self, intent: Intent) -> Result<(), ServiceError> {
        self.intents.send(intent).map_err(|_| ServiceError::Closed)
    }

    /// Start scanning
    pub fn start(&self) -> Result<(), ServiceError> {
        self.send(Intent::Start)
    }

    /// Clear an acquisition error
    pub fn retry(&self) -> Result<(), ServiceError> {
        self.send(Intent::Retry)
    }

    /// Clear a result and go back to Idle
    pub fn scan_again(&self) -> Result<(), ServiceError> {
        self.send(Intent::ScanAgain)
    }

    /// Abandon the current session
    pub fn cancel(&self) -> Result<(), ServiceError> {
        self.send(Intent::Cancel)
    }

    /// Stop the service
    pub fn shutdown(&self) -> Result<(), ServiceError> {
        self.send(Intent::Shutdown)
    }

    /// Latest published state
    pub fn state(&self) -> ScannerState {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ScannerState> {
        self.state.clone()
    }

    /// Wait until the published state is of `kind`
    pub async fn wait_for(&self, kind: StateKind) -> Result<ScannerState, ServiceError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|state| state.kind() == kind)
            .await
            .map_err(|_| ServiceError::Closed)?;
        Ok(state.clone())
    }
}

/// Drives one [`ScanController`] against a [`Camera`]
pub struct ScanService<C: Camera, D: Decoder> {
    camera: C,
    controller: ScanController<C::Stream, D, WatchPublisher>,
    frame_interval: Duration,
}

impl<C, D> ScanService<C, D>
where
    C: Camera,
    D: Decoder + Send + 'static,
{
    /// Spawn the service on the current tokio runtime.
    ///
    /// `config` supplies the camera constraints and tick pacing. The decoder
    /// arrives already built; use [`QrDecoder::from_config`](crate::QrDecoder::from_config)
    /// to apply `parallel_threshold` as well.
    pub fn spawn(camera: C, decoder: D, config: &ScannerConfig) -> (ScannerHandle, JoinHandle<()>) {
        let (state_tx, state_rx) = watch::channel(ScannerState::Idle);
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();

        let controller = ScanController::new(decoder, WatchPublisher(state_tx))
            .with_constraints(Constraints {
                facing_mode: config.facing_mode,
            });
        let service = ScanService {
            camera,
            controller,
            frame_interval: config.frame_interval,
        };

        let task = tokio::spawn(service.run(intent_rx));
        let handle = ScannerHandle {
            intents: intent_tx,
            state: state_rx,
        };
        (handle, task)
    }

    async fn run(mut self, mut intents: mpsc::UnboundedReceiver<Intent>) {
        let (settled_tx, mut settled_rx) = mpsc::unbounded_channel::<Settled<C::Stream>>();
        let mut due: Option<(PendingTick, Instant)> = None;
        info!(interval_ms = self.frame_interval.as_millis() as u64, "scanner service running");

        loop {
            // A tick newly placed in the slot runs one frame interval later
            due = match (self.controller.pending_tick(), due) {
                (Some(tick), Some((current, at))) if current == tick => Some((current, at)),
                (Some(tick), _) => Some((tick, Instant::now() + self.frame_interval)),
                (None, _) => None,
            };
            let deadline = due.map(|(_, at)| at);

            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(Intent::Start) => self.start(&settled_tx),
                    Some(Intent::Retry) => {
                        self.controller.retry();
                    }
                    Some(Intent::ScanAgain) => {
                        self.controller.scan_again();
                    }
                    Some(Intent::Cancel) => self.controller.teardown(),
                    Some(Intent::Shutdown) | None => break,
                },
                Some((ticket, result)) = settled_rx.recv() => {
                    self.controller.acquisition_settled(ticket, result);
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some((tick, _)) = due.take() {
                        self.controller.tick(tick);
                    }
                }
            }
        }

        self.controller.teardown();
        info!("scanner service stopped");
    }

    fn start(&mut self, settled: &mpsc::UnboundedSender<Settled<C::Stream>>) {
        let Some(ticket) = self.controller.start() else {
            return;
        };
        let request = self.camera.request(self.controller.constraints());
        let settled = settled.clone();
        tokio::spawn(async move {
            let result = request.await.map(FrameHandle::new);
            // If the service is gone the handle is dropped here, which stops the stream
            if settled.send((ticket, result)).is_err() {
                debug!(ticket = ticket.id(), "service gone before acquisition settled");
            }
        });
    }
}
