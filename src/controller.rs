//! Scan Controller: the session state machine
//!
//! ```text
//! Idle --start--> Requesting --granted--> Scanning --found--> Success
//!                      |                    |  ^                  |
//!                      |                    +--+ no code /        |
//!                      |                       not ready          |
//!                      +--denied/no device/other--> Error         |
//! Success | Error --reset--> Idle        Requesting | Scanning --teardown--> Idle
//! ```
//!
//! The controller is a plain synchronous state machine. Its host feeds it
//! events (intents, acquisition results, due ticks) one at a time; the
//! camera request itself is performed by the host and reported back with
//! the [`AcquisitionTicket`] handed out by [`ScanController::start`].
//!
//! The camera stream lives inside the `Scanning` phase, so a frame handle
//! exists only while scanning and leaving that phase releases it.

use crate::decoder::Decoder;
use crate::error::AcquisitionError;
use crate::models::{DecodedPayload, ScannerState, StateKind};
use crate::pipeline::{CapturePipeline, DecodeOutcome};
use crate::scheduler::{PendingTick, TickSlot};
use crate::source::{Constraints, FrameHandle, VideoStream};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace, warn};

/// Identifies one camera request; results for an abandoned request are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcquisitionTicket(u64);

impl AcquisitionTicket {
    /// Sequence number (monotonic per controller)
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Receives every published state change
pub trait StateObserver {
    /// Called after each transition, never for a no-op event
    fn state_changed(&mut self, state: &ScannerState);
}

impl<F: FnMut(&ScannerState)> StateObserver for F {
    fn state_changed(&mut self, state: &ScannerState) {
        self(state)
    }
}

/// Observer that records every published state; clones share the log
#[derive(Debug, Clone, Default)]
pub struct StateLog {
    states: Arc<Mutex<Vec<ScannerState>>>,
}

impl StateLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All published states, oldest first
    pub fn states(&self) -> Vec<ScannerState> {
        self.states.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Kinds of all published states, oldest first
    pub fn kinds(&self) -> Vec<StateKind> {
        self.states().iter().map(ScannerState::kind).collect()
    }
}

impl StateObserver for StateLog {
    fn state_changed(&mut self, state: &ScannerState) {
        if let Ok(mut states) = self.states.lock() {
            states.push(state.clone());
        }
    }
}

enum Phase<S: VideoStream> {
    Idle,
    Requesting(AcquisitionTicket),
    Scanning(FrameHandle<S>),
    Success(DecodedPayload),
    Error(AcquisitionError),
}

impl<S: VideoStream> Phase<S> {
    fn to_state(&self) -> ScannerState {
        match self {
            Phase::Idle => ScannerState::Idle,
            Phase::Requesting(_) => ScannerState::Requesting,
            Phase::Scanning(_) => ScannerState::Scanning,
            Phase::Success(payload) => ScannerState::Success(payload.clone()),
            Phase::Error(err) => ScannerState::Error(err.clone()),
        }
    }

    fn is_active(&self) -> bool {
        matches!(self, Phase::Requesting(_) | Phase::Scanning(_))
    }
}

/// Owns the session state, the frame handle, the tick slot and the pipeline
pub struct ScanController<S: VideoStream, D: Decoder, O: StateObserver> {
    phase: Phase<S>,
    ticks: TickSlot,
    pipeline: CapturePipeline<D>,
    observer: O,
    constraints: Constraints,
    next_ticket: u64,
}

impl<S: VideoStream, D: Decoder, O: StateObserver> ScanController<S, D, O> {
    /// Create an idle controller
    pub fn new(decoder: D, observer: O) -> Self {
        Self {
            phase: Phase::Idle,
            ticks: TickSlot::new(),
            pipeline: CapturePipeline::new(decoder),
            observer,
            constraints: Constraints::default(),
            next_ticket: 0,
        }
    }

    /// Constraints used for camera requests
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Constraints the host should pass to the camera
    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    /// Current state
    pub fn state(&self) -> ScannerState {
        self.phase.to_state()
    }

    /// Current state kind
    pub fn kind(&self) -> StateKind {
        self.state().kind()
    }

    /// Tick the host should run next, if any
    pub fn pending_tick(&self) -> Option<PendingTick> {
        self.ticks.pending()
    }

    /// Whether a camera stream is currently held
    pub fn holds_frame_handle(&self) -> bool {
        matches!(&self.phase, Phase::Scanning(handle) if handle.is_held())
    }

    /// Capture pipeline (for stats)
    pub fn pipeline(&self) -> &CapturePipeline<D> {
        &self.pipeline
    }

    /// The state observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Start a session: Idle -> Requesting.
    ///
    /// Returns the ticket the host must report the camera result with, or
    /// `None` if a session is already running or awaiting reset.
    pub fn start(&mut self) -> Option<AcquisitionTicket> {
        if !matches!(self.phase, Phase::Idle) {
            debug!(state = %self.kind(), "start ignored");
            return None;
        }
        self.next_ticket += 1;
        let ticket = AcquisitionTicket(self.next_ticket);
        info!(
            ticket = ticket.id(),
            facing = %self.constraints.facing_mode,
            "requesting camera"
        );
        self.enter(Phase::Requesting(ticket));
        Some(ticket)
    }

    /// Report the outcome of the camera request identified by `ticket`.
    ///
    /// If the session moved on (teardown, or a newer request), a granted
    /// stream is released on the spot and the state is left alone.
    /// Returns true if the result was applied to the session.
    pub fn acquisition_settled(
        &mut self,
        ticket: AcquisitionTicket,
        result: Result<FrameHandle<S>, AcquisitionError>,
    ) -> bool {
        let current = matches!(self.phase, Phase::Requesting(t) if t == ticket);
        if !current {
            match result {
                Ok(mut handle) => {
                    handle.release();
                    info!(ticket = ticket.id(), "late camera stream released");
                }
                Err(err) => {
                    debug!(ticket = ticket.id(), %err, "late acquisition failure dropped");
                }
            }
            return false;
        }

        match result {
            Ok(handle) => {
                info!(ticket = ticket.id(), "camera granted, scanning");
                self.enter(Phase::Scanning(handle));
                self.ticks.schedule();
            }
            Err(err) => {
                warn!(ticket = ticket.id(), %err, "camera acquisition failed");
                self.enter(Phase::Error(err));
            }
        }
        true
    }

    /// Run a due tick: capture one frame and decode it.
    ///
    /// A tick that was cancelled or superseded does nothing and returns `None`.
    pub fn tick(&mut self, tick: PendingTick) -> Option<DecodeOutcome> {
        if !self.ticks.claim(tick) {
            trace!(tick = tick.id(), "stale tick ignored");
            return None;
        }

        let outcome = match &mut self.phase {
            Phase::Scanning(handle) => match handle.stream_mut() {
                Some(stream) => self.pipeline.capture_and_decode(stream),
                None => return None,
            },
            _ => return None,
        };

        match &outcome {
            DecodeOutcome::Found(payload) => {
                info!(len = payload.as_str().len(), "QR code decoded");
                self.ticks.cancel();
                self.release_frame_handle();
                self.enter(Phase::Success(payload.clone()));
            }
            DecodeOutcome::NoCode | DecodeOutcome::NotReady => {
                self.ticks.schedule();
            }
        }
        Some(outcome)
    }

    /// Success | Error -> Idle, clearing result and error detail
    pub fn reset(&mut self) -> bool {
        match self.phase {
            Phase::Success(_) | Phase::Error(_) => {
                self.enter(Phase::Idle);
                true
            }
            _ => false,
        }
    }

    /// Reset after an acquisition failure
    pub fn retry(&mut self) -> bool {
        matches!(self.phase, Phase::Error(_)) && self.reset()
    }

    /// Reset after a successful scan
    pub fn scan_again(&mut self) -> bool {
        matches!(self.phase, Phase::Success(_)) && self.reset()
    }

    /// Release the camera and cancel the pending tick.
    ///
    /// Safe from any state and idempotent. An active session (Requesting or
    /// Scanning) falls back to Idle; a request still in flight becomes stale.
    pub fn teardown(&mut self) {
        let cancelled = self.ticks.cancel();
        let released = self.release_frame_handle();
        if self.phase.is_active() {
            self.enter(Phase::Idle);
        }
        debug!(cancelled, released, "teardown");
    }

    fn release_frame_handle(&mut self) -> bool {
        match &mut self.phase {
            Phase::Scanning(handle) => handle.release(),
            _ => false,
        }
    }

    fn enter(&mut self, phase: Phase<S>) {
        let before = self.phase.to_state();
        self.phase = phase;
        let after = self.phase.to_state();
        if after != before {
            debug!(from = %before.kind(), to = %after.kind(), "state changed");
            self.observer.state_changed(&after);
        }
    }
}

impl<S: VideoStream, D: Decoder, O: StateObserver> Drop for ScanController<S, D, O> {
    fn drop(&mut self) {
        self.teardown();
    }
}
