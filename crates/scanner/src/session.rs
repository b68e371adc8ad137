// Rust guideline compliant 2026-10-18

//! Scan session -- drives [`transition`] against a `Desk` for one device.
//!
//! Inputs (decoded symbols, operator actions, camera faults) arrive on a
//! bounded channel through a [`SessionHandle`]. At most one desk call is in
//! flight; each is bounded by [`ScanConfig::call_timeout`]. Every state change
//! is published on a `watch` channel for the display.
//!
//! Entry points: [`ScanSession::open`], [`ScanSession::run`].

use crate::capture::{CaptureGuard, CaptureSource};
use crate::machine::{Command, Fault, Phase, ScanEvent, ScanState, transition};
use domain::{Desk, DeskError};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::error::Elapsed;

// ---------------------------------------------------------------------------
// ScanError
// ---------------------------------------------------------------------------

/// Errors raised while configuring a session.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The supplied configuration is invalid.
    #[error("invalid scan configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ScanConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`ScanSession`].
///
/// Construct via [`ScanConfig::builder`], or take the defaults.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    /// Upper bound on a single `check` or `redeem` call.
    pub call_timeout: Duration,
    /// Capacity of the input channel (`>= 1`). Decodes beyond it are dropped.
    pub input_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { call_timeout: Duration::from_secs(5), input_capacity: 32 }
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    inner: ScanConfig,
}

impl ScanConfig {
    /// Create a builder.
    ///
    /// Default values: `call_timeout = 5s`, `input_capacity = 32`.
    #[must_use]
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder { inner: Self::default() }
    }
}

impl ScanConfigBuilder {
    /// Override the per-call timeout.
    #[must_use]
    pub fn call_timeout(mut self, call_timeout: Duration) -> Self {
        self.inner.call_timeout = call_timeout;
        self
    }

    /// Override the input channel capacity.
    #[must_use]
    pub fn input_capacity(mut self, input_capacity: usize) -> Self {
        self.inner.input_capacity = input_capacity;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] when `input_capacity` or
    /// `call_timeout` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ScanConfig, ScanError> {
        if self.inner.input_capacity == 0 {
            return Err(ScanError::InvalidConfig {
                reason: "input_capacity must be >= 1".to_owned(),
            });
        }
        if self.inner.call_timeout.is_zero() {
            return Err(ScanError::InvalidConfig {
                reason: "call_timeout must be > 0".to_owned(),
            });
        }
        Ok(self.inner)
    }
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Input delivered to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    /// Raw content decoded by the capture source.
    Decoded(String),
    /// Operator: use the ticket.
    Confirm,
    /// Operator: back / next.
    Dismiss,
    /// The capture device stopped working.
    CameraFailed,
    /// Shut the session down.
    Close,
}

/// Cloneable sender side of a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<ScanInput>,
}

impl SessionHandle {
    /// Offer decoded content. Never blocks: a capture source calls this at
    /// frame rate, so when the queue is full the frame is dropped.
    ///
    /// Returns `false` if the content was not queued.
    pub fn on_decoded(&self, content: impl Into<String>) -> bool {
        self.tx.try_send(ScanInput::Decoded(content.into())).is_ok()
    }

    /// Report a capture device failure. Non-blocking, like [`Self::on_decoded`].
    pub fn camera_failed(&self) -> bool {
        self.tx.try_send(ScanInput::CameraFailed).is_ok()
    }

    /// Operator confirms the ticket on screen.
    pub async fn confirm(&self) -> bool {
        self.send(ScanInput::Confirm).await
    }

    /// Operator dismisses the current screen.
    pub async fn dismiss(&self) -> bool {
        self.send(ScanInput::Dismiss).await
    }

    /// Ask the session to stop.
    pub async fn close(&self) -> bool {
        self.send(ScanInput::Close).await
    }

    /// `true` once the session has stopped and inputs go nowhere.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Returns `false` once the session has stopped.
    pub async fn send(&self, input: ScanInput) -> bool {
        self.tx.send(input).await.is_ok()
    }
}

// ---------------------------------------------------------------------------
// ScanSession
// ---------------------------------------------------------------------------

type InFlight<'a> = Pin<Box<dyn Future<Output = ScanEvent> + Send + 'a>>;

/// One device's scan loop over a `Desk`.
///
/// Sessions share nothing with one another; any number may run against the
/// same desk.
#[derive(Debug)]
pub struct ScanSession<D> {
    desk: D,
    config: ScanConfig,
    state: ScanState,
    inputs: mpsc::Receiver<ScanInput>,
    handle: SessionHandle,
    publisher: watch::Sender<ScanState>,
    capture: Option<CaptureGuard>,
}

impl<D: Desk> ScanSession<D> {
    /// Acquire `source` and create a session in `Idle`.
    ///
    /// If the device cannot be acquired the session opens in `Error` with a
    /// camera fault, so the operator sees it instead of an empty screen.
    #[must_use]
    pub fn open(desk: D, source: &impl CaptureSource, config: ScanConfig) -> Self {
        let (tx, inputs) = mpsc::channel(config.input_capacity.max(1));
        let handle = SessionHandle { tx };
        let (state, capture) = match source.start(handle.clone()) {
            Ok(guard) => (ScanState::default(), Some(guard)),
            Err(e) => {
                log::error!("scanner.capture.failed: error={e}");
                (transition(&ScanState::default(), ScanEvent::CameraFailed).state, None)
            }
        };
        let (publisher, _) = watch::channel(state.clone());
        log::info!("scanner.session.opened: phase={}", state.phase);
        Self { desk, config, state, inputs, handle, publisher, capture }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Sender for inputs. Clone freely.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Receive every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.publisher.subscribe()
    }

    /// Process inputs until `Close` arrives or every handle is dropped.
    ///
    /// Returns the final state. The capture device is released on return.
    pub async fn run(self) -> ScanState {
        let Self { desk, config, mut state, mut inputs, handle, publisher, capture } = self;
        drop(handle);
        let mut in_flight: Option<InFlight<'_>> = None;

        loop {
            // Inputs first: anything queued while a call is pending is seen
            // before the call resolves, and the machine drops it.
            let (event, resolved) = tokio::select! {
                biased;
                input = inputs.recv() => match input.and_then(into_event) {
                    Some(event) => (event, false),
                    None => break,
                },
                Some(event) = resolve(&mut in_flight) => (event, true),
            };
            if resolved {
                in_flight = None;
            }

            let decoded = matches!(event, ScanEvent::Decoded(_));
            let step = transition(&state, event);
            if decoded && step.command.is_none() {
                log::debug!("scanner.decode.ignored: phase={}", state.phase);
            }
            if step.state.phase != state.phase {
                log::info!("scanner.phase: {} -> {}", state.phase, step.state.phase);
            }
            if matches!(step.state.phase, Phase::Idle | Phase::Error) {
                in_flight = None;
            }
            if let Some(command) = step.command {
                in_flight = Some(dispatch(&desk, command, config.call_timeout));
            }
            if step.state != state {
                state = step.state;
                publisher.send_replace(state.clone());
            }
        }

        drop(in_flight);
        drop(capture);
        log::info!("scanner.session.closed: phase={}", state.phase);
        state
    }
}

/// `None` for `Close`.
fn into_event(input: ScanInput) -> Option<ScanEvent> {
    match input {
        ScanInput::Decoded(content) => Some(ScanEvent::Decoded(content)),
        ScanInput::Confirm => Some(ScanEvent::Confirm),
        ScanInput::Dismiss => Some(ScanEvent::Dismiss),
        ScanInput::CameraFailed => Some(ScanEvent::CameraFailed),
        ScanInput::Close => None,
    }
}

async fn resolve(in_flight: &mut Option<InFlight<'_>>) -> Option<ScanEvent> {
    match in_flight {
        Some(call) => Some(call.await),
        None => None,
    }
}

fn dispatch<D: Desk>(desk: &D, command: Command, limit: Duration) -> InFlight<'_> {
    Box::pin(async move {
        match command {
            Command::Check(id) => {
                log::debug!("scanner.call.check: id={id}");
                settle(tokio::time::timeout(limit, desk.check(&id)).await, ScanEvent::CheckResolved)
            }
            Command::Redeem(id) => {
                log::debug!("scanner.call.redeem: id={id}");
                settle(
                    tokio::time::timeout(limit, desk.redeem(&id)).await,
                    ScanEvent::RedeemResolved,
                )
            }
        }
    })
}

fn settle<T>(result: Result<Result<T, DeskError>, Elapsed>, ok: fn(T) -> ScanEvent) -> ScanEvent {
    match result {
        Ok(Ok(outcome)) => ok(outcome),
        Ok(Err(DeskError::StoreUnavailable)) => {
            log::warn!("scanner.call.failed: fault=store_unavailable");
            ScanEvent::CallFailed(Fault::StoreUnavailable)
        }
        Err(_) => {
            log::warn!("scanner.call.failed: fault=timed_out");
            ScanEvent::CallFailed(Fault::TimedOut)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
