// Rust guideline compliant 2026-10-12

//! Issuer component -- mints ticket ids and writes fresh `Issued` tickets to a
//! `TicketStore` hexagonal port.
//!
//! Entry points: [`TicketIssuer::generate_id`], [`TicketIssuer::issue`].
//! Configuration via [`IssuerConfig::builder`].

use domain::{Clock, Holder, HolderError, StoreError, SystemClock, Ticket, TicketId, TicketStore};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::sync::{Mutex, PoisonError};

// ---------------------------------------------------------------------------
// IssueError
// ---------------------------------------------------------------------------

/// Errors that can occur while issuing a ticket.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    /// The supplied configuration is invalid.
    #[error("invalid issuer configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// Name or contact was blank.
    #[error("invalid holder: {0}")]
    InvalidHolder(#[from] HolderError),
    /// Every generated id collided with an existing ticket.
    #[error("generated id collided {attempts} time(s)")]
    DuplicateId {
        /// Number of ids tried.
        attempts: u32,
    },
    /// The store could not be reached.
    #[error("ticket store unavailable")]
    StoreUnavailable,
}

// ---------------------------------------------------------------------------
// IssuerConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`TicketIssuer`].
///
/// Construct via [`IssuerConfig::builder`].
#[derive(Debug)]
pub struct IssuerConfig {
    /// How many fresh ids to try when the store reports a collision (`>= 1`).
    pub max_attempts: u32,
    /// Optional RNG seed for reproducible ids. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`IssuerConfig`].
///
/// Obtain via [`IssuerConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct IssuerConfigBuilder {
    max_attempts: u32,
    seed: Option<u64>,
}

impl IssuerConfig {
    /// Create a builder.
    ///
    /// Default values: `max_attempts = 3`, `seed = None`.
    #[must_use]
    pub fn builder() -> IssuerConfigBuilder {
        IssuerConfigBuilder { max_attempts: 3, seed: None }
    }
}

impl IssuerConfigBuilder {
    /// Override the number of ids tried per issuance.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Fix the RNG seed for deterministic ids (tests only; never in production,
    /// seeded ids are guessable).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError::InvalidConfig`] when `max_attempts` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<IssuerConfig, IssueError> {
        if self.max_attempts == 0 {
            return Err(IssueError::InvalidConfig {
                reason: "max_attempts must be >= 1".to_owned(),
            });
        }
        Ok(IssuerConfig { max_attempts: self.max_attempts, seed: self.seed })
    }
}

// ---------------------------------------------------------------------------
// TicketIssuer
// ---------------------------------------------------------------------------

/// Creates `Issued` tickets with unique random ids.
///
/// Generic over the `TicketStore` and `Clock` ports for static dispatch.
/// Uniqueness is enforced by the store on insert; a collision is retried with
/// a fresh id and never produces a second record.
#[derive(Debug)]
pub struct TicketIssuer<S, C = SystemClock> {
    config: IssuerConfig,
    store: S,
    clock: C,
    /// Mutex so the issuer can be shared across request handlers.
    rng: Mutex<StdRng>,
}

impl<S: TicketStore, C: Clock> TicketIssuer<S, C> {
    /// Create a new issuer writing to `store`, stamping with `clock`.
    ///
    /// Seeds the RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: IssuerConfig, store: S, clock: C) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, store, clock, rng: Mutex::new(rng) }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Draw a fresh ticket id: a random (v4) UUID in canonical text form.
    #[must_use]
    pub fn generate_id(&self) -> TicketId {
        let mut bytes = [0u8; 16];
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(&mut bytes);
        TicketId::from_uuid(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Issue a ticket to `name` / `contact`.
    ///
    /// Both fields are trimmed. On an id collision a new id is drawn, up to
    /// `config.max_attempts` ids in total.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError::InvalidHolder`] for blank input,
    /// [`IssueError::StoreUnavailable`] if the store cannot be reached, or
    /// [`IssueError::DuplicateId`] once every attempt collided.
    pub async fn issue(&self, name: &str, contact: &str) -> Result<Ticket, IssueError> {
        let holder = Holder::new(name, contact)?;
        for attempt in 1..=self.config.max_attempts {
            let ticket = Ticket::issued(self.generate_id(), holder.clone(), self.clock.now());
            match self.store.insert(ticket.clone()).await {
                Ok(()) => {
                    log::info!("issuer.ticket.issued: id={} attempt={attempt}", ticket.id);
                    return Ok(ticket);
                }
                Err(StoreError::DuplicateId { id }) => {
                    log::warn!("issuer.id.collision: id={id} attempt={attempt}");
                }
                Err(StoreError::Unavailable) => {
                    log::error!("issuer.store.unavailable: attempt={attempt}");
                    return Err(IssueError::StoreUnavailable);
                }
            }
        }
        Err(IssueError::DuplicateId { attempts: self.config.max_attempts })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
