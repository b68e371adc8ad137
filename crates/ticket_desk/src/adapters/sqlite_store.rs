// Rust guideline compliant 2026-10-18

//! `SQLite` adapter for the `TicketStore` port.
//!
//! Persists tickets via `sqlx`. Redemption is a single conditional
//! `UPDATE ... WHERE status = 'issued'`; `SQLite` serializes writers, so of any
//! number of racing updates exactly one affects a row.
//!
//! Timestamps are stored as RFC 3339 text. The schema's `CHECK` constraints
//! mirror the domain invariants: status is one of two values and
//! `redeemed_at` is set exactly when the ticket is redeemed.

use chrono::{DateTime, Utc};
use domain::{Holder, RedeemTransition, StoreError, Ticket, TicketId, TicketStatus, TicketStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tickets (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL CHECK (length(name) > 0),
    contact     TEXT NOT NULL CHECK (length(contact) > 0),
    status      TEXT NOT NULL CHECK (status IN ('issued', 'redeemed')),
    issued_at   TEXT NOT NULL,
    redeemed_at TEXT,
    CHECK ((status = 'redeemed') = (redeemed_at IS NOT NULL))
)";

const SELECT_ONE: &str =
    "SELECT id, name, contact, status, issued_at, redeemed_at FROM tickets WHERE id = ?";

/// Raw column tuple, in `SELECT_ONE` order.
type TicketRow = (String, String, String, String, String, Option<String>);

/// `TicketStore` adapter backed by a `SQLite` database via `sqlx`.
#[derive(Debug, Clone)]
pub struct SqliteTicketStore {
    pool: sqlx::SqlitePool,
}

impl SqliteTicketStore {
    /// Open or create the database at `db_url` and ensure the schema exists.
    ///
    /// `sqlite::memory:` gives a private database per store; open it with
    /// `max_connections = 1` so every query sees the same connection.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` when the connection or schema creation fails.
    pub async fn open(db_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        // sqlx 0.8 defaults create_if_missing to false for file databases.
        let opts = db_url.parse::<SqliteConnectOptions>()?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(opts)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        log::info!("sqlite.opened: url={db_url} max_connections={max_connections}");
        Ok(Self { pool })
    }

    async fn fetch(&self, id: &TicketId) -> Result<Option<Ticket>, StoreError> {
        let row = sqlx::query_as::<_, TicketRow>(SELECT_ONE)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("get", &e))?;
        row.map(into_ticket).transpose()
    }
}

fn unavailable(op: &str, e: &sqlx::Error) -> StoreError {
    log::error!("sqlite.{op}.failed: error={e}");
    StoreError::Unavailable
}

/// Primary-key (1555) or unique (2067) constraint failure.
fn is_key_conflict(db: &dyn sqlx::error::DatabaseError) -> bool {
    db.is_unique_violation() || matches!(db.code().as_deref(), Some("1555" | "2067"))
}

fn parse_time(column: &str, text: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text).map(|t| t.with_timezone(&Utc)).map_err(|e| {
        log::error!("sqlite.row.corrupt: column={column} value={text} error={e}");
        StoreError::Unavailable
    })
}

fn into_ticket(row: TicketRow) -> Result<Ticket, StoreError> {
    let (id, name, contact, status, issued_at, redeemed_at) = row;
    let holder = Holder::new(&name, &contact).map_err(|e| {
        log::error!("sqlite.row.corrupt: id={id} error={e}");
        StoreError::Unavailable
    })?;
    let status = match (status.as_str(), redeemed_at) {
        ("issued", None) => TicketStatus::Issued,
        ("redeemed", Some(at)) => TicketStatus::Redeemed { at: parse_time("redeemed_at", &at)? },
        (other, _) => {
            log::error!("sqlite.row.corrupt: id={id} status={other}");
            return Err(StoreError::Unavailable);
        }
    };
    let issued_at = parse_time("issued_at", &issued_at)?;
    Ok(Ticket { id: TicketId::new(id), holder, status, issued_at })
}

impl TicketStore for SqliteTicketStore {
    /// Plain `INSERT`: a primary-key conflict is reported, never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateId` on a key conflict, otherwise
    /// `StoreError::Unavailable` for any `sqlx` error.
    async fn insert(&self, ticket: Ticket) -> Result<(), StoreError> {
        let (status, redeemed_at) = match ticket.status {
            TicketStatus::Issued => ("issued", None),
            TicketStatus::Redeemed { at } => ("redeemed", Some(at.to_rfc3339())),
        };
        let result = sqlx::query(
            "INSERT INTO tickets (id, name, contact, status, issued_at, redeemed_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(ticket.id.as_str())
        .bind(&ticket.holder.name)
        .bind(&ticket.holder.contact)
        .bind(status)
        .bind(ticket.issued_at.to_rfc3339())
        .bind(redeemed_at)
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if is_key_conflict(db.as_ref()) => {
                Err(StoreError::DuplicateId { id: ticket.id })
            }
            Err(e) => Err(unavailable("insert", &e)),
        }
    }

    async fn get(&self, id: &TicketId) -> Result<Option<Ticket>, StoreError> {
        self.fetch(id).await
    }

    /// Conditional update, then read back.
    ///
    /// Whether this call won is decided by `rows_affected` alone; the follow-up
    /// read only supplies the ticket to return.
    async fn redeem_if_issued(
        &self,
        id: &TicketId,
        at: DateTime<Utc>,
    ) -> Result<RedeemTransition, StoreError> {
        let won = sqlx::query(
            "UPDATE tickets SET status = 'redeemed', redeemed_at = ?
             WHERE id = ? AND status = 'issued'",
        )
        .bind(at.to_rfc3339())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| unavailable("redeem", &e))?
        .rows_affected()
            == 1;

        Ok(match (won, self.fetch(id).await?) {
            (_, None) => RedeemTransition::NotFound,
            (true, Some(ticket)) => RedeemTransition::Redeemed(ticket),
            (false, Some(ticket)) => RedeemTransition::AlreadyRedeemed(ticket),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
