use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Event, EventDetails, EventStatus, Ticket};

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Which uniqueness rule a rejected ticket insert tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    TicketNumber,
    ScanCode,
    /// The partial index on (event_id, user_id): the buyer already holds an
    /// ACTIVE or VALIDATED ticket for this event.
    LiveTicket,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Conflict::TicketNumber => "ticket_number",
            Conflict::ScanCode => "scan_code",
            Conflict::LiveTicket => "live ticket per user and event",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Conflict(Conflict),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True when the driver reported lock contention and the statement can
    /// simply be retried.
    pub fn is_busy(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db)) => {
                let message = db.message();
                message.contains("database is locked") || message.contains("database table is locked")
            }
            _ => false,
        }
    }
}

/// Event rows: inserts, conditional lifecycle transitions, the two capacity
/// updates the ledger is built on, and the discovery queries.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<(), StoreError>;

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;

    /// Overwrites the editable fields. Returns false when no such row exists.
    async fn update_details(
        &self,
        event_id: Uuid,
        details: &EventDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Moves `from` to `to` in one conditional statement. Returns false when
    /// the row was not in `from`, so exactly one of any concurrent callers
    /// observes true.
    async fn transition_status(
        &self,
        event_id: Uuid,
        from: EventStatus,
        to: EventStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Decrements remaining capacity by one, only while the event is
    /// published and has seats left. Returns whether a seat was taken.
    async fn reserve_capacity(&self, event_id: Uuid, updated_at: DateTime<Utc>)
        -> Result<bool, StoreError>;

    /// Increments remaining capacity by one, capped at the total. Returns
    /// false when the ledger was already full (the release is a no-op).
    async fn release_capacity(&self, event_id: Uuid, updated_at: DateTime<Utc>)
        -> Result<bool, StoreError>;

    /// Published events with at least one seat left, soonest first.
    async fn find_available(&self) -> Result<Vec<Event>, StoreError>;

    /// Published events starting after `now`, soonest first.
    async fn find_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError>;

    /// Published events with no seats left.
    async fn find_sold_out(&self) -> Result<Vec<Event>, StoreError>;

    /// Published events whose title or description contains the keyword,
    /// soonest first.
    async fn search(&self, keyword: &str) -> Result<Vec<Event>, StoreError>;

    /// Published events in a category, soonest first.
    async fn find_by_category(&self, category: &str) -> Result<Vec<Event>, StoreError>;

    async fn find_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Event>, StoreError>;
}

/// Ticket rows: inserts with typed conflicts, conditional state transitions,
/// and the lookup queries.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Inserts a ticket, mapping unique-index violations to
    /// [`StoreError::Conflict`] so the caller can tell a code collision from
    /// a duplicate purchase.
    async fn insert(&self, ticket: &Ticket) -> Result<(), StoreError>;

    async fn find_by_id(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn find_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>, StoreError>;

    async fn find_by_scan_code(&self, scan_code: &str) -> Result<Option<Ticket>, StoreError>;

    /// The buyer's ACTIVE or VALIDATED ticket for an event, if any.
    async fn find_live(&self, event_id: Uuid, user_id: Uuid)
        -> Result<Option<Ticket>, StoreError>;

    /// ACTIVE -> VALIDATED, recording who scanned and when. Returns false
    /// when the ticket was not ACTIVE, so a double scan loses cleanly.
    async fn mark_validated(
        &self,
        ticket_id: Uuid,
        validated_by: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// ACTIVE -> CANCELLED. Returns false when the ticket was not ACTIVE.
    async fn mark_cancelled(&self, ticket_id: Uuid, at: DateTime<Utc>)
        -> Result<bool, StoreError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError>;

    /// The user's tickets for events that have not started yet.
    async fn find_upcoming_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, StoreError>;

    async fn find_active_by_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError>;

    async fn count_validated(&self, event_id: Uuid) -> Result<i64, StoreError>;

    /// Tickets purchased at or after `since`, across all events and statuses.
    async fn count_purchased_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError>;

    /// Tickets validated at or after `since`.
    async fn count_validated_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError>;
}
