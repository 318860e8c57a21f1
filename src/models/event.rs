use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of an event. Only PUBLISHED events sell tickets; CANCELLED and
/// COMPLETED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
            EventStatus::Cancelled => "CANCELLED",
            EventStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event row. `remaining_capacity` starts equal to `total_capacity` and
/// only ever moves through the capacity ledger; `total_capacity` is fixed at
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub status: EventStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_capacity: i32,
    pub remaining_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_sold_out(&self) -> bool {
        self.remaining_capacity == 0
    }

    /// Open for sale: published with at least one seat left.
    pub fn is_available(&self) -> bool {
        self.status == EventStatus::Published && self.remaining_capacity > 0
    }
}

// The price column is stored as TEXT because sqlx has no Decimal codec for
// SQLite, so the row mapping is spelled out here.
impl FromRow<'_, SqliteRow> for Event {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let raw_price: String = row.try_get("price")?;
        let price = Decimal::from_str(&raw_price).map_err(|e| sqlx::Error::ColumnDecode {
            index: "price".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            organizer_id: row.try_get("organizer_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            category: row.try_get("category")?,
            price,
            status: row.try_get("status")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            total_capacity: row.try_get("total_capacity")?,
            remaining_capacity: row.try_get("remaining_capacity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Payload for creating an event. Capacity is set once here; later edits go
/// through [`EventDetails`] and cannot touch it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
}

/// Editable fields of an existing event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
