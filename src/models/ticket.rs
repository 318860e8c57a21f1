use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a ticket. ACTIVE tickets are live claims on a seat;
/// VALIDATED means checked in at the gate. CANCELLED and EXPIRED are
/// terminal and release their claim on the (event, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Active,
    Validated,
    Cancelled,
    Expired,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "ACTIVE",
            TicketStatus::Validated => "VALIDATED",
            TicketStatus::Cancelled => "CANCELLED",
            TicketStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    /// Short human-readable reference, unique across all tickets.
    pub ticket_number: String,
    /// Credential presented at the gate. Unique and hard to guess.
    pub scan_code: String,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: TicketStatus,
    pub purchased_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    pub validated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&TicketStatus::Validated).unwrap();
        assert_eq!(json, "\"VALIDATED\"");
    }

    #[test]
    fn only_active_counts_as_active() {
        let now = Utc::now();
        let mut ticket = Ticket {
            id: Uuid::new_v4(),
            ticket_number: "TKT-0A1B2C3D".to_string(),
            scan_code: "QR-0123456789abcdef0123456789abcdef".to_string(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: TicketStatus::Active,
            purchased_at: now,
            validated_at: None,
            validated_by: None,
            created_at: now,
            updated_at: now,
        };
        assert!(ticket.is_active());

        ticket.status = TicketStatus::Cancelled;
        assert!(!ticket.is_active());
    }
}
