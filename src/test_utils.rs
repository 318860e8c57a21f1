use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Event, EventStatus, Ticket, TicketStatus};
use crate::services::codegen::CodeGenerator;
use crate::services::{
    CapacityLedger, EventService, LogNotifier, NotifierBridge, TicketService, UuidCodes,
};
use crate::store::SqliteStore;

/// In-memory database with the full migration set applied. A single
/// connection keeps every pool handle on the same database.
pub(crate) async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("connect to in-memory sqlite");

    sqlx::migrate!().run(&pool).await.expect("run migrations");

    pool
}

pub(crate) struct TestEngine {
    pub store: Arc<SqliteStore>,
    pub events: EventService,
    pub tickets: TicketService,
}

/// Full service wiring over one in-memory database, mirroring main().
pub(crate) async fn test_engine() -> TestEngine {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteStore::new(pool));

    let notifier = NotifierBridge::new(Arc::new(LogNotifier));
    let ledger = CapacityLedger::new(store.clone());
    let events = EventService::new(store.clone(), notifier.clone());
    let tickets = TicketService::new(
        store.clone(),
        store.clone(),
        ledger,
        Arc::new(UuidCodes),
        notifier,
    );

    TestEngine {
        store,
        events,
        tickets,
    }
}

fn base_event(status: EventStatus, capacity: i32, starts_in_hours: i64) -> Event {
    let now = Utc::now();
    let start = now + Duration::hours(starts_in_hours);
    Event {
        id: Uuid::new_v4(),
        organizer_id: Uuid::new_v4(),
        title: "Rust Meetup".to_string(),
        description: Some("Talks and hallway track".to_string()),
        location: "Community Hall".to_string(),
        category: Some("tech".to_string()),
        price: Decimal::new(2500, 2),
        status,
        start_time: start,
        end_time: start + Duration::hours(2),
        total_capacity: capacity,
        remaining_capacity: capacity,
        created_at: now,
        updated_at: now,
    }
}

/// Published event starting in a day.
pub(crate) fn future_event(capacity: i32) -> Event {
    base_event(EventStatus::Published, capacity, 24)
}

/// Published event that started an hour ago and is still running.
pub(crate) fn open_event(capacity: i32) -> Event {
    base_event(EventStatus::Published, capacity, -1)
}

/// Published event that already ended.
pub(crate) fn past_event(capacity: i32) -> Event {
    base_event(EventStatus::Published, capacity, -3)
}

/// Draft event starting in a day.
pub(crate) fn draft_event(capacity: i32) -> Event {
    base_event(EventStatus::Draft, capacity, 24)
}

/// Fresh ACTIVE ticket for the event, with generated codes.
pub(crate) fn ticket_for(event: &Event, user_id: Uuid) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: Uuid::new_v4(),
        ticket_number: UuidCodes.ticket_number(),
        scan_code: UuidCodes.scan_code(),
        event_id: event.id,
        user_id,
        status: TicketStatus::Active,
        purchased_at: now,
        validated_at: None,
        validated_by: None,
        created_at: now,
        updated_at: now,
    }
}
