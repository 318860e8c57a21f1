#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use uuid::Uuid;

use turnstile_server::auth::{Identity, Role};
use turnstile_server::models::{Event, NewEvent};
use turnstile_server::services::{
    CapacityLedger, EventService, LogNotifier, NotifierBridge, TicketService, UuidCodes,
};
use turnstile_server::store::SqliteStore;

pub struct Engine {
    pub events: EventService,
    pub tickets: TicketService,
}

/// Full engine over one in-memory database. A single pool connection keeps
/// every handle on the same database.
pub async fn engine() -> Engine {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("connect to in-memory sqlite");
    sqlx::migrate!().run(&pool).await.expect("run migrations");

    let store = Arc::new(SqliteStore::new(pool));
    let notifier = NotifierBridge::new(Arc::new(LogNotifier));
    let ledger = CapacityLedger::new(store.clone());

    Engine {
        events: EventService::new(store.clone(), notifier.clone()),
        tickets: TicketService::new(
            store.clone(),
            store.clone(),
            ledger,
            Arc::new(UuidCodes),
            notifier,
        ),
    }
}

pub fn user(name: &str) -> Identity {
    Identity::new(Uuid::new_v4(), format!("{name}@example.com"), Role::User)
}

pub fn admin() -> Identity {
    Identity::new(Uuid::new_v4(), "ops@example.com", Role::Admin)
}

pub fn meetup_at(start: DateTime<Utc>, capacity: i32) -> NewEvent {
    NewEvent {
        title: "Rust Meetup".to_string(),
        description: Some("Talks and hallway track".to_string()),
        location: "Community Hall".to_string(),
        category: Some("tech".to_string()),
        price: Decimal::new(1500, 2),
        start_time: start,
        end_time: start + Duration::hours(2),
        capacity,
    }
}

/// Creates and publishes an event starting the given number of hours from
/// now (negative values produce an event already underway).
pub async fn published_event(
    engine: &Engine,
    organizer: &Identity,
    capacity: i32,
    starts_in_hours: i64,
) -> Event {
    let start = Utc::now() + Duration::hours(starts_in_hours);
    let event = engine
        .events
        .create(organizer, meetup_at(start, capacity))
        .await
        .expect("create event");
    engine
        .events
        .publish(organizer, event.id)
        .await
        .expect("publish event")
}
