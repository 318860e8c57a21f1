use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{Conflict, EventStore, StoreError, TicketStore};
use crate::models::{Event, EventDetails, EventStatus, Ticket};

/// SQLite-backed implementation of both repositories over one shared pool.
///
/// Every mutation is a single conditional statement, so concurrent callers
/// are serialized by the database itself and the `rows_affected` count tells
/// each caller whether it won.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO events
                (id, organizer_id, title, description, location, category, price, status,
                 start_time, end_time, total_capacity, remaining_capacity, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id)
        .bind(event.organizer_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.category)
        .bind(event.price.to_string())
        .bind(event.status)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.total_capacity)
        .bind(event.remaining_capacity)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn update_details(
        &self,
        event_id: Uuid,
        details: &EventDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, location = ?, category = ?, price = ?,
                start_time = ?, end_time = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&details.title)
        .bind(&details.description)
        .bind(&details.location)
        .bind(&details.category)
        .bind(details.price.to_string())
        .bind(details.start_time)
        .bind(details.end_time)
        .bind(updated_at)
        .bind(event_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn transition_status(
        &self,
        event_id: Uuid,
        from: EventStatus,
        to: EventStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE events SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
                .bind(to)
                .bind(updated_at)
                .bind(event_id)
                .bind(from)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reserve_capacity(
        &self,
        event_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET remaining_capacity = remaining_capacity - 1, updated_at = ?
            WHERE id = ? AND status = 'PUBLISHED' AND remaining_capacity > 0
            "#,
        )
        .bind(updated_at)
        .bind(event_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn release_capacity(
        &self,
        event_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET remaining_capacity = remaining_capacity + 1, updated_at = ?
            WHERE id = ? AND remaining_capacity < total_capacity
            "#,
        )
        .bind(updated_at)
        .bind(event_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_available(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status = 'PUBLISHED' AND remaining_capacity > 0
            ORDER BY start_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status = 'PUBLISHED' AND start_time > ?
            ORDER BY start_time
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find_sold_out(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status = 'PUBLISHED' AND remaining_capacity = 0
            ORDER BY start_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Event>, StoreError> {
        let pattern = format!("%{keyword}%");
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status = 'PUBLISHED' AND (title LIKE ? OR description LIKE ?)
            ORDER BY start_time
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE status = 'PUBLISHED' AND category = ? ORDER BY start_time",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find_by_organizer(&self, organizer_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE organizer_id = ? ORDER BY created_at DESC",
        )
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}

#[async_trait]
impl TicketStore for SqliteStore {
    async fn insert(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO tickets
                (id, ticket_number, scan_code, event_id, user_id, status, purchased_at,
                 validated_at, validated_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ticket.id)
        .bind(&ticket.ticket_number)
        .bind(&ticket.scan_code)
        .bind(ticket.event_id)
        .bind(ticket.user_id)
        .bind(ticket.status)
        .bind(ticket.purchased_at)
        .bind(ticket.validated_at)
        .bind(ticket.validated_by)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => Err(map_ticket_insert_error(err)),
        }
    }

    async fn find_by_id(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    async fn find_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>, StoreError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE ticket_number = ?")
            .bind(ticket_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    async fn find_by_scan_code(&self, scan_code: &str) -> Result<Option<Ticket>, StoreError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE scan_code = ?")
            .bind(scan_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    async fn find_live(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets
            WHERE event_id = ? AND user_id = ? AND status IN ('ACTIVE', 'VALIDATED')
            LIMIT 1
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    async fn mark_validated(
        &self,
        ticket_id: Uuid,
        validated_by: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = 'VALIDATED', validated_at = ?, validated_by = ?, updated_at = ?
            WHERE id = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(at)
        .bind(validated_by)
        .bind(at)
        .bind(ticket_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_cancelled(
        &self,
        ticket_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE tickets SET status = 'CANCELLED', updated_at = ? WHERE id = ? AND status = 'ACTIVE'",
        )
        .bind(at)
        .bind(ticket_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE user_id = ? ORDER BY purchased_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    async fn find_upcoming_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, StoreError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT t.* FROM tickets t
            JOIN events e ON e.id = t.event_id
            WHERE t.user_id = ? AND e.start_time > ?
            ORDER BY e.start_time
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    async fn find_active_by_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE event_id = ? AND status = 'ACTIVE' ORDER BY purchased_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    async fn count_validated(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE event_id = ? AND status = 'VALIDATED'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_purchased_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tickets WHERE purchased_at >= ?")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn count_validated_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE status = 'VALIDATED' AND validated_at >= ?",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// SQLite reports which unique index failed in the error message, which is
/// the only way to tell a code collision from a duplicate purchase.
fn map_ticket_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            let message = db.message();
            if message.contains("tickets.ticket_number") {
                return StoreError::Conflict(Conflict::TicketNumber);
            }
            if message.contains("tickets.scan_code") {
                return StoreError::Conflict(Conflict::ScanCode);
            }
            if message.contains("tickets.event_id") {
                return StoreError::Conflict(Conflict::LiveTicket);
            }
        }
    }

    StoreError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketStatus;
    use crate::test_utils::{
        draft_event, future_event, past_event, setup_test_db, ticket_for,
    };

    async fn store() -> SqliteStore {
        SqliteStore::new(setup_test_db().await)
    }

    #[tokio::test]
    async fn insert_and_find_event_round_trip() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let event = future_event(50);
        events.insert(&event).await.unwrap();

        let found = events.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(found.title, event.title);
        assert_eq!(found.price, event.price);
        assert_eq!(found.status, EventStatus::Published);
        assert_eq!(found.total_capacity, 50);
        assert_eq!(found.remaining_capacity, 50);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_event() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        assert!(events.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reserve_capacity_stops_at_zero() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let event = future_event(2);
        events.insert(&event).await.unwrap();

        assert!(events.reserve_capacity(event.id, Utc::now()).await.unwrap());
        assert!(events.reserve_capacity(event.id, Utc::now()).await.unwrap());
        assert!(!events.reserve_capacity(event.id, Utc::now()).await.unwrap());

        let found = events.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(found.remaining_capacity, 0);
    }

    #[tokio::test]
    async fn reserve_capacity_requires_published() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let event = draft_event(10);
        events.insert(&event).await.unwrap();

        assert!(!events.reserve_capacity(event.id, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn release_capacity_caps_at_total() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let event = future_event(3);
        events.insert(&event).await.unwrap();

        assert!(events.reserve_capacity(event.id, Utc::now()).await.unwrap());
        assert!(events.release_capacity(event.id, Utc::now()).await.unwrap());

        // Already back at the total, so another release is a no-op.
        assert!(!events.release_capacity(event.id, Utc::now()).await.unwrap());

        let found = events.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(found.remaining_capacity, found.total_capacity);
    }

    #[tokio::test]
    async fn transition_status_moves_exactly_once() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let event = draft_event(10);
        events.insert(&event).await.unwrap();

        let first = events
            .transition_status(event.id, EventStatus::Draft, EventStatus::Published, Utc::now())
            .await
            .unwrap();
        let second = events
            .transition_status(event.id, EventStatus::Draft, EventStatus::Published, Utc::now())
            .await
            .unwrap();

        assert!(first);
        assert!(!second);

        let found = events.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(found.status, EventStatus::Published);
    }

    #[tokio::test]
    async fn update_details_leaves_capacity_and_status_alone() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let event = future_event(5);
        events.insert(&event).await.unwrap();
        events.reserve_capacity(event.id, Utc::now()).await.unwrap();

        let details = EventDetails {
            title: "Renamed".to_string(),
            description: Some("new blurb".to_string()),
            location: event.location.clone(),
            category: event.category.clone(),
            price: event.price,
            start_time: event.start_time,
            end_time: event.end_time,
        };
        assert!(events.update_details(event.id, &details, Utc::now()).await.unwrap());

        let found = events.find_by_id(event.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Renamed");
        assert_eq!(found.status, EventStatus::Published);
        assert_eq!(found.total_capacity, 5);
        assert_eq!(found.remaining_capacity, 4);
    }

    #[tokio::test]
    async fn discovery_queries_filter_by_status_and_capacity() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let open = future_event(1);
        let mut full = future_event(1);
        full.remaining_capacity = 0;
        let draft = draft_event(10);

        events.insert(&open).await.unwrap();
        events.insert(&full).await.unwrap();
        events.insert(&draft).await.unwrap();

        let available = events.find_available().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, open.id);

        let sold_out = events.find_sold_out().await.unwrap();
        assert_eq!(sold_out.len(), 1);
        assert_eq!(sold_out[0].id, full.id);

        let upcoming = events.find_upcoming(Utc::now()).await.unwrap();
        assert_eq!(upcoming.len(), 2);
    }

    #[tokio::test]
    async fn ticket_insert_round_trip() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let ticket = ticket_for(&event, Uuid::new_v4());
        tickets.insert(&ticket).await.unwrap();

        let by_number = tickets
            .find_by_number(&ticket.ticket_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id, ticket.id);

        let by_code = tickets
            .find_by_scan_code(&ticket.scan_code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_code.id, ticket.id);
        assert_eq!(by_code.status, TicketStatus::Active);
    }

    #[tokio::test]
    async fn second_live_ticket_for_same_pair_is_a_typed_conflict() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let user_id = Uuid::new_v4();
        tickets.insert(&ticket_for(&event, user_id)).await.unwrap();

        let err = tickets.insert(&ticket_for(&event, user_id)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(Conflict::LiveTicket)));
    }

    #[tokio::test]
    async fn cancelled_ticket_frees_the_pair() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let user_id = Uuid::new_v4();
        let first = ticket_for(&event, user_id);
        tickets.insert(&first).await.unwrap();
        assert!(tickets.mark_cancelled(first.id, Utc::now()).await.unwrap());

        tickets.insert(&ticket_for(&event, user_id)).await.unwrap();
        assert!(tickets.find_live(event.id, user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_ticket_number_is_a_typed_conflict() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let first = ticket_for(&event, Uuid::new_v4());
        tickets.insert(&first).await.unwrap();

        let mut clash = ticket_for(&event, Uuid::new_v4());
        clash.ticket_number = first.ticket_number.clone();

        let err = tickets.insert(&clash).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(Conflict::TicketNumber)));
    }

    #[tokio::test]
    async fn mark_validated_wins_only_once() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let ticket = ticket_for(&event, Uuid::new_v4());
        tickets.insert(&ticket).await.unwrap();

        let scanner = Uuid::new_v4();
        assert!(tickets.mark_validated(ticket.id, scanner, Utc::now()).await.unwrap());
        assert!(!tickets.mark_validated(ticket.id, scanner, Utc::now()).await.unwrap());

        let found = tickets.find_by_id(ticket.id).await.unwrap().unwrap();
        assert_eq!(found.status, TicketStatus::Validated);
        assert_eq!(found.validated_by, Some(scanner));
        assert!(found.validated_at.is_some());
    }

    #[tokio::test]
    async fn mark_cancelled_rejects_validated_tickets() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let ticket = ticket_for(&event, Uuid::new_v4());
        tickets.insert(&ticket).await.unwrap();
        tickets.mark_validated(ticket.id, Uuid::new_v4(), Utc::now()).await.unwrap();

        assert!(!tickets.mark_cancelled(ticket.id, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn find_live_ignores_cancelled_tickets() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let user_id = Uuid::new_v4();
        let ticket = ticket_for(&event, user_id);
        tickets.insert(&ticket).await.unwrap();
        tickets.mark_cancelled(ticket.id, Utc::now()).await.unwrap();

        assert!(tickets.find_live(event.id, user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upcoming_tickets_follow_event_start_times() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let soon = future_event(10);
        let done = past_event(10);
        events.insert(&soon).await.unwrap();
        events.insert(&done).await.unwrap();

        let user_id = Uuid::new_v4();
        let keeper = ticket_for(&soon, user_id);
        tickets.insert(&keeper).await.unwrap();
        tickets.insert(&ticket_for(&done, user_id)).await.unwrap();

        let all = tickets.find_by_user(user_id).await.unwrap();
        assert_eq!(all.len(), 2);

        let upcoming = tickets.find_upcoming_by_user(user_id, Utc::now()).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, keeper.id);
    }

    #[tokio::test]
    async fn event_roster_and_validated_count() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let scanned = ticket_for(&event, Uuid::new_v4());
        tickets.insert(&scanned).await.unwrap();
        tickets.insert(&ticket_for(&event, Uuid::new_v4())).await.unwrap();
        tickets.mark_validated(scanned.id, Uuid::new_v4(), Utc::now()).await.unwrap();

        let active = tickets.find_active_by_event(event.id).await.unwrap();
        assert_eq!(active.len(), 1);

        let validated = tickets.count_validated(event.id).await.unwrap();
        assert_eq!(validated, 1);
    }

    #[tokio::test]
    async fn search_matches_title_and_description_of_published_events() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let mut conference = future_event(10);
        conference.title = "RustConf".to_string();
        conference.description = Some("Compilers and crabs".to_string());
        let mut concert = future_event(10);
        concert.title = "Jazz Night".to_string();
        concert.description = Some("A rust-free evening".to_string());
        let mut hidden = draft_event(10);
        hidden.title = "Rust Hack Day".to_string();

        events.insert(&conference).await.unwrap();
        events.insert(&concert).await.unwrap();
        events.insert(&hidden).await.unwrap();

        // One title hit, one description hit; the draft stays invisible.
        let hits = events.search("rust").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|e| e.status == EventStatus::Published));

        assert!(events.search("opera").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_listing_is_published_only() {
        let store = store().await;
        let events: &dyn EventStore = &store;

        let tech = future_event(10);
        let mut concert = future_event(10);
        concert.category = Some("music".to_string());
        let mut tech_draft = draft_event(10);
        tech_draft.category = Some("tech".to_string());

        events.insert(&tech).await.unwrap();
        events.insert(&concert).await.unwrap();
        events.insert(&tech_draft).await.unwrap();

        let hits = events.find_by_category("tech").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, tech.id);
    }

    #[tokio::test]
    async fn windowed_counts_respect_their_cutoffs() {
        let store = store().await;
        let events: &dyn EventStore = &store;
        let tickets: &dyn TicketStore = &store;

        let event = future_event(10);
        events.insert(&event).await.unwrap();

        let recent = ticket_for(&event, Uuid::new_v4());
        let mut stale = ticket_for(&event, Uuid::new_v4());
        stale.purchased_at = Utc::now() - chrono::Duration::days(60);
        tickets.insert(&recent).await.unwrap();
        tickets.insert(&stale).await.unwrap();
        tickets.mark_validated(recent.id, Uuid::new_v4(), Utc::now()).await.unwrap();

        let month_ago = Utc::now() - chrono::Duration::days(30);
        assert_eq!(tickets.count_purchased_since(month_ago).await.unwrap(), 1);

        let day_ago = Utc::now() - chrono::Duration::days(1);
        assert_eq!(tickets.count_validated_since(day_ago).await.unwrap(), 1);

        let future = Utc::now() + chrono::Duration::hours(1);
        assert_eq!(tickets.count_validated_since(future).await.unwrap(), 0);
    }
}
