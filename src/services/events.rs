use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::{Event, EventDetails, EventStatus, NewEvent};
use crate::services::error::TicketingError;
use crate::services::notify::{Notification, NotifierBridge};
use crate::store::EventStore;

/// Snapshot of an event's selling state.
#[derive(Debug, Serialize)]
pub struct Availability {
    pub event_id: Uuid,
    pub status: EventStatus,
    pub total: i32,
    pub remaining: i32,
    pub sold_out: bool,
    pub on_sale: bool,
}

/// Catalog side of the engine: event lifecycle and discovery.
///
/// Events are created as drafts with the full capacity, sell only while
/// published, and end up cancelled or completed. Capacity itself is fixed
/// here and only moves through the ledger.
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
    notifier: NotifierBridge,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>, notifier: NotifierBridge) -> Self {
        Self { events, notifier }
    }

    pub async fn create(
        &self,
        organizer: &Identity,
        new_event: NewEvent,
    ) -> Result<Event, TicketingError> {
        validate_new_event(&new_event)?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: organizer.user_id,
            title: new_event.title,
            description: new_event.description,
            location: new_event.location,
            category: new_event.category,
            price: new_event.price,
            status: EventStatus::Draft,
            start_time: new_event.start_time,
            end_time: new_event.end_time,
            total_capacity: new_event.capacity,
            remaining_capacity: new_event.capacity,
            created_at: now,
            updated_at: now,
        };

        self.events.insert(&event).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    /// Overwrites the editable fields. Capacity and status are untouchable
    /// from here: capacity belongs to the ledger, status to the transitions
    /// below.
    pub async fn update(
        &self,
        actor: &Identity,
        event_id: Uuid,
        details: EventDetails,
    ) -> Result<Event, TicketingError> {
        validate_details(&details)?;

        let event = self.require(event_id).await?;
        if !actor.can_act_for(event.organizer_id) {
            return Err(TicketingError::Forbidden(
                "only the organizer or an admin may edit an event",
            ));
        }
        if matches!(event.status, EventStatus::Cancelled | EventStatus::Completed) {
            return Err(TicketingError::InvalidState(
                "a closed event can no longer be edited",
            ));
        }

        if !self.events.update_details(event_id, &details, Utc::now()).await? {
            return Err(TicketingError::NotFound("event not found"));
        }

        self.require(event_id).await
    }

    pub async fn publish(
        &self,
        actor: &Identity,
        event_id: Uuid,
    ) -> Result<Event, TicketingError> {
        let event = self.require(event_id).await?;
        if !actor.can_act_for(event.organizer_id) {
            return Err(TicketingError::Forbidden(
                "only the organizer or an admin may publish an event",
            ));
        }

        let moved = self
            .events
            .transition_status(event_id, EventStatus::Draft, EventStatus::Published, Utc::now())
            .await?;
        if !moved {
            return Err(TicketingError::InvalidState(
                "only a draft event can be published",
            ));
        }

        let event = self.require(event_id).await?;
        self.notifier.dispatch(Notification::EventPublished {
            event_id,
            title: event.title.clone(),
        });
        tracing::info!(%event_id, "event published");
        Ok(event)
    }

    pub async fn cancel(
        &self,
        actor: &Identity,
        event_id: Uuid,
    ) -> Result<Event, TicketingError> {
        let event = self.require(event_id).await?;
        if !actor.can_act_for(event.organizer_id) {
            return Err(TicketingError::Forbidden(
                "only the organizer or an admin may cancel an event",
            ));
        }

        let from = match event.status {
            EventStatus::Draft | EventStatus::Published => event.status,
            EventStatus::Cancelled | EventStatus::Completed => {
                return Err(TicketingError::InvalidState("event is already closed"));
            }
        };

        let moved = self
            .events
            .transition_status(event_id, from, EventStatus::Cancelled, Utc::now())
            .await?;
        if !moved {
            return Err(TicketingError::InvalidState(
                "event is not in a cancellable state",
            ));
        }

        let event = self.require(event_id).await?;
        self.notifier.dispatch(Notification::EventCancelled {
            event_id,
            title: event.title.clone(),
        });
        tracing::info!(%event_id, "event cancelled");
        Ok(event)
    }

    pub async fn complete(
        &self,
        actor: &Identity,
        event_id: Uuid,
    ) -> Result<Event, TicketingError> {
        let event = self.require(event_id).await?;
        if !actor.can_act_for(event.organizer_id) {
            return Err(TicketingError::Forbidden(
                "only the organizer or an admin may complete an event",
            ));
        }

        let moved = self
            .events
            .transition_status(event_id, EventStatus::Published, EventStatus::Completed, Utc::now())
            .await?;
        if !moved {
            return Err(TicketingError::InvalidState(
                "only a published event can be completed",
            ));
        }

        tracing::info!(%event_id, "event completed");
        self.require(event_id).await
    }

    pub async fn get(&self, event_id: Uuid) -> Result<Event, TicketingError> {
        self.require(event_id).await
    }

    pub async fn availability(&self, event_id: Uuid) -> Result<Availability, TicketingError> {
        let event = self.require(event_id).await?;
        Ok(Availability {
            event_id,
            status: event.status,
            total: event.total_capacity,
            remaining: event.remaining_capacity,
            sold_out: event.is_sold_out(),
            on_sale: event.is_available(),
        })
    }

    pub async fn list_available(&self) -> Result<Vec<Event>, TicketingError> {
        Ok(self.events.find_available().await?)
    }

    pub async fn list_upcoming(&self) -> Result<Vec<Event>, TicketingError> {
        Ok(self.events.find_upcoming(Utc::now()).await?)
    }

    pub async fn list_sold_out(&self) -> Result<Vec<Event>, TicketingError> {
        Ok(self.events.find_sold_out().await?)
    }

    /// Keyword search over title and description. Only published events are
    /// searchable.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Event>, TicketingError> {
        Ok(self.events.search(keyword.trim()).await?)
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Event>, TicketingError> {
        Ok(self.events.find_by_category(category).await?)
    }

    pub async fn list_by_organizer(&self, organizer: &Identity) -> Result<Vec<Event>, TicketingError> {
        Ok(self.events.find_by_organizer(organizer.user_id).await?)
    }

    async fn require(&self, event_id: Uuid) -> Result<Event, TicketingError> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or(TicketingError::NotFound("event not found"))
    }
}

fn validate_new_event(new_event: &NewEvent) -> Result<(), TicketingError> {
    if new_event.capacity <= 0 {
        return Err(TicketingError::Validation(
            "capacity must be positive".to_string(),
        ));
    }
    validate_common(
        &new_event.title,
        &new_event.location,
        &new_event.price,
        new_event.start_time,
        new_event.end_time,
    )
}

fn validate_details(details: &EventDetails) -> Result<(), TicketingError> {
    validate_common(
        &details.title,
        &details.location,
        &details.price,
        details.start_time,
        details.end_time,
    )
}

fn validate_common(
    title: &str,
    location: &str,
    price: &rust_decimal::Decimal,
    start_time: chrono::DateTime<Utc>,
    end_time: chrono::DateTime<Utc>,
) -> Result<(), TicketingError> {
    if title.trim().is_empty() {
        return Err(TicketingError::Validation("title must not be blank".to_string()));
    }
    if location.trim().is_empty() {
        return Err(TicketingError::Validation("location must not be blank".to_string()));
    }
    if price.is_sign_negative() {
        return Err(TicketingError::Validation("price must not be negative".to_string()));
    }
    if end_time <= start_time {
        return Err(TicketingError::Validation(
            "end time must be after start time".to_string(),
        ));
    }
    Ok(())
}
