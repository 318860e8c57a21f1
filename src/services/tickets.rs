use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::{Event, EventStatus, Ticket, TicketStatus};
use crate::services::codegen::CodeGenerator;
use crate::services::error::TicketingError;
use crate::services::ledger::CapacityLedger;
use crate::services::notify::{Notification, NotifierBridge};
use crate::services::window::{admission_window, WindowCheck};
use crate::store::{Conflict, EventStore, StoreError, TicketStore};

/// How often a ticket insert is retried when a generated code collides.
const CODE_RETRIES: u32 = 3;

/// Purchase, gate validation and cancellation of individual tickets.
///
/// A purchase is availability check, duplicate guard, seat reservation,
/// then the insert, in that order. If the insert fails after the seat was
/// taken, the seat is released again; that compensation is best effort and
/// logged when it fails, never surfaced to the buyer.
#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    events: Arc<dyn EventStore>,
    ledger: CapacityLedger,
    codes: Arc<dyn CodeGenerator>,
    notifier: NotifierBridge,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        events: Arc<dyn EventStore>,
        ledger: CapacityLedger,
        codes: Arc<dyn CodeGenerator>,
        notifier: NotifierBridge,
    ) -> Self {
        Self {
            tickets,
            events,
            ledger,
            codes,
            notifier,
        }
    }

    pub async fn purchase(
        &self,
        buyer: &Identity,
        event_id: Uuid,
    ) -> Result<Ticket, TicketingError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(TicketingError::NotFound("event not found"))?;

        if event.status != EventStatus::Published {
            return Err(TicketingError::Unavailable("event is not open for sale"));
        }
        if event.remaining_capacity <= 0 {
            return Err(TicketingError::Unavailable("event is sold out"));
        }

        // Cheap pre-check; the partial unique index is what actually
        // serializes two simultaneous purchases by the same user.
        if self.tickets.find_live(event_id, buyer.user_id).await?.is_some() {
            return Err(TicketingError::Duplicate);
        }

        if !self.ledger.reserve(event_id).await? {
            // Capacity or status moved between the read and the decrement.
            return Err(TicketingError::Unavailable("event is no longer available"));
        }

        match self.create_ticket(&event, buyer.user_id).await {
            Ok(ticket) => {
                self.notifier.dispatch(Notification::TicketConfirmation {
                    recipient: buyer.email.clone(),
                    event_title: event.title.clone(),
                    ticket_number: ticket.ticket_number.clone(),
                    scan_code: ticket.scan_code.clone(),
                    start_time: event.start_time,
                });
                tracing::info!(
                    ticket_id = %ticket.id,
                    %event_id,
                    user_id = %buyer.user_id,
                    "ticket purchased"
                );
                Ok(ticket)
            }
            Err(err) => {
                self.release_reserved_seat(event_id).await;
                Err(err)
            }
        }
    }

    async fn create_ticket(&self, event: &Event, user_id: Uuid) -> Result<Ticket, TicketingError> {
        let mut attempt = 0;
        loop {
            let now = Utc::now();
            let ticket = Ticket {
                id: Uuid::new_v4(),
                ticket_number: self.codes.ticket_number(),
                scan_code: self.codes.scan_code(),
                event_id: event.id,
                user_id,
                status: TicketStatus::Active,
                purchased_at: now,
                validated_at: None,
                validated_by: None,
                created_at: now,
                updated_at: now,
            };

            match self.tickets.insert(&ticket).await {
                Ok(()) => return Ok(ticket),
                Err(StoreError::Conflict(Conflict::LiveTicket)) => {
                    // A simultaneous purchase by the same user slipped past
                    // the pre-check and won the index.
                    return Err(TicketingError::Duplicate);
                }
                Err(StoreError::Conflict(conflict)) => {
                    attempt += 1;
                    if attempt >= CODE_RETRIES {
                        return Err(StoreError::Conflict(conflict).into());
                    }
                    tracing::warn!(%conflict, attempt, "generated ticket code collided, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Compensates a reservation whose ticket never materialized. The seat
    /// stays consumed until an operator reconciles it if this fails too.
    async fn release_reserved_seat(&self, event_id: Uuid) {
        match self.ledger.release(event_id).await {
            Ok(_) => {
                tracing::debug!(%event_id, "reservation released after failed purchase");
            }
            Err(err) => {
                tracing::error!(
                    %event_id,
                    error = %err,
                    "failed to release reservation after failed purchase"
                );
            }
        }
    }

    /// Checks a scan code in at the gate. The scanner's identity ends up on
    /// the ticket; only an ACTIVE ticket inside the admission window passes,
    /// and of two simultaneous scans exactly one wins.
    pub async fn validate(
        &self,
        scanner: &Identity,
        scan_code: &str,
    ) -> Result<Ticket, TicketingError> {
        let ticket = self
            .tickets
            .find_by_scan_code(scan_code)
            .await?
            .ok_or(TicketingError::NotFound("ticket not found"))?;

        if ticket.status != TicketStatus::Active {
            return Err(TicketingError::InvalidState("ticket is not active"));
        }

        let event = self
            .events
            .find_by_id(ticket.event_id)
            .await?
            .ok_or(TicketingError::NotFound("event not found"))?;

        match admission_window(event.start_time, event.end_time, Utc::now()) {
            WindowCheck::TooEarly => {
                return Err(TicketingError::TooEarly("event has not started yet"));
            }
            WindowCheck::TooLate => {
                return Err(TicketingError::TooLate("event has already ended"));
            }
            WindowCheck::Open => {}
        }

        let marked = self
            .tickets
            .mark_validated(ticket.id, scanner.user_id, Utc::now())
            .await?;
        if !marked {
            // Another scanner got there between our read and the update.
            return Err(TicketingError::InvalidState("ticket is not active"));
        }

        tracing::info!(ticket_id = %ticket.id, validated_by = %scanner.user_id, "ticket validated");
        self.require(ticket.id).await
    }

    /// Cancels an ACTIVE ticket before the event starts and returns its
    /// seat to the ledger.
    pub async fn cancel(
        &self,
        actor: &Identity,
        ticket_id: Uuid,
    ) -> Result<Ticket, TicketingError> {
        let ticket = self.require(ticket_id).await?;

        if !actor.can_act_for(ticket.user_id) {
            return Err(TicketingError::Forbidden(
                "only the ticket holder or an admin may cancel a ticket",
            ));
        }
        if ticket.status != TicketStatus::Active {
            return Err(TicketingError::InvalidState(
                "only an active ticket can be cancelled",
            ));
        }

        let event = self
            .events
            .find_by_id(ticket.event_id)
            .await?
            .ok_or(TicketingError::NotFound("event not found"))?;

        if Utc::now() >= event.start_time {
            return Err(TicketingError::TooLate("event has already started"));
        }

        let marked = self.tickets.mark_cancelled(ticket_id, Utc::now()).await?;
        if !marked {
            return Err(TicketingError::InvalidState(
                "only an active ticket can be cancelled",
            ));
        }

        match self.ledger.release(event.id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(event_id = %event.id, "ledger already full when releasing a cancelled ticket");
            }
            Err(err) => {
                tracing::error!(
                    event_id = %event.id,
                    error = %err,
                    "failed to release capacity for a cancelled ticket"
                );
            }
        }

        self.notifier.dispatch(Notification::TicketCancelled {
            user_id: ticket.user_id,
            event_title: event.title.clone(),
            ticket_number: ticket.ticket_number.clone(),
        });
        tracing::info!(%ticket_id, "ticket cancelled");
        self.require(ticket_id).await
    }

    /// Read-only probe used at the gate before an actual scan: true iff the
    /// code belongs to an ACTIVE ticket inside its admission window. Never
    /// mutates anything.
    pub async fn is_valid(&self, scan_code: &str) -> Result<bool, TicketingError> {
        let Some(ticket) = self.tickets.find_by_scan_code(scan_code).await? else {
            return Ok(false);
        };
        if ticket.status != TicketStatus::Active {
            return Ok(false);
        }
        let Some(event) = self.events.find_by_id(ticket.event_id).await? else {
            return Ok(false);
        };

        Ok(admission_window(event.start_time, event.end_time, Utc::now()) == WindowCheck::Open)
    }

    /// Looks a ticket up by its public number. Only the holder or an admin
    /// may see it.
    pub async fn by_number(
        &self,
        actor: &Identity,
        ticket_number: &str,
    ) -> Result<Ticket, TicketingError> {
        let ticket = self
            .tickets
            .find_by_number(ticket_number)
            .await?
            .ok_or(TicketingError::NotFound("ticket not found"))?;

        if !actor.can_act_for(ticket.user_id) {
            return Err(TicketingError::Forbidden(
                "only the ticket holder or an admin may view a ticket",
            ));
        }

        Ok(ticket)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, TicketingError> {
        Ok(self.tickets.find_by_user(user_id).await?)
    }

    pub async fn list_upcoming_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Ticket>, TicketingError> {
        Ok(self.tickets.find_upcoming_by_user(user_id, Utc::now()).await?)
    }

    pub async fn active_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, TicketingError> {
        Ok(self.tickets.find_active_by_event(event_id).await?)
    }

    pub async fn validated_count(&self, event_id: Uuid) -> Result<i64, TicketingError> {
        Ok(self.tickets.count_validated(event_id).await?)
    }

    /// Tickets sold since `since`, across every event.
    pub async fn purchased_count_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, TicketingError> {
        Ok(self.tickets.count_purchased_since(since).await?)
    }

    /// Attendees admitted since `since`, across every event.
    pub async fn validated_count_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, TicketingError> {
        Ok(self.tickets.count_validated_since(since).await?)
    }

    async fn require(&self, ticket_id: Uuid) -> Result<Ticket, TicketingError> {
        self.tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or(TicketingError::NotFound("ticket not found"))
    }
}
