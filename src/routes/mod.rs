use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::IdentityProvider;
use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{admin, events, health_check, tickets};
use crate::services::{EventService, TicketService};

/// Everything the handlers need, cloned per request by axum.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub tickets: TicketService,
    pub identity: Arc<dyn IdentityProvider>,
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Organizer surface
        .route("/events", post(events::create_event))
        .route("/events/mine", get(events::my_events))
        .route("/events/:event_id", put(events::update_event))
        .route("/events/:event_id/publish", post(events::publish_event))
        .route("/events/:event_id/cancel", post(events::cancel_event))
        .route("/events/:event_id/complete", post(events::complete_event))
        .route("/events/:event_id/availability", get(events::event_availability))
        // Public discovery
        .route("/events/public/available", get(events::list_available_events))
        .route("/events/public/upcoming", get(events::list_upcoming_events))
        .route("/events/public/search", get(events::search_events))
        .route("/events/public/category/:category", get(events::events_by_category))
        .route("/events/public/:event_id", get(events::get_event))
        // Ticket lifecycle
        .route("/tickets/purchase/:event_id", post(tickets::purchase_ticket))
        .route("/tickets/validate", post(tickets::validate_ticket))
        .route("/tickets/validate/:scan_code", get(tickets::check_validity))
        .route("/tickets/my-tickets", get(tickets::my_tickets))
        .route("/tickets/my-tickets/upcoming", get(tickets::my_upcoming_tickets))
        .route("/tickets/number/:ticket_number", get(tickets::ticket_by_number))
        .route("/tickets/:ticket_id/cancel", post(tickets::cancel_ticket))
        // Staff reporting
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/events/sold-out", get(events::sold_out_events))
        .route("/admin/events/:event_id/tickets", get(tickets::event_roster))
        .route("/admin/events/:event_id/attendance", get(tickets::event_attendance))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
