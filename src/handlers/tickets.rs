use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::{bearer_identity, require_admin};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub scan_code: String,
}

#[derive(Serialize)]
struct ValidityPayload {
    valid: bool,
}

#[derive(Serialize)]
struct AttendancePayload {
    event_id: Uuid,
    active: usize,
    validated: i64,
}

pub async fn purchase_ticket(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let ticket = state.tickets.purchase(&identity, event_id).await?;
    Ok(created(ticket, "Ticket purchased").into_response())
}

/// Gate scan. Staff only; the scanner's identity is recorded on the ticket.
pub async fn validate_ticket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ValidateRequest>,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    require_admin(&identity)?;
    let ticket = state.tickets.validate(&identity, &payload.scan_code).await?;
    Ok(success(ticket, "Ticket validated").into_response())
}

/// Read-only probe; answers whether a scan would currently succeed.
pub async fn check_validity(
    State(state): State<AppState>,
    Path(scan_code): Path<String>,
) -> Result<Response, AppError> {
    let valid = state.tickets.is_valid(&scan_code).await?;
    Ok(success(ValidityPayload { valid }, "Validity").into_response())
}

pub async fn my_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let tickets = state.tickets.list_for_user(identity.user_id).await?;
    Ok(success(tickets, "Your tickets").into_response())
}

pub async fn my_upcoming_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let tickets = state.tickets.list_upcoming_for_user(identity.user_id).await?;
    Ok(success(tickets, "Your upcoming tickets").into_response())
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let ticket = state.tickets.cancel(&identity, ticket_id).await?;
    Ok(success(ticket, "Ticket cancelled").into_response())
}

pub async fn ticket_by_number(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let ticket = state.tickets.by_number(&identity, &ticket_number).await?;
    Ok(success(ticket, "Ticket found").into_response())
}

pub async fn event_roster(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    require_admin(&identity)?;
    let tickets = state.tickets.active_for_event(event_id).await?;
    Ok(success(tickets, "Active tickets").into_response())
}

pub async fn event_attendance(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    require_admin(&identity)?;

    let active = state.tickets.active_for_event(event_id).await?.len();
    let validated = state.tickets.validated_count(event_id).await?;

    let payload = AttendancePayload {
        event_id,
        active,
        validated,
    };
    Ok(success(payload, "Attendance").into_response())
}
