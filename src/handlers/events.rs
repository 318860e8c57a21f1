use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{bearer_identity, require_admin};
use crate::models::{EventDetails, NewEvent};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct SearchParams {
    pub keyword: String,
}

pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewEvent>,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let event = state.events.create(&identity, payload).await?;
    Ok(created(event, "Event created").into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<EventDetails>,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let event = state.events.update(&identity, event_id, payload).await?;
    Ok(success(event, "Event updated").into_response())
}

pub async fn publish_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let event = state.events.publish(&identity, event_id).await?;
    Ok(success(event, "Event published").into_response())
}

pub async fn cancel_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let event = state.events.cancel(&identity, event_id).await?;
    Ok(success(event, "Event cancelled").into_response())
}

pub async fn complete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let event = state.events.complete(&identity, event_id).await?;
    Ok(success(event, "Event completed").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.events.get(event_id).await?;
    Ok(success(event, "Event found").into_response())
}

pub async fn event_availability(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let availability = state.events.availability(event_id).await?;
    Ok(success(availability, "Availability").into_response())
}

pub async fn list_available_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list_available().await?;
    Ok(success(events, "Available events").into_response())
}

pub async fn list_upcoming_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list_upcoming().await?;
    Ok(success(events, "Upcoming events").into_response())
}

pub async fn search_events(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let events = state.events.search(&params.keyword).await?;
    Ok(success(events, "Search results").into_response())
}

pub async fn events_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Response, AppError> {
    let events = state.events.list_by_category(&category).await?;
    Ok(success(events, "Events in category").into_response())
}

pub async fn my_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    let events = state.events.list_by_organizer(&identity).await?;
    Ok(success(events, "Your events").into_response())
}

pub async fn sold_out_events(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    require_admin(&identity)?;
    let events = state.events.list_sold_out().await?;
    Ok(success(events, "Sold out events").into_response())
}
