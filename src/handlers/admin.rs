use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::handlers::{bearer_identity, require_admin};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Serialize)]
struct EventCounts {
    available: usize,
    sold_out: usize,
    upcoming: usize,
}

#[derive(Serialize)]
struct TicketCounts {
    purchased_last_month: i64,
    validated_last_day: i64,
}

#[derive(Serialize)]
struct DashboardPayload {
    events: EventCounts,
    tickets: TicketCounts,
}

/// Operational snapshot for staff: how the catalog is selling plus recent
/// purchase and check-in volume.
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &headers).await?;
    require_admin(&identity)?;

    let now = Utc::now();
    let events = EventCounts {
        available: state.events.list_available().await?.len(),
        sold_out: state.events.list_sold_out().await?.len(),
        upcoming: state.events.list_upcoming().await?.len(),
    };
    let tickets = TicketCounts {
        purchased_last_month: state
            .tickets
            .purchased_count_since(now - Duration::days(30))
            .await?,
        validated_last_day: state
            .tickets
            .validated_count_since(now - Duration::days(1))
            .await?,
    };

    let payload = DashboardPayload { events, tickets };
    Ok(success(payload, "Dashboard statistics").into_response())
}
