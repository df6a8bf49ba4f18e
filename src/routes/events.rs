use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{parse_optional_date, UserQuery};
use crate::availability::{Decision, RegistrationState};
use crate::error::{AppError, AppResult};
use crate::models::{EventOccurrence, NewEvent, Registration};
use crate::AppState;

/// Window listed when `/events` is called without bounds.
const DEFAULT_LISTING_DAYS: i64 = 30;

#[derive(Deserialize)]
pub struct EventsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub event_id: Uuid,
    pub registered: bool,
    pub seats_left: Option<i32>,
    #[serde(flatten)]
    pub decision: Decision,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id/availability", get(get_availability))
        .route("/events/:id/registrations", post(register))
        .route("/events/:id/registrations/:user_id", delete(cancel_registration))
        .with_state(state)
}

async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<NewEvent>,
) -> AppResult<(StatusCode, Json<EventOccurrence>)> {
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("Event title is required".into()));
    }
    if body.end <= body.start {
        return Err(AppError::BadRequest("Event must end after it starts".into()));
    }
    if let Some(capacity) = body.capacity {
        if capacity <= 0 {
            return Err(AppError::BadRequest(format!(
                "capacity must be positive, got {capacity}"
            )));
        }
    }

    let event = state.store.create_event(body).await?;
    tracing::info!(event_id = %event.id, "📆 Event created: {}", event.title);
    Ok((StatusCode::CREATED, Json(event)))
}

/// Events overlapping the inclusive day range `from..=to`.
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> AppResult<Json<Vec<EventOccurrence>>> {
    let from = parse_optional_date("from", query.from.as_deref())?.unwrap_or_else(|| state.clock.today());
    let to = parse_optional_date("to", query.to.as_deref())?
        .unwrap_or(from + Duration::days(DEFAULT_LISTING_DAYS));
    if to < from {
        return Err(AppError::BadRequest("'to' must not be before 'from'".into()));
    }

    let from = from.and_time(NaiveTime::MIN).and_utc();
    let to = (to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();
    let events = state.store.list_events(from, to).await?;
    Ok(Json(events))
}

async fn load_event(state: &AppState, id: Uuid) -> AppResult<EventOccurrence> {
    state
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))
}

async fn registration_state(state: &AppState, event_id: Uuid, user_id: Uuid) -> AppResult<RegistrationState> {
    let existing = state.store.find_registration(event_id, user_id).await?;
    Ok(match existing {
        Some(_) => RegistrationState::Registered,
        None => RegistrationState::Unregistered,
    })
}

async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let event = load_event(&state, id).await?;
    let current = registration_state(&state, id, query.user_id).await?;

    let decision = match current.register(&event, state.clock.now()) {
        Ok(_) => Decision::Allowed,
        Err(denial) => Decision::Denied(denial),
    };

    Ok(Json(AvailabilityResponse {
        event_id: id,
        registered: current == RegistrationState::Registered,
        seats_left: event
            .capacity
            .map(|cap| (cap - event.registration_count).max(0)),
        decision,
    }))
}

async fn register(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Registration>)> {
    let event = load_event(&state, id).await?;
    let now = state.clock.now();

    registration_state(&state, id, body.user_id)
        .await?
        .register(&event, now)
        .map_err(|denial| {
            tracing::info!(event_id = %id, user_id = %body.user_id, "🚫 Registration denied: {denial}");
            denial
        })?;

    let registration = state.store.register(id, body.user_id, now).await?;
    tracing::info!(event_id = %id, user_id = %body.user_id, "✅ Registered");
    Ok((StatusCode::CREATED, Json(registration)))
}

async fn cancel_registration(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let event = load_event(&state, id).await?;

    registration_state(&state, id, user_id)
        .await?
        .cancel(&event, state.clock.now())?;

    if !state.store.cancel_registration(id, user_id).await? {
        // Someone else removed it between the check and the delete.
        return Err(AppError::NotFound("Registration not found".into()));
    }
    tracing::info!(event_id = %id, user_id = %user_id, "↩️ Registration cancelled");
    Ok(StatusCode::NO_CONTENT)
}
