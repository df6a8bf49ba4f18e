use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserQuery;
use crate::availability::{find_leave_conflicts, validate_leave_range};
use crate::error::{AppError, AppResult};
use crate::models::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::AppState;

/// A created request plus any active requests it overlaps. Overlap is
/// reported for the approver, never enforced.
#[derive(Serialize)]
pub struct CreatedLeaveRequest {
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub overlapping_requests: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct LeaveDecisionRequest {
    pub status: LeaveStatus,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/leave-requests", get(list_leave_requests).post(create_leave_request))
        .route("/leave-requests/:id/decision", post(decide_leave_request))
        .with_state(state)
}

async fn create_leave_request(
    State(state): State<AppState>,
    Json(body): Json<NewLeaveRequest>,
) -> AppResult<(StatusCode, Json<CreatedLeaveRequest>)> {
    validate_leave_range(body.start, body.end)?;

    let existing = state.store.list_leave_requests(body.user_id).await?;
    let overlapping_requests = find_leave_conflicts(&existing, body.user_id, body.start, body.end);

    let created = state
        .store
        .create_leave_request(body, state.clock.now())
        .await?;
    tracing::info!(leave_id = %created.id, user_id = %created.user_id, "🌴 Leave requested");
    if !overlapping_requests.is_empty() {
        tracing::warn!(
            leave_id = %created.id,
            user_id = %created.user_id,
            overlaps = ?overlapping_requests,
            "⚠️ Leave overlaps existing requests"
        );
    }
    Ok((
        StatusCode::CREATED,
        Json(CreatedLeaveRequest {
            request: created,
            overlapping_requests,
        }),
    ))
}

async fn list_leave_requests(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    Ok(Json(state.store.list_leave_requests(query.user_id).await?))
}

/// Approve or reject a pending request. Decided requests are final.
async fn decide_leave_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<LeaveDecisionRequest>,
) -> AppResult<Json<LeaveRequest>> {
    if body.status == LeaveStatus::Pending {
        return Err(AppError::BadRequest(
            "Decision must be 'approved' or 'rejected'".into(),
        ));
    }

    let updated = state.store.decide_leave_request(id, body.status).await?;
    tracing::info!(leave_id = %id, "Leave request {}", updated.status.as_str());
    Ok(Json(updated))
}
