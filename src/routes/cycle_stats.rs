use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::UserQuery;
use crate::cycles::{cycle_stats, group_bleeding_days};
use crate::error::AppResult;
use crate::models::CycleStats;
use crate::store::DateFilter;
use crate::AppState;

pub async fn get_cycle_stats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<CycleStats>> {
    let records = state
        .store
        .list_records(query.user_id, DateFilter::default())
        .await?;
    let periods = group_bleeding_days(&records);
    Ok(Json(cycle_stats(&periods)))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/cycle-stats", get(get_cycle_stats))
        .with_state(state)
}
