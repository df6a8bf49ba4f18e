use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::UserQuery;
use crate::cycles::group_bleeding_days;
use crate::error::AppResult;
use crate::models::BleedingPeriod;
use crate::store::DateFilter;
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/bleeding-history", get(get_bleeding_history))
        .with_state(state)
}

pub async fn get_bleeding_history(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> AppResult<Json<Vec<BleedingPeriod>>> {
    let records = state
        .store
        .list_records(params.user_id, DateFilter::default())
        .await?;
    Ok(Json(group_bleeding_days(&records)))
}
