use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::UserQuery;
use crate::cycles::{cycle_stats, cycle_summary, group_bleeding_days};
use crate::error::{AppError, AppResult};
use crate::models::CycleSummary;
use crate::store::DateFilter;
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/cycle", get(get_cycle_summary))
        .with_state(state)
}

/// Position in the cycle that began with the most recent period.
async fn get_cycle_summary(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> AppResult<Json<CycleSummary>> {
    let today = state.clock.today();
    let records = state
        .store
        .list_records(
            params.user_id,
            DateFilter {
                from: None,
                to: Some(today),
            },
        )
        .await?;

    let periods = group_bleeding_days(&records);
    let Some(latest) = periods.last() else {
        return Err(AppError::NotFound("No period recorded yet".into()));
    };
    let stats = cycle_stats(&periods);

    Ok(Json(cycle_summary(
        latest.start_date,
        today,
        stats.average_cycle_length,
    )))
}
