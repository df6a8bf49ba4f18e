use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Duration;
use serde::Deserialize;
use uuid::Uuid;

use super::parse_optional_date;
use crate::calendar::{month_bounds, MonthView};
use crate::error::AppResult;
use crate::store::DateFilter;
use crate::AppState;

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub user_id: Uuid,
    pub year: i32,
    pub month: u32,
    /// The caller's local date, so "today" follows their timezone.
    pub today: Option<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/calendar", get(get_month_view))
        .with_state(state)
}

async fn get_month_view(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<MonthView>> {
    let (first, last) = month_bounds(query.year, query.month)?;
    let today = parse_optional_date("today", query.today.as_deref())?
        .unwrap_or_else(|| state.clock.today());

    let records = state
        .store
        .list_records(
            query.user_id,
            DateFilter {
                from: Some(first),
                to: Some(last),
            },
        )
        .await?;

    let from = first.and_time(chrono::NaiveTime::MIN).and_utc();
    let to = from + Duration::days((last - first).num_days() + 1);
    let events = state.store.list_events(from, to).await?;

    let view = MonthView::project(query.year, query.month, today, &records, &events)?;
    tracing::debug!(
        user_id = %query.user_id,
        records = records.len(),
        events = events.len(),
        "📅 Month view {}-{:02}",
        query.year,
        query.month
    );
    Ok(Json(view))
}
