use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::UserQuery;
use crate::error::AppResult;
use crate::models::SymptomsByDate;
use crate::store::DateFilter;
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/symptoms", get(get_symptoms_grouped))
        .with_state(state)
}

/// Days that have at least one symptom, newest first.
async fn get_symptoms_grouped(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<SymptomsByDate>>> {
    let records = state
        .store
        .list_records(query.user_id, DateFilter::default())
        .await?;

    let result: Vec<SymptomsByDate> = records
        .into_iter()
        .rev()
        .filter(|r| !r.symptoms.is_empty())
        .map(|r| SymptomsByDate {
            date: r.date,
            symptoms: r.symptoms.into_iter().collect(),
        })
        .collect();

    Ok(Json(result))
}
