use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_date_field, parse_optional_date};
use crate::error::{AppError, AppResult};
use crate::models::DateRecord;
use crate::store::DateFilter;
use crate::AppState;

#[derive(Deserialize)]
pub struct RecordsQuery {
    pub user_id: Uuid,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveRecordRequest {
    pub user_id: Uuid,
    pub date: String,
    pub flow_intensity: Option<i32>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteRecordRequest {
    pub user_id: Uuid,
    pub date: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/records",
            get(list_records).put(save_record).delete(delete_record),
        )
        .with_state(state)
}

async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> AppResult<Json<Vec<DateRecord>>> {
    let filter = DateFilter {
        from: parse_optional_date("from", query.from.as_deref())?,
        to: parse_optional_date("to", query.to.as_deref())?,
    };
    let records = state.store.list_records(query.user_id, filter).await?;
    Ok(Json(records))
}

async fn save_record(
    State(state): State<AppState>,
    Json(body): Json<SaveRecordRequest>,
) -> AppResult<Json<DateRecord>> {
    let date = parse_date_field("date", &body.date)?;
    if let Some(intensity) = body.flow_intensity {
        if !(0..=5).contains(&intensity) {
            return Err(AppError::BadRequest(format!(
                "flow_intensity must be between 0 and 5, got {intensity}"
            )));
        }
    }

    let record = DateRecord {
        user_id: body.user_id,
        date,
        flow_intensity: body.flow_intensity,
        symptoms: body
            .symptoms
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        note: body.note.filter(|n| !n.trim().is_empty()),
    };

    let saved = state.store.save_record(record).await?;
    tracing::info!(user_id = %saved.user_id, date = %saved.date, "📝 Record saved");
    Ok(Json(saved))
}

async fn delete_record(
    State(state): State<AppState>,
    Json(body): Json<DeleteRecordRequest>,
) -> AppResult<StatusCode> {
    let date = parse_date_field("date", &body.date)?;
    if state.store.delete_record(body.user_id, date).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No record found for {date}")))
    }
}
