pub mod bleeding;
pub mod calendar;
pub mod cycle;
pub mod cycle_stats;
pub mod events;
pub mod leave;
pub mod records;
pub mod symptoms;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::calendar::parse_calendar_date;
use crate::error::{AppError, AppResult};

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Parse a `YYYY-MM-DD` request field, naming it in the 400 response.
pub(crate) fn parse_date_field(field: &str, raw: &str) -> AppResult<NaiveDate> {
    parse_calendar_date(raw).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid {field} '{raw}' (expected YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_optional_date(field: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    raw.map(|raw| parse_date_field(field, raw)).transpose()
}
