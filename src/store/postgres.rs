//! Postgres-backed store. Table layout lives in `migrations/0001_calendar.sql`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{CalendarStore, DateFilter};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    DateRecord, EventOccurrence, LeaveRequest, LeaveStatus, NewEvent, NewLeaveRequest, Registration,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RecordRow {
    user_id: Uuid,
    date: NaiveDate,
    flow_intensity: Option<i32>,
    symptoms: Vec<String>,
    note: Option<String>,
}

impl From<RecordRow> for DateRecord {
    fn from(row: RecordRow) -> Self {
        DateRecord {
            user_id: row.user_id,
            date: row.date,
            flow_intensity: row.flow_intensity,
            symptoms: row.symptoms.into_iter().collect(),
            note: row.note,
        }
    }
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    capacity: Option<i32>,
    registration_count: i32,
}

impl From<EventRow> for EventOccurrence {
    fn from(row: EventRow) -> Self {
        EventOccurrence {
            id: row.id,
            title: row.title,
            start: row.start_at,
            end: row.end_at,
            capacity: row.capacity,
            registration_count: row.registration_count,
        }
    }
}

#[derive(FromRow)]
struct RegistrationRow {
    event_id: Uuid,
    user_id: Uuid,
    registered_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Registration {
            event_id: row.event_id,
            user_id: row.user_id,
            registered_at: row.registered_at,
        }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: Uuid,
    user_id: Uuid,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    reason: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let status = LeaveStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Database(sqlx::Error::Decode(
                format!("unknown leave status '{}'", row.status).into(),
            ))
        })?;
        Ok(LeaveRequest {
            id: row.id,
            user_id: row.user_id,
            start: row.start_at,
            end: row.end_at,
            reason: row.reason,
            status,
            created_at: row.created_at,
        })
    }
}

const EVENT_COLUMNS: &str = "id, title, start_at, end_at, capacity, registration_count";
const LEAVE_COLUMNS: &str = "id, user_id, start_at, end_at, reason, status, created_at";

#[async_trait]
impl CalendarStore for PgStore {
    async fn save_record(&self, record: DateRecord) -> StoreResult<DateRecord> {
        let symptoms: Vec<String> = record.symptoms.iter().cloned().collect();
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO date_records (user_id, date, flow_intensity, symptoms, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, date) DO UPDATE
               SET flow_intensity = EXCLUDED.flow_intensity,
                   symptoms = EXCLUDED.symptoms,
                   note = EXCLUDED.note,
                   updated_at = now()
            RETURNING user_id, date, flow_intensity, symptoms, note
            "#,
        )
        .bind(record.user_id)
        .bind(record.date)
        .bind(record.flow_intensity)
        .bind(symptoms)
        .bind(record.note)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn delete_record(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM date_records WHERE user_id = $1 AND date = $2")
            .bind(user_id)
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_records(&self, user_id: Uuid, filter: DateFilter) -> StoreResult<Vec<DateRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT user_id, date, flow_intensity, symptoms, note
            FROM date_records
            WHERE user_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<EventOccurrence> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events (id, title, start_at, end_at, capacity, registration_count)
             VALUES ($1, $2, $3, $4, $5, 0)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(event.title)
        .bind(event.start)
        .bind(event.end)
        .bind(event.capacity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<EventOccurrence>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_events(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<Vec<EventOccurrence>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE start_at < $2 AND end_at > $1
             ORDER BY start_at ASC, id ASC"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_registration(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Registration>> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            "SELECT event_id, user_id, registered_at FROM event_registrations
             WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn register(&self, event_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<Registration> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::not_found("Event", event_id));
        }

        let inserted = sqlx::query_as::<_, RegistrationRow>(
            "INSERT INTO event_registrations (event_id, user_id, registered_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (event_id, user_id) DO NOTHING
             RETURNING event_id, user_id, registered_at",
        )
        .bind(event_id)
        .bind(user_id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(registration) = inserted else {
            return Err(StoreError::already_exists("Registration", format!("{event_id}/{user_id}")));
        };

        // The guard in the WHERE clause keeps concurrent sign-ups from overshooting capacity.
        let bumped = sqlx::query(
            "UPDATE events SET registration_count = registration_count + 1
             WHERE id = $1 AND (capacity IS NULL OR registration_count < capacity)",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(StoreError::CapacityReached(event_id.to_string()));
        }

        tx.commit().await?;
        Ok(registration.into())
    }

    async fn cancel_registration(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE events SET registration_count = GREATEST(registration_count - 1, 0) WHERE id = $1",
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn create_leave_request(&self, request: NewLeaveRequest, at: DateTime<Utc>) -> StoreResult<LeaveRequest> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "INSERT INTO leave_requests (id, user_id, start_at, end_at, reason, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {LEAVE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.start)
        .bind(request.end)
        .bind(request.reason)
        .bind(LeaveStatus::Pending.as_str())
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn get_leave_request(&self, id: Uuid) -> StoreResult<Option<LeaveRequest>> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(LeaveRequest::try_from).transpose()
    }

    async fn list_leave_requests(&self, user_id: Uuid) -> StoreResult<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests
             WHERE user_id = $1
             ORDER BY start_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn decide_leave_request(&self, id: Uuid, status: LeaveStatus) -> StoreResult<LeaveRequest> {
        // Only a pending row matches, so two racing decisions cannot both land.
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "UPDATE leave_requests SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {LEAVE_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(LeaveStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return row.try_into();
        }

        match self.get_leave_request(id).await? {
            Some(current) => Err(StoreError::invalid_transition(current.status, status)),
            None => Err(StoreError::not_found("LeaveRequest", id)),
        }
    }
}
