//! Persistence for records, events, registrations and leave requests.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    DateRecord, EventOccurrence, LeaveRequest, LeaveStatus, NewEvent, NewLeaveRequest, Registration,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Inclusive range of calendar days. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateFilter {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Insert or replace the user's record for `record.date`.
    async fn save_record(&self, record: DateRecord) -> StoreResult<DateRecord>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_record(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<bool>;

    /// Records ordered by date.
    async fn list_records(&self, user_id: Uuid, filter: DateFilter) -> StoreResult<Vec<DateRecord>>;

    async fn create_event(&self, event: NewEvent) -> StoreResult<EventOccurrence>;

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<EventOccurrence>>;

    /// Events overlapping `[from, to)`, ordered by start.
    async fn list_events(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<Vec<EventOccurrence>>;

    async fn find_registration(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Registration>>;

    /// Record a registration and bump the event's counter. Fails with
    /// `CapacityReached` instead of going over capacity.
    async fn register(&self, event_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<Registration>;

    /// Remove a registration and decrement the counter. Returns `false` when
    /// the user was not registered.
    async fn cancel_registration(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn create_leave_request(&self, request: NewLeaveRequest, at: DateTime<Utc>) -> StoreResult<LeaveRequest>;

    async fn get_leave_request(&self, id: Uuid) -> StoreResult<Option<LeaveRequest>>;

    /// Requests ordered by start.
    async fn list_leave_requests(&self, user_id: Uuid) -> StoreResult<Vec<LeaveRequest>>;

    /// Move a pending request to `status`. A request that was already
    /// decided fails with `InvalidStateTransition`.
    async fn decide_leave_request(&self, id: Uuid, status: LeaveStatus) -> StoreResult<LeaveRequest>;
}
