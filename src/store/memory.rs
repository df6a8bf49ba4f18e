//! In-memory store for tests and database-less runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CalendarStore, DateFilter};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    DateRecord, EventOccurrence, LeaveRequest, LeaveStatus, NewEvent, NewLeaveRequest, Registration,
};

#[derive(Debug, Default)]
struct EventsState {
    events: HashMap<Uuid, EventOccurrence>,
    registrations: HashMap<(Uuid, Uuid), Registration>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<(Uuid, NaiveDate), DateRecord>>>,
    // Events and registrations share a lock so the counter and the rows move together.
    events: Arc<RwLock<EventsState>>,
    leave: Arc<RwLock<HashMap<Uuid, LeaveRequest>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CalendarStore for MemoryStore {
    async fn save_record(&self, record: DateRecord) -> StoreResult<DateRecord> {
        let mut records = self.records.write().await;
        records.insert((record.user_id, record.date), record.clone());
        Ok(record)
    }

    async fn delete_record(&self, user_id: Uuid, date: NaiveDate) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        Ok(records.remove(&(user_id, date)).is_some())
    }

    async fn list_records(&self, user_id: Uuid, filter: DateFilter) -> StoreResult<Vec<DateRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.user_id == user_id && filter.contains(r.date))
            .cloned()
            .collect())
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<EventOccurrence> {
        let event = EventOccurrence {
            id: Uuid::new_v4(),
            title: event.title,
            start: event.start,
            end: event.end,
            capacity: event.capacity,
            registration_count: 0,
        };
        let mut state = self.events.write().await;
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<EventOccurrence>> {
        let state = self.events.read().await;
        Ok(state.events.get(&id).cloned())
    }

    async fn list_events(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> StoreResult<Vec<EventOccurrence>> {
        let state = self.events.read().await;
        let mut events: Vec<EventOccurrence> = state
            .events
            .values()
            .filter(|e| e.start < to && from < e.end)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start, e.id));
        Ok(events)
    }

    async fn find_registration(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Option<Registration>> {
        let state = self.events.read().await;
        Ok(state.registrations.get(&(event_id, user_id)).cloned())
    }

    async fn register(&self, event_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<Registration> {
        let mut state = self.events.write().await;
        if state.registrations.contains_key(&(event_id, user_id)) {
            return Err(StoreError::already_exists("Registration", format!("{event_id}/{user_id}")));
        }
        let event = state
            .events
            .get_mut(&event_id)
            .ok_or_else(|| StoreError::not_found("Event", event_id))?;
        if event.capacity.is_some_and(|cap| event.registration_count >= cap) {
            return Err(StoreError::CapacityReached(event_id.to_string()));
        }
        event.registration_count += 1;

        let registration = Registration {
            event_id,
            user_id,
            registered_at: at,
        };
        state.registrations.insert((event_id, user_id), registration.clone());
        Ok(registration)
    }

    async fn cancel_registration(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut state = self.events.write().await;
        if state.registrations.remove(&(event_id, user_id)).is_none() {
            return Ok(false);
        }
        if let Some(event) = state.events.get_mut(&event_id) {
            event.registration_count = (event.registration_count - 1).max(0);
        }
        Ok(true)
    }

    async fn create_leave_request(&self, request: NewLeaveRequest, at: DateTime<Utc>) -> StoreResult<LeaveRequest> {
        let leave = LeaveRequest {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            start: request.start,
            end: request.end,
            reason: request.reason,
            status: LeaveStatus::Pending,
            created_at: at,
        };
        let mut requests = self.leave.write().await;
        requests.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn get_leave_request(&self, id: Uuid) -> StoreResult<Option<LeaveRequest>> {
        let requests = self.leave.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn list_leave_requests(&self, user_id: Uuid) -> StoreResult<Vec<LeaveRequest>> {
        let requests = self.leave.read().await;
        let mut result: Vec<LeaveRequest> = requests
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|l| (l.start, l.id));
        Ok(result)
    }

    async fn decide_leave_request(&self, id: Uuid, status: LeaveStatus) -> StoreResult<LeaveRequest> {
        let mut requests = self.leave.write().await;
        let leave = requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("LeaveRequest", id))?;
        if leave.status != LeaveStatus::Pending {
            return Err(StoreError::invalid_transition(leave.status, status));
        }
        leave.status = status;
        Ok(leave.clone())
    }
}
