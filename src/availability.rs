//! Registration and leave-range decisions.
//!
//! Pure checks over values the store already loaded. Counters are never
//! touched here; the store does that when a registration is written.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{EventOccurrence, LeaveRequest};

/// Why a registration change was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    #[error("event is in the past")]
    PastEvent,

    #[error("event is at capacity")]
    AtCapacity,

    #[error("event has already started")]
    EventStarted,

    #[error("already registered for this event")]
    AlreadyRegistered,

    #[error("not registered for this event")]
    NotRegistered,
}

impl Denial {
    pub fn code(self) -> &'static str {
        match self {
            Denial::PastEvent => "past_event",
            Denial::AtCapacity => "at_capacity",
            Denial::EventStarted => "event_started",
            Denial::AlreadyRegistered => "already_registered",
            Denial::NotRegistered => "not_registered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied(Denial),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied(denial) => Err(denial),
        }
    }
}

/// Whether a new registration may be taken at `now`.
///
/// Events starting earlier on the current (UTC) day still accept sign-ups.
pub fn check_registration(event: &EventOccurrence, now: DateTime<Utc>) -> Decision {
    if event.start.date_naive() < now.date_naive() {
        return Decision::Denied(Denial::PastEvent);
    }
    match event.capacity {
        Some(capacity) if event.registration_count >= capacity => {
            Decision::Denied(Denial::AtCapacity)
        }
        _ => Decision::Allowed,
    }
}

/// Cancelling is possible until the event starts.
pub fn check_cancellation(event: &EventOccurrence, now: DateTime<Utc>) -> Decision {
    if event.start < now {
        Decision::Denied(Denial::EventStarted)
    } else {
        Decision::Allowed
    }
}

/// A single user's standing for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Unregistered,
    Registered,
}

impl RegistrationState {
    pub fn register(self, event: &EventOccurrence, now: DateTime<Utc>) -> Result<Self, Denial> {
        match self {
            RegistrationState::Registered => Err(Denial::AlreadyRegistered),
            RegistrationState::Unregistered => {
                check_registration(event, now).into_result()?;
                Ok(RegistrationState::Registered)
            }
        }
    }

    pub fn cancel(self, event: &EventOccurrence, now: DateTime<Utc>) -> Result<Self, Denial> {
        match self {
            RegistrationState::Unregistered => Err(Denial::NotRegistered),
            RegistrationState::Registered => {
                check_cancellation(event, now).into_result()?;
                Ok(RegistrationState::Unregistered)
            }
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveRangeError {
    #[error("leave must end after it starts ({start} .. {end})")]
    EndNotAfterStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

pub fn validate_leave_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), LeaveRangeError> {
    if end > start {
        Ok(())
    } else {
        Err(LeaveRangeError::EndNotAfterStart { start, end })
    }
}

/// Half-open `[start, end)` overlap; touching ranges do not overlap.
pub fn ranges_overlap<T: PartialOrd>(a: (T, T), b: (T, T)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Pending or approved requests of the same user that overlap `[start, end)`.
pub fn find_leave_conflicts(
    existing: &[LeaveRequest],
    user_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Uuid> {
    existing
        .iter()
        .filter(|l| l.user_id == user_id && l.status.is_active())
        .filter(|l| ranges_overlap((l.start, l.end), (start, end)))
        .map(|l| l.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaveStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    fn event(start: DateTime<Utc>, capacity: Option<i32>, count: i32) -> EventOccurrence {
        EventOccurrence {
            id: Uuid::new_v4(),
            title: "Lunch & learn".into(),
            start,
            end: start + Duration::hours(1),
            capacity,
            registration_count: count,
        }
    }

    #[test]
    fn full_event_tomorrow_is_at_capacity() {
        let e = event(now() + Duration::days(1), Some(10), 10);
        assert_eq!(check_registration(&e, now()), Decision::Denied(Denial::AtCapacity));
    }

    #[test]
    fn uncapped_event_is_always_open() {
        let e = event(now() + Duration::days(1), None, 10_000);
        assert!(check_registration(&e, now()).is_allowed());
    }

    #[test]
    fn capacity_boundary() {
        let tomorrow = now() + Duration::days(1);
        assert!(check_registration(&event(tomorrow, Some(10), 9), now()).is_allowed());
        assert!(!check_registration(&event(tomorrow, Some(10), 11), now()).is_allowed());
    }

    #[test]
    fn same_day_start_is_still_open() {
        let this_morning = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        assert!(check_registration(&event(this_morning, None, 0), now()).is_allowed());
    }

    #[test]
    fn yesterday_is_past() {
        let e = event(now() - Duration::days(1), Some(10), 0);
        assert_eq!(check_registration(&e, now()), Decision::Denied(Denial::PastEvent));
    }

    #[test]
    fn past_check_comes_before_capacity() {
        let e = event(now() - Duration::days(2), Some(1), 1);
        assert_eq!(check_registration(&e, now()), Decision::Denied(Denial::PastEvent));
    }

    #[test]
    fn cancellation_blocked_once_started() {
        let started = event(now() - Duration::minutes(1), None, 1);
        let upcoming = event(now() + Duration::minutes(1), None, 1);
        assert_eq!(check_cancellation(&started, now()), Decision::Denied(Denial::EventStarted));
        assert!(check_cancellation(&upcoming, now()).is_allowed());
    }

    #[test]
    fn registration_state_machine() {
        let e = event(now() + Duration::days(1), Some(5), 0);
        let state = RegistrationState::Unregistered;

        let state = state.register(&e, now()).unwrap();
        assert_eq!(state, RegistrationState::Registered);
        assert_eq!(state.register(&e, now()), Err(Denial::AlreadyRegistered));

        let state = state.cancel(&e, now()).unwrap();
        assert_eq!(state, RegistrationState::Unregistered);
        assert_eq!(state.cancel(&e, now()), Err(Denial::NotRegistered));

        let later = e.start + Duration::minutes(5);
        assert_eq!(
            RegistrationState::Registered.cancel(&e, later),
            Err(Denial::EventStarted)
        );
    }

    #[test]
    fn decision_serializes_with_reason() {
        assert_eq!(
            serde_json::to_value(Decision::Denied(Denial::AtCapacity)).unwrap(),
            serde_json::json!({"decision": "denied", "reason": "at_capacity"})
        );
        assert_eq!(
            serde_json::to_value(Decision::Allowed).unwrap(),
            serde_json::json!({"decision": "allowed"})
        );
    }

    #[test]
    fn leave_range_must_be_positive() {
        assert!(validate_leave_range(now(), now() + Duration::hours(1)).is_ok());
        assert!(validate_leave_range(now(), now()).is_err());
        assert!(validate_leave_range(now(), now() - Duration::days(1)).is_err());
    }

    #[test]
    fn overlap_is_half_open() {
        assert!(ranges_overlap((1, 5), (4, 8)));
        assert!(ranges_overlap((1, 10), (3, 4)));
        assert!(!ranges_overlap((1, 5), (5, 8)));
        assert!(!ranges_overlap((6, 8), (1, 5)));
    }

    #[test]
    fn leave_conflicts_ignore_rejected_and_other_users() {
        let user = Uuid::new_v4();
        let leave = |owner: Uuid, days: (i64, i64), status| LeaveRequest {
            id: Uuid::new_v4(),
            user_id: owner,
            start: now() + Duration::days(days.0),
            end: now() + Duration::days(days.1),
            reason: None,
            status,
            created_at: now(),
        };
        let existing = vec![
            leave(user, (1, 3), LeaveStatus::Approved),
            leave(user, (2, 4), LeaveStatus::Rejected),
            leave(Uuid::new_v4(), (1, 5), LeaveStatus::Pending),
            leave(user, (10, 12), LeaveStatus::Pending),
        ];

        let conflicts =
            find_leave_conflicts(&existing, user, now() + Duration::days(2), now() + Duration::days(11));
        assert_eq!(conflicts, vec![existing[0].id, existing[3].id]);

        let none = find_leave_conflicts(&existing, user, now() + Duration::days(3), now() + Duration::days(10));
        assert!(none.is_empty());
    }
}
