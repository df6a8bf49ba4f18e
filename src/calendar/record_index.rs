//! Date → entries lookup shared by the period calendar and the event calendar.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use super::parse_calendar_date;
use crate::models::{DateRecord, EventOccurrence};

/// Adapter each feature implements to put its rows on the calendar.
pub trait DatedEntry {
    /// Calendar day the entry belongs to. `None` keeps it off the calendar.
    fn entry_date(&self) -> Option<NaiveDate>;

    /// First and last calendar day the entry covers, inclusive.
    fn entry_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.entry_date().map(|date| (date, date))
    }

    /// Whether the entry covers `date`.
    fn covers(&self, date: NaiveDate) -> bool {
        self.entry_span()
            .is_some_and(|(first, last)| first <= date && date <= last)
    }

    /// Recorded flow intensity; entries without one report 0.
    fn flow_intensity(&self) -> i32 {
        0
    }
}

impl DatedEntry for DateRecord {
    fn entry_date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    fn flow_intensity(&self) -> i32 {
        self.flow_intensity.unwrap_or(0)
    }
}

/// Events cover every UTC day between their start and end. The end is
/// exclusive, so an event ending at midnight stays off the next day.
impl DatedEntry for EventOccurrence {
    fn entry_date(&self) -> Option<NaiveDate> {
        Some(self.start.date_naive())
    }

    fn entry_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.start.date_naive();
        let last = (self.end - Duration::nanoseconds(1)).date_naive().max(first);
        Some((first, last))
    }
}

/// Rows that still carry their date as text, e.g. straight off a form.
impl<T: AsRef<str>> DatedEntry for (T, i32) {
    fn entry_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(self.0.as_ref())
    }

    fn flow_intensity(&self) -> i32 {
        self.1
    }
}

#[derive(Debug)]
pub struct RecordIndex<'a, T> {
    by_date: BTreeMap<NaiveDate, Vec<&'a T>>,
}

impl<'a, T: DatedEntry> RecordIndex<'a, T> {
    /// Group `entries` by day, keeping input order within a day. An entry
    /// spanning several days is listed under each of them. Entries without
    /// a usable date are dropped.
    pub fn build(entries: &'a [T]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<&'a T>> = BTreeMap::new();
        for entry in entries {
            let Some((first, last)) = entry.entry_span() else {
                continue;
            };
            let mut day = first;
            while day <= last {
                by_date.entry(day).or_default().push(entry);
                match day.succ_opt() {
                    Some(next) => day = next,
                    None => break,
                }
            }
        }
        Self { by_date }
    }

    pub fn entries_on(&self, date: NaiveDate) -> &[&'a T] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The entry that represents `date`: the first one with the highest
    /// positive intensity, else the first one recorded.
    pub fn active_on(&self, date: NaiveDate) -> Option<&'a T> {
        pick_active(self.entries_on(date))
    }

    /// Days with at least one entry, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_date.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

fn pick_active<'a, T: DatedEntry>(candidates: &[&'a T]) -> Option<&'a T> {
    let first = *candidates.first()?;
    let mut best: Option<&'a T> = None;
    for &entry in candidates {
        let intensity = entry.flow_intensity();
        if intensity > 0 && best.map_or(true, |b| intensity > b.flow_intensity()) {
            best = Some(entry);
        }
    }
    Some(best.unwrap_or(first))
}

/// One-off lookup without building an index.
pub fn find_record<T: DatedEntry>(records: &[T], target: NaiveDate) -> Option<&T> {
    let matching: Vec<&T> = records
        .iter()
        .filter(|r| r.covers(target))
        .collect();
    pick_active(&matching)
}

/// Same as [`find_record`] with the target still in `YYYY-MM-DD` form.
/// A malformed target matches nothing.
pub fn find_record_str<'a, T: DatedEntry>(records: &'a [T], target: &str) -> Option<&'a T> {
    find_record(records, parse_calendar_date(target)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn positive_flow_wins_over_earlier_empty_entry() {
        let records = [("2024-03-05", 0), ("2024-03-05", 3)];
        let found = find_record_str(&records, "2024-03-05").unwrap();
        assert_eq!(found.1, 3);
    }

    #[test]
    fn first_entry_wins_when_none_has_flow() {
        let user = Uuid::new_v4();
        let mut a = DateRecord::new(user, date(2024, 3, 5));
        a.note = Some("first".into());
        let mut b = DateRecord::new(user, date(2024, 3, 5)).with_flow(0);
        b.note = Some("second".into());
        let records = vec![a, b];

        let found = find_record(&records, date(2024, 3, 5)).unwrap();
        assert_eq!(found.note.as_deref(), Some("first"));
    }

    #[test]
    fn highest_positive_flow_wins_ties_keep_order() {
        let records = [
            ("2024-03-05", 2),
            ("2024-03-05", 4),
            ("2024-03-05", 4),
            ("2024-03-05", 1),
        ];
        let index = RecordIndex::build(&records);
        let active = index.active_on(date(2024, 3, 5)).unwrap();
        assert!(std::ptr::eq(active, &records[1]));
        assert_eq!(index.entries_on(date(2024, 3, 5)).len(), 4);
    }

    #[test]
    fn no_match_for_other_dates() {
        let records = [("2024-03-05", 3)];
        assert!(find_record_str(&records, "2024-03-06").is_none());
        assert!(find_record(&records, date(2023, 3, 5)).is_none());
    }

    #[test]
    fn malformed_dates_never_match() {
        let records = [("05/03/2024", 3), ("garbage", 2), ("2024-03-05", 1)];
        assert!(find_record_str(&records, "not-a-date").is_none());

        let index = RecordIndex::build(&records);
        assert_eq!(index.dates().collect::<Vec<_>>(), vec![date(2024, 3, 5)]);
        assert_eq!(index.active_on(date(2024, 3, 5)).unwrap().1, 1);
    }

    #[test]
    fn timestamped_entries_match_their_written_day() {
        let records = [("2024-03-05T23:00:00-08:00", 2)];
        assert!(find_record(&records, date(2024, 3, 5)).is_some());
        assert!(find_record(&records, date(2024, 3, 6)).is_none());
    }

    #[test]
    fn returned_flow_dominates_other_matches() {
        let records = [
            ("2024-01-01", 0),
            ("2024-01-01", 5),
            ("2024-01-01", 3),
            ("2024-01-02", 1),
        ];
        let target = date(2024, 1, 1);
        let found = find_record(&records, target).unwrap();
        assert!(records
            .iter()
            .filter(|r| r.entry_date() == Some(target))
            .all(|r| found.1 >= r.1));
    }

    fn event(start: &str, end: &str) -> EventOccurrence {
        EventOccurrence {
            id: Uuid::new_v4(),
            title: "Retreat".into(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            capacity: None,
            registration_count: 0,
        }
    }

    #[test]
    fn multi_day_events_cover_each_day() {
        let events = [event("2024-02-28T09:00:00Z", "2024-03-02T17:00:00Z")];
        let index = RecordIndex::build(&events);
        assert_eq!(
            index.dates().collect::<Vec<_>>(),
            vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 2)]
        );
        assert!(find_record(&events, date(2024, 3, 1)).is_some());
        assert!(find_record(&events, date(2024, 3, 3)).is_none());
    }

    #[test]
    fn event_ending_at_midnight_stays_off_next_day() {
        let events = [
            event("2024-03-01T22:00:00Z", "2024-03-02T00:00:00Z"),
            event("2024-03-05T10:00:00Z", "2024-03-05T10:00:00Z"),
        ];
        let index = RecordIndex::build(&events);
        assert_eq!(
            index.dates().collect::<Vec<_>>(),
            vec![date(2024, 3, 1), date(2024, 3, 5)]
        );
    }

    #[test]
    fn empty_input() {
        let records: [(&str, i32); 0] = [];
        let index = RecordIndex::build(&records);
        assert!(index.is_empty());
        assert!(index.active_on(date(2024, 1, 1)).is_none());
        assert!(index.entries_on(date(2024, 1, 1)).is_empty());
    }
}
