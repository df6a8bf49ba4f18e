//! Month grid annotated with the user's records and scheduled events.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::{build_month_grid, classify_flow, CalendarCell, CalendarResult, FlowLevel, RecordIndex};
use crate::models::{DateRecord, EventOccurrence};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBadge {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    #[serde(flatten)]
    pub cell: CalendarCell,
    pub flow: Option<FlowLevel>,
    pub flow_label: Option<&'static str>,
    /// Intensity scaled to 0..=1 for shading.
    pub flow_weight: Option<f32>,
    pub flow_class: Option<&'static str>,
    pub symptoms: Vec<String>,
    pub note: Option<String>,
    pub events: Vec<EventBadge>,
    pub tooltip: Option<String>,
}

impl DayView {
    fn padding(cell: CalendarCell) -> Self {
        Self {
            cell,
            flow: None,
            flow_label: None,
            flow_weight: None,
            flow_class: None,
            symptoms: Vec::new(),
            note: None,
            events: Vec::new(),
            tooltip: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayView>,
}

impl MonthView {
    pub fn project(
        year: i32,
        month: u32,
        today: NaiveDate,
        records: &[DateRecord],
        events: &[EventOccurrence],
    ) -> CalendarResult<Self> {
        let records = RecordIndex::build(records);
        let events = RecordIndex::build(events);

        let days = build_month_grid(year, month, today)?
            .into_iter()
            .map(|cell| match cell.date {
                Some(date) => annotate(cell, date, &records, &events),
                None => DayView::padding(cell),
            })
            .collect();

        Ok(Self { year, month, days })
    }
}

fn annotate(
    cell: CalendarCell,
    date: NaiveDate,
    records: &RecordIndex<'_, DateRecord>,
    events: &RecordIndex<'_, EventOccurrence>,
) -> DayView {
    let record = records.active_on(date);
    let flow = record.and_then(|r| classify_flow(r.flow_intensity));
    let symptoms: Vec<String> = record
        .map(|r| r.symptoms.iter().cloned().collect())
        .unwrap_or_default();
    let note = record.and_then(|r| r.note.clone()).filter(|n| !n.trim().is_empty());
    let events: Vec<EventBadge> = events
        .entries_on(date)
        .iter()
        .map(|e| EventBadge {
            id: e.id,
            title: e.title.clone(),
        })
        .collect();

    let tooltip = tooltip(date, flow, &symptoms, note.as_deref(), &events);

    DayView {
        cell,
        flow,
        flow_label: flow.map(FlowLevel::label),
        flow_weight: flow.map(FlowLevel::weight),
        flow_class: flow.map(FlowLevel::css_class),
        symptoms,
        note,
        events,
        tooltip,
    }
}

/// Multi-line hover text; `None` when there is nothing to show for the day.
pub fn tooltip(
    date: NaiveDate,
    flow: Option<FlowLevel>,
    symptoms: &[String],
    note: Option<&str>,
    events: &[EventBadge],
) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(level) = flow {
        lines.push(format!("Flow: {}", level.label()));
    }
    if !symptoms.is_empty() {
        lines.push(format!("Symptoms: {}", symptoms.join(", ")));
    }
    if let Some(note) = note {
        lines.push(format!("Note: {}", note.trim()));
    }
    for event in events {
        lines.push(format!("Event: {}", event.title));
    }
    if lines.is_empty() {
        return None;
    }

    let heading = format!(
        "{}, {} {}, {}",
        date.format("%A"),
        date.format("%B"),
        date.day(),
        date.year()
    );
    lines.insert(0, heading);
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, y: i32, m: u32, d: u32, hour: u32) -> EventOccurrence {
        let start = Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap();
        EventOccurrence {
            id: Uuid::new_v4(),
            title: title.into(),
            start,
            end: start + chrono::Duration::hours(1),
            capacity: None,
            registration_count: 0,
        }
    }

    fn day(view: &MonthView, d: NaiveDate) -> &DayView {
        view.days.iter().find(|v| v.cell.date == Some(d)).unwrap()
    }

    #[test]
    fn projects_records_and_events() {
        let user = Uuid::new_v4();
        let mut record = DateRecord::new(user, date(2024, 3, 5)).with_flow(3);
        record.symptoms.insert("fatigue".into());
        record.symptoms.insert("cramps".into());
        record.note = Some(" rest day ".into());
        let records = vec![DateRecord::new(user, date(2024, 3, 5)), record];
        let events = vec![event("Yoga", 2024, 3, 5, 17), event("All hands", 2024, 3, 20, 9)];

        let view = MonthView::project(2024, 3, date(2024, 3, 5), &records, &events).unwrap();
        assert_eq!(view.days.len(), 42);

        let fifth = day(&view, date(2024, 3, 5));
        assert!(fifth.cell.is_today);
        assert_eq!(fifth.flow, Some(FlowLevel::Moderate));
        assert_eq!(fifth.flow_label, Some("Moderate"));
        assert_eq!(fifth.flow_weight, Some(0.6));
        assert_eq!(fifth.flow_class, Some("flow-moderate"));
        assert_eq!(fifth.symptoms, vec!["cramps", "fatigue"]);
        assert_eq!(fifth.events.len(), 1);
        assert_eq!(
            fifth.tooltip.as_deref(),
            Some(
                "Tuesday, March 5, 2024\nFlow: Moderate\nSymptoms: cramps, fatigue\nNote: rest day\nEvent: Yoga"
            )
        );

        let twentieth = day(&view, date(2024, 3, 20));
        assert_eq!(twentieth.flow, None);
        assert_eq!(twentieth.flow_weight, None);
        assert_eq!(
            twentieth.tooltip.as_deref(),
            Some("Wednesday, March 20, 2024\nEvent: All hands")
        );
    }

    #[test]
    fn multi_day_event_shows_on_every_day_it_overlaps() {
        let start = Utc.with_ymd_and_hms(2024, 2, 28, 9, 0, 0).unwrap();
        let retreat = EventOccurrence {
            id: Uuid::new_v4(),
            title: "Retreat".into(),
            start,
            end: Utc.with_ymd_and_hms(2024, 3, 2, 17, 0, 0).unwrap(),
            capacity: None,
            registration_count: 0,
        };
        let view = MonthView::project(2024, 3, date(2024, 3, 1), &[], &[retreat]).unwrap();

        for d in [date(2024, 3, 1), date(2024, 3, 2)] {
            let shown = day(&view, d);
            assert_eq!(shown.events.len(), 1);
            assert_eq!(shown.events[0].title, "Retreat");
        }
        assert!(day(&view, date(2024, 3, 3)).events.is_empty());
        assert_eq!(
            day(&view, date(2024, 3, 2)).tooltip.as_deref(),
            Some("Saturday, March 2, 2024\nEvent: Retreat")
        );
    }

    #[test]
    fn empty_days_and_padding_have_no_tooltip() {
        let view = MonthView::project(2024, 3, date(2024, 3, 1), &[], &[]).unwrap();
        assert!(view.days.iter().all(|d| d.tooltip.is_none()));
        assert!(view.days[0].cell.date.is_none());
    }

    #[test]
    fn records_outside_month_are_ignored() {
        let user = Uuid::new_v4();
        let records = vec![DateRecord::new(user, date(2024, 4, 1)).with_flow(5)];
        let view = MonthView::project(2024, 3, date(2024, 3, 1), &records, &[]).unwrap();
        assert!(view.days.iter().all(|d| d.flow.is_none()));
    }

    #[test]
    fn blank_notes_are_dropped() {
        let user = Uuid::new_v4();
        let mut record = DateRecord::new(user, date(2024, 3, 2));
        record.note = Some("   ".into());
        let view = MonthView::project(2024, 3, date(2024, 3, 1), &[record], &[]).unwrap();
        let second = day(&view, date(2024, 3, 2));
        assert!(second.note.is_none());
        assert!(second.tooltip.is_none());
    }
}
