//! Period history derived from the daily records: bleeding periods, cycle
//! lengths and where the user currently is in their cycle.

use chrono::{Duration, NaiveDate};

use crate::calendar::{classify_flow, RecordIndex};
use crate::models::{BleedingDay, BleedingPeriod, CycleStat, CycleStats, CycleSummary, DateRecord};

/// Cycle length assumed until the user has a completed cycle on record.
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// Fertile window, in days after the cycle start (inclusive).
pub const FERTILE_WINDOW: (i64, i64) = (12, 16);

/// Split flow days into periods of consecutive dates.
pub fn group_bleeding_days(records: &[DateRecord]) -> Vec<BleedingPeriod> {
    let index = RecordIndex::build(records);
    let mut periods: Vec<BleedingPeriod> = Vec::new();
    let mut current: Vec<BleedingDay> = Vec::new();

    for date in index.dates() {
        let Some(record) = index.active_on(date) else {
            continue;
        };
        let intensity = record.flow_intensity.unwrap_or(0);
        let Some(level) = classify_flow(Some(intensity)).filter(|_| intensity > 0) else {
            continue;
        };

        let continues = current
            .last()
            .is_some_and(|prev| date.signed_duration_since(prev.date).num_days() == 1);
        if !continues && !current.is_empty() {
            periods.push(close_period(std::mem::take(&mut current)));
        }
        current.push(BleedingDay {
            date,
            intensity,
            level,
        });
    }

    if !current.is_empty() {
        periods.push(close_period(current));
    }
    periods
}

fn close_period(days: Vec<BleedingDay>) -> BleedingPeriod {
    // Callers only close non-empty runs.
    let start_date = days[0].date;
    let end_date = days[days.len() - 1].date;
    BleedingPeriod {
        start_date,
        end_date,
        days,
    }
}

/// One cycle per period; a cycle runs until the next period starts.
pub fn cycle_stats(periods: &[BleedingPeriod]) -> CycleStats {
    let cycle_stats: Vec<CycleStat> = periods
        .iter()
        .enumerate()
        .map(|(i, period)| CycleStat {
            cycle_number: i as u32 + 1,
            start_date: period.start_date,
            period_length: period.days.len() as i64,
            cycle_length: periods
                .get(i + 1)
                .map(|next| (next.start_date - period.start_date).num_days()),
        })
        .collect();

    let average_period_length = mean(cycle_stats.iter().map(|c| c.period_length));
    let average_cycle_length = mean(cycle_stats.iter().filter_map(|c| c.cycle_length));

    CycleStats {
        average_period_length,
        average_cycle_length,
        cycle_stats,
    }
}

fn mean(values: impl Iterator<Item = i64>) -> f64 {
    let (sum, count) = values.fold((0i64, 0u32), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Where `today` falls in the cycle that began on `start_date`.
///
/// `average_cycle_length` of 0 (no completed cycles yet) falls back to
/// [`DEFAULT_CYCLE_LENGTH`].
pub fn cycle_summary(start_date: NaiveDate, today: NaiveDate, average_cycle_length: f64) -> CycleSummary {
    let cycle_length = if average_cycle_length > 0.0 {
        average_cycle_length.round() as i64
    } else {
        DEFAULT_CYCLE_LENGTH
    };
    let cycle_day = (today - start_date).num_days();
    let fertile = start_date + Duration::days(FERTILE_WINDOW.0)..=start_date + Duration::days(FERTILE_WINDOW.1);

    CycleSummary {
        cycle_day,
        in_fertile_window: fertile.contains(&today),
        period_expected_in_days: cycle_length - cycle_day,
        start_date,
    }
}
