use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone};

use crate::{storage::entities::LogEntryEntity, utils::time::day_key};

/// Mean gap between consecutive entries in minutes. With fewer than two
/// entries there is no gap to take a mean of. Input order doesn't matter,
/// gaps are taken over instants sorted ascending.
pub fn average_gap_minutes(entries: &[LogEntryEntity]) -> Option<f64> {
    if entries.len() < 2 {
        return None;
    }

    let mut instants = entries.iter().map(|e| e.instant).collect::<Vec<_>>();
    instants.sort();

    let total_seconds = instants
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds())
        .sum::<i64>();

    Some(total_seconds as f64 / 60. / (instants.len() - 1) as f64)
}

/// Number of entries on each local calendar day.
pub fn counts_by_day<Tz: TimeZone>(
    entries: &[LogEntryEntity],
    tz: &Tz,
) -> HashMap<NaiveDate, usize> {
    let mut counts = HashMap::new();
    for entry in entries {
        *counts.entry(day_key(entry.instant, tz)).or_insert(0) += 1;
    }
    counts
}

/// Entries per day, averaged over the days that have at least one entry. A
/// stretch of empty days in the middle of the log doesn't count toward the
/// denominator.
pub fn average_per_day<Tz: TimeZone>(entries: &[LogEntryEntity], tz: &Tz) -> Option<f64> {
    let days = counts_by_day(entries, tz).len();
    if days == 0 {
        return None;
    }

    Some(entries.len() as f64 / days as f64)
}

/// Renders a gap average to the nearest minute, "1h 5m" from a full hour up,
/// "45m" below, "-" when there is nothing to average.
pub fn format_gap(minutes: Option<f64>) -> String {
    let Some(minutes) = minutes else {
        return "-".to_string();
    };

    let rounded = minutes.round() as i64;
    if rounded >= 60 {
        format!("{}h {}m", rounded / 60, rounded % 60)
    } else {
        format!("{rounded}m")
    }
}
