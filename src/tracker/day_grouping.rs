use chrono::{NaiveDate, TimeZone};

use crate::{
    storage::entities::LogEntryEntity,
    utils::time::{day_key, day_label},
};

/// Entries that fall on one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub label: String,
    pub entries: Vec<LogEntryEntity>,
}

/// Splits entries into day buckets for display. Entries are walked most
/// recent first, so buckets come out newest day first and inside a bucket
/// entries stay newest first as well. Which day an entry lands on follows the
/// given timezone.
pub fn group_by_day<Tz: TimeZone>(entries: &[LogEntryEntity], tz: &Tz) -> Vec<DayGroup> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.instant));

    let mut groups: Vec<DayGroup> = vec![];
    for entry in sorted {
        let day = day_key(entry.instant, tz);
        match groups.last_mut() {
            Some(group) if group.day == day => group.entries.push(entry),
            _ => groups.push(DayGroup {
                day,
                label: day_label(day),
                entries: vec![entry],
            }),
        }
    }

    groups
}
