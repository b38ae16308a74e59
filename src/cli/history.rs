use chrono::TimeZone;

use crate::{
    storage::slot_storage::{LogSlot, SlotStorage},
    tracker::{
        Tracker,
        analysis::{average_gap_minutes, format_gap},
        day_grouping::group_by_day,
    },
    utils::time::clock_time,
};

/// Builds the day by day listing of a log, newest day first. Feeding days
/// with more than one entry also show that day's average gap. Something like:
///
/// ```text
/// Fri, Jan 5, 2024        3 feedings      avg gap 2h 30m
///   09:12  0d9f3a21
///   06:40  77c01b9e
///   04:05  c42d17aa
/// ```
pub fn render_history<S: SlotStorage, Tz: TimeZone>(
    tracker: &Tracker<S>,
    slot: LogSlot,
    days: Option<usize>,
    tz: &Tz,
) -> String {
    let groups = group_by_day(tracker.entries(slot), tz);
    if groups.is_empty() {
        return format!("Nothing in the {slot} log yet");
    }

    let mut lines = vec![];
    for group in groups.iter().take(days.unwrap_or(groups.len())) {
        let mut header = format!(
            "{}\t{} {}",
            group.label,
            group.entries.len(),
            slot.noun(group.entries.len())
        );
        if slot == LogSlot::Feedings {
            if let Some(gap) = average_gap_minutes(&group.entries) {
                header.push_str(&format!("\tavg gap {}", format_gap(Some(gap))));
            }
        }
        lines.push(header);

        for entry in &group.entries {
            lines.push(format!(
                "  {}\t{}",
                clock_time(entry.instant, tz),
                entry.short_id()
            ));
        }
    }

    lines.join("\n")
}
