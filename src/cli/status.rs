use chrono::TimeZone;
use now::DateTimeNow;

use crate::{
    storage::slot_storage::SlotStorage,
    tracker::{
        Tracker,
        analysis::{average_gap_minutes, average_per_day, format_gap},
        schedule::{latest_entry, next_feeding_due},
    },
    utils::{
        clock::Clock,
        time::{day_and_time, day_key, format_duration_hm},
    },
};

/// Builds the overview printed by the status command. Something like:
///
/// ```text
/// Last feeding    Fri, Jan 5, 2024 09:12 (1h 30m ago)
/// Next feeding    Fri, Jan 5, 2024 12:12 (in 1h 30m)
/// Interval        3h
/// Feedings today  5 (avg gap 2h 41m)
/// Diapers today   4 (2.8/day overall)
/// Vitamin         given
/// ```
///
/// "Today" starts at local midnight, which is also where the day buckets of
/// the history listing cut over.
pub fn render_status<S: SlotStorage, Tz: TimeZone>(
    tracker: &Tracker<S>,
    clock: &dyn Clock,
    tz: &Tz,
) -> String {
    let now = clock.time();
    let today_start = now.with_timezone(tz).beginning_of_day().to_utc();

    let mut lines = vec![];

    match latest_entry(tracker.feedings()) {
        Some(latest) => lines.push(format!(
            "Last feeding\t{} ({} ago)",
            day_and_time(latest.instant, tz),
            format_duration_hm(now - latest.instant)
        )),
        None => lines.push("Last feeding\t-".to_string()),
    }

    match next_feeding_due(tracker.feedings(), tracker.interval()) {
        Some(due) if due >= now => lines.push(format!(
            "Next feeding\t{} (in {})",
            day_and_time(due, tz),
            format_duration_hm(due - now)
        )),
        Some(due) => lines.push(format!(
            "Next feeding\t{} (overdue by {})",
            day_and_time(due, tz),
            format_duration_hm(now - due)
        )),
        None => lines.push("Next feeding\t-".to_string()),
    }

    lines.push(format!("Interval\t{}", tracker.interval()));

    let todays_feedings = tracker
        .feedings()
        .iter()
        .filter(|e| e.instant >= today_start)
        .cloned()
        .collect::<Vec<_>>();
    let mut feeding_line = format!("Feedings today\t{}", todays_feedings.len());
    if let Some(gap) = average_gap_minutes(&todays_feedings) {
        feeding_line.push_str(&format!(" (avg gap {})", format_gap(Some(gap))));
    }
    lines.push(feeding_line);

    let todays_diapers = tracker
        .diapers()
        .iter()
        .filter(|e| e.instant >= today_start)
        .count();
    let mut diaper_line = format!("Diapers today\t{todays_diapers}");
    if let Some(per_day) = average_per_day(tracker.diapers(), tz) {
        diaper_line.push_str(&format!(" ({per_day:.1}/day overall)"));
    }
    lines.push(diaper_line);

    lines.push(format!(
        "Vitamin\t{}",
        if tracker.vitamin_given(day_key(now, tz)) {
            "given"
        } else {
            "not given"
        }
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::LogEntryEntity,
            slot_storage::{LogSlot, SlotStorage, SlotStorageImpl},
        },
        tracker::Tracker,
        utils::clock::MockClock,
    };

    use super::render_status;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

    fn instant_at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDateTime::new(
            TEST_DATE,
            NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        ))
    }

    fn fixed_clock(now: DateTime<Utc>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_time().return_const(now);
        clock
    }

    #[tokio::test]
    async fn test_status_with_some_history() -> Result<()> {
        let dir = tempdir()?;
        let storage = SlotStorageImpl::new(dir.path().to_owned())?;

        storage
            .save_log(
                LogSlot::Feedings,
                &[
                    LogEntryEntity::new(instant_at(6, 0)),
                    LogEntryEntity::new(instant_at(8, 30)),
                ],
            )
            .await?;
        storage
            .save_log(
                LogSlot::Diapers,
                &[
                    LogEntryEntity::new(instant_at(7, 15)),
                    LogEntryEntity::new(instant_at(7, 15) - Duration::days(1)),
                    LogEntryEntity::new(instant_at(9, 0) - Duration::days(1)),
                ],
            )
            .await?;

        let tracker = Tracker::load(storage).await?;
        let rendered = render_status(&tracker, &fixed_clock(instant_at(10, 0)), &Utc);

        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Last feeding\tFri, Jan 5, 2024 08:30 (1h 30m ago)");
        assert_eq!(lines[1], "Next feeding\tFri, Jan 5, 2024 11:30 (in 1h 30m)");
        assert_eq!(lines[2], "Interval\t3h");
        assert_eq!(lines[3], "Feedings today\t2 (avg gap 2h 30m)");
        assert_eq!(lines[4], "Diapers today\t1 (1.5/day overall)");
        assert_eq!(lines[5], "Vitamin\tnot given");
        Ok(())
    }

    #[tokio::test]
    async fn test_status_on_a_fresh_directory() -> Result<()> {
        let dir = tempdir()?;
        let tracker = Tracker::load(SlotStorageImpl::new(dir.path().to_owned())?).await?;

        let rendered = render_status(&tracker, &fixed_clock(instant_at(10, 0)), &Utc);

        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Last feeding\t-");
        assert_eq!(lines[1], "Next feeding\t-");
        assert_eq!(lines[2], "Interval\t3h");
        assert_eq!(lines[3], "Feedings today\t0");
        assert_eq!(lines[4], "Diapers today\t0");
        assert_eq!(lines[5], "Vitamin\tnot given");
        Ok(())
    }

    #[tokio::test]
    async fn test_status_shows_overdue_and_vitamin() -> Result<()> {
        let dir = tempdir()?;
        let storage = SlotStorageImpl::new(dir.path().to_owned())?;
        storage
            .save_log(LogSlot::Feedings, &[LogEntryEntity::new(instant_at(8, 30))])
            .await?;

        let mut tracker = Tracker::load(storage).await?;
        tracker.toggle_vitamin(TEST_DATE).await?;

        let rendered = render_status(&tracker, &fixed_clock(instant_at(12, 0)), &Utc);

        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[1],
            "Next feeding\tFri, Jan 5, 2024 11:30 (overdue by 30m)"
        );
        assert_eq!(lines[3], "Feedings today\t1");
        assert_eq!(lines[5], "Vitamin\tgiven");
        Ok(())
    }
}
