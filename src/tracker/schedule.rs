use chrono::{DateTime, Utc};

use crate::storage::entities::{FeedInterval, LogEntryEntity};

/// The most recent entry of a log.
pub fn latest_entry(entries: &[LogEntryEntity]) -> Option<&LogEntryEntity> {
    entries.iter().max_by_key(|e| e.instant)
}

/// The moment the next feeding is expected, the latest feeding plus the
/// preferred interval. Purely a projection that gets recomputed on every
/// look, nothing fires when it passes.
pub fn next_feeding_due(
    entries: &[LogEntryEntity],
    interval: FeedInterval,
) -> Option<DateTime<Utc>> {
    latest_entry(entries).map(|latest| latest.instant + interval.as_duration())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::storage::entities::{FeedInterval, LogEntryEntity};

    use super::{latest_entry, next_feeding_due};

    const TEST_DATE_TIME: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    );

    fn entry_at(minutes: i64) -> LogEntryEntity {
        LogEntryEntity::new(Utc.from_utc_datetime(&TEST_DATE_TIME) + Duration::minutes(minutes))
    }

    #[test]
    fn test_latest_entry_ignores_order() {
        assert_eq!(latest_entry(&[]), None);

        let entries = vec![entry_at(30), entry_at(120), entry_at(0)];
        assert_eq!(latest_entry(&entries).unwrap().instant, entry_at(120).instant);
    }

    #[test]
    fn test_next_feeding_due() {
        assert_eq!(next_feeding_due(&[], FeedInterval::default()), None);

        let entries = vec![entry_at(0), entry_at(90)];
        assert_eq!(
            next_feeding_due(&entries, FeedInterval::default()),
            Some(entry_at(90).instant + Duration::hours(3))
        );
        assert_eq!(
            next_feeding_due(&entries, FeedInterval::new_opt(1).unwrap()),
            Some(entry_at(90).instant + Duration::hours(1))
        );
    }
}
