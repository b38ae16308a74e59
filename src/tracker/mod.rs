//! The in-memory face of the application. [Tracker] holds everything the
//! slot files contain, hands out read views for the display code, and writes
//! a slot back right after each change to it. Derived values like gaps,
//! per day counts and the next feeding projection live in the submodules and
//! are recomputed from the logs on every read.

pub mod analysis;
pub mod day_grouping;
pub mod schedule;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::storage::{
    entities::{FeedInterval, LogEntryEntity, VitaminFlags},
    slot_storage::{LogSlot, SlotStorage},
};

/// Owner of the persisted state. Reads all four slots once on startup, then
/// every mutation goes through memory and straight back to the one slot it
/// touched.
pub struct Tracker<S: SlotStorage> {
    storage: S,
    feedings: Vec<LogEntryEntity>,
    diapers: Vec<LogEntryEntity>,
    vitamin_flags: VitaminFlags,
    interval: FeedInterval,
}

impl<S: SlotStorage> Tracker<S> {
    pub async fn load(storage: S) -> Result<Self> {
        let feedings = storage.load_log(LogSlot::Feedings).await?;
        let diapers = storage.load_log(LogSlot::Diapers).await?;
        let vitamin_flags = storage.load_vitamin_flags().await?;
        let interval = storage.load_interval().await?;

        debug!(
            "Loaded {} feedings, {} diaper changes, {} vitamin days",
            feedings.len(),
            diapers.len(),
            vitamin_flags.len()
        );

        Ok(Self {
            storage,
            feedings,
            diapers,
            vitamin_flags,
            interval,
        })
    }

    pub fn entries(&self, slot: LogSlot) -> &[LogEntryEntity] {
        match slot {
            LogSlot::Feedings => &self.feedings,
            LogSlot::Diapers => &self.diapers,
        }
    }

    pub fn feedings(&self) -> &[LogEntryEntity] {
        &self.feedings
    }

    pub fn diapers(&self) -> &[LogEntryEntity] {
        &self.diapers
    }

    pub fn interval(&self) -> FeedInterval {
        self.interval
    }

    pub fn vitamin_flags(&self) -> &VitaminFlags {
        &self.vitamin_flags
    }

    /// Whether the vitamin checkmark is set for a day. Days that were never
    /// touched count as not given.
    pub fn vitamin_given(&self, day: NaiveDate) -> bool {
        self.vitamin_flags.get(&day).copied().unwrap_or(false)
    }

    /// Appends a freshly stamped entry to a log and writes the log back.
    pub async fn log_event(
        &mut self,
        slot: LogSlot,
        instant: DateTime<Utc>,
    ) -> Result<LogEntryEntity> {
        let entry = LogEntryEntity::new(instant);
        self.entries_mut(slot).push(entry.clone());
        self.flush_log(slot).await?;

        info!("Logged {} entry {} at {}", slot, entry.id, entry.instant);
        Ok(entry)
    }

    /// Removes the entry whose id starts with `id`. Nothing matching is fine
    /// and comes back as None, more than one match is an error so that a
    /// short prefix can never delete the wrong entry.
    pub async fn remove_entry(
        &mut self,
        slot: LogSlot,
        id: &str,
    ) -> Result<Option<LogEntryEntity>> {
        let matched = self
            .entries(slot)
            .iter()
            .filter(|e| e.id.starts_with(id))
            .count();
        if matched > 1 {
            bail!("Id {id} is ambiguous, {matched} {slot} entries start with it");
        }

        let entries = self.entries_mut(slot);
        let Some(position) = entries.iter().position(|e| e.id.starts_with(id)) else {
            return Ok(None);
        };
        let removed = entries.remove(position);
        self.flush_log(slot).await?;

        info!("Removed {} entry {}", slot, removed.id);
        Ok(Some(removed))
    }

    /// Drops every entry of a log. Returns how many went away.
    pub async fn clear_log(&mut self, slot: LogSlot) -> Result<usize> {
        let removed = self.entries(slot).len();
        self.entries_mut(slot).clear();
        self.flush_log(slot).await?;

        info!("Cleared {} {} entries", removed, slot);
        Ok(removed)
    }

    /// Flips the vitamin checkmark for a day and returns the new state. A day
    /// toggled off stays in the map as false, there is no automatic expiry.
    pub async fn toggle_vitamin(&mut self, day: NaiveDate) -> Result<bool> {
        let flag = self.vitamin_flags.entry(day).or_insert(false);
        *flag = !*flag;
        let given = *flag;
        self.storage.save_vitamin_flags(&self.vitamin_flags).await?;

        info!("Vitamin for {} set to {}", day, given);
        Ok(given)
    }

    pub async fn set_interval(&mut self, interval: FeedInterval) -> Result<()> {
        self.interval = interval;
        self.storage.save_interval(interval).await?;

        info!("Feeding interval set to {}", interval);
        Ok(())
    }

    fn entries_mut(&mut self, slot: LogSlot) -> &mut Vec<LogEntryEntity> {
        match slot {
            LogSlot::Feedings => &mut self.feedings,
            LogSlot::Diapers => &mut self.diapers,
        }
    }

    async fn flush_log(&self, slot: LogSlot) -> Result<()> {
        self.storage.save_log(slot, self.entries(slot)).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::{FeedInterval, LogEntryEntity},
            slot_storage::{LogSlot, SlotStorage, SlotStorageImpl},
        },
        utils::logging::TEST_LOGGING,
    };

    use super::Tracker;

    const TEST_DATE_TIME: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    );

    fn test_instant(minutes: i64) -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_DATE_TIME) + Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn test_every_mutation_lands_on_disk() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;

        let mut tracker = Tracker::load(SlotStorageImpl::new(dir.path().to_owned())?).await?;
        let logged = tracker.log_event(LogSlot::Feedings, test_instant(0)).await?;
        tracker.log_event(LogSlot::Diapers, test_instant(5)).await?;
        tracker
            .set_interval(FeedInterval::new_opt(2).unwrap())
            .await?;
        tracker.toggle_vitamin(TEST_DATE_TIME.date()).await?;

        // a second tracker over the same directory sees everything
        let reloaded = Tracker::load(SlotStorageImpl::new(dir.path().to_owned())?).await?;
        assert_eq!(reloaded.feedings(), &[logged]);
        assert_eq!(reloaded.diapers().len(), 1);
        assert_eq!(reloaded.interval(), FeedInterval::new_opt(2).unwrap());
        assert!(reloaded.vitamin_given(TEST_DATE_TIME.date()));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_accepts_a_unique_prefix() -> Result<()> {
        let dir = tempdir()?;
        let mut tracker = Tracker::load(SlotStorageImpl::new(dir.path().to_owned())?).await?;

        let keep = tracker.log_event(LogSlot::Feedings, test_instant(0)).await?;
        let target = tracker
            .log_event(LogSlot::Feedings, test_instant(30))
            .await?;

        let removed = tracker
            .remove_entry(LogSlot::Feedings, target.short_id())
            .await?;
        assert_eq!(removed, Some(target));
        assert_eq!(tracker.feedings(), &[keep]);

        assert_eq!(
            tracker.remove_entry(LogSlot::Feedings, "no such id").await?,
            None
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_refuses_an_ambiguous_prefix() -> Result<()> {
        let dir = tempdir()?;
        let storage = SlotStorageImpl::new(dir.path().to_owned())?;

        let entries = vec![
            LogEntryEntity::new(test_instant(0)).with_id("aab"),
            LogEntryEntity::new(test_instant(30)).with_id("aac"),
        ];
        storage.save_log(LogSlot::Feedings, &entries).await?;

        let mut tracker = Tracker::load(storage).await?;
        assert!(tracker.remove_entry(LogSlot::Feedings, "aa").await.is_err());
        // nothing was deleted by the failed attempt
        assert_eq!(tracker.feedings().len(), 2);

        assert!(
            tracker
                .remove_entry(LogSlot::Feedings, "aab")
                .await?
                .is_some()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_reports_how_many_entries_went_away() -> Result<()> {
        let dir = tempdir()?;
        let mut tracker = Tracker::load(SlotStorageImpl::new(dir.path().to_owned())?).await?;

        tracker.log_event(LogSlot::Diapers, test_instant(0)).await?;
        tracker.log_event(LogSlot::Diapers, test_instant(10)).await?;
        tracker.log_event(LogSlot::Feedings, test_instant(20)).await?;

        assert_eq!(tracker.clear_log(LogSlot::Diapers).await?, 2);
        assert_eq!(tracker.diapers(), &[]);
        // the other log is untouched
        assert_eq!(tracker.feedings().len(), 1);
        assert_eq!(tracker.clear_log(LogSlot::Diapers).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_vitamin_toggle_flips_and_keeps_the_day() -> Result<()> {
        let dir = tempdir()?;
        let mut tracker = Tracker::load(SlotStorageImpl::new(dir.path().to_owned())?).await?;
        let day = TEST_DATE_TIME.date();

        assert!(!tracker.vitamin_given(day));
        assert!(tracker.toggle_vitamin(day).await?);
        assert!(tracker.vitamin_given(day));
        assert!(!tracker.toggle_vitamin(day).await?);
        assert!(!tracker.vitamin_given(day));

        // the day stays in the map as an explicit false
        assert_eq!(tracker.vitamin_flags().get(&day), Some(&false));
        Ok(())
    }
}
