use anyhow::anyhow;
use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// The struct used for storing a single logged event, either a feeding or a
/// diaper change. Only the moment is recorded. Everything shown next to an
/// entry later (day buckets, gaps, counts) is derived from `instant` again on
/// every read.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct LogEntryEntity {
    pub id: Arc<str>,
    pub instant: DateTime<Utc>,
}

impl LogEntryEntity {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string().into(),
            instant,
        }
    }

    /// First characters of the id, enough to refer to an entry by hand.
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    pub fn with_id(self, id: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            ..self
        }
    }
}

/// Days on which the vitamin checkmark is set. Keyed by the local calendar
/// day, so "today" follows the machine's timezone.
pub type VitaminFlags = BTreeMap<NaiveDate, bool>;

/// How many hours the user expects between feedings. Only whole hours from 1
/// to 4 are meaningful, anything else found on disk is replaced with the
/// default of 3.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(try_from = "u8", into = "u8")]
pub struct FeedInterval(u8);

impl FeedInterval {
    pub fn new_opt(hours: u8) -> Option<Self> {
        if (1..=4).contains(&hours) {
            Some(Self(hours))
        } else {
            None
        }
    }

    pub fn hours(&self) -> u8 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::hours(self.0 as i64)
    }
}

impl Default for FeedInterval {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for FeedInterval {
    type Error = String;

    fn try_from(hours: u8) -> Result<Self, Self::Error> {
        FeedInterval::new_opt(hours)
            .ok_or_else(|| format!("feeding interval must be 1 to 4 hours, got {hours}"))
    }
}

impl From<FeedInterval> for u8 {
    fn from(value: FeedInterval) -> Self {
        value.0
    }
}

impl Display for FeedInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.0)
    }
}

impl FromStr for FeedInterval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hours: u8 = s.trim().trim_end_matches('h').parse()?;
        FeedInterval::new_opt(hours)
            .ok_or_else(|| anyhow!("Invalid value {hours} should be in range [1, 4]"))
    }
}
