use std::{
    collections::HashSet,
    fmt::Display,
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use clap::ValueEnum;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::entities::{FeedInterval, LogEntryEntity, VitaminFlags};

const VITAMINS_FILE: &str = "vitamins.json";
const INTERVAL_FILE: &str = "interval.json";

/// The two entry logs. Each one lives in its own file and nothing is shared
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogSlot {
    Feedings,
    Diapers,
}

impl LogSlot {
    pub fn file_name(&self) -> &'static str {
        match self {
            LogSlot::Feedings => "feedings.json",
            LogSlot::Diapers => "diapers.json",
        }
    }

    /// Word used next to counts, like "3 feedings" or "1 diaper change".
    pub fn noun(&self, count: usize) -> &'static str {
        match (self, count) {
            (LogSlot::Feedings, 1) => "feeding",
            (LogSlot::Feedings, _) => "feedings",
            (LogSlot::Diapers, 1) => "diaper change",
            (LogSlot::Diapers, _) => "diaper changes",
        }
    }
}

impl Display for LogSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogSlot::Feedings => write!(f, "feedings"),
            LogSlot::Diapers => write!(f, "diapers"),
        }
    }
}

/// Interface for abstracting storage of the persisted slots.
pub trait SlotStorage {
    /// Reads the entries of a log. A missing file and unusable content both
    /// come back as an empty log, only real io failures surface as errors.
    fn load_log(&self, slot: LogSlot) -> impl Future<Output = Result<Vec<LogEntryEntity>>> + Send;

    /// Overwrites the log with the given entries.
    fn save_log(
        &self,
        slot: LogSlot,
        entries: &[LogEntryEntity],
    ) -> impl Future<Output = Result<()>> + Send;

    fn load_vitamin_flags(&self) -> impl Future<Output = Result<VitaminFlags>> + Send;

    fn save_vitamin_flags(&self, flags: &VitaminFlags) -> impl Future<Output = Result<()>> + Send;

    fn load_interval(&self) -> impl Future<Output = Result<FeedInterval>> + Send;

    fn save_interval(&self, interval: FeedInterval) -> impl Future<Output = Result<()>> + Send;
}

/// The main realization of [SlotStorage]. Every slot is one json file inside
/// `slot_dir`, rewritten whole on save. Shared and exclusive file locks keep
/// one invocation from reading a file another invocation is half way through
/// writing.
pub struct SlotStorageImpl {
    slot_dir: PathBuf,
}

impl SlotStorageImpl {
    pub fn new(slot_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&slot_dir)?;

        Ok(Self { slot_dir })
    }

    async fn read_slot(&self, file_name: &str) -> Result<Option<String>> {
        async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
            debug!("Reading {path:?}");
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut raw = String::new();
            let result = file.read_to_string(&mut raw).await;
            file.unlock_async().await?;
            result?;

            Ok(raw)
        }

        match extract(&self.slot_dir.join(file_name)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) => {
                if e.kind() == ErrorKind::NotFound {
                    Ok(None)
                } else {
                    Err(e)?
                }
            }
        }
    }

    async fn write_slot(&self, file_name: &str, payload: Vec<u8>) -> Result<()> {
        let path = self.slot_dir.join(file_name);
        debug!("Writing {path:?}");
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::write_with_file(&mut file, &payload).await;
        file.unlock_async().await?;
        result
    }

    async fn write_with_file(file: &mut File, payload: &[u8]) -> Result<()> {
        file.write_all(payload).await?;
        file.flush().await?;
        Ok(())
    }
}

impl SlotStorage for SlotStorageImpl {
    async fn load_log(&self, slot: LogSlot) -> Result<Vec<LogEntryEntity>> {
        let entries = match self.read_slot(slot.file_name()).await? {
            Some(raw) => decode_log(slot.file_name(), &raw),
            None => vec![],
        };
        Ok(entries)
    }

    async fn save_log(&self, slot: LogSlot, entries: &[LogEntryEntity]) -> Result<()> {
        self.write_slot(slot.file_name(), serde_json::to_vec(entries)?)
            .await
    }

    async fn load_vitamin_flags(&self) -> Result<VitaminFlags> {
        let flags = match self.read_slot(VITAMINS_FILE).await? {
            Some(raw) => decode_vitamin_flags(&raw),
            None => VitaminFlags::new(),
        };
        Ok(flags)
    }

    async fn save_vitamin_flags(&self, flags: &VitaminFlags) -> Result<()> {
        self.write_slot(VITAMINS_FILE, serde_json::to_vec(flags)?)
            .await
    }

    async fn load_interval(&self) -> Result<FeedInterval> {
        let interval = match self.read_slot(INTERVAL_FILE).await? {
            Some(raw) => decode_interval(&raw),
            None => FeedInterval::default(),
        };
        Ok(interval)
    }

    async fn save_interval(&self, interval: FeedInterval) -> Result<()> {
        self.write_slot(INTERVAL_FILE, serde_json::to_vec(&interval)?)
            .await
    }
}

/// Turns the raw content of a log slot into entries. The top level has to be
/// a json array or the whole log starts over empty. Inside the array every
/// element stands alone, one with a missing or mistyped field is dropped
/// without taking the rest of the log with it. An id that already appeared
/// earlier in the array is dropped as well.
fn decode_log(file_name: &str, raw: &str) -> Vec<LogEntryEntity> {
    let values = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Content of {file_name} is not a json array, starting empty: {e}");
            return vec![];
        }
    };

    let mut entries = Vec::with_capacity(values.len());
    let mut seen_ids = HashSet::new();
    for value in values {
        match serde_json::from_value::<LogEntryEntity>(value) {
            Ok(entry) => {
                if seen_ids.insert(entry.id.clone()) {
                    entries.push(entry);
                } else {
                    warn!("Dropping entry with repeated id {} in {file_name}", entry.id);
                }
            }
            Err(e) => {
                // ignore illegal values. Might happen if the file was edited by hand
                warn!("Dropping malformed entry in {file_name}: {e}");
            }
        }
    }

    entries
}

fn decode_vitamin_flags(raw: &str) -> VitaminFlags {
    match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Content of {VITAMINS_FILE} is not a date to bool map, starting empty: {e}");
            VitaminFlags::new()
        }
    }
}

fn decode_interval(raw: &str) -> FeedInterval {
    match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Content of {INTERVAL_FILE} is not an interval from 1 to 4, using the default: {e}");
            FeedInterval::default()
        }
    }
}
