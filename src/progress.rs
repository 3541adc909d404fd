use anyhow::Context as _;
use chrono::Utc;

use crate::cli::ProgressArgs;
use crate::formats::PersistedProgress;
use crate::storage::{JsonFileStorage, KeyValueStorage};

pub const PROGRESS_KEY: &str = "pageturn:progress";

/// Last committed reading position. Storage failures degrade to no-ops.
pub struct ProgressStore {
    storage: Box<dyn KeyValueStorage>,
}

impl ProgressStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn save(&mut self, volume: u32, page: u32) {
        if let Err(err) = self.try_save(volume, page) {
            tracing::warn!(volume, page, ?err, "could not persist reading progress");
        }
    }

    pub fn load(&self) -> Option<PersistedProgress> {
        match self.try_load() {
            Ok(progress) => progress,
            Err(err) => {
                tracing::warn!(?err, "could not read reading progress");
                None
            }
        }
    }

    fn try_save(&mut self, volume: u32, page: u32) -> anyhow::Result<()> {
        let record = PersistedProgress {
            volume,
            page,
            saved_at: Some(Utc::now()),
        };
        let json = serde_json::to_string(&record).context("serialize progress")?;
        self.storage
            .set(PROGRESS_KEY, &json)
            .context("write progress")?;
        tracing::debug!(volume, page, "saved reading progress");
        Ok(())
    }

    fn try_load(&self) -> anyhow::Result<Option<PersistedProgress>> {
        let Some(raw) = self.storage.get(PROGRESS_KEY).context("read progress")? else {
            return Ok(None);
        };
        let progress = serde_json::from_str(&raw).context("parse progress")?;
        Ok(Some(progress))
    }
}

/// Prints the saved reading position. Nothing is resumed automatically.
pub fn run(args: ProgressArgs) -> anyhow::Result<()> {
    let store = ProgressStore::new(Box::new(JsonFileStorage::new(&args.storage)));
    match store.load() {
        Some(progress) => println!("volume {} page {}", progress.volume, progress.page),
        None => println!("no saved progress"),
    }
    Ok(())
}
