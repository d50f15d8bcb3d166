use std::fs;
use std::path::{Path, PathBuf};

use bot_world::ObjectGuid;
use tracing::debug;

use super::{BotRecord, BotStateStore};
use crate::error::Result;

/// One JSON file per bot.
///
/// # File Format
///
/// `bot_{guid}.json` holds a [`BotRecord`]: the value rows plus the
/// `co`, `nc` and `dead` strategy lists. Writes go through a temporary
/// file and a rename.
pub struct FileStateStore {
    base_dir: PathBuf,
}

impl FileStateStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn record_path(&self, bot: ObjectGuid) -> PathBuf {
        self.base_dir.join(format!("bot_{}.json", bot.raw()))
    }
}

impl BotStateStore for FileStateStore {
    fn save(&self, bot: ObjectGuid, record: &BotRecord) -> Result<()> {
        let path = self.record_path(bot);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(record)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        debug!(target: "runtime::store", bot = %bot, values = record.values.len(), "saved bot state");
        Ok(())
    }

    fn load(&self, bot: ObjectGuid) -> Result<Option<BotRecord>> {
        let path = self.record_path(bot);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let record = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    fn delete(&self, bot: ObjectGuid) -> Result<()> {
        let path = self.record_path(bot);
        if path.exists() {
            fs::remove_file(&path)?;
            debug!(target: "runtime::store", bot = %bot, "deleted bot state");
        }
        Ok(())
    }

    fn list_bots(&self) -> Result<Vec<ObjectGuid>> {
        let mut bots = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(raw) = filename
                    .strip_prefix("bot_")
                    .and_then(|s| s.strip_suffix(".json"))
                && let Ok(raw) = raw.parse::<u64>()
            {
                bots.push(ObjectGuid::new(raw));
            }
        }
        bots.sort_unstable();
        Ok(bots)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::store::StrategyLists;

    #[test]
    fn records_round_trip_as_json() -> Result<()> {
        let dir = TempDir::new()?;
        let store = FileStateStore::new(dir.path())?;
        let record = BotRecord {
            values: vec!["gold>125".to_string()],
            strategies: StrategyLists {
                combat: vec!["custom::pull".to_string()],
                ..StrategyLists::default()
            },
        };

        store.save(ObjectGuid::new(12), &record)?;
        assert_eq!(store.load(ObjectGuid::new(12))?, Some(record));
        assert_eq!(store.load(ObjectGuid::new(13))?, None);
        assert_eq!(store.list_bots()?, vec![ObjectGuid::new(12)]);

        let json = fs::read_to_string(dir.path().join("bot_12.json"))?;
        assert!(json.contains("\"co\""));

        store.delete(ObjectGuid::new(12))?;
        assert!(store.list_bots()?.is_empty());
        Ok(())
    }
}
