use std::collections::BTreeMap;
use std::sync::RwLock;

use bot_world::ObjectGuid;

use super::{BotRecord, BotStateStore};
use crate::error::{Result, RuntimeError};

/// In-memory store for tests and throwaway hosts.
#[derive(Default)]
pub struct MemoryStateStore {
    records: RwLock<BTreeMap<ObjectGuid, BotRecord>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BotStateStore for MemoryStateStore {
    fn save(&self, bot: ObjectGuid, record: &BotRecord) -> Result<()> {
        self.records
            .write()
            .map_err(|_| RuntimeError::LockPoisoned)?
            .insert(bot, record.clone());
        Ok(())
    }

    fn load(&self, bot: ObjectGuid) -> Result<Option<BotRecord>> {
        Ok(self
            .records
            .read()
            .map_err(|_| RuntimeError::LockPoisoned)?
            .get(&bot)
            .cloned())
    }

    fn delete(&self, bot: ObjectGuid) -> Result<()> {
        self.records
            .write()
            .map_err(|_| RuntimeError::LockPoisoned)?
            .remove(&bot);
        Ok(())
    }

    fn list_bots(&self) -> Result<Vec<ObjectGuid>> {
        Ok(self
            .records
            .read()
            .map_err(|_| RuntimeError::LockPoisoned)?
            .keys()
            .copied()
            .collect())
    }
}
