//! Owns every bot and drives them once per server tick.
use std::collections::BTreeMap;

use bot_ai::BotAi;
use bot_world::ObjectGuid;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::store::{BotRecord, BotStateStore};

/// Round-robin driver of many bots.
///
/// Each tick every bot sees the elapsed time, but only a rotating window of
/// `full_updates_per_tick` bots gets a full decision; the others run in
/// minimal mode. The window moves on every tick so no bot starves.
pub struct BotManager {
    bots: BTreeMap<ObjectGuid, BotAi>,
    full_updates_per_tick: usize,
    cursor: usize,
}

/// Outcome of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub updated: usize,
    pub full: usize,
    pub acted: usize,
}

impl BotManager {
    pub fn new(full_updates_per_tick: usize) -> Self {
        Self {
            bots: BTreeMap::new(),
            full_updates_per_tick,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    /// Register `bot`, replacing any bot with the same guid.
    pub fn add_bot(&mut self, bot: BotAi) -> Option<BotAi> {
        let guid = bot.bot();
        debug!(target: "runtime::manager", bot = %guid, "bot added");
        self.bots.insert(guid, bot)
    }

    pub fn remove_bot(&mut self, guid: ObjectGuid) -> Option<BotAi> {
        self.bots.remove(&guid)
    }

    pub fn bot(&self, guid: ObjectGuid) -> Option<&BotAi> {
        self.bots.get(&guid)
    }

    pub fn bot_mut(&mut self, guid: ObjectGuid) -> Option<&mut BotAi> {
        self.bots.get_mut(&guid)
    }

    pub fn guids(&self) -> Vec<ObjectGuid> {
        self.bots.keys().copied().collect()
    }

    /// Advance every bot by `elapsed_ms`.
    pub fn update(&mut self, elapsed_ms: u64) -> TickReport {
        let count = self.bots.len();
        let mut report = TickReport {
            updated: count,
            ..TickReport::default()
        };
        if count == 0 {
            return report;
        }

        let start = self.cursor % count;
        let full = self.full_updates_per_tick.min(count);
        for (index, bot) in self.bots.values_mut().enumerate() {
            let offset = (index + count - start) % count;
            let minimal = offset >= full;
            if !minimal {
                report.full += 1;
            }
            if bot.update_ai(elapsed_ms, minimal) {
                report.acted += 1;
            }
        }
        self.cursor = (start + full) % count;

        trace!(
            target: "runtime::manager",
            bots = count,
            full = report.full,
            acted = report.acted,
            "tick"
        );
        report
    }

    /// Restore a bot's values and strategies from `store` if a record exists.
    pub fn restore(&mut self, store: &dyn BotStateStore, guid: ObjectGuid) -> Result<bool> {
        let Some(bot) = self.bots.get_mut(&guid) else {
            return Ok(false);
        };
        let Some(record) = store.load(guid)? else {
            return Ok(false);
        };
        record.apply(bot);
        debug!(target: "runtime::manager", bot = %guid, "bot state restored");
        Ok(true)
    }

    /// Persist every bot. A failing bot is logged and skipped; the count of
    /// saved bots is returned.
    pub fn save_all(&self, store: &dyn BotStateStore) -> usize {
        let mut saved = 0;
        for (guid, bot) in &self.bots {
            match store.save(*guid, &BotRecord::capture(bot)) {
                Ok(()) => saved += 1,
                Err(error) => warn!(target: "runtime::manager", bot = %guid, %error, "failed to save bot"),
            }
        }
        saved
    }
}
