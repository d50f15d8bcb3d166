//! Per-bot persistence of values and strategy lists.
//!
//! A record is exactly what the decision engine commits to: the `name>data`
//! rows of its persistable values and the strategy list of each engine.
//! Implementations only decide where the record lives.
mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use bot_ai::{BotAi, BotState};
use bot_world::ObjectGuid;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Strategy names per engine, keyed like the engines themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyLists {
    #[serde(rename = "co", default)]
    pub combat: Vec<String>,
    #[serde(rename = "nc", default)]
    pub non_combat: Vec<String>,
    #[serde(rename = "dead", default)]
    pub dead: Vec<String>,
}

impl StrategyLists {
    pub fn get(&self, state: BotState) -> &[String] {
        match state {
            BotState::Combat => &self.combat,
            BotState::NonCombat => &self.non_combat,
            BotState::Dead => &self.dead,
        }
    }

    pub fn set(&mut self, state: BotState, names: Vec<String>) {
        match state {
            BotState::Combat => self.combat = names,
            BotState::NonCombat => self.non_combat = names,
            BotState::Dead => self.dead = names,
        }
    }
}

/// Everything persisted for one bot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotRecord {
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub strategies: StrategyLists,
}

impl BotRecord {
    /// Snapshot `bot` for storage.
    pub fn capture(bot: &BotAi) -> Self {
        let mut strategies = StrategyLists::default();
        for (state, names) in bot.strategy_lists() {
            strategies.set(state, names);
        }
        Self {
            values: bot.context().save(),
            strategies,
        }
    }

    /// Restore values and replace every engine's strategies.
    pub fn apply(&self, bot: &mut BotAi) {
        bot.context_mut().load(&self.values);
        for state in [BotState::Combat, BotState::NonCombat, BotState::Dead] {
            bot.set_strategies(state, self.strategies.get(state));
        }
    }
}

/// Where bot records live.
pub trait BotStateStore: Send + Sync {
    fn save(&self, bot: ObjectGuid, record: &BotRecord) -> Result<()>;

    fn load(&self, bot: ObjectGuid) -> Result<Option<BotRecord>>;

    fn delete(&self, bot: ObjectGuid) -> Result<()>;

    /// Every bot with a stored record, ascending.
    fn list_bots(&self) -> Result<Vec<ObjectGuid>>;
}
