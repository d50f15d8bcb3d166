//! Services injected into every bot.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use bot_world::{Clock, ObjectGuid, SystemClock, WorldOracle};

use crate::config::AiConfig;

/// Source of persisted custom-strategy action lines.
///
/// Lines are keyed by owner and strategy name; owner `0` holds the shared
/// defaults every bot falls back to.
pub trait StrategyStore: Send + Sync {
    fn action_lines(&self, owner: u64, name: &str) -> Vec<String>;
}

/// In-memory [`StrategyStore`].
#[derive(Default)]
pub struct MemoryStrategyStore {
    lines: RwLock<HashMap<(u64, String), Vec<String>>>,
}

impl MemoryStrategyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the lines stored for `(owner, name)`.
    pub fn set_lines(&self, owner: u64, name: &str, lines: Vec<String>) {
        let mut guard = self
            .lines
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert((owner, name.to_string()), lines);
    }
}

impl StrategyStore for MemoryStrategyStore {
    fn action_lines(&self, owner: u64, name: &str) -> Vec<String> {
        let guard = self
            .lines
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .get(&(owner, name.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Per-bot handle to the process-wide services.
///
/// Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct BotEnv {
    pub bot: ObjectGuid,
    pub clock: Arc<dyn Clock>,
    pub world: Arc<dyn WorldOracle>,
    pub store: Arc<dyn StrategyStore>,
    pub config: AiConfig,
}

impl BotEnv {
    pub fn new(bot: ObjectGuid, world: Arc<dyn WorldOracle>) -> Self {
        Self {
            bot,
            clock: Arc::new(SystemClock),
            world,
            store: Arc::new(MemoryStrategyStore::new()),
            config: AiConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn StrategyStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_config(mut self, config: AiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl fmt::Debug for BotEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotEnv")
            .field("bot", &self.bot)
            .field("now_ms", &self.clock.now_ms())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
