//! Process-level configuration.
use std::env;
use std::path::PathBuf;

use bot_ai::AiConfig;
use travel_graph::TravelConfig;

/// Configuration of the whole bot host.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Root for bot state and the travel graph.
    pub data_dir: PathBuf,
    /// `EnvFilter` directive string.
    pub log_filter: String,
    /// Also write logs to a daily file in this directory.
    pub log_dir: Option<PathBuf>,
    /// Command buffer of the graph maintenance worker.
    pub maintenance_buffer: usize,
    /// Server tick length.
    pub tick_ms: u64,
    /// Bots that get a full update per tick; the rest run minimal.
    pub full_updates_per_tick: usize,
    pub ai: AiConfig,
    pub travel: TravelConfig,
}

impl RuntimeConfig {
    pub const DEFAULT_LOG_FILTER: &'static str = "info";
    pub const DEFAULT_MAINTENANCE_BUFFER: usize = 32;
    pub const DEFAULT_TICK_MS: u64 = 50;
    pub const DEFAULT_FULL_UPDATES_PER_TICK: usize = 50;

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_filter: Self::DEFAULT_LOG_FILTER.to_string(),
            log_dir: None,
            maintenance_buffer: Self::DEFAULT_MAINTENANCE_BUFFER,
            tick_ms: Self::DEFAULT_TICK_MS,
            full_updates_per_tick: Self::DEFAULT_FULL_UPDATES_PER_TICK,
            ai: AiConfig::new(),
            travel: TravelConfig::new(),
        }
    }

    /// Construct configuration from process environment variables, after
    /// loading `.env` if one exists.
    ///
    /// Environment variables:
    /// - `BOT_DATA_DIR` - Data root (default: platform data dir, else `./data`)
    /// - `RUST_LOG` - Log filter (default: info)
    /// - `BOT_LOG_DIR` - Directory for a daily log file (default: none)
    /// - `BOT_MAINTENANCE_BUFFER` - Maintenance command buffer (default: 32)
    /// - `BOT_TICK_MS` - Tick length in milliseconds (default: 50)
    /// - `BOT_FULL_UPDATES_PER_TICK` - Full bot updates per tick (default: 50)
    ///
    /// `BOT_AI_*` and `TRAVEL_*` variables configure the engine and the
    /// travel graph.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let data_dir = env::var_os("BOT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let mut config = Self::new(data_dir);

        if let Ok(filter) = env::var("RUST_LOG")
            && !filter.trim().is_empty()
        {
            config.log_filter = filter;
        }
        config.log_dir = env::var_os("BOT_LOG_DIR").map(PathBuf::from);
        if let Some(buffer) = read_env::<usize>("BOT_MAINTENANCE_BUFFER") {
            config.maintenance_buffer = buffer.max(1);
        }
        if let Some(tick) = read_env::<u64>("BOT_TICK_MS") {
            config.tick_ms = tick.max(1);
        }
        if let Some(updates) = read_env::<usize>("BOT_FULL_UPDATES_PER_TICK") {
            config.full_updates_per_tick = updates;
        }
        config.ai = AiConfig::from_env();
        config.travel = TravelConfig::from_env();

        config
    }

    pub fn bot_state_dir(&self) -> PathBuf {
        self.data_dir.join("bots")
    }

    pub fn travel_dir(&self) -> PathBuf {
        self.data_dir.join("travel")
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "playerbots")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_layout_hangs_off_data_dir() {
        let config = RuntimeConfig::new("/srv/bots");
        assert_eq!(config.bot_state_dir(), PathBuf::from("/srv/bots/bots"));
        assert_eq!(config.travel_dir(), PathBuf::from("/srv/bots/travel"));
        assert_eq!(config.log_filter, "info");
    }
}
