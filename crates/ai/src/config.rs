//! Engine tuning knobs.
use std::env;

/// Configuration shared by every engine of a bot.
#[derive(Clone, Debug, PartialEq)]
pub struct AiConfig {
    /// Baskets older than this are purged from the queue. `0` disables expiry.
    pub expire_action_time_ms: u64,
    /// Upper bound on queue pops per tick, multiplied by the queue length.
    pub iterations_per_tick: usize,
    /// How many times a tick may refill the queue with default actions
    /// and re-enter the decision loop before yielding.
    pub max_recursion_depth: u32,
    /// Delay a bot waits after acting before its next decision.
    pub react_delay_ms: u64,
    /// Emit every materialized value at trace level after each tick.
    pub log_values_per_tick: bool,
}

impl AiConfig {
    pub const DEFAULT_EXPIRE_ACTION_TIME_MS: u64 = 5_000;
    pub const DEFAULT_ITERATIONS_PER_TICK: usize = 10;
    pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 2;
    pub const DEFAULT_REACT_DELAY_MS: u64 = 100;

    pub const fn new() -> Self {
        Self {
            expire_action_time_ms: Self::DEFAULT_EXPIRE_ACTION_TIME_MS,
            iterations_per_tick: Self::DEFAULT_ITERATIONS_PER_TICK,
            max_recursion_depth: Self::DEFAULT_MAX_RECURSION_DEPTH,
            react_delay_ms: Self::DEFAULT_REACT_DELAY_MS,
            log_values_per_tick: false,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BOT_AI_EXPIRE_ACTION_MS` - Queue basket time-to-live (default: 5000)
    /// - `BOT_AI_ITERATIONS_PER_TICK` - Pop budget per queued basket (default: 10)
    /// - `BOT_AI_MAX_RECURSION` - Default-action refills per tick (default: 2)
    /// - `BOT_AI_REACT_DELAY_MS` - Delay after a decision (default: 100)
    /// - `BOT_AI_LOG_VALUES` - Trace all values after each tick (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(ttl) = read_env::<u64>("BOT_AI_EXPIRE_ACTION_MS") {
            config.expire_action_time_ms = ttl;
        }
        if let Some(iterations) = read_env::<usize>("BOT_AI_ITERATIONS_PER_TICK") {
            config.iterations_per_tick = iterations.max(1);
        }
        if let Some(depth) = read_env::<u32>("BOT_AI_MAX_RECURSION") {
            config.max_recursion_depth = depth;
        }
        if let Some(delay) = read_env::<u64>("BOT_AI_REACT_DELAY_MS") {
            config.react_delay_ms = delay;
        }
        if let Some(enable) = read_env::<bool>("BOT_AI_LOG_VALUES") {
            config.log_values_per_tick = enable;
        }

        config
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
