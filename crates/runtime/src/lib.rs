//! Composition root of the bot host.
//!
//! Wires the decision engine and the travel graph to process-level
//! concerns: configuration, logging, the per-tick bot loop, persistence of
//! bot state, and background graph maintenance.

pub mod config;
pub mod error;
pub mod logging;
pub mod maintenance;
pub mod manager;
pub mod store;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use logging::init_logging;
pub use maintenance::{Command, MaintenanceHandle, MaintenanceWorker, spawn_maintenance};
pub use manager::{BotManager, TickReport};
pub use store::{BotRecord, BotStateStore, FileStateStore, MemoryStateStore, StrategyLists};
