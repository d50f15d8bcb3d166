//! Decision engine for game bots.
//!
//! A bot owns an [`AiObjectContext`] holding every named strategy, action,
//! trigger and value it can use, and one [`Engine`] per [`BotState`]. Each
//! tick the active engine polls its triggers, queues the actions they
//! propose, and executes the most relevant action that is useful and
//! possible, falling back along prerequisite and alternative edges.
//!
//! # Modules
//!
//! - [`named`]: memoizing name-to-object registries
//! - [`value`] / [`values`]: cached, lazily computed facts about the world
//! - [`action`] / [`trigger`] / [`strategy`]: the behavior vocabulary
//! - [`queue`] / [`engine`]: the decision loop
//! - [`bot`]: per-bot root with combat, non-combat and dead engines

pub mod action;
pub mod bot;
pub mod config;
pub mod context;
pub mod custom;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod external;
pub mod interval;
pub mod multiplier;
pub mod named;
pub mod queue;
pub mod strategy;
pub mod trigger;
pub mod value;
pub mod values;

pub use action::{Action, ActionBasket, ActionNode, ActionThreatType, NextAction, NextActions};
pub use bot::{BotAi, BotState};
pub use config::AiConfig;
pub use context::{ActionContext, AiObjectContext, StrategyContext, TriggerContext};
pub use custom::CustomStrategy;
pub use engine::{ActionExecutionListener, ActionExecutionListeners, ActionResult, Engine};
pub use env::{BotEnv, MemoryStrategyStore, StrategyStore};
pub use error::{AiError, Result};
pub use event::{Event, Packet};
pub use external::ExternalEventHelper;
pub use interval::{CheckInterval, RateGate};
pub use multiplier::{Multiplier, PassiveMultiplier};
pub use named::{ContextObject, NamedObjectContext, NamedObjectContextList, NamedObjectFactory};
pub use queue::Queue;
pub use strategy::{Strategy, StrategyType};
pub use trigger::{ExternalTrigger, Trigger, TriggerNode};
pub use value::{
    CalculatedValue, LogCalculatedValue, ManualSetValue, MemoryCalculatedValue, Value, ValueCodec,
};
pub use values::{UntypedValue, ValueContext, ValueRegistry, Values};
