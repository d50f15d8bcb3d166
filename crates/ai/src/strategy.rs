//! Named bundles of triggers, multipliers and default actions.
use std::sync::OnceLock;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::action::{ActionNode, NextActions};
use crate::env::BotEnv;
use crate::multiplier::Multiplier;
use crate::named::{ContextObject, NamedObjectFactory};
use crate::trigger::TriggerNode;

pub const ACTION_IDLE: f32 = 0.0;
pub const ACTION_DEFAULT: f32 = 5.0;
pub const ACTION_NORMAL: f32 = 10.0;
pub const ACTION_HIGH: f32 = 20.0;
pub const ACTION_MOVE: f32 = 30.0;
pub const ACTION_INTERRUPT: f32 = 40.0;
pub const ACTION_DISPEL: f32 = 50.0;
pub const ACTION_RAID: f32 = 60.0;
pub const ACTION_LIGHT_HEAL: f32 = 10.0;
pub const ACTION_MEDIUM_HEAL: f32 = 20.0;
pub const ACTION_CRITICAL_HEAL: f32 = 30.0;
pub const ACTION_EMERGENCY: f32 = 90.0;

bitflags! {
    /// Capability tags used to ask "does this engine run a healer strategy".
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StrategyType: u32 {
        const GENERIC = 0;
        const COMBAT = 1;
        const NONCOMBAT = 1 << 1;
        const TANK = 1 << 2;
        const DPS = 1 << 3;
        const HEAL = 1 << 4;
        const RANGED = 1 << 5;
        const MELEE = 1 << 6;
    }
}

/// A named behavior bundle.
///
/// Engines derive their trigger and multiplier lists from the union of
/// their active strategies, so new behavior is added by registering a new
/// strategy rather than touching the engine.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    fn strategy_type(&self) -> StrategyType {
        StrategyType::GENERIC
    }

    fn init_triggers(&mut self, _triggers: &mut Vec<TriggerNode>) {}

    fn init_multipliers(&mut self, _multipliers: &mut Vec<Box<dyn Multiplier>>) {}

    /// Actions queued when nothing else is pending.
    fn default_actions(&self) -> NextActions {
        NextActions::new()
    }

    /// Edge wiring for `name`, if this strategy has an opinion.
    fn action_node(&self, name: &str, env: &BotEnv) -> Option<ActionNode> {
        default_action_nodes().create(name, env).map(|node| *node)
    }

    fn update(&mut self) {}

    fn reset(&mut self) {}
}

impl ContextObject for dyn Strategy {
    fn update(&mut self) {
        Strategy::update(self);
    }

    fn reset(&mut self) {
        Strategy::reset(self);
    }
}

/// Node wiring every strategy inherits: consumable fallbacks and a few
/// movement alternatives.
pub fn default_action_nodes() -> &'static NamedObjectFactory<ActionNode> {
    static NODES: OnceLock<NamedObjectFactory<ActionNode>> = OnceLock::new();
    NODES.get_or_init(build_default_action_nodes)
}

fn build_default_action_nodes() -> NamedObjectFactory<ActionNode> {
    let mut factory = NamedObjectFactory::new();
    factory
        .add("melee", |_| Box::new(ActionNode::new("melee")))
        .add("healthstone", |_| {
            Box::new(
                ActionNode::new("healthstone")
                    .with_alternatives(NextActions::of(&[("healing potion", 0.0)])),
            )
        })
        .add("be near", |_| {
            Box::new(
                ActionNode::new("be near").with_alternatives(NextActions::of(&[("follow", 0.0)])),
            )
        })
        .add("attack anything", |_| Box::new(ActionNode::new("attack anything")))
        .add("move random", |_| {
            Box::new(
                ActionNode::new("move random")
                    .with_alternatives(NextActions::of(&[("stay line", 0.0)])),
            )
        })
        .add("move to loot", |_| Box::new(ActionNode::new("move to loot")))
        .add("food", |_| Box::new(ActionNode::new("food")))
        .add("drink", |_| Box::new(ActionNode::new("drink")))
        .add("mana potion", |_| {
            Box::new(
                ActionNode::new("mana potion").with_alternatives(NextActions::of(&[("drink", 0.0)])),
            )
        })
        .add("healing potion", |_| {
            Box::new(
                ActionNode::new("healing potion")
                    .with_alternatives(NextActions::of(&[("food", 0.0)])),
            )
        })
        .add("flee", |_| Box::new(ActionNode::new("flee")));
    factory
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bot_world::{EmptyWorld, ObjectGuid};

    use super::*;

    struct Plain;

    impl Strategy for Plain {
        fn name(&self) -> &str {
            "plain"
        }
    }

    #[test]
    fn strategies_inherit_default_nodes() {
        let env = BotEnv::new(ObjectGuid::new(1), Arc::new(EmptyWorld));
        let node = Plain.action_node("healing potion", &env).expect("default node");
        assert_eq!(
            node,
            ActionNode::new("healing potion").with_alternatives(NextActions::of(&[("food", 0.0)]))
        );
        assert!(Plain.action_node("dance", &env).is_none());
    }

    #[test]
    fn type_flags_combine() {
        let kind = StrategyType::COMBAT | StrategyType::HEAL;
        assert!(kind.contains(StrategyType::HEAL));
        assert!(!kind.contains(StrategyType::TANK));
        assert!(kind.contains(StrategyType::GENERIC));
    }
}
