//! Strategies defined by persisted action lines.
//!
//! An action line wires one trigger to a comma separated list of actions:
//!
//! ```text
//! low health>healing potion!60,flee
//! ```
//!
//! Relevance after `!` is optional and defaults to [`ACTION_NORMAL`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::action::{NextAction, NextActions};
use crate::env::{BotEnv, StrategyStore};
use crate::error::{AiError, Result};
use crate::named::qualify;
use crate::strategy::{ACTION_NORMAL, Strategy};
use crate::trigger::TriggerNode;

/// Owner id whose lines every bot falls back to.
pub const SHARED_OWNER: u64 = 0;

/// Parse `name` or `name!relevance`.
pub fn parse_next_action(text: &str) -> Result<NextAction> {
    let tokens: Vec<&str> = text.split('!').map(str::trim).collect();
    match tokens.as_slice() {
        [name] if !name.is_empty() => Ok(NextAction::new(*name, ACTION_NORMAL)),
        [name, relevance] if !name.is_empty() => {
            let relevance = relevance.parse().map_err(|_| AiError::InvalidRelevance {
                action: text.to_string(),
                value: (*relevance).to_string(),
            })?;
            Ok(NextAction::new(*name, relevance))
        }
        _ => Err(AiError::InvalidNextAction(text.to_string())),
    }
}

/// Parse a comma separated action list, dropping invalid entries.
pub fn parse_next_actions(text: &str) -> NextActions {
    text.split(',')
        .filter_map(|entry| match parse_next_action(entry) {
            Ok(action) => Some(action),
            Err(error) => {
                warn!(target: "ai::custom", %error, "dropping invalid action");
                None
            }
        })
        .collect()
}

/// Parse `trigger>actions`.
pub fn parse_action_line(line: &str) -> Result<TriggerNode> {
    let tokens: Vec<&str> = line.split('>').collect();
    match tokens.as_slice() {
        [trigger, actions] if !trigger.trim().is_empty() => {
            Ok(TriggerNode::new(trigger.trim(), parse_next_actions(actions)))
        }
        _ => Err(AiError::InvalidActionLine(line.to_string())),
    }
}

/// Strategy registered as `custom::<name>` whose triggers come from the
/// [`StrategyStore`].
pub struct CustomStrategy {
    name: String,
    qualifier: String,
    owner: u64,
    store: Arc<dyn StrategyStore>,
    action_lines: Vec<String>,
}

impl CustomStrategy {
    pub const BASE_NAME: &'static str = "custom";

    pub fn new(env: &BotEnv, qualifier: &str) -> Self {
        Self {
            name: qualify(Self::BASE_NAME, qualifier),
            qualifier: qualifier.to_string(),
            owner: env.bot.raw(),
            store: Arc::clone(&env.store),
            action_lines: Vec::new(),
        }
    }

    pub fn action_lines(&self) -> &[String] {
        &self.action_lines
    }

    fn load_action_lines(&mut self) {
        self.action_lines = self.store.action_lines(self.owner, &self.qualifier);
        if self.action_lines.is_empty() {
            self.action_lines = self.store.action_lines(SHARED_OWNER, &self.qualifier);
        }
        debug!(
            target: "ai::custom",
            strategy = %self.name,
            lines = self.action_lines.len(),
            "loaded action lines"
        );
    }
}

impl Strategy for CustomStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn init_triggers(&mut self, triggers: &mut Vec<TriggerNode>) {
        if self.action_lines.is_empty() {
            self.load_action_lines();
        }

        for line in &self.action_lines {
            match parse_action_line(line) {
                Ok(node) => triggers.push(node),
                Err(error) => warn!(target: "ai::custom", strategy = %self.name, %error, "dropping action line"),
            }
        }
    }

    fn reset(&mut self) {
        self.action_lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use bot_world::{EmptyWorld, ObjectGuid};

    use super::*;
    use crate::env::MemoryStrategyStore;

    #[test]
    fn next_action_parsing() {
        assert_eq!(parse_next_action("flee"), Ok(NextAction::new("flee", ACTION_NORMAL)));
        assert_eq!(parse_next_action("heal!25.5"), Ok(NextAction::new("heal", 25.5)));
        assert!(matches!(parse_next_action("!3"), Err(AiError::InvalidNextAction(_))));
        assert!(matches!(parse_next_action("a!b!c"), Err(AiError::InvalidNextAction(_))));
        assert!(matches!(
            parse_next_action("heal!fast"),
            Err(AiError::InvalidRelevance { .. })
        ));
    }

    #[test]
    fn action_line_drops_bad_entries_only() {
        let node = parse_action_line("low health>healing potion!60,!x,flee").expect("valid line");
        assert_eq!(node.name(), "low health");
        assert_eq!(node.first_relevance(), 60.0);

        assert!(parse_action_line("no separator").is_err());
        assert!(parse_action_line("a>b>c").is_err());
    }

    #[test]
    fn lines_fall_back_to_shared_owner() {
        let store = Arc::new(MemoryStrategyStore::new());
        store.set_lines(
            SHARED_OWNER,
            "farm",
            vec!["no target>attack anything".into(), "broken".into()],
        );
        let env = BotEnv::new(ObjectGuid::new(9), Arc::new(EmptyWorld)).with_store(store.clone());

        let mut strategy = CustomStrategy::new(&env, "farm");
        assert_eq!(strategy.name(), "custom::farm");

        let mut triggers = Vec::new();
        strategy.init_triggers(&mut triggers);
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].name(), "no target");

        store.set_lines(9, "farm", vec!["enemy>melee!20".into()]);
        strategy.reset();
        let mut triggers = Vec::new();
        strategy.init_triggers(&mut triggers);
        assert_eq!(triggers[0].name(), "enemy");
    }
}
