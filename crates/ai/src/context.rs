//! Per-bot aggregate of every named registry.
use std::collections::BTreeSet;

use crate::action::Action;
use crate::custom::CustomStrategy;
use crate::env::BotEnv;
use crate::named::{NamedObjectContext, NamedObjectContextList};
use crate::strategy::Strategy;
use crate::trigger::Trigger;
use crate::values::{ValueContext, Values};

pub type StrategyContext = NamedObjectContext<dyn Strategy>;
pub type ActionContext = NamedObjectContext<dyn Action>;
pub type TriggerContext = NamedObjectContext<dyn Trigger>;

/// Strategies, actions, triggers and values of one bot.
///
/// Each kind is a [`NamedObjectContextList`]: the built-in context first,
/// then any extension contexts in the order they were added.
pub struct AiObjectContext {
    pub(crate) strategies: NamedObjectContextList<dyn Strategy>,
    pub(crate) actions: NamedObjectContextList<dyn Action>,
    pub(crate) triggers: NamedObjectContextList<dyn Trigger>,
    pub(crate) values: Values,
}

impl AiObjectContext {
    /// A context that knows only the built-in `custom::<name>` strategy.
    pub fn new(env: BotEnv) -> Self {
        let mut builtin = StrategyContext::new();
        builtin.add_qualified(CustomStrategy::BASE_NAME, |env, qualifier| {
            Box::new(CustomStrategy::new(env, qualifier.unwrap_or_default()))
        });

        let mut strategies = NamedObjectContextList::new();
        strategies.add(builtin);

        Self {
            strategies,
            actions: NamedObjectContextList::new(),
            triggers: NamedObjectContextList::new(),
            values: Values::new(env),
        }
    }

    pub fn with_strategies(mut self, context: StrategyContext) -> Self {
        self.strategies.add(context);
        self
    }

    pub fn with_actions(mut self, context: ActionContext) -> Self {
        self.actions.add(context);
        self
    }

    pub fn with_triggers(mut self, context: TriggerContext) -> Self {
        self.triggers.add(context);
        self
    }

    pub fn with_values(mut self, context: ValueContext) -> Self {
        self.values.add_context(context);
        self
    }

    pub fn env(&self) -> &BotEnv {
        self.values.env()
    }

    pub fn now_ms(&self) -> u64 {
        self.values.env().now_ms()
    }

    pub fn strategy(&mut self, name: &str) -> Option<&mut (dyn Strategy + 'static)> {
        self.strategies.get(name, self.values.env())
    }

    /// Mutually exclusive alternatives to `name`.
    pub fn sibling_strategies(&self, name: &str) -> BTreeSet<String> {
        self.strategies.siblings(name)
    }

    pub fn supported_strategies(&self) -> BTreeSet<String> {
        self.strategies.supports()
    }

    pub fn action(&mut self, name: &str) -> Option<&mut (dyn Action + 'static)> {
        self.actions.get(name, self.values.env())
    }

    pub fn supported_actions(&self) -> BTreeSet<String> {
        self.actions.supports()
    }

    pub fn trigger(&mut self, name: &str) -> Option<&mut (dyn Trigger + 'static)> {
        self.triggers.get(name, self.values.env())
    }

    pub fn supported_triggers(&self) -> BTreeSet<String> {
        self.triggers.supports()
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Values {
        &mut self.values
    }

    pub fn get_value<T: Clone + Send + 'static>(&mut self, name: &str) -> Option<T> {
        self.values.get(name)
    }

    pub fn set_value<T: Clone + Send + 'static>(&mut self, name: &str, value: T) -> bool {
        self.values.set(name, value)
    }

    pub fn supported_values(&self) -> BTreeSet<String> {
        self.values.supports()
    }

    pub fn update(&mut self) {
        self.strategies.update();
        self.triggers.update();
        self.actions.update();
        self.values.update_all();
    }

    pub fn reset(&mut self) {
        self.strategies.reset();
        self.triggers.reset();
        self.actions.reset();
        self.values.reset_all();
    }

    /// `{name=text}|` for each materialized, readable value.
    pub fn format_values(&self) -> String {
        self.values
            .format_all()
            .into_iter()
            .map(|(name, text)| format!("{{{name}={text}}}"))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// `name>data` rows for every materialized value that can be persisted.
    pub fn save(&self) -> Vec<String> {
        self.values.save()
    }

    /// Apply rows produced by [`save`](Self::save).
    pub fn load<S: AsRef<str>>(&mut self, rows: &[S]) {
        self.values.load(rows);
    }
}
