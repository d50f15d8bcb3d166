//! The per-state decision loop.
//!
//! One [`Engine`] exists per bot state. Each tick it lets its triggers
//! propose actions, then drains its [`Queue`] in relevance order until an
//! action executes, the queue empties, or the iteration budget runs out.
use std::collections::{BTreeSet, HashMap};

use strum::{AsRefStr, Display};
use tracing::{debug, trace, warn};

use crate::action::{Action, ActionBasket, ActionNode, NextAction, NextActions};
use crate::context::AiObjectContext;
use crate::event::Event;
use crate::multiplier::Multiplier;
use crate::named::qualify;
use crate::queue::Queue;
use crate::strategy::StrategyType;
use crate::trigger::TriggerNode;

/// Baskets below this relevance are ignored by a minimal tick.
pub const MINIMAL_RELEVANCE: f32 = 100.0;

const PREREQUISITE_BUMP: f32 = 0.02;
const PUSH_AGAIN_BUMP: f32 = 0.01;
const ALTERNATIVE_BUMP: f32 = 0.03;

/// Outcome of [`Engine::execute_action`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ActionResult {
    Unknown,
    Ok,
    Impossible,
    Useless,
    Failed,
}

/// Observer around every action execution.
pub trait ActionExecutionListener: Send {
    fn name(&self) -> &str;

    /// `false` skips execution; the action then counts as not executed.
    fn before(&mut self, _action: &dyn Action, _event: &Event) -> bool {
        true
    }

    /// `false` suppresses execution but reports the action as executed.
    fn allow_execution(&mut self, _action: &dyn Action, _event: &Event) -> bool {
        true
    }

    fn override_result(&mut self, _action: &dyn Action, executed: bool, _event: &Event) -> bool {
        executed
    }

    fn after(&mut self, _action: &dyn Action, _executed: bool, _event: &Event) {}
}

/// Ordered chain of [`ActionExecutionListener`]s.
#[derive(Default)]
pub struct ActionExecutionListeners {
    listeners: Vec<Box<dyn ActionExecutionListener>>,
}

impl ActionExecutionListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Box<dyn ActionExecutionListener>) {
        self.listeners.push(listener);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.name() != name);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Every listener is consulted even after one refuses.
    pub fn before(&mut self, action: &dyn Action, event: &Event) -> bool {
        self.listeners
            .iter_mut()
            .fold(true, |allowed, listener| listener.before(action, event) && allowed)
    }

    pub fn allow_execution(&mut self, action: &dyn Action, event: &Event) -> bool {
        self.listeners.iter_mut().fold(true, |allowed, listener| {
            listener.allow_execution(action, event) && allowed
        })
    }

    pub fn override_result(&mut self, action: &dyn Action, executed: bool, event: &Event) -> bool {
        self.listeners.iter_mut().fold(executed, |result, listener| {
            listener.override_result(action, result, event)
        })
    }

    pub fn after(&mut self, action: &dyn Action, executed: bool, event: &Event) {
        for listener in &mut self.listeners {
            listener.after(action, executed, event);
        }
    }
}

enum Resolution {
    Executed,
    Requeued,
    Failed,
    Impossible,
    Useless,
}

/// Decision loop bound to a set of active strategies.
pub struct Engine {
    label: String,
    queue: Queue,
    triggers: Vec<TriggerNode>,
    multipliers: Vec<Box<dyn Multiplier>>,
    strategies: BTreeSet<String>,
    listeners: ActionExecutionListeners,
    last_relevance: f32,
    last_action: Option<String>,
    test_mode: bool,
}

impl Engine {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            queue: Queue::new(),
            triggers: Vec::new(),
            multipliers: Vec::new(),
            strategies: BTreeSet::new(),
            listeners: ActionExecutionListeners::new(),
            last_relevance: 0.0,
            last_action: None,
            test_mode: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check every trigger every tick, ignoring rate gates.
    pub fn set_test_mode(&mut self, enabled: bool) {
        self.test_mode = enabled;
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn trigger_nodes(&self) -> &[TriggerNode] {
        &self.triggers
    }

    pub fn multiplier_count(&self) -> usize {
        self.multipliers.len()
    }

    pub fn listeners_mut(&mut self) -> &mut ActionExecutionListeners {
        &mut self.listeners
    }

    pub fn last_relevance(&self) -> f32 {
        self.last_relevance
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    /// Drop queued baskets, trigger nodes and multipliers.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.triggers.clear();
        self.multipliers.clear();
    }

    /// Rebuild triggers and multipliers from the active strategies and
    /// queue their default actions.
    pub fn init(&mut self, ctx: &mut AiObjectContext) {
        let wired: BTreeSet<String> = self.triggers.iter().map(|node| node.name().to_string()).collect();
        self.reset();

        let mut defaults = Vec::new();
        for name in &self.strategies {
            let Some(strategy) = ctx.strategies.get(name, ctx.values.env()) else {
                continue;
            };

            strategy.init_multipliers(&mut self.multipliers);

            let mut nodes = Vec::new();
            strategy.init_triggers(&mut nodes);
            for node in nodes {
                match self.triggers.iter_mut().find(|n| n.name() == node.name()) {
                    Some(existing) => *existing = node,
                    None => self.triggers.push(node),
                }
            }

            defaults.push(strategy.default_actions());
        }

        // Input delivered while nothing listened is stale.
        for node in self.triggers.iter().filter(|node| !wired.contains(node.name())) {
            if let Some(trigger) = ctx.triggers.get(node.name(), ctx.values.env()) {
                trigger.reset();
            }
        }

        let empty = Event::default();
        for actions in defaults {
            self.multiply_and_push(ctx, actions, 0.0, false, &empty, "default");
        }

        debug!(
            target: "ai::engine",
            engine = %self.label,
            strategies = self.strategies.len(),
            triggers = self.triggers.len(),
            multipliers = self.multipliers.len(),
            "initialized"
        );
    }

    /// Run one decision tick. Returns whether an action executed.
    ///
    /// `depth` counts default-action refills within the current tick; a
    /// minimal tick only considers baskets of at least
    /// [`MINIMAL_RELEVANCE`].
    pub fn do_next_action(&mut self, ctx: &mut AiObjectContext, depth: u32, minimal: bool) -> bool {
        let config = ctx.env().config.clone();
        trace!(target: "ai::engine", engine = %self.label, depth, queued = self.queue.len(), "tick");

        if config.log_values_per_tick {
            self.log_values(ctx);
        }
        ctx.update();
        self.process_triggers(ctx, minimal);

        let per_basket = if minimal { 2 } else { config.iterations_per_tick };
        let budget = self.queue.len().saturating_mul(per_basket).max(1);
        let mut iterations = 0;
        let mut executed = false;
        let mut drained = false;

        while iterations < budget {
            iterations += 1;

            let Some(peeked) = self.queue.peek() else {
                drained = true;
                break;
            };
            if minimal && peeked.relevance() < MINIMAL_RELEVANCE {
                break;
            }
            let Some(basket) = self.queue.pop() else {
                drained = true;
                break;
            };

            let (node, relevance, skip_prerequisites, event) = basket.into_parts();
            let name = node.name().to_string();
            let Some((slot, mut action)) = ctx.actions.take(&name, ctx.values.env()) else {
                debug!(target: "ai::engine", engine = %self.label, action = %name, "unknown action");
                continue;
            };

            let resolution = self.resolve(
                ctx,
                &node,
                action.as_mut(),
                relevance,
                skip_prerequisites,
                &event,
            );
            ctx.actions.restore(slot, &name, action);

            match resolution {
                Resolution::Executed => {
                    debug!(target: "ai::engine", engine = %self.label, action = %name, relevance, "executed");
                    self.last_action = Some(name);
                    executed = true;
                    break;
                }
                Resolution::Requeued => {
                    trace!(target: "ai::engine", engine = %self.label, action = %name, "waiting on prerequisites");
                }
                Resolution::Failed => {
                    debug!(target: "ai::engine", engine = %self.label, action = %name, "failed");
                }
                Resolution::Impossible => {
                    trace!(target: "ai::engine", engine = %self.label, action = %name, "impossible");
                }
                Resolution::Useless => {
                    trace!(target: "ai::engine", engine = %self.label, action = %name, "useless");
                }
            }
        }

        if !drained && self.queue.is_empty() && !executed {
            drained = true;
        }

        if drained {
            self.last_relevance = 0.0;
            self.push_default_actions(ctx);
            if !self.queue.is_empty() && !minimal {
                if depth < config.max_recursion_depth {
                    return self.do_next_action(ctx, depth + 1, minimal);
                }
                trace!(target: "ai::engine", engine = %self.label, depth, "recursion bound reached");
            }
        }

        if !executed {
            trace!(target: "ai::engine", engine = %self.label, "no actions executed");
        }

        let now = ctx.now_ms();
        self.queue.remove_expired(now, config.expire_action_time_ms);
        executed
    }

    fn resolve(
        &mut self,
        ctx: &mut AiObjectContext,
        node: &ActionNode,
        action: &mut dyn Action,
        relevance: f32,
        skip_prerequisites: bool,
        event: &Event,
    ) -> Resolution {
        if !action.is_useful(&mut ctx.values) {
            self.last_relevance = relevance;
            return Resolution::Useless;
        }

        let mut relevance = relevance;
        for multiplier in &self.multipliers {
            relevance *= multiplier.value(&*action);
            if relevance == 0.0 {
                trace!(
                    target: "ai::engine",
                    engine = %self.label,
                    multiplier = multiplier.name(),
                    action = action.name(),
                    "vetoed"
                );
                break;
            }
        }

        if relevance == 0.0 || !action.is_possible(&mut ctx.values) {
            let alternatives = node.alternatives(&*action);
            self.multiply_and_push(ctx, alternatives, relevance + ALTERNATIVE_BUMP, false, event, "alt");
            return Resolution::Impossible;
        }

        if !skip_prerequisites {
            let prerequisites = node.prerequisites(&*action);
            if self.multiply_and_push(
                ctx,
                prerequisites,
                relevance + PREREQUISITE_BUMP,
                false,
                event,
                "prereq",
            ) {
                self.push_again(ctx, node.name(), relevance + PUSH_AGAIN_BUMP, event);
                return Resolution::Requeued;
            }
        }

        if self.listen_and_execute(action, event, ctx) {
            let continuers = node.continuers(&*action);
            self.multiply_and_push(ctx, continuers, 0.0, false, event, "cont");
            self.last_relevance = relevance;
            Resolution::Executed
        } else {
            let alternatives = node.alternatives(&*action);
            self.multiply_and_push(ctx, alternatives, relevance + ALTERNATIVE_BUMP, false, event, "alt");
            Resolution::Failed
        }
    }

    fn listen_and_execute(
        &mut self,
        action: &mut dyn Action,
        event: &Event,
        ctx: &mut AiObjectContext,
    ) -> bool {
        let mut executed = false;
        if self.listeners.before(&*action, event) {
            executed = if self.listeners.allow_execution(&*action, event) {
                action.execute(event, &mut ctx.values)
            } else {
                true
            };
        }

        let executed = self.listeners.override_result(&*action, executed, event);
        self.listeners.after(&*action, executed, event);
        executed
    }

    fn process_triggers(&mut self, ctx: &mut AiObjectContext, minimal: bool) {
        let now = ctx.now_ms();
        let mut fires: HashMap<String, Event> = HashMap::new();

        for node in &self.triggers {
            if fires.contains_key(node.name()) {
                continue;
            }
            let Some((slot, mut trigger)) = ctx.triggers.take(node.name(), ctx.values.env()) else {
                continue;
            };

            let mut fired = None;
            if self.test_mode || trigger.need_check(now) {
                if !(minimal && node.first_relevance() < MINIMAL_RELEVANCE) {
                    fired = trigger.check(&mut ctx.values);
                }
            }
            ctx.triggers.restore(slot, node.name(), trigger);

            if let Some(event) = fired {
                debug!(target: "ai::trigger", engine = %self.label, trigger = node.name(), "fired");
                fires.insert(node.name().to_string(), event);
            }
        }

        let mut pending = Vec::new();
        for node in &self.triggers {
            let Some(event) = fires.remove(node.name()) else {
                continue;
            };
            let handlers = match ctx.triggers.get(node.name(), ctx.values.env()) {
                Some(trigger) => node.handlers(&*trigger),
                None => continue,
            };
            pending.push((handlers, event));
        }

        for (handlers, event) in pending {
            self.multiply_and_push(ctx, handlers, 0.0, false, &event, "trigger");
        }

        for node in &self.triggers {
            if let Some(trigger) = ctx.triggers.get(node.name(), ctx.values.env()) {
                trigger.reset();
            }
        }
    }

    fn multiply_and_push(
        &mut self,
        ctx: &mut AiObjectContext,
        actions: NextActions,
        force_relevance: f32,
        skip_prerequisites: bool,
        event: &Event,
        push_type: &str,
    ) -> bool {
        let now = ctx.now_ms();
        let mut pushed = false;

        for next in actions {
            let relevance = if force_relevance > 0.0 {
                force_relevance
            } else {
                next.relevance()
            };
            if relevance <= 0.0 {
                continue;
            }

            let node = self.create_action_node(ctx, next.name());
            trace!(
                target: "ai::engine",
                engine = %self.label,
                action = next.name(),
                relevance,
                push_type,
                "push"
            );
            self.queue.push(ActionBasket::new(
                node,
                relevance,
                skip_prerequisites,
                event.clone(),
                now,
            ));
            pushed = true;
        }

        pushed
    }

    fn push_again(&mut self, ctx: &mut AiObjectContext, name: &str, relevance: f32, event: &Event) {
        let again = NextActions::from(vec![NextAction::new(name, relevance)]);
        self.multiply_and_push(ctx, again, relevance, true, event, "again");
    }

    fn push_default_actions(&mut self, ctx: &mut AiObjectContext) {
        let mut defaults = Vec::new();
        for name in &self.strategies {
            if let Some(strategy) = ctx.strategies.get(name, ctx.values.env()) {
                defaults.push(strategy.default_actions());
            }
        }

        let empty = Event::default();
        for actions in defaults {
            self.multiply_and_push(ctx, actions, 0.0, false, &empty, "default");
        }
    }

    /// The first active strategy with wiring for `name` wins; otherwise a
    /// bare node.
    fn create_action_node(&self, ctx: &mut AiObjectContext, name: &str) -> ActionNode {
        for strategy_name in &self.strategies {
            let Some(strategy) = ctx.strategies.get(strategy_name, ctx.values.env()) else {
                continue;
            };
            if let Some(node) = strategy.action_node(name, ctx.values.env()) {
                return node;
            }
        }
        ActionNode::new(name)
    }

    /// Run `name` immediately, bypassing the queue.
    ///
    /// A non-empty `qualifier` looks up `name::qualifier` instead.
    pub fn execute_action(
        &mut self,
        ctx: &mut AiObjectContext,
        name: &str,
        event: &Event,
        qualifier: Option<&str>,
    ) -> ActionResult {
        let lookup = match qualifier {
            Some(qualifier) if !qualifier.is_empty() => qualify(name, qualifier),
            _ => name.to_string(),
        };

        let Some((slot, mut action)) = ctx.actions.take(&lookup, ctx.values.env()) else {
            return ActionResult::Unknown;
        };

        let result = self.execute_now(ctx, action.as_mut(), event);
        ctx.actions.restore(slot, &lookup, action);

        debug!(target: "ai::engine", engine = %self.label, action = %lookup, %result, "direct execution");
        result
    }

    fn execute_now(
        &mut self,
        ctx: &mut AiObjectContext,
        action: &mut dyn Action,
        event: &Event,
    ) -> ActionResult {
        if !action.is_possible(&mut ctx.values) {
            return ActionResult::Impossible;
        }
        if !action.is_useful(&mut ctx.values) {
            return ActionResult::Useless;
        }

        action.make_verbose();
        let executed = self.listen_and_execute(action, event, ctx);
        let continuers = action.continuers();
        self.multiply_and_push(ctx, continuers, 0.0, false, event, "default");

        if executed {
            self.last_action = Some(action.name().to_string());
            ActionResult::Ok
        } else {
            ActionResult::Failed
        }
    }

    /// Activate `name`, evicting its siblings. Unknown names are ignored.
    pub fn add_strategy(&mut self, ctx: &mut AiObjectContext, name: &str) -> bool {
        let added = self.activate(ctx, name);
        self.init(ctx);
        added
    }

    /// Activate several strategies with a single re-initialization.
    pub fn add_strategies(&mut self, ctx: &mut AiObjectContext, names: &[&str]) {
        for name in names {
            self.activate(ctx, name);
        }
        self.init(ctx);
    }

    fn activate(&mut self, ctx: &mut AiObjectContext, name: &str) -> bool {
        self.strategies.remove(name);

        let Some(strategy) = ctx.strategies.get(name, ctx.values.env()) else {
            warn!(target: "ai::engine", engine = %self.label, strategy = name, "unknown strategy");
            return false;
        };
        let strategy_name = strategy.name().to_string();

        for sibling in ctx.strategies.siblings(name) {
            self.strategies.remove(&sibling);
        }

        debug!(target: "ai::engine", engine = %self.label, strategy = %strategy_name, "strategy added");
        self.strategies.insert(strategy_name);
        true
    }

    pub fn remove_strategy(&mut self, ctx: &mut AiObjectContext, name: &str) -> bool {
        if !self.strategies.remove(name) {
            return false;
        }
        debug!(target: "ai::engine", engine = %self.label, strategy = name, "strategy removed");
        self.init(ctx);
        true
    }

    pub fn toggle_strategy(&mut self, ctx: &mut AiObjectContext, name: &str) {
        if !self.remove_strategy(ctx, name) {
            self.add_strategy(ctx, name);
        }
    }

    pub fn remove_all_strategies(&mut self, ctx: &mut AiObjectContext) {
        self.strategies.clear();
        self.init(ctx);
    }

    pub fn has_strategy(&self, name: &str) -> bool {
        self.strategies.contains(name)
    }

    /// Whether any active strategy carries one of the `kind` flags.
    pub fn contains_strategy(&self, ctx: &mut AiObjectContext, kind: StrategyType) -> bool {
        self.strategies.iter().any(|name| {
            ctx.strategies
                .get(name, ctx.values.env())
                .is_some_and(|strategy| strategy.strategy_type().intersects(kind))
        })
    }

    pub fn strategies(&self) -> Vec<String> {
        self.strategies.iter().cloned().collect()
    }

    /// `Strategies: a, b` in name order.
    pub fn list_strategies(&self) -> String {
        let names = self.strategies();
        format!("Strategies: {}", names.join(", "))
    }

    /// Apply a comma-separated change list: `+name` adds, `-name`
    /// removes, `~name` toggles and `?` returns the listing.
    pub fn change_strategy(&mut self, ctx: &mut AiObjectContext, changes: &str) -> Option<String> {
        let mut listing = None;
        for change in changes.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let mut chars = change.chars();
            let op = chars.next();
            let name = chars.as_str().trim();
            match op {
                Some('+') => {
                    self.add_strategy(ctx, name);
                }
                Some('-') => {
                    self.remove_strategy(ctx, name);
                }
                Some('~') => self.toggle_strategy(ctx, name),
                Some('?') => listing = Some(self.list_strategies()),
                _ => warn!(target: "ai::engine", engine = %self.label, change, "unrecognized strategy change"),
            }
        }
        listing
    }

    /// Trace every materialized value.
    pub fn log_values(&self, ctx: &AiObjectContext) {
        trace!(target: "ai::values", engine = %self.label, values = %ctx.format_values(), "values");
    }
}
