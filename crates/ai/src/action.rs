//! Units of behavior and the weighted edges that chain them.
use std::fmt;

use bot_world::ObjectGuid;
use strum::{AsRefStr, Display};

use crate::event::Event;
use crate::named::ContextObject;
use crate::values::Values;

/// Weighted edge to another action, by name.
#[derive(Clone, Debug, PartialEq)]
pub struct NextAction {
    name: String,
    relevance: f32,
}

impl NextAction {
    pub fn new(name: impl Into<String>, relevance: f32) -> Self {
        Self {
            name: name.into(),
            relevance,
        }
    }

    /// Edge with zero weight; the pushing context decides the relevance.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, 0.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relevance(&self) -> f32 {
        self.relevance
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.name, self.relevance)
    }
}

/// Ordered list of [`NextAction`] edges.
///
/// Merging concatenates without deduplication. The same name may appear
/// twice with different weights; the queue resolves that later.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NextActions(Vec<NextAction>);

impl NextActions {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Convenience constructor from `(name, relevance)` pairs.
    pub fn of(pairs: &[(&str, f32)]) -> Self {
        pairs
            .iter()
            .map(|(name, relevance)| NextAction::new(*name, *relevance))
            .collect()
    }

    pub fn push(&mut self, action: NextAction) {
        self.0.push(action);
    }

    /// `self` followed by `other`.
    pub fn merge(mut self, other: NextActions) -> NextActions {
        self.0.extend(other.0);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NextAction> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&NextAction> {
        self.0.first()
    }

    pub fn as_slice(&self) -> &[NextAction] {
        &self.0
    }
}

impl FromIterator<NextAction> for NextActions {
    fn from_iter<I: IntoIterator<Item = NextAction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<NextAction>> for NextActions {
    fn from(actions: Vec<NextAction>) -> Self {
        Self(actions)
    }
}

impl IntoIterator for NextActions {
    type Item = NextAction;
    type IntoIter = std::vec::IntoIter<NextAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NextActions {
    type Item = &'a NextAction;
    type IntoIter = std::slice::Iter<'a, NextAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Combat classification consulted by multipliers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ActionThreatType {
    #[default]
    None,
    Single,
    Aoe,
}

/// A unit of behavior.
///
/// Actions keep no state between calls beyond what they put in
/// [`Values`]. The three gates let the engine tell "cannot run now"
/// (`is_possible`), "pointless now" (`is_useful`) and "tried and failed"
/// (`execute` returning `false`) apart. Collaborator failures are mapped to
/// `false` inside the action; nothing here panics or returns errors.
pub trait Action: Send {
    fn name(&self) -> &str;

    fn execute(&mut self, _event: &Event, _values: &mut Values) -> bool {
        true
    }

    fn is_possible(&mut self, _values: &mut Values) -> bool {
        true
    }

    fn is_useful(&mut self, _values: &mut Values) -> bool {
        true
    }

    /// Actions to run first when this one cannot run yet.
    fn prerequisites(&self) -> NextActions {
        NextActions::new()
    }

    /// Actions to try instead when this one is impossible or fails.
    fn alternatives(&self) -> NextActions {
        NextActions::new()
    }

    /// Actions to queue after a successful execution.
    fn continuers(&self) -> NextActions {
        NextActions::new()
    }

    fn threat_type(&self) -> ActionThreatType {
        ActionThreatType::None
    }

    /// Name of the value holding this action's target.
    fn target_name(&self) -> &str {
        "self target"
    }

    fn target(&self, values: &mut Values) -> Option<ObjectGuid> {
        values
            .get::<Option<ObjectGuid>>(self.target_name())
            .flatten()
    }

    fn relevance(&self) -> f32 {
        0.0
    }

    fn make_verbose(&mut self) {}
}

impl ContextObject for dyn Action {}

/// An action name plus the edges a strategy wired to it.
///
/// The node's own edges come first; the action's intrinsic edges are
/// appended when the engine asks for them.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionNode {
    name: String,
    prerequisites: NextActions,
    alternatives: NextActions,
    continuers: NextActions,
}

impl ActionNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prerequisites: NextActions::new(),
            alternatives: NextActions::new(),
            continuers: NextActions::new(),
        }
    }

    pub fn with_prerequisites(mut self, actions: NextActions) -> Self {
        self.prerequisites = actions;
        self
    }

    pub fn with_alternatives(mut self, actions: NextActions) -> Self {
        self.alternatives = actions;
        self
    }

    pub fn with_continuers(mut self, actions: NextActions) -> Self {
        self.continuers = actions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prerequisites(&self, action: &dyn Action) -> NextActions {
        self.prerequisites.clone().merge(action.prerequisites())
    }

    pub fn alternatives(&self, action: &dyn Action) -> NextActions {
        self.alternatives.clone().merge(action.alternatives())
    }

    pub fn continuers(&self, action: &dyn Action) -> NextActions {
        self.continuers.clone().merge(action.continuers())
    }
}

/// A pending proposal to run an action.
#[derive(Clone, Debug)]
pub struct ActionBasket {
    node: ActionNode,
    relevance: f32,
    skip_prerequisites: bool,
    event: Event,
    created_ms: u64,
}

impl ActionBasket {
    pub fn new(
        node: ActionNode,
        relevance: f32,
        skip_prerequisites: bool,
        event: Event,
        created_ms: u64,
    ) -> Self {
        Self {
            node,
            relevance,
            skip_prerequisites,
            event,
            created_ms,
        }
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn node(&self) -> &ActionNode {
        &self.node
    }

    pub fn relevance(&self) -> f32 {
        self.relevance
    }

    pub fn set_relevance(&mut self, relevance: f32) {
        self.relevance = relevance;
    }

    pub fn amend_relevance(&mut self, factor: f32) {
        self.relevance *= factor;
    }

    pub fn skip_prerequisites(&self) -> bool {
        self.skip_prerequisites
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn created_ms(&self) -> u64 {
        self.created_ms
    }

    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_ms) >= ttl_ms
    }

    pub fn into_parts(self) -> (ActionNode, f32, bool, Event) {
        (self.node, self.relevance, self.skip_prerequisites, self.event)
    }
}
