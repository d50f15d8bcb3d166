//! Condition detectors that propose actions when they fire.
use bot_world::ObjectGuid;

use crate::action::NextActions;
use crate::event::{Event, Packet};
use crate::interval::RateGate;
use crate::named::ContextObject;
use crate::values::Values;

/// A rate-limited condition check.
///
/// The engine only calls [`check`](Trigger::check) after
/// [`need_check`](Trigger::need_check) lets it through, so a trigger that
/// exposes a [`RateGate`] is evaluated at most once per interval.
pub trait Trigger: Send {
    fn name(&self) -> &str;

    fn is_active(&mut self, _values: &mut Values) -> bool {
        false
    }

    /// An event named after the trigger when active, `None` otherwise.
    fn check(&mut self, values: &mut Values) -> Option<Event> {
        if self.is_active(values) {
            Some(Event::new(self.name()))
        } else {
            None
        }
    }

    /// Chat or command input routed straight to this trigger.
    fn external_event(&mut self, _param: &str, _owner: Option<ObjectGuid>) {}

    /// Packet input routed straight to this trigger.
    fn external_packet(&mut self, _packet: &Packet, _owner: Option<ObjectGuid>) {}

    /// Handlers the trigger itself contributes, appended after the node's.
    fn handlers(&self) -> NextActions {
        NextActions::new()
    }

    fn reset(&mut self) {}

    fn target_name(&self) -> &str {
        "self target"
    }

    fn target(&self, values: &mut Values) -> Option<ObjectGuid> {
        values
            .get::<Option<ObjectGuid>>(self.target_name())
            .flatten()
    }

    /// The trigger's check-interval gate. `None` means every tick.
    fn rate_gate(&mut self) -> Option<&mut RateGate> {
        None
    }

    fn need_check(&mut self, now_ms: u64) -> bool {
        match self.rate_gate() {
            Some(gate) => gate.try_pass(now_ms),
            None => true,
        }
    }

    /// `need_check` followed by `check` when allowed.
    fn poll(&mut self, values: &mut Values) -> Option<Event> {
        let now = values.env().now_ms();
        if !self.need_check(now) {
            return None;
        }
        self.check(values)
    }
}

impl ContextObject for dyn Trigger {
    fn reset(&mut self) {
        Trigger::reset(self);
    }
}

/// A trigger name wired to handler edges by a strategy.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerNode {
    name: String,
    handlers: NextActions,
}

impl TriggerNode {
    pub fn new(name: impl Into<String>, handlers: NextActions) -> Self {
        Self {
            name: name.into(),
            handlers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node handlers followed by the trigger's own.
    pub fn handlers(&self, trigger: &dyn Trigger) -> NextActions {
        self.handlers.clone().merge(trigger.handlers())
    }

    /// Relevance of the first wired handler, `-1.0` when there is none.
    pub fn first_relevance(&self) -> f32 {
        self.handlers.first().map_or(-1.0, |action| action.relevance())
    }
}

/// Trigger that fires for an externally delivered command or packet.
///
/// Chat commands, whisper shortcuts and packet handlers are all this shape:
/// input arrives out of band, the next tick turns it into an event. Only
/// the latest delivery is kept; a newer command replaces one not yet run.
#[derive(Debug)]
pub struct ExternalTrigger {
    name: String,
    pending: Option<Event>,
}

impl ExternalTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Trigger for ExternalTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&mut self, _values: &mut Values) -> bool {
        self.pending.is_some()
    }

    fn check(&mut self, _values: &mut Values) -> Option<Event> {
        self.pending.take()
    }

    fn external_event(&mut self, param: &str, owner: Option<ObjectGuid>) {
        self.pending = Some(Event::with_param(self.name.clone(), param).with_owner(owner));
    }

    fn external_packet(&mut self, packet: &Packet, owner: Option<ObjectGuid>) {
        self.pending = Some(
            Event::new(self.name.clone())
                .with_packet(packet)
                .with_owner(owner),
        );
    }

    fn reset(&mut self) {
        self.pending = None;
    }
}
