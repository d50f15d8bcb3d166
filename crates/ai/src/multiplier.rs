//! Relevance multipliers applied to every useful action before it runs.
use crate::action::Action;

/// Scales the relevance of a candidate action. `0.0` vetoes it.
pub trait Multiplier: Send + Sync {
    fn name(&self) -> &str;

    fn value(&self, action: &dyn Action) -> f32;
}

/// Pauses a bot: everything is vetoed except a small set of control
/// actions and anything whose name mentions following or staying.
#[derive(Clone, Debug)]
pub struct PassiveMultiplier {
    allowed_actions: Vec<String>,
    allowed_parts: Vec<String>,
}

impl PassiveMultiplier {
    pub const ALLOWED_ACTIONS: [&'static str; 4] = ["co", "nc", "reset botAI", "check mount state"];
    pub const ALLOWED_PARTS: [&'static str; 3] = ["follow", "stay", "chat shortcut"];

    pub fn new() -> Self {
        Self {
            allowed_actions: Self::ALLOWED_ACTIONS.iter().map(|s| s.to_string()).collect(),
            allowed_parts: Self::ALLOWED_PARTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Allow one more exact action name.
    pub fn allow(mut self, name: impl Into<String>) -> Self {
        self.allowed_actions.push(name.into());
        self
    }

    pub fn allows(&self, name: &str) -> bool {
        self.allowed_actions.iter().any(|allowed| allowed == name)
            || self.allowed_parts.iter().any(|part| name.contains(part.as_str()))
    }
}

impl Default for PassiveMultiplier {
    fn default() -> Self {
        Self::new()
    }
}

impl Multiplier for PassiveMultiplier {
    fn name(&self) -> &str {
        "passive"
    }

    fn value(&self, action: &dyn Action) -> f32 {
        if self.allows(action.name()) { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Action for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn passive_allows_control_and_movement() {
        let passive = PassiveMultiplier::new();
        assert_eq!(passive.value(&Named("co")), 1.0);
        assert_eq!(passive.value(&Named("follow master")), 1.0);
        assert_eq!(passive.value(&Named("stay line")), 1.0);
        assert_eq!(passive.value(&Named("melee")), 0.0);
        assert_eq!(passive.value(&Named("c")), 0.0);

        let passive = passive.allow("melee");
        assert_eq!(passive.value(&Named("melee")), 1.0);
    }
}
