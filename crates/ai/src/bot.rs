//! One bot: its object context and an engine per state.
use std::collections::VecDeque;

use bot_world::ObjectGuid;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, info};

use crate::context::AiObjectContext;
use crate::engine::{ActionResult, Engine};
use crate::event::Event;
use crate::external::ExternalEventHelper;

/// Which engine drives the bot.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum BotState {
    #[strum(serialize = "co")]
    #[serde(rename = "co")]
    Combat,
    #[strum(serialize = "nc")]
    #[serde(rename = "nc")]
    NonCombat,
    #[strum(serialize = "dead")]
    #[serde(rename = "dead")]
    Dead,
}

impl BotState {
    const fn index(self) -> usize {
        match self {
            Self::Combat => 0,
            Self::NonCombat => 1,
            Self::Dead => 2,
        }
    }
}

struct PendingCommand {
    text: String,
    owner: Option<ObjectGuid>,
}

/// A bot's decision-making root.
///
/// Ticks are throttled by a next-check delay: after every decision the
/// bot waits at least the configured react delay before deciding again.
pub struct BotAi {
    ctx: AiObjectContext,
    engines: [Engine; 3],
    state: BotState,
    next_check_delay_ms: u64,
    commands: VecDeque<PendingCommand>,
}

impl BotAi {
    pub fn new(ctx: AiObjectContext) -> Self {
        Self {
            ctx,
            engines: [
                Engine::new(BotState::Combat.as_ref()),
                Engine::new(BotState::NonCombat.as_ref()),
                Engine::new(BotState::Dead.as_ref()),
            ],
            state: BotState::NonCombat,
            next_check_delay_ms: 0,
            commands: VecDeque::new(),
        }
    }

    pub fn bot(&self) -> ObjectGuid {
        self.ctx.env().bot
    }

    pub fn context(&self) -> &AiObjectContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AiObjectContext {
        &mut self.ctx
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn engine(&self, state: BotState) -> &Engine {
        &self.engines[state.index()]
    }

    /// Run `f` against the engine for `state` and this bot's context.
    pub fn with_engine<R>(
        &mut self,
        state: BotState,
        f: impl FnOnce(&mut Engine, &mut AiObjectContext) -> R,
    ) -> R {
        f(&mut self.engines[state.index()], &mut self.ctx)
    }

    pub fn next_check_delay_ms(&self) -> u64 {
        self.next_check_delay_ms
    }

    pub fn set_next_check_delay(&mut self, delay_ms: u64) {
        self.next_check_delay_ms = delay_ms;
    }

    pub fn increase_next_check_delay(&mut self, delay_ms: u64) {
        self.next_check_delay_ms = self.next_check_delay_ms.saturating_add(delay_ms);
    }

    pub fn can_update_ai(&self) -> bool {
        self.next_check_delay_ms == 0
    }

    /// Ensure at least the react delay passes before the next decision.
    pub fn yield_thread(&mut self, long_delay: bool) {
        let react = self.ctx.env().config.react_delay_ms;
        if self.next_check_delay_ms < react {
            self.next_check_delay_ms = if long_delay { react * 10 } else { react };
        }
    }

    /// Advance the bot by `elapsed_ms`. Returns whether an action executed.
    pub fn update_ai(&mut self, elapsed_ms: u64, minimal: bool) -> bool {
        self.next_check_delay_ms = self.next_check_delay_ms.saturating_sub(elapsed_ms);
        if !self.can_update_ai() {
            return false;
        }

        self.process_commands();
        let executed = self.do_next_action(minimal);
        self.yield_thread(false);
        executed
    }

    /// Switch engines if the world says the bot died or entered or left
    /// combat, then run one decision on the current engine.
    pub fn do_next_action(&mut self, minimal: bool) -> bool {
        if let Some(state) = self.observed_state() {
            self.change_engine(state);
        }
        let index = self.state.index();
        self.engines[index].do_next_action(&mut self.ctx, 0, minimal)
    }

    fn observed_state(&self) -> Option<BotState> {
        let env = self.ctx.env();
        let unit = env.world.unit(env.bot)?;
        Some(if !unit.alive {
            BotState::Dead
        } else if unit.in_combat {
            BotState::Combat
        } else {
            BotState::NonCombat
        })
    }

    /// Make `state` current, re-initializing its engine on a change.
    pub fn change_engine(&mut self, state: BotState) {
        if self.state == state {
            return;
        }
        debug!(target: "ai::engine", bot = %self.bot(), from = %self.state, to = %state, "changing engine");
        self.state = state;
        self.engines[state.index()].init(&mut self.ctx);
    }

    /// Queue a chat command for the next tick.
    ///
    /// `co`, `nc` and `dead` followed by a change list (`co +a,-b`) edit
    /// that engine's strategies at once and return its listing when asked
    /// with `?`.
    pub fn handle_command(&mut self, text: &str, owner: Option<ObjectGuid>) -> Option<String> {
        let text = text.trim();
        if let Some((prefix, changes)) = text.split_once(' ') {
            if let Ok(state) = prefix.parse::<BotState>() {
                return self.change_strategy(changes, state);
            }
        }

        self.commands.push_back(PendingCommand {
            text: text.to_string(),
            owner,
        });
        None
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            let mut helper = ExternalEventHelper::new(&mut self.ctx);
            if !helper.parse_chat_command(&command.text, command.owner) {
                debug!(target: "ai::trigger", bot = %self.bot(), command = %command.text, "ignored command");
            }
        }
    }

    pub fn execute_action(&mut self, name: &str, event: &Event) -> ActionResult {
        let index = self.state.index();
        self.engines[index].execute_action(&mut self.ctx, name, event, None)
    }

    pub fn change_strategy(&mut self, changes: &str, state: BotState) -> Option<String> {
        let index = state.index();
        self.engines[index].change_strategy(&mut self.ctx, changes)
    }

    pub fn has_strategy(&self, name: &str, state: BotState) -> bool {
        self.engine(state).has_strategy(name)
    }

    pub fn strategies(&self, state: BotState) -> Vec<String> {
        self.engine(state).strategies()
    }

    /// Replace the strategies of `state` wholesale.
    pub fn set_strategies<S: AsRef<str>>(&mut self, state: BotState, names: &[S]) {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        let engine = &mut self.engines[state.index()];
        engine.remove_all_strategies(&mut self.ctx);
        engine.add_strategies(&mut self.ctx, &names);
    }

    /// Forget every value and queued decision, keeping active strategies.
    pub fn reset(&mut self) {
        self.ctx.reset();
        self.commands.clear();
        self.next_check_delay_ms = 0;
        for engine in &mut self.engines {
            engine.init(&mut self.ctx);
        }
        info!(target: "ai::engine", bot = %self.bot(), "bot reset");
    }

    /// Strategy lists of every engine, for persistence.
    pub fn strategy_lists(&self) -> Vec<(BotState, Vec<String>)> {
        BotState::iter()
            .map(|state| (state, self.strategies(state)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bot_world::EmptyWorld;

    use super::*;
    use crate::env::BotEnv;

    fn bot() -> BotAi {
        let env = BotEnv::new(ObjectGuid::new(3), Arc::new(EmptyWorld));
        BotAi::new(AiObjectContext::new(env))
    }

    #[test]
    fn state_names() {
        assert_eq!(BotState::Combat.to_string(), "co");
        assert_eq!("dead".parse::<BotState>().ok(), Some(BotState::Dead));
        assert!("idle".parse::<BotState>().is_err());
    }

    #[test]
    fn react_delay_throttles_updates() {
        let mut bot = bot();
        let react = bot.context().env().config.react_delay_ms;

        bot.update_ai(0, false);
        assert_eq!(bot.next_check_delay_ms(), react);

        bot.update_ai(react / 2, false);
        assert_eq!(bot.next_check_delay_ms(), react - react / 2);
    }

    #[test]
    fn strategy_commands_apply_immediately() {
        let mut bot = bot();
        assert_eq!(bot.handle_command("nc +custom::farm", None), None);
        assert!(bot.has_strategy("custom::farm", BotState::NonCombat));
        assert!(!bot.has_strategy("custom::farm", BotState::Combat));

        let listing = bot.handle_command("nc ?", None);
        assert_eq!(listing.as_deref(), Some("Strategies: custom::farm"));

        bot.set_strategies(BotState::Combat, &["custom::a", "custom::b"]);
        assert_eq!(bot.strategies(BotState::Combat), vec!["custom::a", "custom::b"]);
    }
}
