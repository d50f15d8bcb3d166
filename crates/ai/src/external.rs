//! Routing of chat commands and packets to triggers by name.
use std::collections::HashMap;

use bot_world::ObjectGuid;
use tracing::debug;

use crate::context::AiObjectContext;
use crate::event::Packet;

/// Trigger that receives free-form chat nobody else claimed.
pub const CHAT_TRIGGER: &str = "c";
/// Trigger that receives free-form chat for trade handling.
pub const TRADE_TRIGGER: &str = "t";

const CHAT_KEYWORDS: &[&str] = &[
    "questitem", "ammo", "food", "drink", "potion", "elixir", "flask", "scroll", "bandage", "poor",
    "normal", "uncommon", "rare", "epic", "legendary", "head", "neck", "shoulder", "chest",
    "waist", "legs", "feet", "wrist", "hands", "finger", "trinket", "back", "mainhand", "offhand",
    "ranged",
];

/// Whether free text is worth handing to the generic chat triggers: it
/// carries an item link or starts with a known item keyword.
pub fn is_parseable(text: &str) -> bool {
    if text.contains("|H") {
        return true;
    }
    let first = text.split_whitespace().next().unwrap_or_default();
    CHAT_KEYWORDS.contains(&first)
}

/// Delivers external input to the triggers of one bot.
pub struct ExternalEventHelper<'a> {
    ctx: &'a mut AiObjectContext,
}

impl<'a> ExternalEventHelper<'a> {
    pub fn new(ctx: &'a mut AiObjectContext) -> Self {
        Self { ctx }
    }

    /// Match the longest prefix of `command` that names a trigger and
    /// hand it the rest as its parameter.
    ///
    /// `"attack rat now"` tries `attack rat now`, then `attack rat` with
    /// `now`, then `attack` with `rat now`. Unclaimed parseable text goes
    /// to [`CHAT_TRIGGER`] and [`TRADE_TRIGGER`].
    pub fn parse_chat_command(&mut self, command: &str, owner: Option<ObjectGuid>) -> bool {
        if self.handle_command(command, "", owner) {
            return true;
        }

        let mut end = command.len();
        while let Some(found) = command[..end].rfind(' ') {
            if found == 0 {
                break;
            }
            let (name, param) = (&command[..found], &command[found + 1..]);
            if self.handle_command(name, param, owner) {
                return true;
            }
            end = found;
        }

        if !is_parseable(command) {
            debug!(target: "ai::trigger", command, "unclaimed chat command");
            return false;
        }

        self.handle_command(CHAT_TRIGGER, command, owner);
        self.handle_command(TRADE_TRIGGER, command, owner);
        true
    }

    /// Deliver `packet` to the trigger registered for its opcode.
    pub fn handle_packet(
        &mut self,
        handlers: &HashMap<u16, String>,
        packet: &Packet,
        owner: Option<ObjectGuid>,
    ) -> bool {
        let Some(name) = handlers.get(&packet.opcode).filter(|name| !name.is_empty()) else {
            return false;
        };
        let Some(trigger) = self.ctx.trigger(name) else {
            return false;
        };

        trigger.external_packet(packet, owner);
        debug!(target: "ai::trigger", trigger = %name, opcode = packet.opcode, "packet delivered");
        true
    }

    pub fn handle_command(&mut self, name: &str, param: &str, owner: Option<ObjectGuid>) -> bool {
        let Some(trigger) = self.ctx.trigger(name) else {
            return false;
        };

        trigger.external_event(param, owner);
        debug!(target: "ai::trigger", trigger = name, param, "command delivered");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bot_world::EmptyWorld;

    use super::*;
    use crate::context::TriggerContext;
    use crate::env::BotEnv;
    use crate::trigger::{ExternalTrigger, Trigger};

    fn context() -> AiObjectContext {
        let mut triggers = TriggerContext::new();
        for name in ["attack", "attack rat", "c", "t", "loot"] {
            triggers.add(name, move |_| Box::new(ExternalTrigger::new(name)));
        }
        let env = BotEnv::new(ObjectGuid::new(7), Arc::new(EmptyWorld));
        AiObjectContext::new(env).with_triggers(triggers)
    }

    fn pending(ctx: &mut AiObjectContext, name: &str) -> Vec<String> {
        let mut params = Vec::new();
        let values = &mut ctx.values;
        if let Some(trigger) = ctx.triggers.get(name, values.env()) {
            while let Some(event) = trigger.check(values) {
                params.push(event.param().to_string());
            }
        }
        params
    }

    #[test]
    fn longest_trigger_prefix_wins() {
        let mut ctx = context();
        assert!(ExternalEventHelper::new(&mut ctx).parse_chat_command("attack rat now", None));
        assert_eq!(pending(&mut ctx, "attack rat"), vec!["now"]);
        assert!(pending(&mut ctx, "attack").is_empty());
    }

    #[test]
    fn exact_name_gets_empty_param() {
        let mut ctx = context();
        assert!(ExternalEventHelper::new(&mut ctx).parse_chat_command("loot", None));
        assert_eq!(pending(&mut ctx, "loot"), vec![""]);
    }

    #[test]
    fn parseable_leftovers_go_to_chat_and_trade() {
        let mut ctx = context();
        let mut helper = ExternalEventHelper::new(&mut ctx);
        assert!(helper.parse_chat_command("|Hitem:123|h[Bread]|h", None));
        assert!(!helper.parse_chat_command("hello there", None));

        assert_eq!(pending(&mut ctx, "c"), vec!["|Hitem:123|h[Bread]|h"]);
        assert_eq!(pending(&mut ctx, "t"), vec!["|Hitem:123|h[Bread]|h"]);
    }

    #[test]
    fn packets_route_by_opcode() {
        let mut ctx = context();
        let handlers = HashMap::from([(0x1A, "loot".to_string())]);
        let mut helper = ExternalEventHelper::new(&mut ctx);

        assert!(helper.handle_packet(&handlers, &Packet::new(0x1A, vec![1, 2]), None));
        assert!(!helper.handle_packet(&handlers, &Packet::new(0x2B, Vec::new()), None));
        assert_eq!(pending(&mut ctx, "loot").len(), 1);
    }
}
