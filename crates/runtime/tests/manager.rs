use std::sync::Arc;

use anyhow::Result;
use bot_ai::{
    Action, ActionContext, AiObjectContext, BotAi, BotEnv, BotState, ManualSetValue, NextActions,
    Strategy, StrategyContext, ValueCodec, ValueContext, ValueRegistry,
};
use bot_runtime::{BotManager, BotStateStore, MemoryStateStore, TickReport};
use bot_world::{EmptyWorld, ObjectGuid};

struct Idle;

impl Action for Idle {
    fn name(&self) -> &str {
        "idle"
    }
}

struct Wander;

impl Strategy for Wander {
    fn name(&self) -> &str {
        "wander"
    }

    fn default_actions(&self) -> NextActions {
        NextActions::of(&[("idle", 1.0)])
    }
}

fn plain_bot(guid: ObjectGuid) -> BotAi {
    let mut actions = ActionContext::new();
    actions.add("idle", |_| Box::new(Idle));

    let mut strategies = StrategyContext::new();
    strategies.add("wander", |_| Box::new(Wander));

    let mut values = ValueContext::new();
    values.add_value("gold", |_, _| {
        ManualSetValue::new(0_u32).with_codec(ValueCodec::text())
    });

    let env = BotEnv::new(guid, Arc::new(EmptyWorld));
    BotAi::new(
        AiObjectContext::new(env)
            .with_actions(actions)
            .with_strategies(strategies)
            .with_values(values),
    )
}

fn wandering_bot(guid: ObjectGuid) -> BotAi {
    let mut bot = plain_bot(guid);
    bot.set_strategies(BotState::NonCombat, &["wander"]);
    bot
}

#[test]
fn full_updates_rotate_between_bots() {
    let mut manager = BotManager::new(1);
    for raw in 1..=3 {
        manager.add_bot(wandering_bot(ObjectGuid::new(raw)));
    }
    let react = manager
        .bot(ObjectGuid::new(1))
        .map_or(0, |bot| bot.context().env().config.react_delay_ms);

    let reports: Vec<TickReport> = (0..3).map(|_| manager.update(react)).collect();
    for report in &reports {
        assert_eq!(*report, TickReport { updated: 3, full: 1, acted: 1 });
    }

    for guid in manager.guids() {
        let last = manager
            .bot(guid)
            .and_then(|bot| bot.engine(BotState::NonCombat).last_action());
        assert_eq!(last, Some("idle"), "bot {guid} never got a full update");
    }
}

#[test]
fn empty_manager_ticks_cleanly() {
    let mut manager = BotManager::new(10);
    assert_eq!(manager.update(50), TickReport::default());
    assert!(manager.is_empty());
}

#[test]
fn saved_state_restores_into_a_fresh_bot() -> Result<()> {
    let guid = ObjectGuid::new(7);
    let mut manager = BotManager::new(1);
    manager.add_bot(wandering_bot(guid));
    if let Some(bot) = manager.bot_mut(guid) {
        assert!(bot.context_mut().set_value("gold", 77_u32));
    }

    let store = MemoryStateStore::new();
    assert_eq!(manager.save_all(&store), 1);
    let record = store.load(guid)?;
    assert_eq!(record.as_ref().map(|r| r.values.clone()), Some(vec!["gold>77".to_string()]));
    assert_eq!(
        record.map(|r| r.strategies.non_combat),
        Some(vec!["wander".to_string()])
    );

    let mut fresh = BotManager::new(1);
    fresh.add_bot(plain_bot(guid));
    assert!(fresh.restore(&store, guid)?);
    assert!(!fresh.restore(&store, ObjectGuid::new(8))?);

    let bot = fresh.bot_mut(guid);
    assert_eq!(bot.and_then(|b| b.context_mut().get_value::<u32>("gold")), Some(77));
    assert_eq!(
        fresh.bot(guid).map(|b| b.strategies(BotState::NonCombat)),
        Some(vec!["wander".to_string()])
    );
    Ok(())
}
