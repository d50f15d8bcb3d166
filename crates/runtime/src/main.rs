//! Headless bot host.
//!
//! Restores every stored bot, loads the travel graph, and ticks the bots
//! until interrupted. State and graph are saved on the way out.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bot_ai::{AiObjectContext, BotAi, BotEnv};
use bot_runtime::{
    BotManager, BotStateStore, FileStateStore, RuntimeConfig, init_logging, spawn_maintenance,
};
use bot_world::{EmptyWorld, WorldOracle};
use travel_graph::{FileNodeStore, RangeLimitedPlanner, TravelNodeMap};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    let _guard = init_logging(&config)?;

    // The host server plugs its own world in here.
    let world: Arc<dyn WorldOracle> = Arc::new(EmptyWorld);

    let planner = Arc::new(RangeLimitedPlanner::new(
        Arc::clone(&world),
        config.travel.planner_range,
    ));
    let map = Arc::new(TravelNodeMap::new(
        config.travel.clone(),
        planner,
        Arc::clone(&world),
    ));
    let graph_store = Arc::new(FileNodeStore::new(config.travel_dir())?);
    if let Err(error) = map.load(&graph_store) {
        tracing::warn!(target: "runtime", %error, "starting with an empty travel graph");
    }
    let (maintenance, maintenance_join) =
        spawn_maintenance(Arc::clone(&map), graph_store, config.maintenance_buffer);

    let state_store = FileStateStore::new(config.bot_state_dir())?;
    let mut manager = BotManager::new(config.full_updates_per_tick);
    for guid in state_store.list_bots()? {
        let env = BotEnv::new(guid, Arc::clone(&world)).with_config(config.ai.clone());
        manager.add_bot(BotAi::new(AiObjectContext::new(env)));
        manager.restore(&state_store, guid)?;
    }
    tracing::info!(
        target: "runtime",
        bots = manager.len(),
        nodes = map.node_count(),
        "bot host started"
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_ms));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                manager.update(config.tick_ms);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let saved = manager.save_all(&state_store);
    let nodes = maintenance.save().await?;
    maintenance.shutdown().await?;
    maintenance_join.await?;
    tracing::info!(target: "runtime", saved, nodes, "bot host stopped");
    Ok(())
}
