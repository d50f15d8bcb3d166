use std::sync::Arc;

use anyhow::Result;
use bot_runtime::{RuntimeError, spawn_maintenance};
use bot_world::{EmptyWorld, WorldOracle, WorldPosition};
use tempfile::TempDir;
use travel_graph::{
    FileNodeStore, PointOfInterest, RangeLimitedPlanner, TravelConfig, TravelNodeMap,
};

fn travel_map() -> Arc<TravelNodeMap> {
    let world: Arc<dyn WorldOracle> = Arc::new(EmptyWorld);
    let config = TravelConfig {
        planner_range: 100.0,
        min_component_size: 2,
        ..TravelConfig::new()
    };
    let planner = Arc::new(RangeLimitedPlanner::new(Arc::clone(&world), config.planner_range));
    Arc::new(TravelNodeMap::new(config, planner, world))
}

fn camps() -> Vec<PointOfInterest> {
    (0..4)
        .map(|i| {
            PointOfInterest::new(
                format!("camp {i}"),
                WorldPosition::new(0, i as f32 * 80.0, 0.0, 0.0),
                true,
            )
        })
        .collect()
}

#[tokio::test]
async fn generation_links_points_of_interest() -> Result<()> {
    let dir = TempDir::new()?;
    let map = travel_map();
    let store = Arc::new(FileNodeStore::new(dir.path())?);
    let (handle, join) = spawn_maintenance(Arc::clone(&map), Arc::clone(&store), 4);

    let report = handle.generate_all(camps()).await?;
    assert_eq!(report.nodes_added, 4);
    assert_eq!(report.links_added, 6);
    assert_eq!(report.low_nodes_removed, 0);

    let ids = map.with_graph(|graph| graph.ids());
    assert_eq!(map.get_route(ids[0], ids[3], None).len(), 4);

    assert_eq!(handle.save().await?, 4);
    assert_eq!(store.load()?.len(), 4);

    handle.shutdown().await?;
    join.await?;
    assert!(matches!(handle.save().await, Err(RuntimeError::CommandChannelClosed)));
    Ok(())
}

#[tokio::test]
async fn linking_and_cropping_run_in_the_background() -> Result<()> {
    let dir = TempDir::new()?;
    let map = travel_map();
    let store = Arc::new(FileNodeStore::new(dir.path())?);
    let (handle, join) = spawn_maintenance(Arc::clone(&map), store, 4);

    let a = map.add_node("a", WorldPosition::new(0, 0.0, 0.0, 0.0), true);
    let b = map.add_node("b", WorldPosition::new(0, 30.0, 0.0, 0.0), false);
    let c = map.add_node("c", WorldPosition::new(0, 60.0, 0.0, 0.0), true);
    for node in [a, b, c] {
        handle.link_node(node).await?;
    }
    assert_eq!(map.link_count(), 4);

    // a and c see each other directly, so b is redundant.
    assert_eq!(handle.crop_useless().await?, 1);
    assert_eq!(map.node_count(), 2);
    assert!(map.node_position(b).is_none());
    assert!(!map.get_route(a, c, None).is_empty());

    drop(handle);
    join.await?;
    Ok(())
}
