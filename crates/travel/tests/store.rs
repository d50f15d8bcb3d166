use std::fs;

use anyhow::Result;
use bot_world::WorldPosition;
use tempfile::TempDir;
use travel_graph::{
    FileNodeStore, NodeGraph, STORE_VERSION, StoreError, TravelNodePath, TravelNodePathType,
};

fn sample_graph() -> NodeGraph {
    let mut graph = NodeGraph::new();
    let dock = graph.insert("Menethil dock", WorldPosition::new(0, -3700.0, -600.0, 5.0), true);
    let inn = graph.insert("inn 1", WorldPosition::new(0, -3800.0, -800.0, 10.0), false);
    let theramore = graph.insert("Theramore dock", WorldPosition::new(1, -4000.0, -4700.0, 5.0), true);

    let mut walk = TravelNodePath::walk(0.0);
    walk.set_points(vec![
        WorldPosition::new(0, -3700.0, -600.0, 5.0),
        WorldPosition::new(0, -3800.0, -800.0, 10.0),
    ]);
    walk.set_complete(true);
    graph.set_path(dock, inn, walk, true);
    graph.set_path(inn, dock, TravelNodePath::walk(40.0), false);
    graph.set_path(
        dock,
        theramore,
        TravelNodePath::special(TravelNodePathType::Transport, 176231, 120.0),
        true,
    );
    if let Some(node) = graph.node_mut(dock) {
        node.set_linked(true);
    }
    graph
}

#[test]
fn graph_survives_a_save_load_cycle() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileNodeStore::new(dir.path())?;
    let graph = sample_graph();

    assert_eq!(store.save(&graph)?, 3);
    assert_eq!(store.map_ids()?, vec![0, 1]);

    let loaded = store.load()?;
    assert_eq!(loaded.len(), 3);
    for original in graph.nodes() {
        let restored = loaded.node(original.id());
        assert_eq!(restored, Some(original));
    }

    // Cross-map transport link resolves after every map is loaded.
    let ids = loaded.ids();
    assert!(loaded.link(ids[0], ids[2]).is_some());
    assert!(loaded.link(ids[1], ids[0]).is_none());
    assert!(loaded.path(ids[1], ids[0]).is_some());
    Ok(())
}

#[test]
fn maps_that_disappear_lose_their_file() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileNodeStore::new(dir.path())?;
    store.save(&sample_graph())?;

    let mut shrunk = sample_graph();
    let ids = shrunk.ids();
    shrunk.remove(ids[2]);
    store.save(&shrunk)?;

    assert_eq!(store.map_ids()?, vec![0]);
    assert_eq!(store.load()?.len(), 2);
    Ok(())
}

#[test]
fn failed_save_keeps_previous_maps() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileNodeStore::new(dir.path())?;
    store.save(&sample_graph())?;

    let mut shrunk = sample_graph();
    let ids = shrunk.ids();
    shrunk.remove(ids[2]);
    // A directory squatting on the temp file makes the map 0 write fail.
    fs::create_dir(dir.path().join("travel_nodes_0.bin.tmp"))?;
    assert!(matches!(store.save(&shrunk), Err(StoreError::Io(_))));

    assert_eq!(store.map_ids()?, vec![0, 1]);
    assert_eq!(store.load()?.len(), 3);
    Ok(())
}

#[test]
fn unknown_version_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileNodeStore::new(dir.path())?;
    store.save(&sample_graph())?;

    let file = dir.path().join("travel_nodes_0.bin");
    let mut bytes = fs::read(&file)?;
    bytes[..4].copy_from_slice(&(STORE_VERSION + 1).to_le_bytes());
    fs::write(&file, bytes)?;

    match store.load() {
        Err(StoreError::VersionMismatch { expected, found }) => {
            assert_eq!(expected, STORE_VERSION);
            assert_eq!(found, STORE_VERSION + 1);
        }
        other => panic!("expected a version mismatch, got {other:?}"),
    }
    Ok(())
}

#[test]
fn empty_directory_loads_an_empty_graph() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileNodeStore::new(dir.path().join("nested"))?;
    assert!(store.load()?.is_empty());
    Ok(())
}
