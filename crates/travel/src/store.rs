//! File-based graph persistence.
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use bot_world::WorldPosition;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::graph::NodeGraph;
use crate::node::{NodeId, TravelNode};
use crate::path::TravelNodePath;

/// Layout version written in front of every map file.
pub const STORE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredNode {
    id: NodeId,
    name: String,
    position: WorldPosition,
    important: bool,
    linked: bool,
}

#[derive(Serialize, Deserialize)]
struct StoredPath {
    from: NodeId,
    to: NodeId,
    link: bool,
    path: TravelNodePath,
}

#[derive(Default, Serialize, Deserialize)]
struct StoredMap {
    map_id: u32,
    nodes: Vec<StoredNode>,
    paths: Vec<StoredPath>,
}

/// Stores the graph as one bincode file per map.
///
/// # File Format
///
/// `travel_nodes_{map_id}.bin` holds the [`STORE_VERSION`] as a `u32`
/// followed by that map's nodes and the edges leaving them. Files are
/// written to a temporary name and renamed into place.
pub struct FileNodeStore {
    base_dir: PathBuf,
}

impl FileNodeStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn map_path(&self, map_id: u32) -> PathBuf {
        self.base_dir.join(format!("travel_nodes_{map_id}.bin"))
    }

    /// Map ids that have a stored file, ascending.
    pub fn map_ids(&self) -> Result<Vec<u32>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(id) = filename
                    .strip_prefix("travel_nodes_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(id) = id.parse::<u32>()
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Write every map of `graph`, dropping files of maps it no longer has.
    /// Returns the number of nodes written.
    pub fn save(&self, graph: &NodeGraph) -> Result<usize> {
        let mut maps: BTreeMap<u32, StoredMap> = BTreeMap::new();
        for node in graph.nodes() {
            let map_id = node.position().map_id;
            let stored = maps.entry(map_id).or_insert_with(|| StoredMap {
                map_id,
                ..StoredMap::default()
            });
            stored.nodes.push(StoredNode {
                id: node.id(),
                name: node.name().to_string(),
                position: *node.position(),
                important: node.is_important(),
                linked: node.is_linked(),
            });
            let mut paths: Vec<(NodeId, &TravelNodePath)> = node.paths().collect();
            paths.sort_by_key(|(to, _)| *to);
            stored.paths.extend(paths.into_iter().map(|(to, path)| StoredPath {
                from: node.id(),
                to,
                link: node.has_link_to(to),
                path: path.clone(),
            }));
        }

        let mut nodes = 0;
        for stored in maps.values() {
            nodes += stored.nodes.len();
            self.write_map(stored)?;
        }

        // Only drop old maps once the new set is fully on disk.
        let written: BTreeSet<u32> = maps.keys().copied().collect();
        for stale in self.map_ids()?.into_iter().filter(|id| !written.contains(id)) {
            fs::remove_file(self.map_path(stale))?;
        }
        Ok(nodes)
    }

    fn write_map(&self, stored: &StoredMap) -> Result<()> {
        let path = self.map_path(stored.map_id);
        let temp_path = path.with_extension("bin.tmp");

        let mut bytes =
            bincode::serialize(&STORE_VERSION).map_err(|e| StoreError::Serialization(e.to_string()))?;
        bytes.extend(
            bincode::serialize(stored).map_err(|e| StoreError::Serialization(e.to_string()))?,
        );

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        debug!(
            target: "travel::store",
            map = stored.map_id,
            nodes = stored.nodes.len(),
            paths = stored.paths.len(),
            "saved map to {}",
            path.display()
        );
        Ok(())
    }

    fn read_map(&self, map_id: u32) -> Result<StoredMap> {
        let bytes = fs::read(self.map_path(map_id))?;
        let mut reader = bytes.as_slice();

        let found: u32 = bincode::deserialize_from(&mut reader)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if found != STORE_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_VERSION,
                found,
            });
        }

        let stored: StoredMap = bincode::deserialize_from(&mut reader)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if stored.map_id != map_id {
            return Err(StoreError::CorruptedData(format!(
                "file for map {map_id} contains map {}",
                stored.map_id
            )));
        }
        Ok(stored)
    }

    /// Rebuild the graph from every stored map.
    ///
    /// All nodes are inserted before any edge so that edges crossing maps
    /// resolve. Edges to unknown nodes are skipped.
    pub fn load(&self) -> Result<NodeGraph> {
        let maps = self
            .map_ids()?
            .into_iter()
            .map(|id| self.read_map(id))
            .collect::<Result<Vec<_>>>()?;

        let mut graph = NodeGraph::new();
        for stored in &maps {
            for node in &stored.nodes {
                let mut restored = TravelNode::new(node.id, node.name.clone(), node.position, node.important);
                restored.set_linked(node.linked);
                if !graph.insert_node(restored) {
                    return Err(StoreError::CorruptedData(format!("duplicate node {}", node.id)));
                }
            }
        }

        for stored in maps {
            for edge in stored.paths {
                if !graph.set_path(edge.from, edge.to, edge.path, edge.link) {
                    warn!(
                        target: "travel::store",
                        from = %edge.from,
                        to = %edge.to,
                        "skipping edge with a missing end"
                    );
                }
            }
        }

        debug!(target: "travel::store", nodes = graph.len(), "loaded graph");
        Ok(graph)
    }
}
