//! Process-wide travel graph shared by every bot.
//!
//! Route lookups take the read lock and keep their search state to
//! themselves. Maintenance passes take the write lock for one node or one
//! edge at a time, so bots keep routing while the graph is being built.
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bot_world::{ObjectGuid, WorldOracle, WorldPosition};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::config::TravelConfig;
use crate::error::Result;
use crate::graph::{NodeGraph, RouteStart};
use crate::node::NodeId;
use crate::path::{TravelNodePath, TravelNodePathType, TravelerProfile, polyline_length};
use crate::planner::PathPlanner;
use crate::route::TravelNodeRoute;
use crate::store::FileNodeStore;
use crate::travel_path::{PathNodeType, TravelPath};

/// Upper bound on prune-until-stable passes.
const MAX_PRUNE_PASSES: usize = 10;

/// A fixed place worth a node: inn, flight master, boss, dock.
#[derive(Clone, Debug, PartialEq)]
pub struct PointOfInterest {
    pub name: String,
    pub position: WorldPosition,
    pub important: bool,
}

impl PointOfInterest {
    pub fn new(name: impl Into<String>, position: WorldPosition, important: bool) -> Self {
        Self {
            name: name.into(),
            position,
            important,
        }
    }
}

/// A teleport the traveler can cast to skip the first stretch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleportOption {
    pub spell: u32,
    pub destination: WorldPosition,
    /// Cast and loading time, in the same units as edge costs.
    pub cost: f32,
}

/// What one `generate_all` pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub nodes_added: usize,
    pub links_added: usize,
    pub zone_nodes: usize,
    pub random_nodes: usize,
    pub low_nodes_removed: usize,
    pub paths_removed: usize,
    pub paths_calculated: usize,
}

pub struct TravelNodeMap {
    graph: RwLock<NodeGraph>,
    teleport_nodes: RwLock<HashMap<(ObjectGuid, u32), NodeId>>,
    config: TravelConfig,
    planner: Arc<dyn PathPlanner>,
    world: Arc<dyn WorldOracle>,
}

impl TravelNodeMap {
    pub fn new(config: TravelConfig, planner: Arc<dyn PathPlanner>, world: Arc<dyn WorldOracle>) -> Self {
        Self {
            graph: RwLock::new(NodeGraph::new()),
            teleport_nodes: RwLock::new(HashMap::new()),
            config,
            planner,
            world,
        }
    }

    pub fn config(&self) -> &TravelConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, NodeGraph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NodeGraph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against a consistent snapshot of the graph.
    pub fn with_graph<R>(&self, f: impl FnOnce(&NodeGraph) -> R) -> R {
        f(&self.read())
    }

    pub fn node_count(&self) -> usize {
        self.read().len()
    }

    pub fn link_count(&self) -> usize {
        self.read().link_count()
    }

    pub fn node_position(&self, id: NodeId) -> Option<WorldPosition> {
        self.read().node(id).map(|node| *node.position())
    }

    // ------------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------------

    /// Add a node, or reuse one within the merge radius.
    ///
    /// Reusing a node for an important point makes it important. Plain
    /// nodes get a running number after their name.
    pub fn add_node(&self, name: &str, position: WorldPosition, important: bool) -> NodeId {
        let mut graph = self.write();

        if let Some((existing, _)) = graph
            .nearest(&position, self.config.node_merge_radius)
            .first()
            .copied()
        {
            if important && let Some(node) = graph.node_mut(existing) {
                node.set_important(true);
            }
            return existing;
        }

        let name = if important {
            name.to_string()
        } else {
            let taken = graph.nodes().filter(|node| node.name().starts_with(name)).count();
            format!("{name} {}", taken + 1)
        };
        let id = graph.insert(name, position, important);
        debug!(target: "travel::map", node = %id, important, "node added");
        id
    }

    pub fn remove_node(&self, id: NodeId) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            self.teleport_cache_mut().retain(|_, node| *node != id);
            debug!(target: "travel::map", node = %id, "node removed");
        }
        removed
    }

    pub fn remove_nodes(&self, ids: &[NodeId]) -> usize {
        ids.iter().filter(|id| self.remove_node(**id)).count()
    }

    /// Nodes within `range` of `position`, nearest first.
    pub fn nodes_near(&self, position: &WorldPosition, range: f32) -> Vec<(NodeId, f32)> {
        self.read().nearest(position, range)
    }

    /// Nodes the traveler at `position` can walk to directly, with the
    /// cost of that walk.
    fn entry_nodes(&self, position: &WorldPosition, traveler: Option<&TravelerProfile>) -> Vec<(NodeId, f32, Vec<WorldPosition>)> {
        let candidates: Vec<(NodeId, WorldPosition)> = {
            let graph = self.read();
            graph
                .nearest(position, self.config.planner_range)
                .into_iter()
                .take(self.config.get_node_attempts)
                .filter_map(|(id, _)| graph.node(id).map(|node| (id, *node.position())))
                .collect()
        };

        let run_speed = traveler.map_or(TravelerProfile::DEFAULT_RUN_SPEED, |t| t.run_speed);
        candidates
            .into_iter()
            .filter_map(|(id, node_position)| {
                let planned = self.planner.plan(position, &node_position);
                planned.complete.then(|| {
                    let cost = polyline_length(&planned.points) / run_speed;
                    (id, cost, planned.points)
                })
            })
            .collect()
    }

    /// The best node to enter the graph from `position`.
    pub fn get_node(&self, position: &WorldPosition) -> Option<NodeId> {
        self.entry_nodes(position, None).first().map(|(id, _, _)| *id)
    }

    fn teleport_cache_mut(&self) -> RwLockWriteGuard<'_, HashMap<(ObjectGuid, u32), NodeId>> {
        self.teleport_nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Entry node for a bot's teleport destination, cached per bot and spell.
    pub fn teleport_node(&self, bot: ObjectGuid, option: &TeleportOption) -> Option<NodeId> {
        let key = (bot, option.spell);
        let cached = self
            .teleport_nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied();
        if let Some(id) = cached.filter(|id| self.read().contains(*id)) {
            return Some(id);
        }

        let id = self.get_node(&option.destination)?;
        self.teleport_cache_mut().insert(key, id);
        Some(id)
    }

    // ------------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------------

    pub fn get_route(&self, start: NodeId, goal: NodeId, traveler: Option<&TravelerProfile>) -> TravelNodeRoute {
        self.read().get_route(start, goal, traveler)
    }

    /// Route between two world positions through the graph.
    ///
    /// Every node the traveler can walk to from `start`, plus every
    /// teleport landing node, seeds one search per goal candidate. The
    /// first goal candidate that can be reached wins.
    pub fn route_between(
        &self,
        bot: ObjectGuid,
        start: &WorldPosition,
        end: &WorldPosition,
        traveler: Option<&TravelerProfile>,
        teleports: &[TeleportOption],
    ) -> TravelNodeRoute {
        let mut starts: Vec<RouteStart> = self
            .entry_nodes(start, traveler)
            .into_iter()
            .map(|(node, cost, _)| RouteStart {
                node,
                cost,
                teleport: None,
            })
            .collect();
        for option in teleports {
            if let Some(node) = self.teleport_node(bot, option) {
                starts.push(RouteStart {
                    node,
                    cost: option.cost,
                    teleport: Some(option.spell),
                });
            }
        }
        if starts.is_empty() {
            debug!(target: "travel::route", bot = %bot, "no entry node near start");
            return TravelNodeRoute::empty();
        }

        let goals = self.entry_nodes(end, traveler);
        let graph = self.read();
        for (goal, _, _) in goals {
            let route = graph.find_route(&starts, goal, traveler);
            if !route.is_empty() {
                return route;
            }
        }

        debug!(target: "travel::route", bot = %bot, "destination unreachable");
        TravelNodeRoute::empty()
    }

    /// Complete movement plan from `start` to `end`.
    ///
    /// Short hops use the planner directly. Everything else goes through
    /// [`route_between`](Self::route_between). Empty when unreachable.
    pub fn full_path(
        &self,
        bot: ObjectGuid,
        start: &WorldPosition,
        end: &WorldPosition,
        traveler: Option<&TravelerProfile>,
        teleports: &[TeleportOption],
    ) -> TravelPath {
        let mut travel_path = TravelPath::new();

        if start.same_map(end) && start.distance(end) <= self.config.planner_range {
            let direct = self.planner.plan(start, end);
            if direct.complete {
                travel_path.add_path(&direct.points, PathNodeType::Path);
                return travel_path;
            }
        }

        let route = self.route_between(bot, start, end, traveler, teleports);
        let (Some(first), Some(last)) = (route.start(), route.goal()) else {
            return travel_path;
        };
        let (Some(first_position), Some(last_position)) = (self.node_position(first), self.node_position(last)) else {
            return travel_path;
        };

        let from = route
            .teleport()
            .and_then(|spell| teleports.iter().find(|option| option.spell == spell))
            .map_or(*start, |option| option.destination);
        let pre_path = self.planner.plan(&from, &first_position).points;
        let post_path = self.planner.plan(&last_position, end).points;

        route.build_path(&self.read(), &pre_path, &post_path)
    }

    // ------------------------------------------------------------------------
    // Linking
    // ------------------------------------------------------------------------

    /// Plan walk edges from `id` to every nearby node not yet reachable.
    ///
    /// Complete plans become links both ways. Incomplete ones are stored
    /// for [`extend_path`](Self::extend_path). Returns the links added.
    pub fn full_link_node(&self, id: NodeId) -> usize {
        let Some(position) = self.node_position(id) else {
            return 0;
        };
        let candidates: Vec<NodeId> = {
            let graph = self.read();
            graph
                .nearest(&position, self.config.planner_range)
                .into_iter()
                .map(|(candidate, _)| candidate)
                .filter(|candidate| *candidate != id)
                .filter(|candidate| graph.node(id).is_some_and(|node| !node.has_path_to(*candidate)))
                .collect()
        };

        let mut linked = 0;
        for candidate in candidates {
            let target = {
                let graph = self.read();
                if !graph.get_route(id, candidate, None).is_empty() {
                    continue;
                }
                match graph.node(candidate) {
                    Some(node) => *node.position(),
                    None => continue,
                }
            };

            let planned = self.planner.plan(&position, &target);
            let mut path = TravelNodePath::walk(position.distance(&target));
            path.set_points(planned.points.clone());
            path.set_complete(planned.complete);

            let mut graph = self.write();
            if !graph.set_path(id, candidate, path, true) {
                continue;
            }
            if planned.complete {
                linked += 1;
                let has_reverse = graph.node(candidate).is_some_and(|node| node.has_link_to(id));
                if !has_reverse {
                    let mut reverse = TravelNodePath::walk(position.distance(&target));
                    reverse.set_points(planned.points.into_iter().rev().collect());
                    reverse.set_complete(true);
                    if graph.set_path(candidate, id, reverse, true) {
                        linked += 1;
                    }
                }
            }
        }

        if let Some(node) = self.write().node_mut(id) {
            node.set_linked(true);
        }
        debug!(target: "travel::map", node = %id, linked, "node linked");
        linked
    }

    /// Continue a stored incomplete walk edge from where it stopped.
    pub fn extend_path(&self, from: NodeId, to: NodeId) -> bool {
        let (resume, target, mut points) = {
            let graph = self.read();
            let (Some(path), Some(from_node), Some(to_node)) =
                (graph.path(from, to), graph.node(from), graph.node(to))
            else {
                return false;
            };
            if path.is_complete() {
                return false;
            }
            let resume = path.points().last().copied().unwrap_or(*from_node.position());
            (resume, *to_node.position(), path.points().to_vec())
        };

        let planned = self.planner.plan(&resume, &target);
        if !planned.complete {
            return false;
        }
        let skip = usize::from(!points.is_empty());
        points.extend(planned.points.into_iter().skip(skip));

        let mut graph = self.write();
        let Some(node) = graph.node_mut(from) else {
            return false;
        };
        let Some(path) = node.path_to_mut(to) else {
            return false;
        };
        path.set_points(points);
        path.set_complete(true);
        node.set_link_to(to)
    }

    /// Link two nodes with a portal, transport, flight or teleport edge.
    pub fn add_special_link(
        &self,
        from: NodeId,
        to: NodeId,
        path_type: TravelNodePathType,
        path_object: u32,
        cost: f32,
    ) -> bool {
        let added = self
            .write()
            .set_path(from, to, TravelNodePath::special(path_type, path_object, cost), true);
        if added {
            debug!(target: "travel::map", from = %from, to = %to, kind = %path_type, "special link added");
        }
        added
    }

    // ------------------------------------------------------------------------
    // Pruning
    // ------------------------------------------------------------------------

    pub fn crop_useless_links(&self) -> usize {
        let cropped = self
            .write()
            .crop_useless_links(self.config.useless_link_tolerance, None);
        if cropped > 0 {
            debug!(target: "travel::map", cropped, "useless links cropped");
        }
        cropped
    }

    /// Crop until stable, then forget every edge that is not a link.
    pub fn remove_useless_paths(&self) -> usize {
        let mut removed = 0;
        for _ in 0..MAX_PRUNE_PASSES {
            let cropped = self.crop_useless_links();
            removed += cropped;
            if cropped == 0 {
                break;
            }
        }
        removed + self.write().remove_unlinked_paths()
    }

    /// Remove a linked, unimportant node if its neighbours reach each
    /// other without it.
    pub fn crop_useless_node(&self, id: NodeId) -> bool {
        let mut graph = self.write();
        let Some(node) = graph.node(id) else {
            return false;
        };
        if node.is_important() || !node.is_linked() {
            return false;
        }

        let outgoing: Vec<NodeId> = node.links().collect();
        let incoming: Vec<NodeId> = graph
            .nodes()
            .filter(|other| other.has_link_to(id))
            .map(|other| other.id())
            .collect();
        let ignore = HashSet::from([id]);

        for from in incoming {
            let reach: HashSet<NodeId> = graph.node_map(from, false, &ignore).into_iter().collect();
            if outgoing.iter().any(|to| *to != from && !reach.contains(to)) {
                return false;
            }
        }

        graph.remove(id);
        drop(graph);
        self.teleport_cache_mut().retain(|_, node| *node != id);
        debug!(target: "travel::map", node = %id, "useless node cropped");
        true
    }

    /// Remove unimportant nodes stuck in small reachability islands.
    pub fn remove_low_nodes(&self) -> usize {
        let doomed: Vec<NodeId> = {
            let graph = self.read();
            let mut visited = HashSet::new();
            let mut doomed = Vec::new();
            for id in graph.ids() {
                if visited.contains(&id) {
                    continue;
                }
                let component = graph.node_map(id, false, &HashSet::new());
                visited.extend(component.iter().copied());
                if component.len() < self.config.min_component_size {
                    doomed.extend(
                        component
                            .into_iter()
                            .filter(|node| graph.node(*node).is_some_and(|n| !n.is_important())),
                    );
                }
            }
            doomed
        };
        self.remove_nodes(&doomed)
    }

    // ------------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------------

    pub fn generate_nodes(&self, points: &[PointOfInterest]) -> usize {
        let before = self.node_count();
        for point in points {
            self.add_node(&point.name, point.position, point.important);
        }
        self.node_count() - before
    }

    /// Add a node where the edge `from -> to` crosses into another area,
    /// unless a node already sits close to that crossing.
    pub fn add_zone_link_node(&self, from: NodeId, to: NodeId) -> Option<NodeId> {
        let points = self.read().path(from, to)?.points().to_vec();

        let mut previous_area: Option<String> = None;
        for point in points {
            let area = self.world.area_name(&point);
            if let (Some(previous), Some(current)) = (&previous_area, &area)
                && previous != current
                && self.nodes_near(&point, self.config.zone_link_spacing).is_empty()
            {
                return Some(self.add_node(current, point, false));
            }
            if area.is_some() {
                previous_area = area;
            }
        }
        None
    }

    /// Add a node at a random point of some stored edge that has no node
    /// nearby.
    pub fn add_random_ext_node<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<NodeId> {
        let edges: Vec<Vec<WorldPosition>> = self.with_graph(|graph| {
            graph
                .nodes()
                .flat_map(|node| node.paths())
                .map(|(_, path)| path.points())
                .filter(|points| points.len() > 2)
                .map(<[WorldPosition]>::to_vec)
                .collect()
        });

        for _ in 0..self.config.random_node_attempts {
            let points = edges.choose(rng)?;
            let point = points[rng.gen_range(1..points.len() - 1)];
            if self.nodes_near(&point, self.config.zone_link_spacing).is_empty() {
                return Some(self.add_node("random node", point, false));
            }
        }
        None
    }

    /// Compute distance and swim share for every walk edge not yet done.
    pub fn calculate_path_costs(&self) -> usize {
        let mut graph = self.write();
        let mut calculated = 0;
        for id in graph.ids() {
            let Some(node) = graph.node_mut(id) else {
                continue;
            };
            for (_, path) in node.paths_mut() {
                if path.is_calculated() || path.path_type() != TravelNodePathType::Walk {
                    continue;
                }
                path.calculate_cost(Some(self.world.as_ref()));
                calculated += 1;
            }
        }
        calculated
    }

    /// Full maintenance pass: seed nodes, link everything unlinked, add
    /// zone crossings and one random node, then prune and cost.
    ///
    /// The write lock is taken per node, never for the whole pass.
    pub fn generate_all<R: Rng + ?Sized>(&self, points: &[PointOfInterest], rng: &mut R) -> GenerationReport {
        let mut report = GenerationReport {
            nodes_added: self.generate_nodes(points),
            ..GenerationReport::default()
        };

        let pending: Vec<NodeId> = self.with_graph(|graph| {
            graph
                .nodes()
                .filter(|node| !node.is_linked())
                .map(|node| node.id())
                .collect()
        });
        for id in pending {
            report.links_added += self.full_link_node(id);
        }

        let edges: Vec<(NodeId, NodeId)> = self.with_graph(|graph| {
            graph
                .nodes()
                .flat_map(|node| node.links().map(move |to| (node.id(), to)))
                .collect()
        });
        for (from, to) in edges {
            if let Some(id) = self.add_zone_link_node(from, to) {
                report.zone_nodes += 1;
                report.links_added += self.full_link_node(id);
            }
        }

        if let Some(id) = self.add_random_ext_node(rng) {
            report.random_nodes += 1;
            report.links_added += self.full_link_node(id);
        }

        report.low_nodes_removed = self.remove_low_nodes();
        report.paths_removed = self.remove_useless_paths();
        report.paths_calculated = self.calculate_path_costs();

        info!(
            target: "travel::map",
            nodes = self.node_count(),
            links = self.link_count(),
            added = report.nodes_added,
            linked = report.links_added,
            removed = report.low_nodes_removed,
            "graph generated"
        );
        report
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    pub fn save(&self, store: &FileNodeStore) -> Result<usize> {
        store.save(&self.read())
    }

    /// Replace the graph with the stored one. Returns the node count.
    pub fn load(&self, store: &FileNodeStore) -> Result<usize> {
        let graph = store.load()?;
        let count = graph.len();
        *self.write() = graph;
        self.teleport_cache_mut().clear();
        info!(target: "travel::map", nodes = count, "graph loaded");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use bot_world::EmptyWorld;

    use super::*;
    use crate::planner::RangeLimitedPlanner;

    fn at(x: f32, y: f32) -> WorldPosition {
        WorldPosition::new(0, x, y, 0.0)
    }

    fn map() -> TravelNodeMap {
        let world: Arc<dyn WorldOracle> = Arc::new(EmptyWorld);
        let config = TravelConfig {
            planner_range: 100.0,
            min_component_size: 2,
            ..TravelConfig::new()
        };
        let planner = Arc::new(RangeLimitedPlanner::new(Arc::clone(&world), config.planner_range));
        TravelNodeMap::new(config, planner, world)
    }

    #[test]
    fn nearby_nodes_merge() {
        let map = map();
        let inn = map.add_node("inn", at(0.0, 0.0), false);
        assert_eq!(map.add_node("inn door", at(2.0, 0.0), true), inn);
        assert_eq!(map.node_count(), 1);
        map.with_graph(|graph| {
            let node = graph.node(inn);
            assert!(node.is_some_and(|n| n.is_important()));
            assert_eq!(node.map(|n| n.name()), Some("inn 1"));
        });
    }

    #[test]
    fn linking_chains_short_hops() {
        let map = map();
        let ids: Vec<NodeId> = (0..4)
            .map(|i| map.add_node("hop", at(i as f32 * 80.0, 0.0), false))
            .collect();
        for id in &ids {
            map.full_link_node(*id);
        }

        // 80 apart: neighbours link, the rest is out of planner range.
        map.with_graph(|graph| {
            assert!(graph.link(ids[0], ids[1]).is_some());
            assert!(graph.link(ids[1], ids[0]).is_some());
            assert!(graph.link(ids[0], ids[2]).is_none());
        });
        assert_eq!(map.get_route(ids[0], ids[3], None).nodes(), ids.as_slice());
    }

    #[test]
    fn full_path_walks_short_hops_directly() {
        let map = map();
        let path = map.full_path(ObjectGuid::new(1), &at(0.0, 0.0), &at(50.0, 0.0), None, &[]);
        assert!(!path.is_empty());
        assert_eq!(path.back().map(|p| p.position), Some(at(50.0, 0.0)));
    }

    #[test]
    fn full_path_routes_long_distances() {
        let map = map();
        for i in 0..4 {
            map.add_node("hop", at(i as f32 * 80.0, 0.0), false);
        }
        for id in map.with_graph(NodeGraph::ids) {
            map.full_link_node(id);
        }

        let path = map.full_path(ObjectGuid::new(1), &at(-10.0, 0.0), &at(250.0, 0.0), None, &[]);
        assert_eq!(path.front().map(|p| p.kind), Some(PathNodeType::Prepath));
        assert_eq!(path.back().map(|p| p.position), Some(at(250.0, 0.0)));
        assert!(path.points().iter().any(|p| p.kind == PathNodeType::Node));
    }

    #[test]
    fn redundant_middle_node_is_cropped() {
        let map = map();
        let a = map.add_node("a", at(0.0, 0.0), false);
        let b = map.add_node("b", at(30.0, 0.0), false);
        let c = map.add_node("c", at(60.0, 0.0), false);
        for id in [a, b, c] {
            map.full_link_node(id);
        }

        // a and c are within range of each other, so b adds nothing.
        assert!(map.crop_useless_node(b));
        assert_eq!(map.node_count(), 2);
        assert!(!map.get_route(a, c, None).is_empty());
    }

    #[test]
    fn islands_below_minimum_size_are_removed() {
        let map = map();
        let lonely = map.add_node("lonely", at(0.0, 0.0), false);
        let kept = map.add_node("shrine", at(1000.0, 0.0), true);
        map.full_link_node(lonely);

        assert_eq!(map.remove_low_nodes(), 1);
        assert!(map.node_position(lonely).is_none());
        assert!(map.node_position(kept).is_some());
    }

    #[test]
    fn incomplete_edges_can_be_extended() {
        let map = map();
        let a = map.add_node("a", at(0.0, 0.0), false);
        let b = map.add_node("b", at(150.0, 0.0), false);
        let mut partial = TravelNodePath::walk(100.0);
        partial.set_points(vec![at(0.0, 0.0), at(100.0, 0.0)]);
        map.write().set_path(a, b, partial, true);
        assert!(map.with_graph(|graph| graph.link(a, b).is_none()));

        assert!(map.extend_path(a, b));
        map.with_graph(|graph| {
            let path = graph.link(a, b);
            assert!(path.is_some_and(|p| (p.distance() - 150.0).abs() < 1e-3));
        });
    }
}
