//! The node graph and A* search over it.
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet, VecDeque};
use std::sync::OnceLock;

use bot_world::WorldPosition;
use tracing::{debug, trace};

use crate::node::{NodeId, TravelNode};
use crate::path::{TravelNodePath, TravelNodePathType, TravelerProfile};
use crate::route::TravelNodeRoute;

/// One way onto the graph for a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteStart {
    pub node: NodeId,
    /// Cost already paid to stand on `node`.
    pub cost: f32,
    /// Spell that puts the traveler on `node`, if any.
    pub teleport: Option<u32>,
}

impl RouteStart {
    pub fn at(node: NodeId) -> Self {
        Self {
            node,
            cost: 0.0,
            teleport: None,
        }
    }
}

/// Search-local state for one node. Lives in a per-call side table so
/// concurrent searches never touch the shared nodes.
#[derive(Clone, Copy, Debug)]
struct TravelNodeStub {
    g: f32,
    parent: Option<NodeId>,
    teleport: Option<u32>,
    closed: bool,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    seq: u64,
    node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Max-heap: lowest f first, then the earliest pushed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Fastest displacement per cost unit the links allow, before the
/// traveler's own speeds are known.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SpeedBound {
    /// Largest displacement over stored distance of any walk link.
    walk_ratio: f32,
    /// Largest displacement over fixed cost of any other link.
    special_speed: f32,
}

/// Nodes keyed by id plus their outgoing edges.
#[derive(Clone, Debug, Default)]
pub struct NodeGraph {
    nodes: BTreeMap<NodeId, TravelNode>,
    next_id: u32,
    /// Computed on the first search after a mutation. `None` inside means
    /// the heuristic is off.
    speed_bound: OnceLock<Option<SpeedBound>>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&TravelNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TravelNode> {
        self.invalidate();
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TravelNode> {
        self.nodes.values()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, position: WorldPosition, important: bool) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes
            .insert(id, TravelNode::new(id, name, position, important));
        id
    }

    /// Insert a node that already carries its id. Fails on a duplicate id.
    pub fn insert_node(&mut self, node: TravelNode) -> bool {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.invalidate();
        self.next_id = self.next_id.max(id.0 + 1);
        self.nodes.insert(id, node);
        true
    }

    /// Remove a node together with every edge pointing at it.
    pub fn remove(&mut self, id: NodeId) -> Option<TravelNode> {
        let removed = self.nodes.remove(&id)?;
        self.invalidate();
        for node in self.nodes.values_mut() {
            node.remove_link_to(id, true);
        }
        Some(removed)
    }

    pub fn path(&self, from: NodeId, to: NodeId) -> Option<&TravelNodePath> {
        self.nodes.get(&from)?.path_to(to)
    }

    pub fn path_mut(&mut self, from: NodeId, to: NodeId) -> Option<&mut TravelNodePath> {
        self.invalidate();
        self.nodes.get_mut(&from)?.path_to_mut(to)
    }

    /// The routable edge from `from` to `to`.
    pub fn link(&self, from: NodeId, to: NodeId) -> Option<&TravelNodePath> {
        self.nodes.get(&from)?.link_to(to)
    }

    /// Store an edge between two existing nodes.
    pub fn set_path(&mut self, from: NodeId, to: NodeId, path: TravelNodePath, link: bool) -> bool {
        if !self.nodes.contains_key(&to) {
            return false;
        }
        self.invalidate();
        self.nodes
            .get_mut(&from)
            .is_some_and(|node| node.set_path_to(to, path, link))
    }

    pub fn link_count(&self) -> usize {
        self.nodes.values().map(TravelNode::link_count).sum()
    }

    /// Nodes on the same map within `range`, nearest first.
    pub fn nearest(&self, position: &WorldPosition, range: f32) -> Vec<(NodeId, f32)> {
        let mut found: Vec<(NodeId, f32)> = self
            .nodes
            .values()
            .filter(|node| node.position().same_map(position))
            .map(|node| (node.id(), node.position().distance(position)))
            .filter(|(_, distance)| *distance <= range)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found
    }

    /// Cheapest route between two nodes. Empty when unreachable or when
    /// `start == goal`.
    pub fn get_route(&self, start: NodeId, goal: NodeId, traveler: Option<&TravelerProfile>) -> TravelNodeRoute {
        if start == goal {
            return TravelNodeRoute::empty();
        }
        self.find_route(&[RouteStart::at(start)], goal, traveler)
    }

    /// A* from any of `starts` to `goal` over linked edges.
    ///
    /// The heuristic is the straight-line distance to the goal divided by
    /// the fastest displacement per cost unit any link offers, which keeps
    /// it consistent even with cheap portals. Graphs with cross-map links
    /// search without a heuristic.
    pub fn find_route(
        &self,
        starts: &[RouteStart],
        goal: NodeId,
        traveler: Option<&TravelerProfile>,
    ) -> TravelNodeRoute {
        let Some(goal_position) = self.nodes.get(&goal).map(|node| *node.position()) else {
            return TravelNodeRoute::empty();
        };

        let speed = self.heuristic_speed(traveler);
        let heuristic = |position: &WorldPosition| match speed {
            Some(speed) if position.same_map(&goal_position) => position.distance(&goal_position) / speed,
            _ => 0.0,
        };

        let mut stubs: HashMap<NodeId, TravelNodeStub> = HashMap::new();
        let mut open = BinaryHeap::new();
        let mut seq = 0_u64;

        for start in starts {
            let Some(node) = self.nodes.get(&start.node) else {
                continue;
            };
            if stubs.get(&start.node).is_some_and(|stub| stub.g <= start.cost) {
                continue;
            }
            stubs.insert(
                start.node,
                TravelNodeStub {
                    g: start.cost,
                    parent: None,
                    teleport: start.teleport,
                    closed: false,
                },
            );
            open.push(OpenEntry {
                f: start.cost + heuristic(node.position()),
                seq,
                node: start.node,
            });
            seq += 1;
        }

        let mut expanded = 0_usize;
        while let Some(entry) = open.pop() {
            let Some(current) = stubs.get_mut(&entry.node) else {
                continue;
            };
            if current.closed {
                continue;
            }
            current.closed = true;
            let g = current.g;
            expanded += 1;

            if entry.node == goal {
                let route = reconstruct(&stubs, goal);
                debug!(
                    target: "travel::route",
                    goal = %goal,
                    nodes = route.len(),
                    cost = g,
                    expanded,
                    "route found"
                );
                return route;
            }

            let Some(node) = self.nodes.get(&entry.node) else {
                continue;
            };
            for next in node.links() {
                let (Some(edge), Some(next_node)) = (node.path_to(next), self.nodes.get(&next)) else {
                    continue;
                };
                let next_g = g + edge.cost(traveler);
                match stubs.get(&next) {
                    Some(stub) if stub.closed || stub.g <= next_g => continue,
                    _ => {}
                }
                stubs.insert(
                    next,
                    TravelNodeStub {
                        g: next_g,
                        parent: Some(entry.node),
                        teleport: None,
                        closed: false,
                    },
                );
                open.push(OpenEntry {
                    f: next_g + heuristic(next_node.position()),
                    seq,
                    node: next,
                });
                seq += 1;
            }
        }

        trace!(target: "travel::route", goal = %goal, expanded, "no route");
        TravelNodeRoute::empty()
    }

    fn invalidate(&mut self) {
        self.speed_bound.take();
    }

    fn heuristic_speed(&self, traveler: Option<&TravelerProfile>) -> Option<f32> {
        let bound = (*self.speed_bound.get_or_init(|| self.compute_speed_bound()))?;
        let fastest = traveler.map_or(
            TravelerProfile::DEFAULT_RUN_SPEED.max(TravelerProfile::DEFAULT_SWIM_SPEED),
            |t| t.run_speed.max(t.swim_speed),
        );
        // Level modifiers only ever raise a cost, so they can be ignored.
        Some(fastest.max(bound.walk_ratio * fastest).max(bound.special_speed))
    }

    fn compute_speed_bound(&self) -> Option<SpeedBound> {
        let mut bound = SpeedBound {
            walk_ratio: 0.0,
            special_speed: 0.0,
        };

        for node in self.nodes.values() {
            for to in node.links() {
                let (Some(edge), Some(target)) = (node.path_to(to), self.nodes.get(&to)) else {
                    continue;
                };
                if !node.position().same_map(target.position()) {
                    return None;
                }
                let displacement = node.distance(target);
                if edge.path_type() == TravelNodePathType::Walk {
                    bound.walk_ratio = bound.walk_ratio.max(displacement / edge.distance());
                } else if edge.extra_cost() > 0.0 {
                    bound.special_speed = bound.special_speed.max(displacement / edge.extra_cost());
                } else if displacement > 0.0 {
                    return None;
                }
            }
        }

        Some(bound)
    }

    /// Nodes reachable from `start` over links, `start` included.
    ///
    /// Nodes in `ignore` are neither entered nor reported. With
    /// `important_only`, traversal still crosses every node but only
    /// important ones are returned.
    pub fn node_map(&self, start: NodeId, important_only: bool, ignore: &HashSet<NodeId>) -> Vec<NodeId> {
        if !self.nodes.contains_key(&start) || ignore.contains(&start) {
            return Vec::new();
        }

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut reached = Vec::new();

        while let Some(id) = queue.pop_front() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !important_only || node.is_important() {
                reached.push(id);
            }
            for next in node.links() {
                if !ignore.contains(&next) && self.nodes.contains_key(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        reached
    }

    /// Whether the walk link `from -> to` can be replaced by a detour
    /// `from -> via -> to` costing within `tolerance` of it.
    pub fn is_useless_link(
        &self,
        from: NodeId,
        to: NodeId,
        tolerance: f32,
        traveler: Option<&TravelerProfile>,
    ) -> bool {
        let Some(node) = self.nodes.get(&from) else {
            return false;
        };
        let Some(direct) = node.link_to(to) else {
            return false;
        };
        if direct.path_type() != TravelNodePathType::Walk {
            return false;
        }
        let direct_cost = direct.cost(traveler);

        node.links().filter(|via| *via != to).any(|via| {
            let (Some(first), Some(second)) = (node.link_to(via), self.link(via, to)) else {
                return false;
            };
            let detour = first.cost(traveler) + second.cost(traveler);
            (detour - direct_cost).abs() <= tolerance
        })
    }

    /// Unlink every redundant walk link. Edge data is kept.
    pub fn crop_useless_links(&mut self, tolerance: f32, traveler: Option<&TravelerProfile>) -> usize {
        self.invalidate();
        let mut cropped = 0;
        for from in self.ids() {
            let targets: Vec<NodeId> = self
                .nodes
                .get(&from)
                .map(|node| node.links().collect())
                .unwrap_or_default();
            for to in targets {
                if self.is_useless_link(from, to, tolerance, traveler) {
                    if let Some(node) = self.nodes.get_mut(&from) {
                        node.remove_link_to(to, false);
                        cropped += 1;
                    }
                }
            }
        }
        cropped
    }

    /// Drop stored edges that are not links.
    pub fn remove_unlinked_paths(&mut self) -> usize {
        self.invalidate();
        self.nodes
            .values_mut()
            .map(TravelNode::remove_unlinked_paths)
            .sum()
    }
}

fn reconstruct(stubs: &HashMap<NodeId, TravelNodeStub>, goal: NodeId) -> TravelNodeRoute {
    let mut nodes = vec![goal];
    let mut teleport = None;
    let mut current = goal;
    while let Some(stub) = stubs.get(&current) {
        match stub.parent {
            Some(parent) => {
                nodes.push(parent);
                current = parent;
            }
            None => {
                teleport = stub.teleport;
                break;
            }
        }
    }
    nodes.reverse();
    TravelNodeRoute::new(nodes, teleport)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> WorldPosition {
        WorldPosition::new(0, x, y, 0.0)
    }

    fn walk(distance: f32) -> TravelNodePath {
        let mut path = TravelNodePath::walk(distance);
        path.set_complete(true);
        path
    }

    #[test]
    fn removing_a_node_drops_incoming_edges() {
        let mut graph = NodeGraph::new();
        let a = graph.insert("a", at(0.0, 0.0), false);
        let b = graph.insert("b", at(1.0, 0.0), false);
        graph.set_path(a, b, walk(1.0), true);

        assert!(graph.remove(b).is_some());
        assert!(graph.path(a, b).is_none());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn edges_need_both_ends() {
        let mut graph = NodeGraph::new();
        let a = graph.insert("a", at(0.0, 0.0), false);
        assert!(!graph.set_path(a, NodeId(99), walk(1.0), true));
        assert!(!graph.set_path(NodeId(99), a, walk(1.0), true));
    }

    #[test]
    fn node_map_respects_ignore_and_importance() {
        let mut graph = NodeGraph::new();
        let a = graph.insert("a", at(0.0, 0.0), true);
        let b = graph.insert("b", at(1.0, 0.0), false);
        let c = graph.insert("c", at(2.0, 0.0), true);
        graph.set_path(a, b, walk(1.0), true);
        graph.set_path(b, c, walk(1.0), true);

        assert_eq!(graph.node_map(a, false, &HashSet::new()), vec![a, b, c]);
        assert_eq!(graph.node_map(a, true, &HashSet::new()), vec![a, c]);
        assert_eq!(graph.node_map(a, false, &HashSet::from([b])), vec![a]);
    }

    #[test]
    fn multi_start_search_prefers_cheaper_entry() {
        let mut graph = NodeGraph::new();
        let near = graph.insert("near", at(0.0, 0.0), false);
        let far = graph.insert("far", at(50.0, 0.0), false);
        let goal = graph.insert("goal", at(60.0, 0.0), false);
        graph.set_path(near, goal, walk(60.0), true);
        graph.set_path(far, goal, walk(10.0), true);

        let starts = [
            RouteStart::at(near),
            RouteStart {
                node: far,
                cost: 1.0,
                teleport: Some(3561),
            },
        ];
        let route = graph.find_route(&starts, goal, None);
        assert_eq!(route.nodes(), &[far, goal]);
        assert_eq!(route.teleport(), Some(3561));
    }

    #[test]
    fn same_start_and_goal_is_empty() {
        let mut graph = NodeGraph::new();
        let a = graph.insert("a", at(0.0, 0.0), false);
        assert!(graph.get_route(a, a, None).is_empty());
    }

    #[test]
    fn heuristic_follows_new_portals() {
        let mut graph = NodeGraph::new();
        let start = graph.insert("start", at(0.0, 0.0), false);
        let goal = graph.insert("goal", at(1000.0, 0.0), false);
        let gate = graph.insert("gate", at(-500.0, 0.0), false);
        graph.set_path(start, goal, walk(1000.0), true);
        graph.set_path(start, gate, walk(500.0), true);
        assert_eq!(graph.get_route(start, goal, None).nodes(), &[start, goal]);

        // The portal makes the gate far cheaper than its distance suggests;
        // a heuristic still tuned for walking would overestimate it.
        let portal = TravelNodePath::special(TravelNodePathType::Portal, 7, 1.0);
        assert!(graph.set_path(gate, goal, portal, true));
        assert_eq!(graph.get_route(start, goal, None).nodes(), &[start, gate, goal]);
    }
}
