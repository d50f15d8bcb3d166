//! Node sequences produced by route search.
use bot_world::WorldPosition;

use crate::graph::NodeGraph;
use crate::node::NodeId;
use crate::path::{TravelNodePathType, TravelerProfile};
use crate::travel_path::{PathNodeType, TravelPath};

/// Ordered nodes from start to goal.
///
/// Empty means unreachable. `teleport` names the spell that carries the
/// traveler onto the first node when the route starts with a teleport.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TravelNodeRoute {
    nodes: Vec<NodeId>,
    teleport: Option<u32>,
}

impl TravelNodeRoute {
    pub fn new(nodes: Vec<NodeId>, teleport: Option<u32>) -> Self {
        Self { nodes, teleport }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn goal(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn teleport(&self) -> Option<u32> {
        self.teleport
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Sum of edge lengths between consecutive nodes.
    pub fn total_distance(&self, graph: &NodeGraph) -> f32 {
        self.nodes
            .windows(2)
            .filter_map(|pair| graph.path(pair[0], pair[1]))
            .map(|path| path.distance())
            .sum()
    }

    pub fn total_cost(&self, graph: &NodeGraph, traveler: Option<&TravelerProfile>) -> f32 {
        self.nodes
            .windows(2)
            .filter_map(|pair| graph.path(pair[0], pair[1]))
            .map(|path| path.cost(traveler))
            .sum()
    }

    /// Flatten the route into points a mover can follow.
    ///
    /// `pre_path` leads onto the first node: from the traveler, or from
    /// the landing point when the route starts with a teleport. `post_path`
    /// leads from the last node to the real destination.
    pub fn build_path(
        &self,
        graph: &NodeGraph,
        pre_path: &[WorldPosition],
        post_path: &[WorldPosition],
    ) -> TravelPath {
        let mut travel_path = TravelPath::new();
        let Some(first) = self.nodes.first().and_then(|id| graph.node(*id)) else {
            return travel_path;
        };

        match self.teleport {
            Some(spell) => {
                let landing = pre_path.first().copied().unwrap_or(*first.position());
                travel_path.add_point(landing, PathNodeType::Teleport, spell);
                travel_path.add_path(pre_path.get(1..).unwrap_or_default(), PathNodeType::Prepath);
            }
            None => travel_path.add_path(pre_path, PathNodeType::Prepath),
        }
        travel_path.add_path(&[*first.position()], PathNodeType::Node);

        for pair in self.nodes.windows(2) {
            let (Some(from), Some(to)) = (graph.node(pair[0]), graph.node(pair[1])) else {
                continue;
            };
            let Some(edge) = from.path_to(pair[1]) else {
                continue;
            };

            match step_type(edge.path_type()) {
                Some(kind) => {
                    // Special edges are entered at the near node and left at the far one.
                    travel_path.pop_if_at(from.position());
                    travel_path.add_point(*from.position(), kind, edge.path_object());
                    travel_path.add_point(*to.position(), kind, edge.path_object());
                }
                None => {
                    let points = edge.points();
                    let inner = match points {
                        [_, inner @ .., _] => inner,
                        _ => &[],
                    };
                    travel_path.add_path(inner, PathNodeType::Path);
                    travel_path.add_point(*to.position(), PathNodeType::Node, 0);
                }
            }
        }

        travel_path.add_path(post_path, PathNodeType::Path);
        travel_path
    }
}

fn step_type(path_type: TravelNodePathType) -> Option<PathNodeType> {
    match path_type {
        TravelNodePathType::Portal => Some(PathNodeType::Portal),
        TravelNodePathType::Transport => Some(PathNodeType::Transport),
        TravelNodePathType::FlightPath => Some(PathNodeType::FlightPath),
        TravelNodePathType::TeleportSpell => Some(PathNodeType::Teleport),
        TravelNodePathType::Walk | TravelNodePathType::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::TravelNodePath;

    fn at(x: f32) -> WorldPosition {
        WorldPosition::new(0, x, 0.0, 0.0)
    }

    fn graph() -> (NodeGraph, Vec<NodeId>) {
        let mut graph = NodeGraph::new();
        let ids: Vec<NodeId> = [0.0, 10.0, 20.0]
            .into_iter()
            .enumerate()
            .map(|(i, x)| graph.insert(format!("n{i}"), at(x), false))
            .collect();

        let mut walk = TravelNodePath::walk(10.0);
        walk.set_points(vec![at(0.0), at(5.0), at(10.0)]);
        walk.set_complete(true);
        graph.set_path(ids[0], ids[1], walk, true);
        graph.set_path(
            ids[1],
            ids[2],
            TravelNodePath::special(TravelNodePathType::Portal, 42, 1.0),
            true,
        );
        (graph, ids)
    }

    #[test]
    fn distance_sums_every_edge() {
        let (graph, ids) = graph();
        let route = TravelNodeRoute::new(ids.clone(), None);
        let expected = 10.0 + TravelNodePath::MIN_DISTANCE;
        assert!((route.total_distance(&graph) - expected).abs() < 1e-4);
        assert!(route.has_node(ids[2]));
    }

    #[test]
    fn build_path_marks_special_steps() {
        let (graph, ids) = graph();
        let route = TravelNodeRoute::new(ids, None);
        let path = route.build_path(&graph, &[at(-5.0)], &[at(25.0)]);

        let kinds: Vec<PathNodeType> = path.points().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PathNodeType::Prepath,
                PathNodeType::Node,
                PathNodeType::Path,
                PathNodeType::Portal,
                PathNodeType::Portal,
                PathNodeType::Path,
            ]
        );
        assert_eq!(path.points()[3].entry, 42);
        assert_eq!(path.points()[4].position, at(20.0));
    }

    #[test]
    fn teleport_start_lands_on_pre_path() {
        let (graph, ids) = graph();
        let route = TravelNodeRoute::new(vec![ids[0], ids[1]], Some(8690));
        let path = route.build_path(&graph, &[at(-5.0), at(-2.0)], &[]);

        let first = path.front().copied();
        assert_eq!(first.map(|p| p.kind), Some(PathNodeType::Teleport));
        assert_eq!(first.map(|p| p.entry), Some(8690));
        assert_eq!(first.map(|p| p.position), Some(at(-5.0)));
        assert_eq!(path.points()[1].kind, PathNodeType::Prepath);
        assert_eq!(path.back().map(|p| p.position), Some(at(10.0)));
    }
}
