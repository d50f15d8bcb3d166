use bot_world::WorldPosition;
use travel_graph::{
    Faction, NodeGraph, NodeId, TravelNodePath, TravelNodePathType, TravelerProfile,
};

/// A traveler for whom one yard of walking costs exactly one.
fn unit_runner() -> TravelerProfile {
    TravelerProfile::new(60, Faction::Alliance).with_speeds(1.0, 1.0)
}

fn at(x: f32) -> WorldPosition {
    WorldPosition::new(0, x, 0.0, 0.0)
}

fn walk(distance: f32) -> TravelNodePath {
    let mut path = TravelNodePath::walk(distance);
    path.set_complete(true);
    path
}

struct Line {
    graph: NodeGraph,
    s: NodeId,
    a: NodeId,
    b: NodeId,
    g: NodeId,
}

fn line() -> Line {
    let mut graph = NodeGraph::new();
    let s = graph.insert("S", at(0.0), true);
    let a = graph.insert("A", at(1.0), false);
    let b = graph.insert("B", at(2.0), false);
    let g = graph.insert("G", at(3.0), true);
    Line { graph, s, a, b, g }
}

#[test]
fn cheap_chain_beats_expensive_teleport() {
    let Line {
        mut graph,
        s,
        a,
        b,
        g,
    } = line();
    graph.set_path(s, a, walk(1.0), true);
    graph.set_path(a, b, walk(1.0), true);
    graph.set_path(b, g, walk(1.0), true);
    graph.set_path(
        s,
        g,
        TravelNodePath::special(TravelNodePathType::TeleportSpell, 556, 10.0),
        true,
    );

    let runner = unit_runner();
    let route = graph.get_route(s, g, Some(&runner));
    assert_eq!(route.nodes(), &[s, a, b, g]);
    assert!((route.total_cost(&graph, Some(&runner)) - 3.0).abs() < 1e-4);
    assert!((route.total_distance(&graph) - 3.0).abs() < 1e-4);
}

#[test]
fn cheap_teleport_beats_long_walk() {
    let Line {
        mut graph,
        s,
        a,
        b,
        g,
    } = line();
    graph.set_path(s, a, walk(1.0), true);
    graph.set_path(a, b, walk(1.0), true);
    graph.set_path(b, g, walk(1.0), true);
    graph.set_path(
        s,
        g,
        TravelNodePath::special(TravelNodePathType::TeleportSpell, 556, 0.5),
        true,
    );

    let runner = unit_runner();
    assert_eq!(graph.get_route(s, g, Some(&runner)).nodes(), &[s, g]);
}

#[test]
fn disconnected_nodes_have_no_route() {
    let Line {
        mut graph,
        s,
        a,
        b,
        g,
    } = line();
    graph.set_path(s, a, walk(1.0), true);
    graph.set_path(b, g, walk(1.0), true);
    // Stored but incomplete edges never carry a route.
    graph.set_path(a, b, TravelNodePath::walk(1.0), true);

    let route = graph.get_route(s, g, Some(&unit_runner()));
    assert!(route.is_empty());
    assert_eq!(route.total_distance(&graph), 0.0);
}

#[test]
fn near_equal_detour_makes_direct_link_useless() {
    let Line {
        mut graph, s, a, b, ..
    } = line();
    graph.set_path(s, a, walk(1.0), true);
    graph.set_path(a, b, walk(1.0), true);
    graph.set_path(s, b, walk(2.05), true);

    let runner = unit_runner();
    assert!(graph.is_useless_link(s, b, 0.1, Some(&runner)));
    assert!(!graph.is_useless_link(s, a, 0.1, Some(&runner)));

    assert_eq!(graph.crop_useless_links(0.1, Some(&runner)), 1);
    assert!(graph.link(s, b).is_none());
    assert!(graph.path(s, b).is_some());
}

#[test]
fn much_longer_direct_link_is_kept() {
    let Line {
        mut graph, s, a, b, ..
    } = line();
    graph.set_path(s, a, walk(1.0), true);
    graph.set_path(a, b, walk(1.0), true);
    graph.set_path(s, b, walk(5.0), true);

    assert!(!graph.is_useless_link(s, b, 0.1, Some(&unit_runner())));
}
