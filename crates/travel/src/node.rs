//! Graph vertices.
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use bot_world::WorldPosition;
use serde::{Deserialize, Serialize};

use crate::path::{TravelNodePath, TravelNodePathType};

/// Stable identifier of a node inside one [`NodeGraph`](crate::graph::NodeGraph).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named point with outgoing edges.
///
/// `paths` holds every edge computed so far, usable or not. `links` is the
/// subset of targets whose edge is complete and accepted for routing.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelNode {
    id: NodeId,
    name: String,
    position: WorldPosition,
    important: bool,
    linked: bool,
    paths: HashMap<NodeId, TravelNodePath>,
    links: BTreeSet<NodeId>,
}

impl TravelNode {
    pub fn new(id: NodeId, name: impl Into<String>, position: WorldPosition, important: bool) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            important,
            linked: false,
            paths: HashMap::new(),
            links: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> &WorldPosition {
        &self.position
    }

    pub fn is_important(&self) -> bool {
        self.important
    }

    pub fn set_important(&mut self, important: bool) {
        self.important = important;
    }

    /// Whether the neighbourhood of this node has been explored.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }

    pub fn distance(&self, other: &TravelNode) -> f32 {
        self.position.distance(&other.position)
    }

    pub fn paths(&self) -> impl Iterator<Item = (NodeId, &TravelNodePath)> {
        self.paths.iter().map(|(to, path)| (*to, path))
    }

    pub fn paths_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut TravelNodePath)> {
        self.paths.iter_mut().map(|(to, path)| (*to, path))
    }

    /// Targets of usable edges, in id order.
    pub fn links(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.iter().copied()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn path_to(&self, to: NodeId) -> Option<&TravelNodePath> {
        self.paths.get(&to)
    }

    pub fn path_to_mut(&mut self, to: NodeId) -> Option<&mut TravelNodePath> {
        self.paths.get_mut(&to)
    }

    /// The usable edge towards `to`, if there is one.
    pub fn link_to(&self, to: NodeId) -> Option<&TravelNodePath> {
        self.links.contains(&to).then(|| self.paths.get(&to)).flatten()
    }

    pub fn has_path_to(&self, to: NodeId) -> bool {
        self.paths.contains_key(&to)
    }

    pub fn has_link_to(&self, to: NodeId) -> bool {
        self.links.contains(&to)
    }

    pub fn has_complete_path_to(&self, to: NodeId) -> bool {
        self.paths.get(&to).is_some_and(TravelNodePath::is_complete)
    }

    /// Store `path` towards `to`, linking it when asked and complete.
    ///
    /// A node never gets an edge to itself; that call returns `false`.
    pub fn set_path_to(&mut self, to: NodeId, path: TravelNodePath, link: bool) -> bool {
        if to == self.id {
            return false;
        }
        let complete = path.is_complete();
        self.paths.insert(to, path);
        if link && complete {
            self.links.insert(to);
        } else {
            self.links.remove(&to);
        }
        true
    }

    /// Promote an existing complete edge to a link.
    pub fn set_link_to(&mut self, to: NodeId) -> bool {
        if !self.has_complete_path_to(to) {
            return false;
        }
        self.links.insert(to)
    }

    /// Drop the link towards `to`, and its edge data too if `remove_path`.
    pub fn remove_link_to(&mut self, to: NodeId, remove_path: bool) -> bool {
        let unlinked = self.links.remove(&to);
        let removed = remove_path && self.paths.remove(&to).is_some();
        unlinked || removed
    }

    /// Forget edges that are stored but not linked.
    pub fn remove_unlinked_paths(&mut self) -> usize {
        let before = self.paths.len();
        let links = &self.links;
        self.paths.retain(|to, _| links.contains(to));
        before - self.paths.len()
    }

    fn links_of(&self, path_type: TravelNodePathType) -> impl Iterator<Item = &TravelNodePath> {
        self.links
            .iter()
            .filter_map(|to| self.paths.get(to))
            .filter(move |path| path.path_type() == path_type)
    }

    pub fn is_transport(&self) -> bool {
        self.links_of(TravelNodePathType::Transport).next().is_some()
    }

    pub fn is_portal(&self) -> bool {
        self.links_of(TravelNodePathType::Portal).next().is_some()
    }

    pub fn is_walking(&self) -> bool {
        self.links_of(TravelNodePathType::Walk).next().is_some()
    }

    /// Object id of the first transport leaving this node.
    pub fn transport_id(&self) -> Option<u32> {
        self.links_of(TravelNodePathType::Transport)
            .next()
            .map(TravelNodePath::path_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32) -> TravelNode {
        TravelNode::new(NodeId(id), format!("node {id}"), WorldPosition::default(), false)
    }

    #[test]
    fn never_links_to_itself() {
        let mut a = node(1);
        let mut walk = TravelNodePath::walk(5.0);
        walk.set_complete(true);
        assert!(!a.set_path_to(NodeId(1), walk, true));
        assert!(!a.has_path_to(NodeId(1)));
    }

    #[test]
    fn incomplete_walks_are_stored_but_not_linked() {
        let mut a = node(1);
        assert!(a.set_path_to(NodeId(2), TravelNodePath::walk(5.0), true));
        assert!(a.has_path_to(NodeId(2)));
        assert!(!a.has_link_to(NodeId(2)));
        assert!(!a.set_link_to(NodeId(2)));

        if let Some(path) = a.path_to_mut(NodeId(2)) {
            path.set_complete(true);
        }
        assert!(a.set_link_to(NodeId(2)));
        assert!(a.link_to(NodeId(2)).is_some());
        assert!(a.is_walking());
    }

    #[test]
    fn transport_flags_follow_links() {
        let mut a = node(1);
        a.set_path_to(
            NodeId(2),
            TravelNodePath::special(TravelNodePathType::Transport, 164871, 30.0),
            true,
        );
        assert!(a.is_transport());
        assert!(!a.is_portal());
        assert_eq!(a.transport_id(), Some(164871));

        a.remove_link_to(NodeId(2), false);
        assert!(!a.is_transport());
        assert_eq!(a.remove_unlinked_paths(), 1);
        assert!(!a.has_path_to(NodeId(2)));
    }
}
