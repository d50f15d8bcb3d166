//! Flattened, step-by-step movement plans.
use bot_world::WorldPosition;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// What the mover does on reaching a point.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum PathNodeType {
    /// Walking from the traveler onto the graph.
    Prepath,
    /// Walking along a computed edge or to the destination.
    Path,
    /// A graph node.
    Node,
    Portal,
    Transport,
    FlightPath,
    Teleport,
}

impl PathNodeType {
    /// Whether the mover just walks to this point.
    pub fn is_walk(self) -> bool {
        matches!(self, Self::Prepath | Self::Path | Self::Node)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathNodePoint {
    pub position: WorldPosition,
    pub kind: PathNodeType,
    /// Spell, transport or area trigger used at this point; 0 for walking.
    pub entry: u32,
}

/// The next thing a mover should do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NextStep {
    pub position: WorldPosition,
    pub kind: PathNodeType,
    pub entry: u32,
}

/// A movement plan consumed from the front.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelPath {
    points: Vec<PathNodePoint>,
}

impl TravelPath {
    /// Points closer than this to each other are the same point.
    pub const SAME_POINT: f32 = 0.5;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PathNodePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn front(&self) -> Option<&PathNodePoint> {
        self.points.first()
    }

    pub fn back(&self) -> Option<&PathNodePoint> {
        self.points.last()
    }

    pub fn add_point(&mut self, position: WorldPosition, kind: PathNodeType, entry: u32) {
        self.points.push(PathNodePoint {
            position,
            kind,
            entry,
        });
    }

    /// Append walkable `positions`, skipping one that repeats the last point.
    pub fn add_path(&mut self, positions: &[WorldPosition], kind: PathNodeType) {
        for position in positions {
            let repeated = self.back().is_some_and(|last| {
                last.kind.is_walk() && last.position.distance(position) < Self::SAME_POINT
            });
            if !repeated {
                self.add_point(*position, kind, 0);
            }
        }
    }

    /// Drop the last point if it is a walk point at `position`.
    pub(crate) fn pop_if_at(&mut self, position: &WorldPosition) {
        if self
            .back()
            .is_some_and(|last| last.kind.is_walk() && last.position.distance(position) < Self::SAME_POINT)
        {
            self.points.pop();
        }
    }

    pub fn pop_front(&mut self) -> Option<PathNodePoint> {
        (!self.points.is_empty()).then(|| self.points.remove(0))
    }

    /// Only the positions, for drawing or debugging.
    pub fn point_path(&self) -> Vec<WorldPosition> {
        self.points.iter().map(|point| point.position).collect()
    }

    /// Skip the walkable points the mover can reach directly.
    ///
    /// Among the leading walk points, the furthest one within `max_dist`
    /// of `start` becomes the new front. When none is that close, the
    /// closest one does. Points before it are dropped. Returns `false` if
    /// the path is empty.
    pub fn make_short_cut(&mut self, start: &WorldPosition, max_dist: f32) -> bool {
        if self.points.is_empty() {
            return false;
        }

        let walkable = self
            .points
            .iter()
            .take_while(|point| point.kind.is_walk())
            .count();
        if walkable == 0 {
            return true;
        }

        let leading = &self.points[..walkable];
        let furthest_in_range = leading
            .iter()
            .rposition(|point| point.position.same_map(start) && start.distance(&point.position) <= max_dist);
        let closest = || {
            leading
                .iter()
                .enumerate()
                .filter(|(_, point)| point.position.same_map(start))
                .min_by(|(_, a), (_, b)| {
                    start
                        .distance(&a.position)
                        .total_cmp(&start.distance(&b.position))
                })
                .map(|(index, _)| index)
        };

        if let Some(index) = furthest_in_range.or_else(closest) {
            self.points.drain(..index);
        }
        true
    }

    /// Whether `position` has reached the front point.
    pub fn should_move_to_next_point(&self, position: &WorldPosition) -> bool {
        self.front().is_some_and(|front| {
            front.position.same_map(position) && front.position.distance(position) < Self::SAME_POINT
        })
    }

    /// Where to go next from `start`, advancing at most `max_dist`.
    ///
    /// A reached walk point is consumed so repeated polling makes progress.
    /// Special points are returned as they are: the mover has to use the
    /// portal, transport or spell named by `entry` to get past them.
    pub fn next_point(&mut self, start: &WorldPosition, max_dist: f32) -> Option<NextStep> {
        if !self.make_short_cut(start, max_dist) {
            return None;
        }

        while self.len() > 1
            && self.should_move_to_next_point(start)
            && self.front().is_some_and(|front| front.kind.is_walk())
        {
            self.points.remove(0);
        }

        self.front().map(|front| NextStep {
            position: front.position,
            kind: front.kind,
            entry: front.entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> WorldPosition {
        WorldPosition::new(0, x, 0.0, 0.0)
    }

    fn straight(xs: &[f32]) -> TravelPath {
        let mut path = TravelPath::new();
        let positions: Vec<WorldPosition> = xs.iter().map(|x| at(*x)).collect();
        path.add_path(&positions, PathNodeType::Path);
        path
    }

    #[test]
    fn shortcut_jumps_to_furthest_reachable_point() {
        let mut path = straight(&[0.0, 10.0, 20.0, 30.0, 40.0]);
        assert!(path.make_short_cut(&at(5.0), 20.0));
        assert_eq!(path.front().map(|p| p.position), Some(at(20.0)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn shortcut_falls_back_to_closest_point() {
        let mut path = straight(&[0.0, 100.0, 200.0]);
        assert!(path.make_short_cut(&at(120.0), 5.0));
        assert_eq!(path.front().map(|p| p.position), Some(at(100.0)));
    }

    #[test]
    fn shortcut_never_skips_a_portal() {
        let mut path = straight(&[0.0, 2.0]);
        path.add_point(at(4.0), PathNodeType::Portal, 7);
        path.add_point(at(6.0), PathNodeType::Path, 0);

        let step = path.next_point(&at(2.0), 50.0);
        assert_eq!(step.map(|s| s.position), Some(at(4.0)));
        assert_eq!(step.map(|s| s.kind), Some(PathNodeType::Portal));
        assert_eq!(step.map(|s| s.entry), Some(7));
    }

    #[test]
    fn repeated_points_are_collapsed() {
        let path = straight(&[0.0, 0.1, 10.0]);
        assert_eq!(path.point_path(), vec![at(0.0), at(10.0)]);
    }

    #[test]
    fn empty_path_has_no_next_point() {
        assert_eq!(TravelPath::new().next_point(&at(0.0), 10.0), None);
    }
}
