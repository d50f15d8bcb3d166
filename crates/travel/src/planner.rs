//! Short-range path planning used to build and enter the graph.
use std::sync::Arc;

use bot_world::{WorldOracle, WorldPosition};

/// Result of one planner query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlannedPath {
    pub points: Vec<WorldPosition>,
    /// The points actually reach the requested destination.
    pub complete: bool,
}

impl PlannedPath {
    pub fn incomplete(points: Vec<WorldPosition>) -> Self {
        Self {
            points,
            complete: false,
        }
    }

    pub fn last(&self) -> Option<&WorldPosition> {
        self.points.last()
    }
}

/// A walkable-path oracle with bounded reach.
pub trait PathPlanner: Send + Sync {
    fn plan(&self, from: &WorldPosition, to: &WorldPosition) -> PlannedPath;
}

/// Straight-line planner that trusts line of sight within a range.
///
/// Beyond `range` it walks as far as it can towards the target and gives
/// up, which is what a real navigation planner degrades to as well.
pub struct RangeLimitedPlanner {
    world: Arc<dyn WorldOracle>,
    range: f32,
    step: f32,
}

impl RangeLimitedPlanner {
    pub const DEFAULT_STEP: f32 = 25.0;

    pub fn new(world: Arc<dyn WorldOracle>, range: f32) -> Self {
        Self {
            world,
            range,
            step: Self::DEFAULT_STEP,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step.max(1.0);
        self
    }

    fn sample(&self, from: &WorldPosition, to: &WorldPosition) -> Vec<WorldPosition> {
        let distance = from.distance(to);
        let segments = (distance / self.step).ceil().max(1.0) as usize;
        (0..=segments)
            .map(|i| from.lerp(to, i as f32 / segments as f32))
            .collect()
    }
}

impl PathPlanner for RangeLimitedPlanner {
    fn plan(&self, from: &WorldPosition, to: &WorldPosition) -> PlannedPath {
        if !from.same_map(to) {
            return PlannedPath::incomplete(Vec::new());
        }

        let distance = from.distance(to);
        if distance > self.range {
            let reachable = from.lerp(to, self.range / distance);
            return PlannedPath::incomplete(self.sample(from, &reachable));
        }

        if !self.world.in_line_of_sight(from, to) {
            return PlannedPath::incomplete(vec![*from]);
        }

        PlannedPath {
            points: self.sample(from, to),
            complete: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use bot_world::EmptyWorld;

    use super::*;

    #[test]
    fn plans_within_range_only() {
        let planner = RangeLimitedPlanner::new(Arc::new(EmptyWorld), 100.0);
        let from = WorldPosition::new(0, 0.0, 0.0, 0.0);

        let near = planner.plan(&from, &WorldPosition::new(0, 60.0, 0.0, 0.0));
        assert!(near.complete);
        assert_eq!(near.points.len(), 4);
        assert_eq!(near.last(), Some(&WorldPosition::new(0, 60.0, 0.0, 0.0)));

        let far = planner.plan(&from, &WorldPosition::new(0, 400.0, 0.0, 0.0));
        assert!(!far.complete);
        assert!(far.last().is_some_and(|end| (end.x - 100.0).abs() < 1e-3));

        let other_map = planner.plan(&from, &WorldPosition::new(1, 1.0, 0.0, 0.0));
        assert_eq!(other_map, PlannedPath::default());
    }
}
