//! Directed edges between travel nodes and their cost model.
use bot_world::{WorldOracle, WorldPosition};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::config::TravelConfig;

/// How an edge is traversed.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum TravelNodePathType {
    None,
    #[default]
    Walk,
    Portal,
    Transport,
    FlightPath,
    TeleportSpell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Alliance,
    Horde,
}

/// Who is traveling: speeds and level decide what an edge costs them.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelerProfile {
    pub level: u8,
    pub faction: Faction,
    pub run_speed: f32,
    pub swim_speed: f32,
    pub mob_level_slack: u8,
    pub faction_level_slack: u8,
}

impl TravelerProfile {
    pub const DEFAULT_RUN_SPEED: f32 = 8.0;
    pub const DEFAULT_SWIM_SPEED: f32 = 4.0;

    pub fn new(level: u8, faction: Faction) -> Self {
        let config = TravelConfig::new();
        Self {
            level,
            faction,
            run_speed: Self::DEFAULT_RUN_SPEED,
            swim_speed: Self::DEFAULT_SWIM_SPEED,
            mob_level_slack: config.max_level_mob_penalty,
            faction_level_slack: config.max_level_faction_penalty,
        }
    }

    pub fn with_speeds(mut self, run_speed: f32, swim_speed: f32) -> Self {
        self.run_speed = run_speed.max(f32::EPSILON);
        self.swim_speed = swim_speed.max(f32::EPSILON);
        self
    }

    pub fn with_config(mut self, config: &TravelConfig) -> Self {
        self.mob_level_slack = config.max_level_mob_penalty;
        self.faction_level_slack = config.max_level_faction_penalty;
        self
    }
}

/// Highest unit levels seen along an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxLevels {
    pub mob: u8,
    pub horde: u8,
    pub alliance: u8,
}

/// A directed edge from one node to another.
///
/// Walk edges become complete once the planner produced a path that
/// actually reaches the far node. Every other kind is complete from the
/// start: the traveler just uses the portal, boat or spell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TravelNodePath {
    distance: f32,
    extra_cost: f32,
    path_type: TravelNodePathType,
    path_object: u32,
    calculated: bool,
    complete: bool,
    points: Vec<WorldPosition>,
    max_levels: MaxLevels,
    swim_distance: f32,
}

impl TravelNodePath {
    /// Edges are never shorter than this, so route costs stay positive.
    pub const MIN_DISTANCE: f32 = 0.1;

    pub fn new(distance: f32, path_type: TravelNodePathType) -> Self {
        Self {
            distance: distance.max(Self::MIN_DISTANCE),
            extra_cost: 0.0,
            path_type,
            path_object: 0,
            calculated: false,
            complete: path_type != TravelNodePathType::Walk,
            points: Vec::new(),
            max_levels: MaxLevels::default(),
            swim_distance: 0.0,
        }
    }

    pub fn walk(distance: f32) -> Self {
        Self::new(distance, TravelNodePathType::Walk)
    }

    /// A portal, transport, flight or teleport edge with a fixed cost.
    pub fn special(path_type: TravelNodePathType, path_object: u32, extra_cost: f32) -> Self {
        Self {
            extra_cost: extra_cost.max(0.0),
            path_object,
            calculated: true,
            ..Self::new(Self::MIN_DISTANCE, path_type)
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn extra_cost(&self) -> f32 {
        self.extra_cost
    }

    pub fn path_type(&self) -> TravelNodePathType {
        self.path_type
    }

    pub fn path_object(&self) -> u32 {
        self.path_object
    }

    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    pub fn is_complete(&self) -> bool {
        self.complete || self.path_type != TravelNodePathType::Walk
    }

    pub fn points(&self) -> &[WorldPosition] {
        &self.points
    }

    pub fn max_levels(&self) -> MaxLevels {
        self.max_levels
    }

    pub fn swim_distance(&self) -> f32 {
        self.swim_distance
    }

    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    pub fn set_calculated(&mut self, calculated: bool) {
        self.calculated = calculated;
    }

    pub fn set_max_levels(&mut self, max_levels: MaxLevels) {
        self.max_levels = max_levels;
    }

    pub fn set_path_type(&mut self, path_type: TravelNodePathType, path_object: u32) {
        self.path_type = path_type;
        self.path_object = path_object;
    }

    /// Replace the geometry and re-derive the distance from it.
    pub fn set_points(&mut self, points: Vec<WorldPosition>) {
        self.points = points;
        self.distance = polyline_length(&self.points).max(Self::MIN_DISTANCE);
    }

    /// Set geometry and charge the traversal time at `speed` as a fixed cost.
    pub fn set_points_and_cost(&mut self, points: Vec<WorldPosition>, speed: f32) {
        self.set_points(points);
        self.extra_cost = self.distance / speed.max(f32::EPSILON);
    }

    /// Recompute distance and, when a world is supplied, the swimming share.
    pub fn calculate_cost(&mut self, world: Option<&dyn WorldOracle>) {
        self.distance = polyline_length(&self.points).max(Self::MIN_DISTANCE);

        let Some(world) = world else {
            return;
        };

        let mut swim = 0.0;
        let mut last: Option<(WorldPosition, bool)> = None;
        for point in &self.points {
            let in_water = world.is_in_water(point);
            if let Some((previous, previous_in_water)) = last {
                if previous.same_map(point) && (in_water || previous_in_water) {
                    swim += previous.distance(point);
                }
            }
            last = Some((*point, in_water));
        }

        self.swim_distance = swim.min(self.distance);
        self.calculated = true;
    }

    /// Time-equivalent cost for `traveler`, or for a default runner.
    ///
    /// Walk edges cost their running plus swimming time; other edges cost
    /// their fixed `extra_cost`. Either is stretched when the edge passes
    /// units well above the traveler's level.
    pub fn cost(&self, traveler: Option<&TravelerProfile>) -> f32 {
        let (run_speed, swim_speed) = traveler.map_or(
            (TravelerProfile::DEFAULT_RUN_SPEED, TravelerProfile::DEFAULT_SWIM_SPEED),
            |t| (t.run_speed, t.swim_speed),
        );
        let modifier = traveler.map_or(1.0, |t| self.level_modifier(t));

        if self.path_type != TravelNodePathType::Walk {
            return self.extra_cost * modifier;
        }

        let run_distance = (self.distance - self.swim_distance).max(0.0);
        (run_distance / run_speed + self.swim_distance / swim_speed) * modifier
    }

    fn level_modifier(&self, traveler: &TravelerProfile) -> f32 {
        let level = i32::from(traveler.level);
        let mob_annoyance =
            i32::from(self.max_levels.mob) - level - i32::from(traveler.mob_level_slack);
        let opposing = match traveler.faction {
            Faction::Alliance => self.max_levels.horde,
            Faction::Horde => self.max_levels.alliance,
        };
        let faction_annoyance =
            i32::from(opposing) - level - i32::from(traveler.faction_level_slack);

        let mut modifier = 1.0;
        if mob_annoyance > 0 {
            modifier += 0.1 * mob_annoyance as f32;
        }
        if faction_annoyance > 0 {
            modifier += 0.3 * faction_annoyance as f32;
        }
        modifier
    }
}

impl Default for TravelNodePath {
    fn default() -> Self {
        Self::walk(Self::MIN_DISTANCE)
    }
}

/// Sum of same-map segment lengths.
pub fn polyline_length(points: &[WorldPosition]) -> f32 {
    points
        .windows(2)
        .filter(|pair| pair[0].same_map(&pair[1]))
        .map(|pair| pair[0].distance(&pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_never_drops_below_epsilon() {
        assert_eq!(TravelNodePath::walk(0.0).distance(), TravelNodePath::MIN_DISTANCE);

        let mut path = TravelNodePath::walk(4.0);
        path.set_points(vec![WorldPosition::new(0, 1.0, 1.0, 0.0)]);
        assert_eq!(path.distance(), TravelNodePath::MIN_DISTANCE);
    }

    #[test]
    fn only_walk_paths_start_incomplete() {
        assert!(!TravelNodePath::walk(10.0).is_complete());
        let portal = TravelNodePath::special(TravelNodePathType::Portal, 17, 2.0);
        assert!(portal.is_complete());
        assert_eq!(portal.path_object(), 17);
    }

    #[test]
    fn walk_cost_is_travel_time() {
        let mut path = TravelNodePath::walk(1.0);
        path.set_points(vec![
            WorldPosition::new(0, 0.0, 0.0, 0.0),
            WorldPosition::new(0, 80.0, 0.0, 0.0),
        ]);
        assert!((path.cost(None) - 10.0).abs() < 1e-4);

        let runner = TravelerProfile::new(60, Faction::Horde).with_speeds(16.0, 4.0);
        assert!((path.cost(Some(&runner)) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn high_level_neighbours_stretch_cost() {
        let mut path = TravelNodePath::special(TravelNodePathType::FlightPath, 0, 10.0);
        path.set_max_levels(MaxLevels {
            mob: 25,
            horde: 0,
            alliance: 22,
        });

        let traveler = TravelerProfile::new(10, Faction::Horde);
        // 5 mob levels over slack: +50%; 2 faction levels over slack: +60%.
        assert!((path.cost(Some(&traveler)) - 21.0).abs() < 1e-4);

        let alliance = TravelerProfile::new(10, Faction::Alliance);
        assert!((path.cost(Some(&alliance)) - 15.0).abs() < 1e-4);
    }

    #[test]
    fn path_type_names() {
        assert_eq!(TravelNodePathType::FlightPath.to_string(), "flight_path");
        assert_eq!(
            "teleport_spell".parse::<TravelNodePathType>().ok(),
            Some(TravelNodePathType::TeleportSpell)
        );
    }
}
