//! Graph generation and routing knobs.
use std::env;

/// Configuration of a [`TravelNodeMap`](crate::map::TravelNodeMap).
#[derive(Clone, Debug, PartialEq)]
pub struct TravelConfig {
    /// An edge whose detour differs from it by at most this much is redundant.
    pub useless_link_tolerance: f32,
    /// A new node closer than this to an existing one reuses the existing one.
    pub node_merge_radius: f32,
    /// Radius within which the path planner returns usable paths.
    pub planner_range: f32,
    /// Minimum spacing between generated zone-transition nodes.
    pub zone_link_spacing: f32,
    /// Tries per call to place a random node along an existing path.
    pub random_node_attempts: u32,
    /// Nearest nodes considered when entering or leaving the graph.
    pub get_node_attempts: usize,
    /// Components with fewer nodes are pruned by `remove_low_nodes`.
    pub min_component_size: usize,
    /// Hostile mobs up to this many levels above the traveler do not slow
    /// a walk path down.
    pub max_level_mob_penalty: u8,
    /// Same slack for the opposing faction's units.
    pub max_level_faction_penalty: u8,
}

impl TravelConfig {
    pub const DEFAULT_USELESS_LINK_TOLERANCE: f32 = 0.1;
    pub const DEFAULT_NODE_MERGE_RADIUS: f32 = 5.0;
    pub const DEFAULT_PLANNER_RANGE: f32 = 300.0;
    pub const DEFAULT_ZONE_LINK_SPACING: f32 = 100.0;
    pub const DEFAULT_RANDOM_NODE_ATTEMPTS: u32 = 20;
    pub const DEFAULT_GET_NODE_ATTEMPTS: usize = 5;
    pub const DEFAULT_MIN_COMPONENT_SIZE: usize = 5;
    pub const DEFAULT_MAX_LEVEL_MOB_PENALTY: u8 = 10;
    pub const DEFAULT_MAX_LEVEL_FACTION_PENALTY: u8 = 10;

    pub const fn new() -> Self {
        Self {
            useless_link_tolerance: Self::DEFAULT_USELESS_LINK_TOLERANCE,
            node_merge_radius: Self::DEFAULT_NODE_MERGE_RADIUS,
            planner_range: Self::DEFAULT_PLANNER_RANGE,
            zone_link_spacing: Self::DEFAULT_ZONE_LINK_SPACING,
            random_node_attempts: Self::DEFAULT_RANDOM_NODE_ATTEMPTS,
            get_node_attempts: Self::DEFAULT_GET_NODE_ATTEMPTS,
            min_component_size: Self::DEFAULT_MIN_COMPONENT_SIZE,
            max_level_mob_penalty: Self::DEFAULT_MAX_LEVEL_MOB_PENALTY,
            max_level_faction_penalty: Self::DEFAULT_MAX_LEVEL_FACTION_PENALTY,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TRAVEL_USELESS_LINK_TOLERANCE` - Redundant-edge tolerance (default: 0.1)
    /// - `TRAVEL_NODE_MERGE_RADIUS` - Duplicate-node radius (default: 5.0)
    /// - `TRAVEL_PLANNER_RANGE` - Path planner reach (default: 300.0)
    /// - `TRAVEL_ZONE_LINK_SPACING` - Zone-transition node spacing (default: 100.0)
    /// - `TRAVEL_RANDOM_NODE_ATTEMPTS` - Random node placement tries (default: 20)
    /// - `TRAVEL_GET_NODE_ATTEMPTS` - Entry node candidates (default: 5)
    /// - `TRAVEL_MIN_COMPONENT_SIZE` - Smallest kept component (default: 5)
    /// - `TRAVEL_MAX_LEVEL_MOB_PENALTY` - Mob level slack (default: 10)
    /// - `TRAVEL_MAX_LEVEL_FACTION_PENALTY` - Faction level slack (default: 10)
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(tolerance) = read_env::<f32>("TRAVEL_USELESS_LINK_TOLERANCE") {
            config.useless_link_tolerance = tolerance.max(0.0);
        }
        if let Some(radius) = read_env::<f32>("TRAVEL_NODE_MERGE_RADIUS") {
            config.node_merge_radius = radius.max(0.0);
        }
        if let Some(range) = read_env::<f32>("TRAVEL_PLANNER_RANGE") {
            config.planner_range = range;
        }
        if let Some(spacing) = read_env::<f32>("TRAVEL_ZONE_LINK_SPACING") {
            config.zone_link_spacing = spacing;
        }
        if let Some(attempts) = read_env::<u32>("TRAVEL_RANDOM_NODE_ATTEMPTS") {
            config.random_node_attempts = attempts;
        }
        if let Some(attempts) = read_env::<usize>("TRAVEL_GET_NODE_ATTEMPTS") {
            config.get_node_attempts = attempts.max(1);
        }
        if let Some(size) = read_env::<usize>("TRAVEL_MIN_COMPONENT_SIZE") {
            config.min_component_size = size;
        }
        if let Some(levels) = read_env::<u8>("TRAVEL_MAX_LEVEL_MOB_PENALTY") {
            config.max_level_mob_penalty = levels;
        }
        if let Some(levels) = read_env::<u8>("TRAVEL_MAX_LEVEL_FACTION_PENALTY") {
            config.max_level_faction_penalty = levels;
        }

        config
    }
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}
