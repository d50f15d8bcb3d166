//! Read-only world queries.
use crate::{ObjectGuid, WorldPosition};

/// Snapshot of a unit at query time.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSnapshot {
    pub guid: ObjectGuid,
    pub position: WorldPosition,
    /// Health as a percentage in `0.0..=100.0`.
    pub health_pct: f32,
    /// Mana (or other primary power) as a percentage.
    pub power_pct: f32,
    pub level: u8,
    pub alive: bool,
    pub in_combat: bool,
}

/// Synchronous world queries consumed by values, actions and graph
/// maintenance. Every query may come back empty; callers treat that as
/// absence rather than as an error.
pub trait WorldOracle: Send + Sync {
    fn unit(&self, guid: ObjectGuid) -> Option<UnitSnapshot>;

    fn position_of(&self, guid: ObjectGuid) -> Option<WorldPosition> {
        self.unit(guid).map(|unit| unit.position)
    }

    fn distance_between(&self, a: ObjectGuid, b: ObjectGuid) -> Option<f32> {
        Some(self.position_of(a)?.distance(&self.position_of(b)?))
    }

    fn in_line_of_sight(&self, from: &WorldPosition, to: &WorldPosition) -> bool;

    fn is_in_water(&self, position: &WorldPosition) -> bool;

    /// Hostile units within `range` of `around`, nearest first.
    fn nearby_hostiles(&self, around: ObjectGuid, range: f32) -> Vec<ObjectGuid>;

    /// Name of the zone/area containing `position`, if the map knows it.
    fn area_name(&self, position: &WorldPosition) -> Option<String>;
}

/// A world with nothing in it. Every lookup misses, sight is never blocked.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyWorld;

impl WorldOracle for EmptyWorld {
    fn unit(&self, _guid: ObjectGuid) -> Option<UnitSnapshot> {
        None
    }

    fn in_line_of_sight(&self, from: &WorldPosition, to: &WorldPosition) -> bool {
        from.same_map(to)
    }

    fn is_in_water(&self, _position: &WorldPosition) -> bool {
        false
    }

    fn nearby_hostiles(&self, _around: ObjectGuid, _range: f32) -> Vec<ObjectGuid> {
        Vec::new()
    }

    fn area_name(&self, _position: &WorldPosition) -> Option<String> {
        None
    }
}
