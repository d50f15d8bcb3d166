use serde::{Deserialize, Serialize};

/// A point on a specific map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub map_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPosition {
    pub const fn new(map_id: u32, x: f32, y: f32, z: f32) -> Self {
        Self { map_id, x, y, z }
    }

    /// Squared 3D distance. Points on different maps are infinitely far apart.
    pub fn sq_distance(&self, other: &WorldPosition) -> f32 {
        if self.map_id != other.map_id {
            return f32::INFINITY;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &WorldPosition) -> f32 {
        self.sq_distance(other).sqrt()
    }

    /// Planar distance ignoring height.
    pub fn distance_2d(&self, other: &WorldPosition) -> f32 {
        if self.map_id != other.map_id {
            return f32::INFINITY;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn same_map(&self, other: &WorldPosition) -> bool {
        self.map_id == other.map_id
    }

    /// Point `fraction` of the way from `self` towards `other` (same map only).
    pub fn lerp(&self, other: &WorldPosition, fraction: f32) -> WorldPosition {
        WorldPosition {
            map_id: self.map_id,
            x: self.x + (other.x - self.x) * fraction,
            y: self.y + (other.y - self.y) * fraction,
            z: self.z + (other.z - self.z) * fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_across_maps_is_infinite() {
        let a = WorldPosition::new(0, 0.0, 0.0, 0.0);
        let b = WorldPosition::new(0, 3.0, 4.0, 0.0);
        let c = WorldPosition::new(1, 3.0, 4.0, 0.0);

        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.distance_2d(&b), 5.0);
        assert!(a.distance(&c).is_infinite());
    }

    #[test]
    fn lerp_midpoint() {
        let a = WorldPosition::new(0, 0.0, 0.0, 0.0);
        let b = WorldPosition::new(0, 10.0, 0.0, 2.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, WorldPosition::new(0, 5.0, 0.0, 1.0));
    }
}
