//! Player entity and capsule shape

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::collision::Segment;

/// Fraction of the capsule height within which a downward ray counts as ground.
pub const GROUND_PROBE_RATIO: f32 = 0.75;

/// Smallest surface normal Y that can still be stood on (60 degree incline).
pub const MIN_GROUND_NORMAL_Y: f32 = 0.5;

/// Capsule in player-local space. The segment runs from the player position
/// (the top sphere centre) straight down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    pub segment_start: Vec3,
    pub segment_end: Vec3,
}

impl CapsuleShape {
    pub fn new(radius: f32, segment_length: f32) -> Self {
        Self {
            radius,
            segment_start: Vec3::ZERO,
            segment_end: Vec3::new(0.0, -segment_length, 0.0),
        }
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_start.distance(self.segment_end)
    }

    /// Full height including both hemispheres.
    pub fn height(&self) -> f32 {
        self.segment_length() + 2.0 * self.radius
    }

    /// Distance from the player position down to the bottom of the capsule.
    pub fn foot_offset(&self) -> f32 {
        self.segment_start.y - self.segment_end.y + self.radius
    }

    /// Longest downward ray hit that still counts as standing.
    pub fn ground_probe_distance(&self) -> f32 {
        self.height() * GROUND_PROBE_RATIO
    }

    /// Ray distance from the player position down to a surface with `normal`
    /// when the bottom sphere rests on it. Zero for surfaces too steep to
    /// stand on.
    pub fn resting_distance(&self, normal: Vec3) -> f32 {
        if normal.y < MIN_GROUND_NORMAL_Y {
            return 0.0;
        }
        self.segment_start.y - self.segment_end.y + self.radius / normal.y
    }

    /// Ground threshold for a ray hit on a surface with `normal`.
    pub fn ground_threshold(&self, normal: Vec3) -> f32 {
        self.ground_probe_distance().max(self.resting_distance(normal))
    }
}

/// The simulated character.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub capsule: CapsuleShape,
    pub on_ground: bool,
}

impl Player {
    pub fn new(position: Vec3, capsule: CapsuleShape) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            capsule,
            on_ground: false,
        }
    }

    pub fn world_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Capsule axis in world space.
    pub fn world_segment(&self) -> Segment {
        let world = self.world_transform();
        Segment::new(
            world.transform_point3(self.capsule.segment_start),
            world.transform_point3(self.capsule.segment_end),
        )
    }

    /// Heading in radians; 0 faces -Z, positive turns toward +X.
    pub fn yaw(&self) -> f32 {
        -self.orientation.to_euler(EulerRot::YXZ).0
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.orientation = Quat::from_rotation_y(-yaw);
    }

    /// Unit facing direction on the ground plane.
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw();
        Vec3::new(yaw.sin(), 0.0, -yaw.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_capsule_geometry() {
        let capsule = CapsuleShape::new(0.5, 1.0);
        assert_eq!(capsule.segment_end, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(capsule.height(), 2.0);
        assert_eq!(capsule.foot_offset(), 1.5);
        assert_eq!(capsule.ground_probe_distance(), 1.5);
    }

    #[test]
    fn test_ground_threshold_on_slopes() {
        let capsule = CapsuleShape::new(0.5, 1.0);
        assert_eq!(capsule.ground_threshold(Vec3::Y), 1.5);

        let angle = 20f32.to_radians();
        let ramp = Vec3::new(0.0, angle.cos(), angle.sin());
        let expected = 1.0 + 0.5 / angle.cos();
        assert!((capsule.ground_threshold(ramp) - expected).abs() < 1e-6);

        // Too steep to stand on: only the flat threshold applies
        let cliff = Vec3::new(0.0, 0.3, 0.95).normalize();
        assert_eq!(capsule.ground_threshold(cliff), 1.5);
    }

    #[test]
    fn test_world_segment_follows_position() {
        let player = Player::new(Vec3::new(1.0, 2.0, 3.0), CapsuleShape::new(0.5, 1.0));
        let segment = player.world_segment();
        assert_eq!(segment.start, Vec3::new(1.0, 2.0, 3.0));
        assert!((segment.end - Vec3::new(1.0, 1.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_yaw_round_trip_and_forward() {
        let mut player = Player::new(Vec3::ZERO, CapsuleShape::new(0.5, 1.0));
        assert!((player.forward() - Vec3::NEG_Z).length() < 1e-6);

        player.set_yaw(FRAC_PI_2);
        assert!((player.yaw() - FRAC_PI_2).abs() < 1e-5);
        assert!((player.forward() - Vec3::X).length() < 1e-5);
        // Orientation and heading agree
        assert!((player.orientation * Vec3::NEG_Z - Vec3::X).length() < 1e-5);
    }
}
