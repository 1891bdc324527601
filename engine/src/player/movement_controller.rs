//! Player Movement Controller
//!
//! Integrates one frame of player motion: camera-relative planar movement at
//! one of two fixed speeds, ground detection by a downward ray against the
//! level collider, and gravity while airborne.
//!
//! # Physics Model
//!
//! - Walk speed: 5.0 m/s, run speed: 10.0 m/s (times model scale)
//! - Gravity: -30.0 m/s^2 (times model scale)
//! - No acceleration ramp: the selected speed applies immediately
//! - Horizontal step is applied before the vertical step
//!
//! # Usage
//!
//! ```rust,ignore
//! use character_rig_engine::player::PlayerMovementController;
//!
//! let mut movement = PlayerMovementController::from_tuning(&tuning);
//!
//! // Each frame:
//! let step = movement.integrate(&mut player, &controls, camera_yaw, &collider, dt);
//! ```

use glam::Vec3;

use super::capsule::Player;
use crate::collision::MeshCollider;
use crate::config::{BASE_GRAVITY, BASE_RUN_SPEED, BASE_WALK_SPEED, Tuning};
use crate::input::{ControlState, DirectionSet};

/// Longest frame step the integrator accepts (seconds).
pub const MAX_FRAME_DELTA: f32 = 1.0 / 30.0;

/// Result of the downward ground probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundProbe {
    /// Ray hit within the standing distance
    Grounded { distance: f32 },
    /// Ray hit too far below, or nothing below at all
    Airborne { distance: Option<f32> },
    /// Player is moving up; the probe was skipped
    Ascending,
}

/// What one integration step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    /// Unit planar move direction (zero when no direction is held)
    pub direction: Vec3,
    /// Planar displacement applied this frame
    pub horizontal: Vec3,
    /// Vertical displacement applied this frame
    pub vertical: f32,
    pub ground: GroundProbe,
}

/// Camera-relative movement with gravity and ray-based ground detection.
#[derive(Debug, Clone)]
pub struct PlayerMovementController {
    /// Walk speed in m/s
    walk_speed: f32,
    /// Run speed in m/s
    run_speed: f32,
    /// Vertical acceleration in m/s^2 (negative is down)
    gravity: f32,
}

impl Default for PlayerMovementController {
    fn default() -> Self {
        Self {
            walk_speed: BASE_WALK_SPEED,
            run_speed: BASE_RUN_SPEED,
            gravity: BASE_GRAVITY,
        }
    }
}

impl PlayerMovementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            walk_speed: tuning.walk_speed,
            run_speed: tuning.run_speed,
            gravity: tuning.gravity,
        }
    }

    pub fn with_speeds(walk_speed: f32, run_speed: f32) -> Self {
        Self {
            walk_speed,
            run_speed,
            ..Default::default()
        }
    }

    pub fn get_walk_speed(&self) -> f32 {
        self.walk_speed
    }

    pub fn get_run_speed(&self) -> f32 {
        self.run_speed
    }

    pub fn get_gravity(&self) -> f32 {
        self.gravity
    }

    /// Speed tier for the sprint flag.
    pub fn speed(&self, sprint: bool) -> f32 {
        if sprint { self.run_speed } else { self.walk_speed }
    }

    /// Forward direction on the ground plane for a camera yaw.
    ///
    /// Yaw 0 looks toward -Z; positive yaw turns toward +X.
    pub fn get_camera_forward(camera_yaw: f32) -> Vec3 {
        Vec3::new(camera_yaw.sin(), 0.0, -camera_yaw.cos())
    }

    /// Right direction on the ground plane for a camera yaw.
    pub fn get_camera_right(camera_yaw: f32) -> Vec3 {
        let forward = Self::get_camera_forward(camera_yaw);
        Vec3::new(-forward.z, 0.0, forward.x)
    }

    /// Yaw of a look direction projected onto the ground plane.
    pub fn yaw_from_forward(forward: Vec3) -> f32 {
        forward.x.atan2(-forward.z)
    }

    /// Unit planar move direction for the held keys, rotated by the camera yaw.
    ///
    /// Opposite keys cancel; no keys gives zero.
    pub fn move_direction(directions: DirectionSet, camera_yaw: f32) -> Vec3 {
        let forward = Self::get_camera_forward(camera_yaw);
        let right = Self::get_camera_right(camera_yaw);
        let dir = forward * directions.forward_axis() as f32
            + right * directions.right_axis() as f32;
        dir.normalize_or_zero()
    }

    /// Downward ray from the player position.
    ///
    /// A hit within the capsule's standing distance grounds the player and
    /// zeroes vertical velocity. On an incline the standing distance grows to
    /// where the capsule rests on that surface; anything else applies gravity. While the
    /// player is moving up the ray is not cast, so a takeoff is never undone.
    pub fn detect_ground(&self, player: &mut Player, collider: &MeshCollider, dt: f32) -> GroundProbe {
        if player.velocity.y > 0.0 {
            player.on_ground = false;
            player.velocity.y += self.gravity * dt;
            return GroundProbe::Ascending;
        }

        let hit = collider.raycast(player.position, Vec3::NEG_Y, f32::MAX);
        match hit {
            Some(hit) if hit.distance <= player.capsule.ground_threshold(hit.normal) => {
                player.on_ground = true;
                player.velocity.y = 0.0;
                GroundProbe::Grounded {
                    distance: hit.distance,
                }
            }
            other => {
                player.on_ground = false;
                player.velocity.y += self.gravity * dt;
                GroundProbe::Airborne {
                    distance: other.map(|h| h.distance),
                }
            }
        }
    }

    /// Advance the player by one frame. `dt` is clamped to [`MAX_FRAME_DELTA`].
    pub fn integrate(
        &self,
        player: &mut Player,
        controls: &ControlState,
        camera_yaw: f32,
        collider: &MeshCollider,
        dt: f32,
    ) -> MotionStep {
        let dt = dt.clamp(0.0, MAX_FRAME_DELTA);

        let ground = self.detect_ground(player, collider, dt);

        let direction = Self::move_direction(controls.directions(), camera_yaw);
        let horizontal = direction * self.speed(controls.sprint) * dt;
        player.position += horizontal;

        let vertical = player.velocity.y * dt;
        player.position.y += vertical;

        MotionStep {
            direction,
            horizontal,
            vertical,
            ground,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::CapsuleShape;
    use crate::scene::SceneMesh;
    use std::f32::consts::FRAC_PI_2;

    fn floor_collider() -> MeshCollider {
        let floor = SceneMesh::floor("floor", -1.5, 50.0);
        MeshCollider::from_meshes([&floor]).unwrap()
    }

    fn player_at(position: Vec3) -> Player {
        Player::new(position, CapsuleShape::new(0.5, 1.0))
    }

    fn dirs(forward: bool, backward: bool, left: bool, right: bool) -> DirectionSet {
        DirectionSet {
            forward,
            backward,
            left,
            right,
        }
    }

    #[test]
    fn test_default_controller() {
        let controller = PlayerMovementController::new();
        assert_eq!(controller.get_walk_speed(), BASE_WALK_SPEED);
        assert_eq!(controller.get_run_speed(), BASE_RUN_SPEED);
        assert_eq!(controller.get_gravity(), BASE_GRAVITY);
    }

    #[test]
    fn test_speed_tiers() {
        let controller = PlayerMovementController::with_speeds(3.0, 8.0);
        assert_eq!(controller.speed(false), 3.0);
        assert_eq!(controller.speed(true), 8.0);
    }

    #[test]
    fn test_move_direction_at_zero_yaw() {
        let d = PlayerMovementController::move_direction(dirs(true, false, false, false), 0.0);
        assert!((d - Vec3::NEG_Z).length() < 1e-6);
        let d = PlayerMovementController::move_direction(dirs(false, true, false, false), 0.0);
        assert!((d - Vec3::Z).length() < 1e-6);
        let d = PlayerMovementController::move_direction(dirs(false, false, true, false), 0.0);
        assert!((d - Vec3::NEG_X).length() < 1e-6);
        let d = PlayerMovementController::move_direction(dirs(false, false, false, true), 0.0);
        assert!((d - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_move_direction_no_input_or_cancelled() {
        assert_eq!(
            PlayerMovementController::move_direction(DirectionSet::default(), 1.0),
            Vec3::ZERO
        );
        assert_eq!(
            PlayerMovementController::move_direction(dirs(true, true, true, true), 1.0),
            Vec3::ZERO
        );
    }

    #[test]
    fn test_move_direction_diagonal_is_normalized() {
        let d = PlayerMovementController::move_direction(dirs(true, false, false, true), 0.3);
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert_eq!(d.y, 0.0);
    }

    #[test]
    fn test_move_direction_follows_camera_yaw() {
        // Camera looking toward +X
        let d = PlayerMovementController::move_direction(dirs(true, false, false, false), FRAC_PI_2);
        assert!((d - Vec3::X).length() < 1e-5);
        let d = PlayerMovementController::move_direction(dirs(false, false, false, true), FRAC_PI_2);
        assert!((d - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_yaw_from_forward_round_trip() {
        for yaw in [-2.0f32, -0.5, 0.0, 0.7, 2.5] {
            let forward = PlayerMovementController::get_camera_forward(yaw);
            let back = PlayerMovementController::yaw_from_forward(forward);
            assert!((back - yaw).abs() < 1e-5, "{yaw} -> {back}");
        }
    }

    #[test]
    fn test_ground_boundary_is_inclusive() {
        let controller = PlayerMovementController::new();
        let collider = floor_collider();

        // Exactly 0.75 * height (1.5) above the floor
        let mut player = player_at(Vec3::new(0.3, 0.0, 0.2));
        player.velocity.y = -2.0;
        let probe = controller.detect_ground(&mut player, &collider, 1.0 / 60.0);
        assert!(matches!(probe, GroundProbe::Grounded { .. }));
        assert!(player.on_ground);
        assert_eq!(player.velocity.y, 0.0);

        // One unit higher
        let mut player = player_at(Vec3::new(0.3, 1.0, 0.2));
        let probe = controller.detect_ground(&mut player, &collider, 1.0 / 60.0);
        assert!(matches!(probe, GroundProbe::Airborne { distance: Some(_) }));
        assert!(!player.on_ground);
        assert!(player.velocity.y < 0.0);
    }

    #[test]
    fn test_no_ground_below_is_airborne() {
        let controller = PlayerMovementController::new();
        let collider = floor_collider();
        let mut player = player_at(Vec3::new(200.0, 0.0, 0.0));
        let probe = controller.detect_ground(&mut player, &collider, 0.1);
        assert_eq!(probe, GroundProbe::Airborne { distance: None });
        assert!((player.velocity.y - BASE_GRAVITY * 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_ascending_skips_ground_ray() {
        let controller = PlayerMovementController::new();
        let collider = floor_collider();
        let mut player = player_at(Vec3::new(0.3, 0.0, 0.2));
        player.velocity.y = 10.0;
        let probe = controller.detect_ground(&mut player, &collider, 0.01);
        assert_eq!(probe, GroundProbe::Ascending);
        assert!(player.velocity.y > 9.0);
        assert!(!player.on_ground);
    }

    #[test]
    fn test_integrate_walk_on_ground() {
        let controller = PlayerMovementController::new();
        let collider = floor_collider();
        let mut player = player_at(Vec3::new(0.3, 0.0, 0.2));
        let mut controls = ControlState::new();
        controls.forward = true;

        let step = controller.integrate(&mut player, &controls, 0.0, &collider, 0.02);
        assert!((step.horizontal - Vec3::new(0.0, 0.0, -0.1)).length() < 1e-6);
        assert_eq!(step.vertical, 0.0);
        assert!(player.on_ground);
    }

    #[test]
    fn test_integrate_clamps_delta() {
        let controller = PlayerMovementController::new();
        let collider = floor_collider();
        let mut player = player_at(Vec3::new(0.3, 0.0, 0.2));
        let mut controls = ControlState::new();
        controls.right = true;
        controls.sprint = true;

        let step = controller.integrate(&mut player, &controls, 0.0, &collider, 1.0);
        assert!((step.horizontal.x - BASE_RUN_SPEED * MAX_FRAME_DELTA).abs() < 1e-5);
    }
}
