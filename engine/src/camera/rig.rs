//! Camera Rig Module
//!
//! Player-centric camera with third-person and first-person modes.
//!
//! - **Third-person**: orbit around a target point above the player, driven
//!   by spherical coordinates (azimuth, polar, distance). The distance is
//!   managed by occlusion against the level collider.
//! - **First-person**: camera sits at a fixed offset on the player. Mouse X
//!   turns the player, mouse Y pitches the camera.
//!
//! Toggling the view re-parents the camera and snaps it to the canonical
//! pose of the new mode. This is window-system agnostic; raw mouse deltas are
//! passed in by the controller.

use std::f32::consts::PI;

use glam::{Mat3, Quat, Vec3};
use log::debug;

use super::occlusion::{self, OcclusionProbe};
use crate::collision::MeshCollider;
use crate::config::CameraSettings;
use crate::player::Player;

/// Radians per pixel per unit of configured mouse sensitivity.
pub const MOUSE_SENSITIVITY_SCALE: f32 = 0.0004;

/// First-person pitch limits: about -74 and +80 degrees
pub const PITCH_LIMIT_MIN: f32 = -1.3;
pub const PITCH_LIMIT_MAX: f32 = 1.4;

/// Keeps the orbit away from straight up and straight down.
pub const POLAR_MARGIN: f32 = 0.1;

/// Camera mode - determines where the camera sits relative to the player
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CameraMode {
    /// Orbit camera behind and above the player
    #[default]
    ThirdPerson,
    /// Camera at the player's head
    FirstPerson,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
        }
    }
}

/// What the camera's transform is expressed against.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CameraParent {
    Scene,
    Player,
}

/// World-space camera transform handed back on detach.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub mode: CameraMode,
}

/// Camera state for both view modes.
#[derive(Clone, Debug)]
pub struct CameraRig {
    mode: CameraMode,
    parent: CameraParent,
    settings: CameraSettings,
    /// Mouse look sensitivity in radians per pixel
    sensitivity: f32,
    /// Orbit angle around Y (radians); 0 puts the camera on +Z of the target
    azimuth: f32,
    /// Orbit angle from straight up (radians)
    polar: f32,
    /// Current follow distance (third-person)
    distance: f32,
    /// First-person pitch (radians), positive looks up
    pitch: f32,
    target: Vec3,
    position: Vec3,
    rotation: Quat,
    last_probe: Option<OcclusionProbe>,
}

impl CameraRig {
    /// `mouse_sensitivity` is the configured unitless value (default 5).
    pub fn new(settings: CameraSettings, mouse_sensitivity: f32) -> Self {
        let polar = clamp_polar(settings.default_polar);
        let distance = settings.max_follow_distance;
        Self {
            mode: CameraMode::ThirdPerson,
            parent: CameraParent::Scene,
            sensitivity: mouse_sensitivity * MOUSE_SENSITIVITY_SCALE,
            azimuth: 0.0,
            polar,
            distance,
            pitch: 0.0,
            target: Vec3::ZERO,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            last_probe: None,
            settings,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn parent(&self) -> CameraParent {
        self.parent
    }

    pub fn is_first_person(&self) -> bool {
        self.mode == CameraMode::FirstPerson
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Orbit target (third-person) in world space.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Occlusion result from the last third-person follow.
    pub fn last_probe(&self) -> Option<&OcclusionProbe> {
        self.last_probe.as_ref()
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            rotation: self.rotation,
            mode: self.mode,
        }
    }

    /// Look direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Yaw of the look direction projected onto the ground plane, used to
    /// rotate movement input.
    pub fn movement_yaw(&self) -> f32 {
        let forward = self.forward();
        forward.x.atan2(-forward.z)
    }

    /// Apply a raw mouse delta (pixels).
    ///
    /// Positive `dx` looks right, positive `dy` looks down. The view is
    /// re-placed immediately so movement this frame uses the new heading.
    pub fn apply_mouse_delta(&mut self, player: &mut Player, dx: f32, dy: f32) {
        match self.mode {
            CameraMode::FirstPerson => {
                player.set_yaw(player.yaw() + dx * self.sensitivity);
                self.pitch = (self.pitch - dy * self.sensitivity).clamp(PITCH_LIMIT_MIN, PITCH_LIMIT_MAX);
            }
            CameraMode::ThirdPerson => {
                self.azimuth -= dx * self.sensitivity;
                self.polar = clamp_polar(self.polar - dy * self.sensitivity);
            }
        }
        self.place(player);
    }

    /// Switch view mode and snap to its canonical pose.
    pub fn toggle(&mut self, player: &Player) -> CameraMode {
        self.mode = self.mode.toggled();
        self.snap(player);
        debug!("Camera mode: {:?}", self.mode);
        self.mode
    }

    /// Re-parent and reset the mode's free parameters.
    ///
    /// Third-person lands behind the player at the maximum follow distance;
    /// first-person looks level along the player's heading.
    pub fn snap(&mut self, player: &Player) {
        match self.mode {
            CameraMode::FirstPerson => {
                self.parent = CameraParent::Player;
                self.pitch = 0.0;
            }
            CameraMode::ThirdPerson => {
                self.parent = CameraParent::Scene;
                self.azimuth = -player.yaw();
                self.polar = clamp_polar(self.settings.default_polar);
                self.distance = self.settings.max_follow_distance;
            }
        }
        self.last_probe = None;
        self.place(player);
    }

    /// Per-frame follow. In third-person the distance is eased against the
    /// collider first.
    pub fn follow(&mut self, player: &Player, collider: Option<&MeshCollider>) {
        if self.mode == CameraMode::ThirdPerson {
            self.target = self.orbit_target(player);
            if let Some(collider) = collider {
                let direction = self.orbit_direction();
                let probe = occlusion::probe(collider, self.target, direction, self.distance, &self.settings);
                self.distance = occlusion::ease(self.distance, probe.desired, self.settings.follow_smoothing);
                self.last_probe = Some(probe);
            }
        }
        self.place(player);
    }

    /// Leave the player: the camera stays where it is, parented to the scene.
    pub fn detach(&mut self) -> CameraPose {
        self.parent = CameraParent::Scene;
        self.pose()
    }

    fn orbit_target(&self, player: &Player) -> Vec3 {
        player.position + Vec3::new(0.0, self.settings.target_height, 0.0)
    }

    /// Unit vector from the orbit target toward the camera.
    fn orbit_direction(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a)
    }

    fn place(&mut self, player: &Player) {
        match self.mode {
            CameraMode::FirstPerson => {
                self.target = player.position;
                self.position = player.position + player.orientation * self.settings.first_person_offset;
                self.rotation = player.orientation * Quat::from_rotation_x(self.pitch);
            }
            CameraMode::ThirdPerson => {
                self.target = self.orbit_target(player);
                self.position = self.target + self.orbit_direction() * self.distance;
                self.rotation = look_rotation(self.target - self.position);
            }
        }
    }
}

fn clamp_polar(polar: f32) -> f32 {
    polar.clamp(POLAR_MARGIN, PI - POLAR_MARGIN)
}

/// Rotation whose -Z axis points along `forward`, keeping +Y up.
fn look_rotation(forward: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    let right = forward.cross(Vec3::Y).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::CapsuleShape;
    use crate::scene::SceneMesh;
    use std::f32::consts::FRAC_PI_2;

    fn player() -> Player {
        Player::new(Vec3::new(1.0, 2.0, 3.0), CapsuleShape::new(0.5, 1.0))
    }

    fn rig() -> CameraRig {
        CameraRig::new(CameraSettings::default(), 5.0)
    }

    #[test]
    fn test_default_rig() {
        let rig = rig();
        assert_eq!(rig.mode(), CameraMode::ThirdPerson);
        assert!((rig.sensitivity() - 0.002).abs() < 1e-7);
        assert_eq!(rig.distance(), 5.0);
    }

    #[test]
    fn test_third_person_sits_behind_and_above() {
        let mut rig = rig();
        let p = player();
        rig.follow(&p, None);
        let offset = rig.position() - rig.target();
        assert!((offset.length() - 5.0).abs() < 1e-4);
        assert!(offset.z > 0.0);
        assert!(offset.y > 0.0);
        assert!((rig.target() - (p.position + Vec3::new(0.0, 0.5, 0.0))).length() < 1e-6);

        // Looks at the target
        let to_target = (rig.target() - rig.position()).normalize();
        assert!((rig.forward() - to_target).length() < 1e-4);
        assert!(rig.movement_yaw().abs() < 1e-5);
    }

    #[test]
    fn test_third_person_mouse_orbits() {
        let mut rig = rig();
        let mut p = player();
        rig.apply_mouse_delta(&mut p, 100.0, 0.0);
        rig.follow(&p, None);
        // Dragging right turns the view right
        assert!(rig.movement_yaw() > 0.0);
        assert_eq!(p.yaw(), 0.0);
    }

    #[test]
    fn test_polar_clamped_away_from_poles() {
        let mut rig = rig();
        let mut p = player();
        rig.apply_mouse_delta(&mut p, 0.0, 1.0e6);
        assert!((rig.polar() - POLAR_MARGIN).abs() < 1e-6);
        rig.apply_mouse_delta(&mut p, 0.0, -1.0e6);
        assert!((rig.polar() - (PI - POLAR_MARGIN)).abs() < 1e-6);
    }

    #[test]
    fn test_first_person_mouse_turns_player_and_pitches() {
        let mut rig = rig();
        let mut p = player();
        rig.toggle(&p);
        assert_eq!(rig.parent(), CameraParent::Player);

        rig.apply_mouse_delta(&mut p, 500.0, -100.0);
        assert!((p.yaw() - 1.0).abs() < 1e-4);
        assert!((rig.pitch() - 0.2).abs() < 1e-5);

        rig.apply_mouse_delta(&mut p, 0.0, -1.0e6);
        assert_eq!(rig.pitch(), PITCH_LIMIT_MAX);
        rig.apply_mouse_delta(&mut p, 0.0, 1.0e6);
        assert_eq!(rig.pitch(), PITCH_LIMIT_MIN);
    }

    #[test]
    fn test_first_person_view_follows_heading() {
        let mut rig = rig();
        let mut p = player();
        p.set_yaw(FRAC_PI_2);
        rig.toggle(&p);
        rig.follow(&p, None);
        assert!((rig.forward() - Vec3::X).length() < 1e-4);
        assert!((rig.position() - (p.position + Vec3::new(0.0, 0.2, 0.0))).length() < 1e-5);
        assert!((rig.movement_yaw() - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_toggle_back_snaps_behind_player() {
        let mut rig = rig();
        let mut p = player();
        rig.apply_mouse_delta(&mut p, 300.0, 200.0);
        rig.toggle(&p);
        p.set_yaw(0.5);
        rig.toggle(&p);
        assert_eq!(rig.mode(), CameraMode::ThirdPerson);
        assert_eq!(rig.parent(), CameraParent::Scene);
        assert_eq!(rig.distance(), 5.0);
        assert!((rig.movement_yaw() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_occlusion_eases_toward_hit() {
        let mut rig = rig();
        let p = Player::new(Vec3::new(0.1, 0.0, 0.0), CapsuleShape::new(0.5, 1.0));
        // Wall just behind the player, across the orbit
        let wall = SceneMesh::cuboid("wall", Vec3::new(0.0, 0.0, 3.0), Vec3::new(10.0, 10.0, 0.5));
        let collider = MeshCollider::from_meshes([&wall]).unwrap();

        let start = rig.distance();
        rig.follow(&p, Some(&collider));
        assert!(rig.distance() < start);
        assert!(matches!(
            rig.last_probe().map(|p| p.occlusion),
            Some(occlusion::Occlusion::Blocked { .. })
        ));

        for _ in 0..200 {
            rig.follow(&p, Some(&collider));
        }
        let desired = rig.last_probe().unwrap().desired;
        assert!((rig.distance() - desired).abs() < 1e-3);
        assert!(desired >= rig.settings().min_follow_distance);
    }

    #[test]
    fn test_detach_keeps_pose() {
        let mut rig = rig();
        let p = player();
        rig.toggle(&p);
        let before = rig.position();
        let pose = rig.detach();
        assert_eq!(pose.position, before);
        assert_eq!(rig.parent(), CameraParent::Scene);
    }
}
