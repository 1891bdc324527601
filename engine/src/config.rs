//! Controller Configuration
//!
//! Everything the host can tune, loadable from JSON. `Default` returns the
//! documented values; unset optional physics fields are resolved by
//! [`Tuning::resolve`] against the base constants multiplied by the player
//! model scale.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::RigError;
use crate::player::CapsuleShape;

/// Gravity applied while airborne (m/s^2, negative is down)
pub const BASE_GRAVITY: f32 = -30.0;

/// Upward velocity of a short jump (m/s)
pub const BASE_JUMP_VELOCITY: f32 = 10.0;

/// Upward velocity of a high (long-press) jump (m/s)
pub const BASE_HIGH_JUMP_VELOCITY: f32 = 16.0;

/// Walk speed (m/s)
pub const BASE_WALK_SPEED: f32 = 5.0;

/// Run speed (m/s)
pub const BASE_RUN_SPEED: f32 = 10.0;

/// Capsule radius (m)
pub const BASE_CAPSULE_RADIUS: f32 = 0.5;

/// Length of the capsule's inner segment (m)
pub const BASE_CAPSULE_SEGMENT: f32 = 1.0;

/// Mouse sensitivity used when the config does not set one
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 5.0;

/// Animation names the character asset is expected to provide.
///
/// The first four are required; the directional ones are only used in
/// first-person view and fall back to walking when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNames {
    pub idle: String,
    pub walking: String,
    pub running: String,
    pub jumping: String,
    pub walking_backward: Option<String>,
    pub left_walking: Option<String>,
    pub right_walking: Option<String>,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            idle: "Idle".to_string(),
            walking: "Walking".to_string(),
            running: "Running".to_string(),
            jumping: "Jumping".to_string(),
            walking_backward: None,
            left_walking: None,
            right_walking: None,
        }
    }
}

/// Where to load the character from and how big it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerModelConfig {
    pub url: String,
    /// Uniform model scale; also scales every base physics constant
    pub scale: f32,
    pub clips: ClipNames,
}

impl Default for PlayerModelConfig {
    fn default() -> Self {
        Self {
            url: "models/character.glb".to_string(),
            scale: 1.0,
            clips: ClipNames::default(),
        }
    }
}

/// Camera tunables, in unscaled metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Fixed blend factor for occlusion easing (0 = frozen, 1 = snap)
    pub follow_smoothing: f32,
    /// Gap kept between the camera and an occluding surface
    pub safety_epsilon: f32,
    pub min_follow_distance: f32,
    pub max_follow_distance: f32,
    /// Height of the orbit target above the player position
    pub target_height: f32,
    /// Initial orbit polar angle (radians from straight up)
    pub default_polar: f32,
    /// Camera offset from the player position in first-person view
    pub first_person_offset: Vec3,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            follow_smoothing: 0.25,
            safety_epsilon: 0.1,
            min_follow_distance: 1.0,
            max_follow_distance: 5.0,
            target_height: 0.5,
            default_polar: 1.2,
            first_person_offset: Vec3::new(0.0, 0.2, 0.0),
        }
    }
}

impl CameraSettings {
    /// Copy with every distance multiplied by `scale`.
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            safety_epsilon: self.safety_epsilon * scale,
            min_follow_distance: self.min_follow_distance * scale,
            max_follow_distance: self.max_follow_distance * scale,
            target_height: self.target_height * scale,
            first_person_offset: self.first_person_offset * scale,
            ..self.clone()
        }
    }
}

/// Top-level configuration passed to `CharacterController::init`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub initial_position: Vec3,
    pub mouse_sensitivity: f32,
    pub player_model: PlayerModelConfig,
    pub gravity: Option<f32>,
    /// Short jump takeoff velocity
    pub jump_height: Option<f32>,
    /// High jump takeoff velocity
    pub high_jump_height: Option<f32>,
    pub walk_speed: Option<f32>,
    pub run_speed: Option<f32>,
    pub camera: CameraSettings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            initial_position: Vec3::ZERO,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            player_model: PlayerModelConfig::default(),
            gravity: None,
            jump_height: None,
            high_jump_height: None,
            walk_speed: None,
            run_speed: None,
            camera: CameraSettings::default(),
        }
    }
}

impl ControllerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, RigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, RigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make the simulation meaningless.
    pub fn validate(&self) -> Result<(), RigError> {
        if !(self.player_model.scale > 0.0) {
            return Err(RigError::InvalidConfig(format!(
                "player_model.scale must be positive, got {}",
                self.player_model.scale
            )));
        }
        if !(self.mouse_sensitivity >= 0.0) {
            return Err(RigError::InvalidConfig(format!(
                "mouse_sensitivity must be non-negative, got {}",
                self.mouse_sensitivity
            )));
        }
        let cam = &self.camera;
        if !(0.0..=1.0).contains(&cam.follow_smoothing) {
            return Err(RigError::InvalidConfig(format!(
                "camera.follow_smoothing must be in [0, 1], got {}",
                cam.follow_smoothing
            )));
        }
        if !(cam.min_follow_distance > 0.0 && cam.min_follow_distance <= cam.max_follow_distance)
        {
            return Err(RigError::InvalidConfig(format!(
                "camera follow distances must satisfy 0 < min <= max, got {} / {}",
                cam.min_follow_distance, cam.max_follow_distance
            )));
        }
        Ok(())
    }
}

/// Resolved physics parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub high_jump_velocity: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub capsule: CapsuleShape,
    pub scale: f32,
}

impl Tuning {
    /// Fill unset values with base constants multiplied by the model scale.
    pub fn resolve(config: &ControllerConfig) -> Self {
        let scale = config.player_model.scale;
        Self {
            gravity: config.gravity.unwrap_or(BASE_GRAVITY * scale),
            jump_velocity: config.jump_height.unwrap_or(BASE_JUMP_VELOCITY * scale),
            high_jump_velocity: config
                .high_jump_height
                .unwrap_or(BASE_HIGH_JUMP_VELOCITY * scale),
            walk_speed: config.walk_speed.unwrap_or(BASE_WALK_SPEED * scale),
            run_speed: config.run_speed.unwrap_or(BASE_RUN_SPEED * scale),
            capsule: CapsuleShape::new(
                BASE_CAPSULE_RADIUS * scale,
                BASE_CAPSULE_SEGMENT * scale,
            ),
            scale,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::resolve(&ControllerConfig::default())
    }
}
