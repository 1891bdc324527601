//! Camera Module
//!
//! Third-person orbit and first-person camera for the character rig, with
//! occlusion against the level collider. Window-system agnostic: it only deals
//! with camera state and math.

pub mod occlusion;
pub mod rig;

pub use occlusion::{Occlusion, OcclusionProbe};
pub use rig::{
    CameraMode, CameraParent, CameraPose, CameraRig,
    MOUSE_SENSITIVITY_SCALE, PITCH_LIMIT_MAX, PITCH_LIMIT_MIN,
};
