//! Player Module
//!
//! The simulated character and everything that moves it each frame.
//!
//! # Components
//!
//! - [`Player`] / [`CapsuleShape`] - Character state and collision shape
//! - [`PlayerMovementController`] - Camera-relative movement, gravity and ground probe
//! - [`JumpScheduler`] - Deferred takeoff on the simulation clock
//! - [`resolve`] - Capsule depenetration against the level collider

pub mod capsule;
pub mod jump;
pub mod movement_controller;
pub mod resolver;

pub use capsule::{CapsuleShape, GROUND_PROBE_RATIO, MIN_GROUND_NORMAL_Y, Player};
pub use jump::{FiredJump, JUMP_TAKEOFF_DELAY, JumpScheduler, PendingJump};
pub use movement_controller::{GroundProbe, MAX_FRAME_DELTA, MotionStep, PlayerMovementController};
pub use resolver::{RESOLVE_SKIN, Resolution, resolve};
