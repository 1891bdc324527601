//! Animation Module
//!
//! Chooses and blends the character's animation clips.
//!
//! - [`AnimationPlayer`] - Interface to whatever plays the clips
//! - [`ActionMixer`] - Built-in weight-only player
//! - [`AnimationStateMachine`] - Motion intent to animation state, with cross-fades

pub mod mixer;
pub mod state_machine;

pub use mixer::{ActionId, ActionMixer, AnimationPlayer};
pub use state_machine::{
    AnimState, AnimationRegistry, AnimationStateMachine, DEFAULT_FADE_SECONDS, MotionSnapshot,
};
