//! Input Module
//!
//! Platform-agnostic input for the character rig. The host forwards key
//! presses, mouse motion and clicks; this module turns them into the control
//! flags and look deltas the simulation reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use character_rig_engine::input::{ControlState, KeyBindings, KeyCode, InputAction};
//!
//! let bindings = KeyBindings::new();
//! let mut controls = ControlState::new();
//!
//! if bindings.get_action(KeyCode::W) == Some(InputAction::MoveForward) {
//!     controls.forward = true;
//! }
//! ```

pub mod bindings;
pub mod handler;
pub mod keyboard;
pub mod pointer;

pub use bindings::{InputAction, KeyBindings};
pub use keyboard::{ControlState, DirectionSet, JumpKind, JumpPress, KeyCode, LONG_PRESS_SECONDS};
pub use pointer::{MouseButton, PointerAction, PointerCapture};
