//! Input Handler
//!
//! Translates winit events into the engine's own input types so the rest of
//! the crate never depends on the windowing system.

use winit::event::{ElementState, MouseButton as WinitMouseButton};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use super::{KeyCode, MouseButton};

/// Map a winit key code to the engine key code.
pub fn translate_key(key: WinitKeyCode) -> KeyCode {
    match key {
        WinitKeyCode::KeyW => KeyCode::W,
        WinitKeyCode::KeyA => KeyCode::A,
        WinitKeyCode::KeyS => KeyCode::S,
        WinitKeyCode::KeyD => KeyCode::D,
        WinitKeyCode::KeyV => KeyCode::V,
        WinitKeyCode::Space => KeyCode::Space,
        WinitKeyCode::ShiftLeft => KeyCode::ShiftLeft,
        WinitKeyCode::ShiftRight => KeyCode::ShiftRight,
        WinitKeyCode::ControlLeft => KeyCode::ControlLeft,
        WinitKeyCode::ControlRight => KeyCode::ControlRight,
        WinitKeyCode::Escape => KeyCode::Escape,
        _ => KeyCode::Unknown,
    }
}

/// Map a physical key from a `KeyboardInput` event.
pub fn translate_physical_key(key: PhysicalKey) -> KeyCode {
    match key {
        PhysicalKey::Code(code) => translate_key(code),
        PhysicalKey::Unidentified(_) => KeyCode::Unknown,
    }
}

pub fn translate_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(n) => MouseButton::Other(n),
    }
}

pub fn is_pressed(state: ElementState) -> bool {
    state == ElementState::Pressed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_movement_keys() {
        assert_eq!(translate_key(WinitKeyCode::KeyW), KeyCode::W);
        assert_eq!(translate_key(WinitKeyCode::Space), KeyCode::Space);
        assert_eq!(translate_key(WinitKeyCode::ShiftLeft), KeyCode::ShiftLeft);
        assert_eq!(translate_key(WinitKeyCode::Escape), KeyCode::Escape);
        assert_eq!(translate_key(WinitKeyCode::KeyQ), KeyCode::Unknown);
    }

    #[test]
    fn test_translate_physical_key() {
        assert_eq!(
            translate_physical_key(PhysicalKey::Code(WinitKeyCode::KeyV)),
            KeyCode::V
        );
    }

    #[test]
    fn test_translate_mouse_button() {
        assert_eq!(translate_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(
            translate_mouse_button(WinitMouseButton::Other(7)),
            MouseButton::Other(7)
        );
    }

    #[test]
    fn test_is_pressed() {
        assert!(is_pressed(ElementState::Pressed));
        assert!(!is_pressed(ElementState::Released));
    }
}
