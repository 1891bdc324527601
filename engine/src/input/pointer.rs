//! Pointer Capture
//!
//! Tracks whether the pointer is captured for mouse-look and accumulates raw
//! motion between frames. The host owns the actual window; this only decides
//! what the window should be doing and flags when that changes.

/// Mouse button identifiers, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Additional mouse buttons (button 4, 5, etc.)
    Other(u16),
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    None,
    /// Capture state changed; grab/hide or release/show the cursor
    ApplyState,
}

/// Pointer capture state plus accumulated look delta.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerCapture {
    captured: bool,
    has_focus: bool,
    dirty: bool,
    delta_x: f32,
    delta_y: f32,
}

impl Default for PointerCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerCapture {
    /// Starts released; the first click or view toggle captures.
    pub fn new() -> Self {
        Self {
            captured: false,
            has_focus: true,
            dirty: false,
            delta_x: 0.0,
            delta_y: 0.0,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Whether the host still has to apply a capture change.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn request_capture(&mut self) -> PointerAction {
        if self.captured {
            return PointerAction::None;
        }
        self.captured = true;
        self.dirty = true;
        PointerAction::ApplyState
    }

    pub fn release(&mut self) -> PointerAction {
        if !self.captured {
            return PointerAction::None;
        }
        self.captured = false;
        self.dirty = true;
        self.delta_x = 0.0;
        self.delta_y = 0.0;
        PointerAction::ApplyState
    }

    /// Left click while released re-captures the pointer.
    pub fn handle_click(&mut self, button: MouseButton) -> PointerAction {
        match button {
            MouseButton::Left => self.request_capture(),
            _ => PointerAction::None,
        }
    }

    /// Focus loss drops the pending delta but remembers the capture preference.
    pub fn set_focus(&mut self, focused: bool) {
        if self.has_focus != focused {
            self.has_focus = focused;
            self.dirty = true;
            self.delta_x = 0.0;
            self.delta_y = 0.0;
        }
    }

    /// Accumulate raw motion. Ignored while not captured or unfocused.
    pub fn accumulate(&mut self, dx: f32, dy: f32) -> bool {
        if !self.should_grab() {
            return false;
        }
        self.delta_x += dx;
        self.delta_y += dy;
        true
    }

    /// Take the motion accumulated since the last call.
    pub fn consume_delta(&mut self) -> (f32, f32) {
        let delta = (self.delta_x, self.delta_y);
        self.delta_x = 0.0;
        self.delta_y = 0.0;
        delta
    }

    pub fn peek_delta(&self) -> (f32, f32) {
        (self.delta_x, self.delta_y)
    }

    /// The host should grab and hide the cursor.
    pub fn should_grab(&self) -> bool {
        self.captured && self.has_focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_released() {
        let pointer = PointerCapture::new();
        assert!(!pointer.is_captured());
        assert!(!pointer.should_grab());
    }

    #[test]
    fn test_left_click_recaptures() {
        let mut pointer = PointerCapture::new();
        assert_eq!(pointer.handle_click(MouseButton::Right), PointerAction::None);
        assert_eq!(pointer.handle_click(MouseButton::Left), PointerAction::ApplyState);
        assert!(pointer.is_captured());
        assert!(pointer.is_dirty());

        // Already captured
        pointer.clear_dirty();
        assert_eq!(pointer.handle_click(MouseButton::Left), PointerAction::None);
        assert!(!pointer.is_dirty());
    }

    #[test]
    fn test_motion_only_accumulates_while_captured() {
        let mut pointer = PointerCapture::new();
        assert!(!pointer.accumulate(5.0, 5.0));
        assert_eq!(pointer.peek_delta(), (0.0, 0.0));

        pointer.request_capture();
        pointer.accumulate(10.0, 5.0);
        pointer.accumulate(3.0, -2.0);
        assert_eq!(pointer.consume_delta(), (13.0, 3.0));
        assert_eq!(pointer.consume_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_release_clears_delta() {
        let mut pointer = PointerCapture::new();
        pointer.request_capture();
        pointer.accumulate(4.0, 4.0);
        assert_eq!(pointer.release(), PointerAction::ApplyState);
        assert_eq!(pointer.peek_delta(), (0.0, 0.0));
        assert_eq!(pointer.release(), PointerAction::None);
    }

    #[test]
    fn test_focus_loss_keeps_preference() {
        let mut pointer = PointerCapture::new();
        pointer.request_capture();
        pointer.set_focus(false);
        assert!(pointer.is_captured());
        assert!(!pointer.should_grab());
        assert!(!pointer.accumulate(1.0, 1.0));

        pointer.set_focus(true);
        assert!(pointer.should_grab());
    }
}
