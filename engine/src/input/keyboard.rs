//! Keyboard Input Module
//!
//! Key codes and the control flags the simulation reads each frame.
//! Decoupled from winit; see `handler` for translation.

/// Seconds jump must be held before it becomes a high jump.
pub const LONG_PRESS_SECONDS: f64 = 2.0;

/// Generic key codes, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    V,
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    Escape,

    /// Catch-all for unhandled keys
    Unknown,
}

/// Which jump a press asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    /// Released before the long-press threshold
    Short,
    /// Held past the long-press threshold
    High,
}

/// Debounce for the jump key: a short tap or a sustained hold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpPress {
    /// Simulation time the key went down, while it is held
    held_since: Option<f64>,
    /// The hold already produced a high jump request
    long_press_fired: bool,
}

impl JumpPress {
    pub fn is_held(&self) -> bool {
        self.held_since.is_some()
    }

    /// Seconds the key has been held at time `now`.
    pub fn held_for(&self, now: f64) -> Option<f64> {
        self.held_since.map(|t| (now - t).max(0.0))
    }
}

/// Control flags driven by forwarded input events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    /// Holds the current animation; no transitions while set
    pub lock: bool,
    /// A short jump was requested
    pub jump_short: bool,
    /// A high jump was requested
    pub jump_sustain: bool,
    jump_press: JumpPress,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump key went down at simulation time `now`. Key repeat is ignored.
    pub fn press_jump(&mut self, now: f64) {
        if self.jump_press.held_since.is_none() {
            self.jump_press = JumpPress {
                held_since: Some(now),
                long_press_fired: false,
            };
        }
    }

    /// Jump key released. A release before the long-press threshold requests
    /// a short jump.
    pub fn release_jump(&mut self, now: f64) {
        if let Some(since) = self.jump_press.held_since.take() {
            if !self.jump_press.long_press_fired && now - since < LONG_PRESS_SECONDS {
                self.jump_short = true;
            }
        }
        self.jump_press.long_press_fired = false;
    }

    /// Promote a held jump key to a high jump request once it crosses the
    /// long-press threshold. Call once per frame.
    pub fn tick_jump(&mut self, now: f64) {
        if let Some(since) = self.jump_press.held_since {
            if !self.jump_press.long_press_fired && now - since >= LONG_PRESS_SECONDS {
                self.jump_press.long_press_fired = true;
                self.jump_sustain = true;
            }
        }
    }

    pub fn jump_press(&self) -> &JumpPress {
        &self.jump_press
    }

    /// The pending jump request, high jump first.
    pub fn jump_request(&self) -> Option<JumpKind> {
        if self.jump_sustain {
            Some(JumpKind::High)
        } else if self.jump_short {
            Some(JumpKind::Short)
        } else {
            None
        }
    }

    pub fn clear_jump_requests(&mut self) {
        self.jump_short = false;
        self.jump_sustain = false;
    }

    /// The directional flags as a comparable set.
    pub fn directions(&self) -> DirectionSet {
        DirectionSet {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
        }
    }

    /// Release everything, including a held jump key.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Pressed directional keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionSet {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Axis value: +1 forward, -1 backward, 0 for both or neither.
    pub fn forward_axis(&self) -> i32 {
        self.forward as i32 - self.backward as i32
    }

    /// Axis value: +1 right, -1 left, 0 for both or neither.
    pub fn right_axis(&self) -> i32 {
        self.right as i32 - self.left as i32
    }
}
