//! Deferred Jump
//!
//! A jump request does not change velocity immediately: the takeoff is
//! scheduled on the simulation clock so the jump animation can wind up first.
//! At most one takeoff is pending. The scheduler is polled each frame and can
//! be cancelled on reset or teardown.

use log::debug;

use crate::input::JumpKind;

/// Delay between a jump request and the velocity change (seconds).
pub const JUMP_TAKEOFF_DELAY: f64 = 0.25;

/// A takeoff waiting for its time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingJump {
    pub kind: JumpKind,
    pub fire_at: f64,
}

/// Record of the last takeoff that was actually applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredJump {
    pub kind: JumpKind,
    pub velocity: f32,
    pub at: f64,
}

/// Holds the single pending takeoff.
#[derive(Debug, Clone, Default)]
pub struct JumpScheduler {
    pending: Option<PendingJump>,
    last_fired: Option<FiredJump>,
}

impl JumpScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a takeoff at `now + JUMP_TAKEOFF_DELAY`.
    ///
    /// Returns `false` (and schedules nothing) if one is already pending.
    pub fn schedule(&mut self, kind: JumpKind, now: f64) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let fire_at = now + JUMP_TAKEOFF_DELAY;
        debug!("Jump scheduled: {:?} at t={:.3}", kind, fire_at);
        self.pending = Some(PendingJump { kind, fire_at });
        true
    }

    /// Take the pending jump if its time has come.
    pub fn poll(&mut self, now: f64) -> Option<JumpKind> {
        match self.pending {
            Some(pending) if now >= pending.fire_at => {
                self.pending = None;
                Some(pending.kind)
            }
            _ => None,
        }
    }

    /// Drop the pending takeoff, if any.
    pub fn cancel(&mut self) -> Option<PendingJump> {
        let cancelled = self.pending.take();
        if let Some(p) = &cancelled {
            debug!("Jump cancelled: {:?}", p.kind);
        }
        cancelled
    }

    pub fn pending(&self) -> Option<&PendingJump> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn record_fired(&mut self, kind: JumpKind, velocity: f32, at: f64) {
        debug!("Jump fired: {:?} vy={:.2} at t={:.3}", kind, velocity, at);
        self.last_fired = Some(FiredJump { kind, velocity, at });
    }

    pub fn last_fired(&self) -> Option<&FiredJump> {
        self.last_fired.as_ref()
    }
}
