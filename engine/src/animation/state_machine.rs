//! Animation state machine
//!
//! Picks the character's animation from motion intent and cross-fades to it.
//! The controller feeds a [`MotionSnapshot`] every frame; a transition is
//! evaluated only when the snapshot changes. The lock flag freezes the
//! current state while held. Jumping is a one-shot entered explicitly and
//! left when its clip finishes.

use std::collections::HashMap;

use log::debug;

use super::mixer::{ActionId, ActionMixer, AnimationPlayer};
use crate::assets::CharacterAsset;
use crate::config::ClipNames;
use crate::error::RigError;
use crate::input::DirectionSet;

/// Default cross-fade window in seconds.
pub const DEFAULT_FADE_SECONDS: f32 = 0.18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimState {
    Idle,
    Walking,
    Running,
    WalkingBackward,
    LeftWalking,
    RightWalking,
    Jumping,
}

/// Inputs that drive state selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionSnapshot {
    pub directions: DirectionSet,
    pub sprint: bool,
    pub on_ground: bool,
    pub lock: bool,
    pub first_person: bool,
}

/// Semantic state to registered action, plus the current state.
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    actions: HashMap<AnimState, ActionId>,
    current: Option<AnimState>,
}

impl AnimationRegistry {
    /// Register the configured clips with `player`.
    ///
    /// The four core clips must exist in the asset; missing directional clips
    /// are left unregistered.
    pub fn from_asset<P: AnimationPlayer>(
        player: &mut P,
        asset: &CharacterAsset,
        names: &ClipNames,
    ) -> Result<Self, RigError> {
        let mut registry = Self::default();

        let required = [
            (AnimState::Idle, &names.idle),
            (AnimState::Walking, &names.walking),
            (AnimState::Running, &names.running),
            (AnimState::Jumping, &names.jumping),
        ];
        for (state, name) in required {
            let clip = asset
                .clip(name)
                .ok_or_else(|| RigError::MissingClip(name.clone()))?;
            let looping = state != AnimState::Jumping;
            registry
                .actions
                .insert(state, player.register(&clip.name, clip.duration, looping));
        }

        let optional = [
            (AnimState::WalkingBackward, &names.walking_backward),
            (AnimState::LeftWalking, &names.left_walking),
            (AnimState::RightWalking, &names.right_walking),
        ];
        for (state, name) in optional {
            if let Some(clip) = name.as_deref().and_then(|n| asset.clip(n)) {
                registry
                    .actions
                    .insert(state, player.register(&clip.name, clip.duration, true));
            }
        }

        Ok(registry)
    }

    pub fn contains(&self, state: AnimState) -> bool {
        self.actions.contains_key(&state)
    }

    pub fn action(&self, state: AnimState) -> Option<ActionId> {
        self.actions.get(&state).copied()
    }

    pub fn current(&self) -> Option<AnimState> {
        self.current
    }

    /// `state` if registered, otherwise walking.
    fn or_walking(&self, state: AnimState) -> AnimState {
        if self.contains(state) {
            state
        } else {
            AnimState::Walking
        }
    }
}

/// Drives an [`AnimationPlayer`] from motion snapshots.
#[derive(Debug, Clone)]
pub struct AnimationStateMachine<P: AnimationPlayer = ActionMixer> {
    player: P,
    registry: AnimationRegistry,
    last: Option<MotionSnapshot>,
    jump_active: bool,
    fade: f32,
}

impl<P: AnimationPlayer> AnimationStateMachine<P> {
    /// Starts in idle at full weight.
    pub fn new(mut player: P, mut registry: AnimationRegistry) -> Self {
        if let Some(idle) = registry.action(AnimState::Idle) {
            player.play(idle);
            registry.current = Some(AnimState::Idle);
        }
        Self {
            player,
            registry,
            last: None,
            jump_active: false,
            fade: DEFAULT_FADE_SECONDS,
        }
    }

    pub fn current(&self) -> Option<AnimState> {
        self.registry.current
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn is_jumping(&self) -> bool {
        self.jump_active
    }

    /// Target state for a snapshot, ignoring lock and jumps.
    pub fn select(&self, snapshot: &MotionSnapshot) -> AnimState {
        let dirs = snapshot.directions;
        let moving_tier = if snapshot.sprint {
            AnimState::Running
        } else {
            AnimState::Walking
        };

        if !dirs.any() {
            AnimState::Idle
        } else if dirs.forward {
            moving_tier
        } else if !snapshot.first_person {
            moving_tier
        } else if dirs.backward {
            self.registry.or_walking(AnimState::WalkingBackward)
        } else if dirs.left {
            self.registry.or_walking(AnimState::LeftWalking)
        } else {
            self.registry.or_walking(AnimState::RightWalking)
        }
    }

    /// Feed this frame's inputs. Only a changed snapshot is evaluated.
    pub fn observe(&mut self, snapshot: MotionSnapshot) {
        if self.last == Some(snapshot) {
            return;
        }
        self.last = Some(snapshot);
        self.evaluate();
    }

    /// Enter the jumping one-shot.
    pub fn start_jump(&mut self) {
        if self.last.is_some_and(|s| s.lock) {
            return;
        }
        self.jump_active = true;
        self.transition(AnimState::Jumping, true);
    }

    /// Advance the player; a finished jump hands back to motion states.
    pub fn update(&mut self, dt: f32) {
        let finished = self.player.update(dt);
        let jump = self.registry.action(AnimState::Jumping);
        if self.jump_active && jump.is_some_and(|id| finished.contains(&id)) {
            debug!("Jump animation finished");
            self.jump_active = false;
            self.evaluate();
        }
    }

    fn evaluate(&mut self) {
        let Some(snapshot) = self.last else {
            return;
        };
        if snapshot.lock || self.jump_active {
            return;
        }
        let target = self.select(&snapshot);
        self.transition(target, false);
    }

    fn transition(&mut self, target: AnimState, restart: bool) {
        let current = self.registry.current;
        if current == Some(target) && !restart {
            return;
        }
        let Some(to) = self.registry.action(target) else {
            return;
        };
        let from = current.and_then(|s| self.registry.action(s));
        debug!("Animation {:?} -> {:?}", current, target);
        if from == Some(to) {
            // Two states sharing one clip only restart on a jump
            if restart {
                self.player.play(to);
            }
        } else {
            self.player.cross_fade(from, to, self.fade);
        }
        self.registry.current = Some(target);
    }
}
