//! Character Controller
//!
//! Owns the player, the level collider, input state, the camera rig and the
//! animation state machine, and runs them once per frame:
//!
//! ```text
//! input -> jump scheduling -> motion -> capsule resolve -> recovery -> camera -> animation
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use character_rig_engine::{CharacterController, ControllerConfig, MemoryAssetLoader, Scene};
//!
//! let mut controller = CharacterController::init(config, &scene, &mut loader)?;
//!
//! // From the host's event loop:
//! controller.handle_key(KeyCode::W, true);
//! controller.handle_mouse_motion(dx, dy);
//!
//! // Each frame (None = measure with the wall clock):
//! controller.update(None);
//! let eye = controller.camera().pose();
//! ```

use std::time::Instant;

use glam::Vec3;
use log::{debug, info, warn};

use crate::animation::{ActionMixer, AnimState, AnimationRegistry, AnimationStateMachine, MotionSnapshot};
use crate::assets::AssetLoader;
use crate::camera::{CameraMode, CameraPose, CameraRig};
use crate::collision::MeshCollider;
use crate::config::{ControllerConfig, Tuning};
use crate::error::RigError;
use crate::input::{ControlState, InputAction, JumpKind, KeyBindings, KeyCode, MouseButton, PointerAction, PointerCapture};
use crate::player::{
    FiredJump, JumpScheduler, MAX_FRAME_DELTA, MotionStep, PendingJump, Player, PlayerMovementController,
    Resolution, resolve,
};
use crate::scene::Scene;

/// What one call to [`CharacterController::update`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Step actually simulated, after clamping
    pub dt: f32,
    pub motion: MotionStep,
    pub resolution: Resolution,
    /// Takeoff applied this frame
    pub jump_fired: Option<JumpKind>,
    /// The player fell below the level and was put back
    pub recovered: bool,
}

/// Per-frame orchestration of the character rig.
pub struct CharacterController {
    config: ControllerConfig,
    tuning: Tuning,
    player: Player,
    collider: Option<MeshCollider>,
    movement: PlayerMovementController,
    jumps: JumpScheduler,
    controls: ControlState,
    bindings: KeyBindings,
    pointer: PointerCapture,
    camera: CameraRig,
    animation: Option<AnimationStateMachine>,
    character_error: Option<RigError>,
    /// Simulation clock in seconds
    clock: f64,
    last_frame: Option<Instant>,
}

impl CharacterController {
    /// Build the controller: collider from the scene's static meshes, the
    /// character's animations from the loader.
    ///
    /// Only an invalid config is an error. A scene with nothing to collide
    /// against leaves the controller without a collider (updates do nothing
    /// until [`rebuild_collider`](Self::rebuild_collider) succeeds); a failed
    /// character load leaves it without animations.
    pub fn init<L>(config: ControllerConfig, scene: &Scene, loader: &mut L) -> Result<Self, RigError>
    where
        L: AssetLoader + ?Sized,
    {
        config.validate()?;
        let tuning = Tuning::resolve(&config);
        let player = Player::new(config.initial_position, tuning.capsule);

        let collider = match MeshCollider::from_meshes(scene.static_meshes()) {
            Ok(collider) => Some(collider),
            Err(e) => {
                warn!("No level collider: {}", e);
                None
            }
        };

        let (animation, character_error) = match Self::load_animation(&config, loader) {
            Ok(animation) => (Some(animation), None),
            Err(e) => {
                warn!("Character '{}' unavailable, running without animations: {}", config.player_model.url, e);
                (None, Some(e))
            }
        };

        let mut camera = CameraRig::new(config.camera.scaled(tuning.scale), config.mouse_sensitivity);
        camera.snap(&player);

        info!(
            "Character controller ready at {:?} (scale {}, collider: {}, animations: {})",
            player.position,
            tuning.scale,
            collider.as_ref().map_or(0, MeshCollider::triangle_count),
            animation.is_some()
        );

        Ok(Self {
            movement: PlayerMovementController::from_tuning(&tuning),
            config,
            tuning,
            player,
            collider,
            jumps: JumpScheduler::new(),
            controls: ControlState::new(),
            bindings: KeyBindings::new(),
            pointer: PointerCapture::new(),
            camera,
            animation,
            character_error,
            clock: 0.0,
            last_frame: None,
        })
    }

    /// [`init`](Self::init), then hand the ready controller to `on_ready`.
    pub fn init_with_callback<L, F>(
        config: ControllerConfig,
        scene: &Scene,
        loader: &mut L,
        on_ready: F,
    ) -> Result<Self, RigError>
    where
        L: AssetLoader + ?Sized,
        F: FnOnce(&mut Self),
    {
        let mut controller = Self::init(config, scene, loader)?;
        on_ready(&mut controller);
        Ok(controller)
    }

    fn load_animation<L>(config: &ControllerConfig, loader: &mut L) -> Result<AnimationStateMachine, RigError>
    where
        L: AssetLoader + ?Sized,
    {
        let asset = loader.load_character(&config.player_model.url)?;
        let mut mixer = ActionMixer::new();
        let registry = AnimationRegistry::from_asset(&mut mixer, &asset, &config.player_model.clips)?;
        Ok(AnimationStateMachine::new(mixer, registry))
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Advance one frame. `dt` of `None` measures the time since the previous
    /// wall-clock update. Returns `None` when there is no collider.
    pub fn update(&mut self, dt: Option<f32>) -> Option<FrameReport> {
        let dt = match dt {
            Some(dt) => dt,
            None => self.wall_clock_delta(),
        };
        let collider = self.collider.as_ref()?;

        let dt = dt.clamp(0.0, MAX_FRAME_DELTA);
        self.clock += dt as f64;

        // Look input first so movement uses this frame's heading
        let (dx, dy) = self.pointer.consume_delta();
        if dx != 0.0 || dy != 0.0 {
            self.camera.apply_mouse_delta(&mut self.player, dx, dy);
        }

        self.controls.tick_jump(self.clock);

        // Deferred takeoff
        let mut jump_fired = None;
        if let Some(kind) = self.jumps.poll(self.clock) {
            self.controls.clear_jump_requests();
            if self.player.on_ground {
                let velocity = match kind {
                    JumpKind::Short => self.tuning.jump_velocity,
                    JumpKind::High => self.tuning.high_jump_velocity,
                };
                self.player.velocity.y = velocity;
                self.player.on_ground = false;
                self.jumps.record_fired(kind, velocity, self.clock);
                jump_fired = Some(kind);
            } else {
                debug!("Jump dropped: airborne at takeoff");
            }
        }

        // New requests only take effect from the ground
        if let Some(kind) = self.controls.jump_request() {
            if !self.player.on_ground {
                self.controls.clear_jump_requests();
            } else if self.jumps.schedule(kind, self.clock) {
                if let Some(animation) = self.animation.as_mut() {
                    animation.start_jump();
                }
            }
        }

        let yaw = self.camera.movement_yaw();
        let motion = self
            .movement
            .integrate(&mut self.player, &self.controls, yaw, collider, dt);
        if self.camera.mode() == CameraMode::ThirdPerson && motion.direction != Vec3::ZERO {
            self.player
                .set_yaw(PlayerMovementController::yaw_from_forward(motion.direction));
        }

        let resolution = resolve(&mut self.player, collider);
        // Held up by a surface the ground ray did not reach
        if resolution.stands_on_ground() && self.player.velocity.y <= 0.0 {
            self.player.on_ground = true;
            self.player.velocity.y = 0.0;
        }
        let recovered = Self::recover_fall_through(&mut self.player, collider);

        self.camera.follow(&self.player, Some(collider));

        if let Some(animation) = self.animation.as_mut() {
            animation.observe(MotionSnapshot {
                directions: self.controls.directions(),
                sprint: self.controls.sprint,
                on_ground: self.player.on_ground,
                lock: self.controls.lock,
                first_person: self.camera.is_first_person(),
            });
            animation.update(dt);
        }

        Some(FrameReport {
            dt,
            motion,
            resolution,
            jump_fired,
            recovered,
        })
    }

    fn wall_clock_delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame = Some(now);
        dt
    }

    /// Put a player that dropped below the level back on top of it.
    fn recover_fall_through(player: &mut Player, collider: &MeshCollider) -> bool {
        let threshold = collider.fall_through_y();
        if player.position.y >= threshold {
            return false;
        }

        let bounds = collider.bounds();
        let origin = Vec3::new(player.position.x, bounds.max.y + 1.0, player.position.z);
        let foot = player.capsule.foot_offset();
        match collider.raycast(origin, Vec3::NEG_Y, f32::MAX) {
            Some(hit) => {
                player.position.y = hit.point.y + foot;
                warn!("Player fell through the level; placed back at {:?}", player.position);
            }
            None => {
                player.position.y = threshold + player.capsule.height();
                warn!("Player fell through the level; nothing below, nudged to y={:.2}", player.position.y);
            }
        }
        player.velocity = Vec3::ZERO;
        true
    }

    // ------------------------------------------------------------------
    // Runtime operations
    // ------------------------------------------------------------------

    /// Switch first/third person and ask the host to capture the pointer.
    pub fn toggle_view(&mut self) -> CameraMode {
        let mode = self.camera.toggle(&self.player);
        self.pointer.request_capture();
        mode
    }

    /// Rebuild the collider from the scene, or from a mesh set loaded from
    /// `url`. On failure the previous collider stays in place.
    pub fn rebuild_collider<L>(&mut self, url: Option<&str>, scene: &Scene, loader: &mut L) -> Result<(), RigError>
    where
        L: AssetLoader + ?Sized,
    {
        let collider = match url {
            Some(url) => {
                let meshes = loader.load_meshes(url)?;
                MeshCollider::from_meshes(meshes.iter())?
            }
            None => MeshCollider::from_meshes(scene.static_meshes())?,
        };
        info!(
            "Collider rebuilt from {}: {} triangles",
            url.unwrap_or("scene"),
            collider.triangle_count()
        );
        self.collider = Some(collider);
        Ok(())
    }

    /// Move the player (default: the configured start), stop it and drop any
    /// pending jump. The ground state is probed at the new position, so a jump
    /// pressed before the next update still counts as grounded.
    pub fn reset(&mut self, position: Option<Vec3>) {
        self.player.position = position.unwrap_or(self.config.initial_position);
        self.player.velocity = Vec3::ZERO;
        self.player.on_ground = false;
        if let Some(collider) = self.collider.as_ref() {
            self.movement.detect_ground(&mut self.player, collider, 0.0);
        }
        self.jumps.cancel();
        self.controls.clear_jump_requests();
        self.camera.snap(&self.player);
        debug!("Player reset to {:?}", self.player.position);
    }

    /// Cancel pending work, release input and detach the camera.
    pub fn teardown(mut self) -> CameraPose {
        self.jumps.cancel();
        self.controls.clear();
        self.pointer.release();
        let pose = self.camera.detach();
        info!("Character controller torn down at t={:.2}s", self.clock);
        pose
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Route a key event through the bindings. Returns whether it was bound.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let Some(action) = self.bindings.get_action(key) else {
            return false;
        };
        match action {
            InputAction::MoveForward => self.controls.forward = pressed,
            InputAction::MoveBack => self.controls.backward = pressed,
            InputAction::MoveLeft => self.controls.left = pressed,
            InputAction::MoveRight => self.controls.right = pressed,
            InputAction::Sprint => self.controls.sprint = pressed,
            InputAction::Lock => self.controls.lock = pressed,
            InputAction::Jump => {
                if pressed {
                    self.controls.press_jump(self.clock);
                } else {
                    self.controls.release_jump(self.clock);
                }
            }
            InputAction::ToggleView => {
                if pressed {
                    self.toggle_view();
                }
            }
            InputAction::ReleasePointer => {
                if pressed {
                    self.pointer.release();
                }
            }
        }
        true
    }

    /// Raw pointer motion in pixels; used only while the pointer is captured.
    pub fn handle_mouse_motion(&mut self, dx: f32, dy: f32) -> bool {
        self.pointer.accumulate(dx, dy)
    }

    pub fn handle_mouse_click(&mut self, button: MouseButton) -> PointerAction {
        self.pointer.handle_click(button)
    }

    pub fn handle_focus(&mut self, focused: bool) {
        self.pointer.set_focus(focused);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn collider(&self) -> Option<&MeshCollider> {
        self.collider.as_ref()
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn pointer(&self) -> &PointerCapture {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerCapture {
        &mut self.pointer
    }

    /// Simulation clock in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn has_pending_jump(&self) -> bool {
        self.jumps.is_pending()
    }

    pub fn pending_jump(&self) -> Option<&PendingJump> {
        self.jumps.pending()
    }

    pub fn last_jump(&self) -> Option<&FiredJump> {
        self.jumps.last_fired()
    }

    pub fn animation(&self) -> Option<&AnimationStateMachine> {
        self.animation.as_ref()
    }

    pub fn current_animation(&self) -> Option<AnimState> {
        self.animation.as_ref().and_then(AnimationStateMachine::current)
    }

    /// Outcome of loading the character at init.
    pub fn character_load_result(&self) -> Result<(), &RigError> {
        match &self.character_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
