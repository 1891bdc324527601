//! Character Rig Engine Library
//!
//! A capsule character controller for interactive 3D scenes. Static scene
//! meshes are merged into a BVH collider; each frame the player is moved by
//! input and gravity, pushed out of the level geometry, followed by a
//! first/third-person camera and animated by cross-fading clips.
//!
//! # Modules
//!
//! - [`geometry`] - Attribute buffers and static mesh merging
//! - [`collision`] - Triangles, BVH, raycast and shapecast collider
//! - [`player`] - Player capsule, movement, deferred jumps, depenetration
//! - [`camera`] - Orbit / first-person camera with occlusion
//! - [`animation`] - Weighted action mixer and animation state machine
//! - [`input`] - Platform-agnostic keys, bindings and pointer capture
//! - [`controller`] - Per-frame orchestration
//!
//! # Example
//!
//! ```ignore
//! use character_rig_engine::{CharacterController, ControllerConfig, KeyCode, MemoryAssetLoader, Scene, SceneMesh};
//!
//! let scene = Scene::new().with_mesh(SceneMesh::floor("ground", 0.0, 50.0));
//! let mut loader = MemoryAssetLoader::new();
//!
//! let mut controller = CharacterController::init(ControllerConfig::default(), &scene, &mut loader)?;
//!
//! controller.handle_key(KeyCode::W, true);
//! controller.update(Some(1.0 / 60.0));
//! println!("player at {:?}", controller.player().position);
//! ```

pub mod animation;
pub mod assets;
pub mod camera;
pub mod collision;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod input;
pub mod player;
pub mod scene;

// Re-export the types a host needs to drive the controller
pub use assets::{AssetLoader, CharacterAsset, ClipInfo, JsonAssetLoader, MemoryAssetLoader};
pub use camera::{CameraMode, CameraPose, CameraRig};
pub use collision::MeshCollider;
pub use config::{ControllerConfig, Tuning};
pub use controller::{CharacterController, FrameReport};
pub use error::{AggregationError, RigError};
pub use input::{KeyCode, MouseButton};
pub use player::{CapsuleShape, Player};
pub use scene::{MeshRole, Scene, SceneMesh};
