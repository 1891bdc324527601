//! Rig Sim - Headless character controller run
//!
//! Run with: `cargo run --bin rig_sim -- [config.json]`
//!
//! Builds a small walled courtyard, drives the controller with a scripted
//! input sequence at 60 Hz and logs the player, camera and animation state.
//! Set `RUST_LOG=debug` to also see jump scheduling and animation transitions.
//!
//! Script:
//! - 0-1s: stand still
//! - 1-3s: walk forward into the north wall
//! - 3-4s: sprint
//! - 4s: tap Space (short jump)
//! - 5-7.5s: hold Space (high jump after 2s)
//! - 8s: switch to first person, look right
//! - 8-9.5s: strafe left

use glam::Vec3;
use log::info;

use character_rig_engine::{
    CharacterAsset, CharacterController, ClipInfo, ControllerConfig, KeyCode, MemoryAssetLoader, MouseButton,
    RigError, Scene, SceneMesh,
};

const FRAME: f32 = 1.0 / 60.0;
const DURATION: f32 = 10.0;

/// One scripted input at a given time.
enum Step {
    Key(KeyCode, bool),
    Look(f32, f32),
    Click(MouseButton),
}

fn script() -> Vec<(f32, Step)> {
    vec![
        (0.5, Step::Click(MouseButton::Left)),
        (1.0, Step::Key(KeyCode::W, true)),
        (3.0, Step::Key(KeyCode::ShiftLeft, true)),
        (4.0, Step::Key(KeyCode::ShiftLeft, false)),
        (4.0, Step::Key(KeyCode::W, false)),
        (4.0, Step::Key(KeyCode::Space, true)),
        (4.05, Step::Key(KeyCode::Space, false)),
        (5.0, Step::Key(KeyCode::Space, true)),
        (7.5, Step::Key(KeyCode::Space, false)),
        (8.0, Step::Key(KeyCode::V, true)),
        (8.0, Step::Key(KeyCode::V, false)),
        (8.1, Step::Look(200.0, 0.0)),
        (8.2, Step::Key(KeyCode::A, true)),
        (9.5, Step::Key(KeyCode::A, false)),
    ]
}

fn courtyard() -> Scene {
    Scene::new()
        .with_mesh(SceneMesh::floor("ground", -1.5, 30.0))
        .with_mesh(SceneMesh::cuboid("north_wall", Vec3::new(0.0, 0.5, -8.0), Vec3::new(8.0, 2.0, 0.5)))
        .with_mesh(SceneMesh::cuboid("crate", Vec3::new(5.0, -1.0, -2.0), Vec3::new(1.0, 0.5, 1.0)))
}

fn loader(config: &ControllerConfig) -> MemoryAssetLoader {
    let hero = CharacterAsset::new(vec![
        ClipInfo::new("Idle", 2.0),
        ClipInfo::new("Walking", 1.0),
        ClipInfo::new("Running", 0.7),
        ClipInfo::new("Jumping", 0.9),
        ClipInfo::new("WalkingBackward", 1.0),
        ClipInfo::new("LeftWalking", 1.0),
        ClipInfo::new("RightWalking", 1.0),
    ]);
    MemoryAssetLoader::new().with_character(config.player_model.url.clone(), hero)
}

fn run() -> Result<(), RigError> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            ControllerConfig::from_json_file(path)?
        }
        None => ControllerConfig::default(),
    };
    let clips = &mut config.player_model.clips;
    clips.walking_backward.get_or_insert_with(|| "WalkingBackward".to_string());
    clips.left_walking.get_or_insert_with(|| "LeftWalking".to_string());
    clips.right_walking.get_or_insert_with(|| "RightWalking".to_string());

    let scene = courtyard();
    let mut loader = loader(&config);
    let mut controller = CharacterController::init_with_callback(config, &scene, &mut loader, |c| {
        info!("Ready: capsule height {:.2}", c.player().capsule.height());
    })?;

    let mut script = script().into_iter().peekable();
    let mut time = 0.0f32;
    let mut next_log = 0.0f32;
    while time < DURATION {
        while let Some((_, step)) = script.next_if(|(at, _)| *at <= time) {
            match step {
                Step::Key(key, pressed) => {
                    controller.handle_key(key, pressed);
                }
                Step::Look(dx, dy) => {
                    controller.handle_mouse_motion(dx, dy);
                }
                Step::Click(button) => {
                    controller.handle_mouse_click(button);
                }
            }
        }

        if let Some(report) = controller.update(Some(FRAME)) {
            if let Some(kind) = report.jump_fired {
                info!("t={:.2}s takeoff: {:?}", time, kind);
            }
        }

        if time >= next_log {
            let player = controller.player();
            info!(
                "t={:.2}s pos=({:.2}, {:.2}, {:.2}) ground={} anim={:?} camera={:?} dist={:.2}",
                time,
                player.position.x,
                player.position.y,
                player.position.z,
                player.on_ground,
                controller.current_animation(),
                controller.camera().mode(),
                controller.camera().distance()
            );
            next_log += 0.5;
        }
        time += FRAME;
    }

    let pose = controller.teardown();
    info!("Camera left at {:?}", pose.position);
    Ok(())
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
