//! Scene description handed over by the host
//!
//! The rig does not own a scene graph. The host flattens whatever it renders
//! into a list of [`SceneMesh`]es with baked world transforms; the collider is
//! built from the static ones.

use glam::{Mat4, Vec3};

use crate::geometry::Geometry;

/// What a mesh is used for when building the collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshRole {
    /// Level geometry the player collides with
    #[default]
    Static,
    /// Part of the player model; never collidable
    Player,
}

/// One renderable mesh with its world transform.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub name: String,
    pub geometry: Geometry,
    pub world_transform: Mat4,
    pub role: MeshRole,
}

impl SceneMesh {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
            world_transform: Mat4::IDENTITY,
            role: MeshRole::Static,
        }
    }

    pub fn with_transform(mut self, world_transform: Mat4) -> Self {
        self.world_transform = world_transform;
        self
    }

    pub fn with_role(mut self, role: MeshRole) -> Self {
        self.role = role;
        self
    }

    /// Axis-aligned box centred at `center`. Outward-facing, indexed.
    pub fn cuboid(name: impl Into<String>, center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents;
        let corners = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // -z
            4, 5, 6, 4, 6, 7, // +z
            0, 4, 7, 0, 7, 3, // -x
            1, 2, 6, 1, 6, 5, // +x
            3, 7, 6, 3, 6, 2, // +y
            0, 1, 5, 0, 5, 4, // -y
        ];
        Self::new(name, Geometry::from_indexed(&corners, indices))
            .with_transform(Mat4::from_translation(center))
    }

    /// Flat square in the XZ plane at height `y`, facing up.
    pub fn floor(name: impl Into<String>, y: f32, half_size: f32) -> Self {
        let s = half_size;
        let corners = [
            Vec3::new(-s, 0.0, -s),
            Vec3::new(s, 0.0, -s),
            Vec3::new(s, 0.0, s),
            Vec3::new(-s, 0.0, s),
        ];
        Self::new(name, Geometry::from_indexed(&corners, vec![0, 2, 1, 0, 3, 2]))
            .with_transform(Mat4::from_translation(Vec3::new(0.0, y, 0.0)))
    }
}

/// The meshes a controller is initialised against.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<SceneMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mesh(mut self, mesh: SceneMesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    /// Meshes that take part in collision.
    pub fn static_meshes(&self) -> impl Iterator<Item = &SceneMesh> {
        self.meshes.iter().filter(|m| m.role == MeshRole::Static)
    }
}
