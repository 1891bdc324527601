//! Asset loading
//!
//! The controller resolves two kinds of URL: a character (its animation clip
//! list) and a mesh set (for rebuilding the collider). Loading is synchronous
//! and goes through [`AssetLoader`] so hosts can plug in their own formats.
//!
//! Two loaders ship with the crate: [`MemoryAssetLoader`] for hosts that
//! already hold their assets, and [`JsonAssetLoader`] which reads small JSON
//! manifests from a directory.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use glam::{Mat4, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::RigError;
use crate::geometry::Geometry;
use crate::scene::{MeshRole, SceneMesh};

/// One animation clip provided by a character asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name: String,
    /// Length in seconds
    pub duration: f32,
}

impl ClipInfo {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// A loaded character: the clips it can play.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterAsset {
    pub clips: Vec<ClipInfo>,
}

impl CharacterAsset {
    pub fn new(clips: Vec<ClipInfo>) -> Self {
        Self { clips }
    }

    pub fn clip(&self, name: &str) -> Option<&ClipInfo> {
        self.clips.iter().find(|c| c.name == name)
    }
}

/// Resolves asset URLs.
pub trait AssetLoader {
    fn load_character(&mut self, url: &str) -> Result<CharacterAsset, RigError>;

    fn load_meshes(&mut self, url: &str) -> Result<Vec<SceneMesh>, RigError>;
}

/// Loader backed by maps filled up front.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetLoader {
    characters: HashMap<String, CharacterAsset>,
    meshes: HashMap<String, Vec<SceneMesh>>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character(mut self, url: impl Into<String>, asset: CharacterAsset) -> Self {
        self.characters.insert(url.into(), asset);
        self
    }

    pub fn with_meshes(mut self, url: impl Into<String>, meshes: Vec<SceneMesh>) -> Self {
        self.meshes.insert(url.into(), meshes);
        self
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_character(&mut self, url: &str) -> Result<CharacterAsset, RigError> {
        self.characters
            .get(url)
            .cloned()
            .ok_or_else(|| RigError::asset_load(url, "no such character"))
    }

    fn load_meshes(&mut self, url: &str) -> Result<Vec<SceneMesh>, RigError> {
        self.meshes
            .get(url)
            .cloned()
            .ok_or_else(|| RigError::asset_load(url, "no such mesh set"))
    }
}

/// A mesh as stored in a JSON mesh manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEntry {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    /// Column-major world transform; identity when absent
    #[serde(default)]
    pub transform: Option<[f32; 16]>,
    #[serde(default)]
    pub player: bool,
}

impl MeshEntry {
    pub fn into_scene_mesh(self) -> SceneMesh {
        let geometry = match self.indices {
            Some(indices) => {
                let vertices: Vec<Vec3> = self.positions.iter().copied().map(Vec3::from_array).collect();
                Geometry::from_indexed(&vertices, indices)
            }
            None => Geometry::from_positions(self.positions.into_iter().flatten().collect()),
        };
        let role = if self.player {
            MeshRole::Player
        } else {
            MeshRole::Static
        };
        SceneMesh::new(self.name, geometry)
            .with_transform(self.transform.map_or(Mat4::IDENTITY, |m| Mat4::from_cols_array(&m)))
            .with_role(role)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshManifest {
    pub meshes: Vec<MeshEntry>,
}

/// Reads `<root>/<url>` as JSON: a [`CharacterAsset`] for characters and a
/// [`MeshManifest`] for mesh sets.
#[derive(Debug, Clone)]
pub struct JsonAssetLoader {
    root: PathBuf,
}

impl JsonAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, url: &str) -> Result<String, RigError> {
        let path = self.root.join(url);
        debug!("Reading asset {}", path.display());
        fs::read_to_string(&path).map_err(|e| RigError::asset_load(url, e.to_string()))
    }
}

impl AssetLoader for JsonAssetLoader {
    fn load_character(&mut self, url: &str) -> Result<CharacterAsset, RigError> {
        let text = self.read(url)?;
        serde_json::from_str(&text).map_err(|e| RigError::asset_load(url, e.to_string()))
    }

    fn load_meshes(&mut self, url: &str) -> Result<Vec<SceneMesh>, RigError> {
        let text = self.read(url)?;
        let manifest: MeshManifest =
            serde_json::from_str(&text).map_err(|e| RigError::asset_load(url, e.to_string()))?;
        Ok(manifest
            .meshes
            .into_iter()
            .map(MeshEntry::into_scene_mesh)
            .collect())
    }
}
