//! Geometry Module
//!
//! Attribute buffers for scene meshes and the aggregator that merges static
//! meshes into the single world-space buffer the collider is built from.

pub mod aggregate;
pub mod attributes;

pub use aggregate::merge_static_meshes;
pub use attributes::{
    AttributeData, AttributeLayout, Geometry, NORMAL, POSITION, StorageKind, UV, VertexAttribute,
};
