//! Collision Module
//!
//! Static-level collision for the character capsule:
//! - `aabb`: bounding boxes and the slab ray test
//! - `triangle`: closest-point and ray/triangle primitives
//! - `bvh`: median-split triangle BVH with shapecast and nearest-hit raycast
//! - `collider`: merged scene geometry + BVH with its own world transform

pub mod aabb;
pub mod bvh;
pub mod collider;
pub mod triangle;

pub use aabb::Aabb;
pub use bvh::{Bvh, TriangleHit};
pub use collider::{MeshCollider, RayHit};
pub use triangle::{Segment, SegmentContact, Triangle};
