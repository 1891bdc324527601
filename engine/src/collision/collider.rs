//! Static level collider
//!
//! Wraps the merged scene geometry and its BVH. The collider keeps its own
//! world transform so callers can move queries into its local frame; rays
//! are accepted in world space and converted here.

use glam::{Mat3, Mat4, Vec3};
use log::info;

use super::aabb::Aabb;
use super::bvh::Bvh;
use super::triangle::{Segment, Triangle};
use crate::error::{AggregationError, RigError};
use crate::geometry::{Geometry, merge_static_meshes};
use crate::scene::SceneMesh;

/// Nearest ray hit against the collider, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    /// Unit face normal, facing back toward the ray origin
    pub normal: Vec3,
}

/// Immutable triangle mesh + BVH built from the static scene.
#[derive(Debug, Clone)]
pub struct MeshCollider {
    bvh: Bvh,
    world: Mat4,
    world_inverse: Mat4,
}

impl MeshCollider {
    /// Build from an already merged, non-indexed geometry.
    pub fn from_geometry(geometry: &Geometry) -> Result<Self, AggregationError> {
        let source = if geometry.is_indexed() {
            geometry.to_non_indexed()?
        } else {
            geometry.clone()
        };
        let positions = source.positions().ok_or(AggregationError::NoMeshes)?;

        let triangles: Vec<Triangle> = positions
            .chunks_exact(3)
            .map(|t| {
                Triangle::new(
                    Vec3::from_array(t[0]),
                    Vec3::from_array(t[1]),
                    Vec3::from_array(t[2]),
                )
            })
            .collect();
        if triangles.is_empty() {
            return Err(AggregationError::NoMeshes);
        }

        Ok(Self {
            bvh: Bvh::build(triangles),
            world: Mat4::IDENTITY,
            world_inverse: Mat4::IDENTITY,
        })
    }

    /// Merge the static meshes and build a collider over the result.
    pub fn from_meshes<'a, I>(meshes: I) -> Result<Self, RigError>
    where
        I: IntoIterator<Item = &'a SceneMesh>,
    {
        let merged = merge_static_meshes(meshes)?;
        let collider = Self::from_geometry(&merged)?;
        info!(
            "Built collider: {} triangles, {} BVH nodes",
            collider.triangle_count(),
            collider.bvh.node_count()
        );
        Ok(collider)
    }

    pub fn with_world_transform(mut self, world: Mat4) -> Self {
        self.set_world_transform(world);
        self
    }

    pub fn set_world_transform(&mut self, world: Mat4) {
        self.world = world;
        self.world_inverse = world.inverse();
    }

    pub fn world_transform(&self) -> Mat4 {
        self.world
    }

    pub fn world_inverse(&self) -> Mat4 {
        self.world_inverse
    }

    pub fn triangle_count(&self) -> usize {
        self.bvh.triangles().len()
    }

    /// Bounds in world space.
    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds().transformed(self.world)
    }

    /// Height below which the player has fallen through the level.
    pub fn fall_through_y(&self) -> f32 {
        self.bounds().min.y
    }

    /// Shapecast in the collider's local frame. See [`Bvh::shapecast`].
    pub fn shapecast<B, T>(&self, intersects_bounds: B, intersects_triangle: T) -> bool
    where
        B: FnMut(&Aabb) -> bool,
        T: FnMut(&Triangle, usize) -> bool,
    {
        self.bvh.shapecast(intersects_bounds, intersects_triangle)
    }

    /// Nearest hit of a world-space ray within `max_distance`.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.try_normalize()?;

        let local_origin = self.world_inverse.transform_point3(origin);
        let local_step = self.world_inverse.transform_vector3(direction);
        let scale = local_step.length();
        if scale <= f32::EPSILON {
            return None;
        }
        let local_dir = local_step / scale;
        let local_max = if max_distance.is_finite() {
            max_distance * scale
        } else {
            max_distance
        };

        let hit = self.bvh.raycast_first(local_origin, local_dir, local_max)?;
        let tri = &self.bvh.triangles()[hit.triangle];

        let point = self
            .world
            .transform_point3(local_origin + local_dir * hit.distance);
        let normal_matrix = Mat3::from_mat4(self.world_inverse).transpose();
        let mut normal = (normal_matrix * tri.normal()).normalize_or_zero();
        if normal.dot(direction) > 0.0 {
            normal = -normal;
        }

        Some(RayHit {
            point,
            distance: hit.distance / scale,
            normal,
        })
    }

    /// Smallest distance from a local-frame segment to the mesh, searching
    /// only triangles within `search_radius`.
    pub fn segment_clearance(&self, segment: &Segment, search_radius: f32) -> Option<f32> {
        let query = segment.aabb().expanded(search_radius);
        let mut best: Option<f32> = None;
        self.bvh.shapecast(
            |bounds| bounds.intersects(&query),
            |tri, _| {
                let d = tri.closest_points_to_segment(segment).distance;
                if best.is_none_or(|b| d < b) {
                    best = Some(d);
                }
                false
            },
        );
        best.filter(|d| *d <= search_radius)
    }
}
