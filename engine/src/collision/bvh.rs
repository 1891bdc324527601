//! Triangle BVH
//!
//! Flat array of nodes in depth-first order: an interior node's left child is
//! the next node, its right child index is stored. Built once per scene load
//! by median split on the longest centroid axis.
//!
//! Two queries are offered:
//! - [`Bvh::shapecast`] walks every node whose bounds satisfy a caller
//!   predicate and hands each triangle in those leaves to a callback. The
//!   callback owns whatever state it mutates; the BVH never looks at it.
//! - [`Bvh::raycast_first`] returns the nearest triangle hit along a ray.

use glam::Vec3;

use super::aabb::Aabb;
use super::triangle::Triangle;

/// Maximum triangles stored in a leaf.
pub const MAX_LEAF_TRIANGLES: usize = 8;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { start: u32, count: u32 },
    Interior { right: u32 },
}

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bounds: Aabb,
    kind: NodeKind,
}

/// Nearest triangle along a ray, in the BVH's own space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Index into [`Bvh::triangles`]
    pub triangle: usize,
    /// Distance along the (unit) ray direction
    pub distance: f32,
}

/// Bounding volume hierarchy over a triangle soup.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<Triangle>,
}

impl Bvh {
    /// Build over `triangles`. Triangle order is not preserved.
    pub fn build(mut triangles: Vec<Triangle>) -> Self {
        let mut nodes = Vec::new();
        if !triangles.is_empty() {
            nodes.reserve(2 * triangles.len() / MAX_LEAF_TRIANGLES + 1);
            let len = triangles.len();
            build_recursive(&mut nodes, &mut triangles, 0, len);
        }
        Self { nodes, triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounds of the whole tree.
    pub fn bounds(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |n| n.bounds)
    }

    /// Visit every triangle in leaves whose bounds pass `intersects_bounds`.
    ///
    /// `intersects_triangle` receives the triangle and its index; returning
    /// `true` stops the traversal. Returns whether the traversal was stopped.
    pub fn shapecast<B, T>(&self, mut intersects_bounds: B, mut intersects_triangle: T) -> bool
    where
        B: FnMut(&Aabb) -> bool,
        T: FnMut(&Triangle, usize) -> bool,
    {
        if self.nodes.is_empty() {
            return false;
        }

        let mut stack = vec![0u32];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !intersects_bounds(&node.bounds) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, count } => {
                    let start = start as usize;
                    for i in start..start + count as usize {
                        if intersects_triangle(&self.triangles[i], i) {
                            return true;
                        }
                    }
                }
                NodeKind::Interior { right } => {
                    stack.push(right);
                    stack.push(index + 1);
                }
            }
        }
        false
    }

    /// Nearest triangle hit along `direction` (unit length) within `max_distance`.
    pub fn raycast_first(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<TriangleHit> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best: Option<TriangleHit> = None;
        let mut limit = max_distance;
        let mut stack = vec![0u32];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.bounds.ray_entry(origin, direction, limit).is_none() {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, count } => {
                    let start = start as usize;
                    for i in start..start + count as usize {
                        if let Some(t) = self.triangles[i].ray_intersect(origin, direction, limit) {
                            if best.is_none_or(|b| t < b.distance) {
                                best = Some(TriangleHit {
                                    triangle: i,
                                    distance: t,
                                });
                                limit = t;
                            }
                        }
                    }
                }
                NodeKind::Interior { right } => {
                    // Visit the nearer child first so the limit shrinks early
                    let left = index + 1;
                    let left_t = self.nodes[left as usize]
                        .bounds
                        .ray_entry(origin, direction, limit);
                    let right_t = self.nodes[right as usize]
                        .bounds
                        .ray_entry(origin, direction, limit);
                    match (left_t, right_t) {
                        (Some(l), Some(r)) if r < l => {
                            stack.push(left);
                            stack.push(right);
                        }
                        _ => {
                            stack.push(right);
                            stack.push(left);
                        }
                    }
                }
            }
        }
        best
    }
}

fn build_recursive(nodes: &mut Vec<BvhNode>, triangles: &mut [Triangle], start: usize, end: usize) {
    let slice = &mut triangles[start..end];
    let bounds = slice
        .iter()
        .fold(Aabb::EMPTY, |acc, tri| acc.union(&tri.aabb()));

    let node_index = nodes.len();
    let count = end - start;
    if count <= MAX_LEAF_TRIANGLES {
        nodes.push(BvhNode {
            bounds,
            kind: NodeKind::Leaf {
                start: start as u32,
                count: count as u32,
            },
        });
        return;
    }

    let centroid_bounds = Aabb::from_points(slice.iter().map(Triangle::centroid));
    let axis = centroid_bounds.longest_axis();
    let mid = count / 2;
    slice.select_nth_unstable_by(mid, |a, b| {
        a.centroid()[axis].total_cmp(&b.centroid()[axis])
    });

    nodes.push(BvhNode {
        bounds,
        kind: NodeKind::Interior { right: 0 },
    });
    build_recursive(nodes, triangles, start, start + mid);
    let right = nodes.len() as u32;
    build_recursive(nodes, triangles, start + mid, end);
    nodes[node_index].kind = NodeKind::Interior { right };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Grid of upward-facing floor quads, `n * n * 2` triangles.
    fn floor_grid(n: usize) -> Vec<Triangle> {
        let mut tris = Vec::new();
        for x in 0..n {
            for z in 0..n {
                let (x0, z0) = (x as f32, z as f32);
                let a = Vec3::new(x0, 0.0, z0);
                let b = Vec3::new(x0 + 1.0, 0.0, z0);
                let c = Vec3::new(x0 + 1.0, 0.0, z0 + 1.0);
                let d = Vec3::new(x0, 0.0, z0 + 1.0);
                tris.push(Triangle::new(a, c, b));
                tris.push(Triangle::new(a, d, c));
            }
        }
        tris
    }

    #[test]
    fn test_build_empty() {
        let bvh = Bvh::build(Vec::new());
        assert!(bvh.is_empty());
        assert!(bvh.raycast_first(Vec3::ZERO, Vec3::NEG_Y, 10.0).is_none());
        assert!(!bvh.shapecast(|_| true, |_, _| true));
    }

    #[test]
    fn test_build_keeps_all_triangles() {
        let bvh = Bvh::build(floor_grid(10));
        assert_eq!(bvh.triangles().len(), 200);
        assert!(bvh.node_count() > 1);
        let b = bvh.bounds();
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(10.0, 0.0, 10.0));
    }

    #[test]
    fn test_shapecast_visits_only_overlapping_triangles() {
        let bvh = Bvh::build(floor_grid(10));
        let query = Aabb::new(Vec3::new(2.2, -1.0, 2.2), Vec3::new(2.8, 1.0, 2.8));

        let mut visited = Vec::new();
        bvh.shapecast(
            |bounds| bounds.intersects(&query),
            |_, index| {
                visited.push(index);
                false
            },
        );

        // Every overlapping triangle is reported
        let expected = bvh
            .triangles()
            .iter()
            .filter(|t| t.aabb().intersects(&query))
            .count();
        let overlapping_visited = visited
            .iter()
            .filter(|&&i| bvh.triangles()[i].aabb().intersects(&query))
            .count();
        assert_eq!(overlapping_visited, expected);
        // And far fewer than the whole floor is touched
        assert!(visited.len() < 50, "visited {}", visited.len());
    }

    #[test]
    fn test_shapecast_stops_early() {
        let bvh = Bvh::build(floor_grid(10));
        let mut calls = 0;
        let stopped = bvh.shapecast(
            |_| true,
            |_, _| {
                calls += 1;
                true
            },
        );
        assert!(stopped);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_raycast_first_returns_nearest() {
        let mut tris = floor_grid(4);
        // A second layer above the floor
        tris.extend(floor_grid(4).into_iter().map(|t| {
            Triangle::new(t.a + Vec3::Y * 2.0, t.b + Vec3::Y * 2.0, t.c + Vec3::Y * 2.0)
        }));
        let bvh = Bvh::build(tris);

        let hit = bvh
            .raycast_first(Vec3::new(1.3, 5.0, 1.6), Vec3::NEG_Y, 100.0)
            .unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-5);

        let hit = bvh
            .raycast_first(Vec3::new(1.3, 1.0, 1.6), Vec3::NEG_Y, 100.0)
            .unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_raycast_first_misses_outside() {
        let bvh = Bvh::build(floor_grid(4));
        assert!(
            bvh.raycast_first(Vec3::new(10.0, 5.0, 10.0), Vec3::NEG_Y, 100.0)
                .is_none()
        );
        assert!(
            bvh.raycast_first(Vec3::new(1.3, 5.0, 1.6), Vec3::NEG_Y, 2.0)
                .is_none()
        );
    }
}
