//! Triangle and segment primitives
//!
//! Closest-point queries used by the capsule resolver and the ray/triangle
//! test used by every raycast against the collider.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use static_assertions::assert_eq_size;

use super::aabb::Aabb;

/// Determinant threshold below which a ray is treated as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle in collider-local space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

assert_eq_size!(Triangle, [f32; 9]);

/// Closest pair of points between a segment and a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentContact {
    /// Point on the segment
    pub on_segment: Vec3,
    /// Point on the triangle
    pub on_triangle: Vec3,
    pub distance: f32,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points([self.a, self.b, self.c])
    }

    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Unit face normal following the counter-clockwise winding, zero if degenerate.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    pub fn edges(&self) -> [Segment; 3] {
        [
            Segment::new(self.a, self.b),
            Segment::new(self.b, self.c),
            Segment::new(self.c, self.a),
        ]
    }

    /// Closest point on the triangle to `p` (Voronoi region walk).
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;

        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = va + vb + vc;
        if denom.abs() < f32::EPSILON {
            return a;
        }
        a + ab * (vb / denom) + ac * (vc / denom)
    }

    /// Möller–Trumbore ray intersection, double sided.
    ///
    /// Returns the distance along `direction` (not normalised here) of the hit,
    /// if it lies in `[0, max_t]`.
    pub fn ray_intersect(&self, origin: Vec3, direction: Vec3, max_t: f32) -> Option<f32> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let h = direction.cross(e2);
        let det = e1.dot(h);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let s = origin - self.a;
        let u = s.dot(h) / det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(e1);
        let v = direction.dot(q) / det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(q) / det;
        (t >= 0.0 && t <= max_t).then_some(t)
    }

    /// Closest points between a segment and this triangle.
    ///
    /// A crossing segment reports distance zero at the crossing point.
    /// Otherwise the minimum is found among the segment endpoints against the
    /// face and the segment against each triangle edge.
    pub fn closest_points_to_segment(&self, segment: &Segment) -> SegmentContact {
        let delta = segment.delta();
        let length = delta.length();
        if length > f32::EPSILON {
            if let Some(t) = self.ray_intersect(segment.start, delta / length, length) {
                let p = segment.start + delta / length * t;
                return SegmentContact {
                    on_segment: p,
                    on_triangle: p,
                    distance: 0.0,
                };
            }
        }

        let mut best = SegmentContact {
            on_segment: segment.start,
            on_triangle: self.a,
            distance: f32::INFINITY,
        };
        let mut consider = |on_segment: Vec3, on_triangle: Vec3| {
            let distance = on_segment.distance(on_triangle);
            if distance < best.distance {
                best = SegmentContact {
                    on_segment,
                    on_triangle,
                    distance,
                };
            }
        };

        for p in [segment.start, segment.end] {
            consider(p, self.closest_point(p));
        }
        for edge in self.edges() {
            let (on_edge, on_segment) = edge.closest_points(segment);
            consider(on_segment, on_edge);
        }

        best
    }
}

/// A line segment, used for the capsule axis and triangle edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    pub fn delta(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points([self.start, self.end])
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.start += offset;
        self.end += offset;
    }

    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let d = self.delta();
        let len_sq = d.length_squared();
        if len_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0);
        self.start + d * t
    }

    /// Closest points between two segments: `(on self, on other)`.
    pub fn closest_points(&self, other: &Segment) -> (Vec3, Vec3) {
        let d1 = self.delta();
        let d2 = other.delta();
        let r = self.start - other.start;
        let a = d1.length_squared();
        let e = d2.length_squared();
        let f = d2.dot(r);

        if a <= f32::EPSILON && e <= f32::EPSILON {
            return (self.start, other.start);
        }
        if a <= f32::EPSILON {
            let t = (f / e).clamp(0.0, 1.0);
            return (self.start, other.start + d2 * t);
        }

        let c = d1.dot(r);
        if e <= f32::EPSILON {
            let s = (-c / a).clamp(0.0, 1.0);
            return (self.start + d1 * s, other.start);
        }

        let b = d1.dot(d2);
        let denom = a * e - b * b;
        let mut s = if denom > f32::EPSILON {
            ((b * f - c * e) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = (b * s + f) / e;
        if t < 0.0 {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else if t > 1.0 {
            t = 1.0;
            s = ((b - c) / a).clamp(0.0, 1.0);
        }

        (self.start + d1 * s, other.start + d2 * t)
    }
}
