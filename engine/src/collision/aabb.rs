//! Axis-aligned bounding boxes
//!
//! Bounds for BVH nodes and shapecast queries. Ray tests use the slab method:
//! entry and exit times are computed per axis and the ray hits when the
//! latest entry comes before the earliest exit.

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Inverted box that grows to fit the first point added.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.grow(p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    /// Overlap test, touching boxes count as overlapping.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Bounds of this box after an affine transform (all eight corners).
    pub fn transformed(&self, matrix: Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        Aabb::from_points((0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            matrix.transform_point3(corner)
        }))
    }

    /// Slab test. Returns the entry distance along `direction` (clamped to 0
    /// when the origin is inside), or `None` if the box is missed or lies
    /// beyond `max_distance`.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let inv = |d: f32| {
            if d.abs() > 1e-10 {
                1.0 / d
            } else {
                f32::MAX * d.signum()
            }
        };
        let inv_dir = Vec3::new(inv(direction.x), inv(direction.y), inv(direction.z));

        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;

        let t_enter = t1.min(t2).max_element();
        let t_exit = t1.max(t2).min_element();

        if t_exit < 0.0 || t_enter > t_exit || t_enter > max_distance {
            return None;
        }
        Some(t_enter.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_and_center() {
        let aabb = Aabb::from_points([Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, -2.0)]);
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 4.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(aabb.longest_axis(), 0);
    }

    #[test]
    fn test_empty_box() {
        assert!(Aabb::EMPTY.is_empty());
        assert!(!Aabb::EMPTY.intersects(&Aabb::new(Vec3::ZERO, Vec3::ONE)));
    }

    #[test]
    fn test_intersects_touching() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.1, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_ray_entry_hit_and_miss() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));

        let t = aabb.ray_entry(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 100.0);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);

        assert!(aabb.ray_entry(Vec3::new(0.0, 5.0, -5.0), Vec3::Z, 100.0).is_none());
        assert!(aabb.ray_entry(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 3.0).is_none());
        assert!(aabb.ray_entry(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, 100.0).is_none());
    }

    #[test]
    fn test_ray_entry_from_inside() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(aabb.ray_entry(Vec3::ZERO, Vec3::NEG_Y, 10.0), Some(0.0));
    }

    #[test]
    fn test_transformed_translation() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let moved = aabb.transformed(Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(moved.max, Vec3::new(1.0, -1.0, 1.0));
    }
}
