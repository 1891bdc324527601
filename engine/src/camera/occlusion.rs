//! Camera occlusion
//!
//! Keeps the third-person camera in front of level geometry. Each frame a ray
//! is cast from the orbit target toward the camera; a hit pulls the camera in,
//! a clear line lets it ease back out toward the maximum follow distance.
//! Distance changes are eased with a fixed per-frame blend factor.

use glam::Vec3;

use crate::collision::MeshCollider;
use crate::config::CameraSettings;

/// What the occlusion probe found this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Occlusion {
    /// Geometry between target and camera at this distance
    Blocked { hit: f32 },
    /// Clear, but geometry before the maximum distance
    Limited { hit: f32 },
    /// Clear all the way out to the maximum distance
    Clear,
}

/// Distance the camera should settle at, and why.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionProbe {
    pub desired: f32,
    pub occlusion: Occlusion,
}

/// Probe along `direction` (unit, target → camera) from `target`.
pub fn probe(
    collider: &MeshCollider,
    target: Vec3,
    direction: Vec3,
    current: f32,
    settings: &CameraSettings,
) -> OcclusionProbe {
    let min = settings.min_follow_distance;
    let max = settings.max_follow_distance;
    let eps = settings.safety_epsilon;

    let blocked = collider
        .raycast(target, direction, current)
        .filter(|hit| hit.distance < current);
    if let Some(hit) = blocked {
        return OcclusionProbe {
            desired: (hit.distance - eps).max(min),
            occlusion: Occlusion::Blocked { hit: hit.distance },
        };
    }

    if current < max {
        return match collider.raycast(target, direction, max) {
            Some(hit) => OcclusionProbe {
                desired: (hit.distance - eps).clamp(min, max),
                occlusion: Occlusion::Limited { hit: hit.distance },
            },
            None => OcclusionProbe {
                desired: max,
                occlusion: Occlusion::Clear,
            },
        };
    }

    OcclusionProbe {
        desired: current.min(max),
        occlusion: Occlusion::Clear,
    }
}

/// Linear step from `current` toward `desired` by `factor` (clamped to [0, 1]).
pub fn ease(current: f32, desired: f32, factor: f32) -> f32 {
    current + (desired - current) * factor.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneMesh;

    fn wall_behind() -> MeshCollider {
        // Slab whose near face is at z = 3
        let wall = SceneMesh::cuboid("wall", Vec3::new(0.0, 0.0, 4.0), Vec3::new(5.0, 5.0, 1.0));
        MeshCollider::from_meshes([&wall]).unwrap()
    }

    fn open_floor() -> MeshCollider {
        let floor = SceneMesh::floor("floor", -10.0, 5.0);
        MeshCollider::from_meshes([&floor]).unwrap()
    }

    #[test]
    fn test_blocked_pulls_in() {
        let settings = CameraSettings::default();
        let collider = wall_behind();
        let result = probe(&collider, Vec3::new(0.1, 0.2, 0.0), Vec3::Z, 5.0, &settings);
        assert!(matches!(result.occlusion, Occlusion::Blocked { .. }));
        assert!((result.desired - 2.9).abs() < 1e-4);
    }

    #[test]
    fn test_blocked_respects_min_distance() {
        let settings = CameraSettings::default();
        let wall = SceneMesh::cuboid("wall", Vec3::new(0.0, 0.0, 1.3), Vec3::new(5.0, 5.0, 1.0));
        let collider = MeshCollider::from_meshes([&wall]).unwrap();
        let result = probe(&collider, Vec3::new(0.1, 0.2, 0.0), Vec3::Z, 5.0, &settings);
        assert_eq!(result.desired, settings.min_follow_distance);
    }

    #[test]
    fn test_clear_eases_back_out() {
        let settings = CameraSettings::default();
        let collider = open_floor();
        let result = probe(&collider, Vec3::ZERO, Vec3::Z, 2.0, &settings);
        assert_eq!(result.occlusion, Occlusion::Clear);
        assert_eq!(result.desired, settings.max_follow_distance);
    }

    #[test]
    fn test_clear_but_limited() {
        let settings = CameraSettings::default();
        let collider = wall_behind();
        // Current distance is short of the wall; the far probe finds it
        let result = probe(&collider, Vec3::new(0.1, 0.2, 0.0), Vec3::Z, 2.0, &settings);
        assert!(matches!(result.occlusion, Occlusion::Limited { .. }));
        assert!((result.desired - 2.9).abs() < 1e-4);
    }

    #[test]
    fn test_ease_is_linear_blend() {
        assert_eq!(ease(4.0, 2.0, 0.25), 3.5);
        assert_eq!(ease(4.0, 2.0, 0.0), 4.0);
        assert_eq!(ease(4.0, 2.0, 2.0), 2.0);
    }
}
