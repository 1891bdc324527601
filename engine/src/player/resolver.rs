//! Capsule Resolver
//!
//! Pushes the player capsule out of the level mesh after the motion step.
//! The capsule axis is moved into the collider's local frame, every triangle
//! the BVH reports near it pushes both endpoints out along the separation
//! direction, and the corrected start point is carried back to world space.
//!
//! One pass only: pushes from all overlapping triangles accumulate before the
//! position is committed.

use glam::Vec3;

use super::capsule::{MIN_GROUND_NORMAL_Y, Player};
use crate::collision::{MeshCollider, Segment};

/// Correction lengths at or below this are treated as no correction.
pub const RESOLVE_SKIN: f32 = 1e-5;

/// Outcome of one resolve pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Resolution {
    /// World-space displacement applied to the player
    pub correction: Vec3,
    /// Number of triangles that pushed the capsule
    pub contacts: usize,
    /// The correction pushed the player upward (standing on something)
    pub supported: bool,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.correction == Vec3::ZERO
    }

    /// The correction lifted the player off a surface gentle enough to stand on.
    pub fn stands_on_ground(&self) -> bool {
        self.supported && self.correction.normalize_or_zero().y >= MIN_GROUND_NORMAL_Y
    }
}

/// Depenetrate the player capsule from the collider.
pub fn resolve(player: &mut Player, collider: &MeshCollider) -> Resolution {
    let radius = player.capsule.radius;
    let to_local = collider.world_inverse() * player.world_transform();
    let mut segment = Segment::new(
        to_local.transform_point3(player.capsule.segment_start),
        to_local.transform_point3(player.capsule.segment_end),
    );
    let original_start = segment.start;

    let query = segment.aabb().expanded(radius);
    let mut contacts = 0;
    collider.shapecast(
        |bounds| bounds.intersects(&query),
        |tri, _| {
            let contact = tri.closest_points_to_segment(&segment);
            if contact.distance < radius {
                let push_dir = match (contact.on_segment - contact.on_triangle).try_normalize() {
                    Some(dir) => dir,
                    None => {
                        // Axis touches the surface; push out along the face toward the capsule.
                        let normal = tri.normal();
                        let center = (segment.start + segment.end) * 0.5;
                        if normal.dot(center - contact.on_triangle) < 0.0 {
                            -normal
                        } else {
                            normal
                        }
                    }
                };
                segment.translate(push_dir * (radius - contact.distance));
                contacts += 1;
            }
            false
        },
    );

    if contacts == 0 {
        return Resolution::default();
    }

    let world = collider.world_transform();
    let new_position = world.transform_point3(segment.start);
    let old_position = world.transform_point3(original_start);
    let delta = new_position - old_position;

    let length = delta.length();
    let applied = (length - RESOLVE_SKIN).max(0.0);
    if applied == 0.0 {
        return Resolution {
            contacts,
            ..Default::default()
        };
    }

    let normal = delta / length;
    let correction = normal * applied;
    player.position += correction;

    // Stop falling into a floor or rising into a ceiling
    if normal.y * player.velocity.y < 0.0 {
        player.velocity.y = 0.0;
    }

    let supported = normal.y > 0.0;
    Resolution {
        correction,
        contacts,
        supported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::CapsuleShape;
    use crate::scene::SceneMesh;
    use glam::Mat4;

    fn player_at(position: Vec3) -> Player {
        Player::new(position, CapsuleShape::new(0.5, 1.0))
    }

    #[test]
    fn test_clear_capsule_is_untouched() {
        let floor = SceneMesh::floor("floor", -1.5, 20.0);
        let collider = MeshCollider::from_meshes([&floor]).unwrap();
        let mut player = player_at(Vec3::new(0.3, 0.0, 0.2));
        let result = resolve(&mut player, &collider);
        assert!(result.is_empty());
        assert_eq!(result.contacts, 0);
        assert_eq!(player.position, Vec3::new(0.3, 0.0, 0.2));
    }

    #[test]
    fn test_sunk_capsule_pushed_up() {
        let floor = SceneMesh::floor("floor", -1.5, 20.0);
        let collider = MeshCollider::from_meshes([&floor]).unwrap();
        // Bottom sphere centre 0.2 above the floor: 0.3 of penetration
        let mut player = player_at(Vec3::new(0.3, -0.3, 0.2));
        player.velocity = Vec3::new(1.0, -4.0, 0.0);

        let result = resolve(&mut player, &collider);
        assert!(result.supported);
        assert!(result.stands_on_ground());
        assert!((player.position.y - 0.0).abs() < 1e-3);
        assert!((player.position.x - 0.3).abs() < 1e-5);
        assert!(player.velocity.y.abs() < 1e-5);
        assert_eq!(player.velocity.x, 1.0);
    }

    #[test]
    fn test_wall_pushes_sideways() {
        // Wall face at x = 1.0
        let wall = SceneMesh::cuboid("wall", Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 5.0, 5.0));
        let collider = MeshCollider::from_meshes([&wall]).unwrap();
        let mut player = player_at(Vec3::new(0.7, 0.0, 0.1));

        let result = resolve(&mut player, &collider);
        assert!(!result.supported);
        assert!(!result.stands_on_ground());
        assert!((player.position.x - 0.5).abs() < 1e-3);

        let clearance = collider
            .segment_clearance(&player.world_segment(), 1.0)
            .unwrap();
        assert!(clearance >= 0.5 - 1e-3);
    }

    #[test]
    fn test_resolves_in_collider_frame() {
        let floor = SceneMesh::floor("floor", 0.0, 20.0);
        let collider = MeshCollider::from_meshes([&floor])
            .unwrap()
            .with_world_transform(Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)));
        let mut player = player_at(Vec3::new(0.3, -0.2, 0.2));

        let result = resolve(&mut player, &collider);
        assert!(result.supported);
        assert!(player.position.y.abs() < 1e-3);
    }

    #[test]
    fn test_ramp_push_keeps_horizontal_velocity() {
        let angle = 15f32.to_radians();
        let ramp = SceneMesh::floor("ramp", 0.0, 20.0).with_transform(
            Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0)) * Mat4::from_rotation_x(angle),
        );
        let collider = MeshCollider::from_meshes([&ramp]).unwrap();
        // Sunk 0.1 below its resting height on the ramp
        let rest = 1.0 + 0.5 / angle.cos();
        let surface_y = -1.5 - 0.2 * angle.tan();
        let mut player = player_at(Vec3::new(0.3, surface_y + rest - 0.1, 0.2));
        player.velocity = Vec3::new(0.0, -3.0, 0.0);

        let result = resolve(&mut player, &collider);
        assert!(result.stands_on_ground());
        assert_eq!(player.velocity, Vec3::ZERO);
    }
}
