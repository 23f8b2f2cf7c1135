//! Export-time occlusion culling.
//!
//! From each of a cuboid's 8 corners, 14 outward rays are sampled (6 axis
//! directions + 8 diagonals). A corner counts as occluded only when every
//! ray passes close by some other cuboid's corner; only when all 8 corners
//! agree is the cuboid's geometry removed. The bias is deliberately toward
//! retention: one exposed corner keeps everything.
//!
//! O(N^2 * 8 * 14) in the cuboid count — fine for editor-scale scenes
//! (tens to low hundreds of cuboids), a known limit beyond that.

use glam::Vec3;

use super::cuboid::CORNER_MATCH_EPSILON;
use super::{GeometryArena, SceneCubes};
use crate::viewport::picking::Ray;

/// A ray is blocked when its closest approach to a neighboring corner is
/// under this radius.
const BLOCK_RADIUS: f32 = 0.01;

/// The 14 sampled directions: axis-aligned plus corner diagonals.
pub fn ray_directions() -> [Vec3; 14] {
    [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
        Vec3::new(1.0, 1.0, 1.0).normalize(),
        Vec3::new(-1.0, 1.0, 1.0).normalize(),
        Vec3::new(1.0, -1.0, 1.0).normalize(),
        Vec3::new(1.0, 1.0, -1.0).normalize(),
        Vec3::new(-1.0, -1.0, 1.0).normalize(),
        Vec3::new(-1.0, 1.0, -1.0).normalize(),
        Vec3::new(1.0, -1.0, -1.0).normalize(),
        Vec3::new(-1.0, -1.0, -1.0).normalize(),
    ]
}

/// Remove the triangles of every fully surrounded cuboid. Works in true
/// (unstretched) space so the result matches what export serializes.
/// Returns the number of triangles removed.
pub fn remove_hidden_geometry(scene: &mut SceneCubes, arena: &mut GeometryArena) -> usize {
    let corner_sets: Vec<[Vec3; 8]> = scene.cuboids.iter().map(|c| c.true_corners()).collect();
    let directions = ray_directions();

    let mut hidden: Vec<(usize, [Vec3; 8])> = Vec::new();
    for (i, corners) in corner_sets.iter().enumerate() {
        let all_occluded = corners.iter().all(|corner| {
            directions.iter().all(|direction| {
                let ray = Ray::new(*corner, *direction);
                corner_sets
                    .iter()
                    .enumerate()
                    .any(|(j, others)| j != i && blocked_by_corners(&ray, others, *corner))
            })
        });
        if all_occluded {
            hidden.push((i, *corners));
        }
    }

    let mut removed = 0;
    for (index, corners) in hidden {
        removed += scene.cuboids[index].remove_triangles_matching(arena, &corners);
    }
    if removed > 0 {
        scene.notify_mutated();
    }
    removed
}

/// Closest-approach test against a neighbor's corners. The origin corner
/// itself (a corner shared with a touching neighbor) never blocks.
fn blocked_by_corners(ray: &Ray, corners: &[Vec3; 8], origin_corner: Vec3) -> bool {
    for corner in corners {
        if (*corner - origin_corner).abs().max_element() < CORNER_MATCH_EPSILON {
            continue;
        }

        let to_corner = *corner - ray.origin;
        let t = to_corner.dot(ray.direction);
        if t < 0.0 {
            // Corner is behind the ray origin
            continue;
        }

        let closest = ray.origin + ray.direction * t;
        if closest.distance(*corner) < BLOCK_RADIUS {
            return true;
        }
    }
    false
}
