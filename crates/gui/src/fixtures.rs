//! Factory functions for creating test data.
//!
//! Convenient helpers to construct cuboids, scenes and geometry text used
//! by unit and integration tests.

use glam::Vec3;

use shared::{format, ObjectBlock};

use crate::scene::{Cuboid, GeometryArena, SceneCubes, TargetId};
use crate::viewport::mesh;

/// Target handle used throughout tests.
pub const TEST_TARGET: TargetId = TargetId(1);

/// Default cuboid edge length used by tests (the editor default).
pub const TEST_SIZE: f32 = 0.1;

/// Mid-gray test color.
pub fn test_color() -> Vec3 {
    Vec3::splat(0.8)
}

/// A generated cuboid at `position` with the given edge length and aspect
/// ratio.
pub fn cuboid_at(arena: &mut GeometryArena, position: Vec3, size: f32, aspect: f32) -> Cuboid {
    let block = mesh::cuboid_block(size, test_color());
    Cuboid::from_block(
        "cuboid",
        &block,
        Some(position),
        size,
        None,
        TEST_TARGET,
        aspect,
        arena,
    )
}

/// A size-0.1 cuboid at the origin with no aspect stretch.
pub fn unit_cuboid(arena: &mut GeometryArena) -> Cuboid {
    cuboid_at(arena, Vec3::ZERO, TEST_SIZE, 1.0)
}

/// Development-format text for one generated cuboid block (aspect 1.0, so
/// stretched and true data coincide).
pub fn dev_data_at(position: Vec3, size: f32) -> String {
    format::write_block(&ObjectBlock::new(
        position,
        mesh::cuboid_records(size, test_color()),
    ))
}

/// A scene containing cuboids at the given positions.
pub fn scene_with_cuboids(
    arena: &mut GeometryArena,
    positions: &[Vec3],
    size: f32,
    aspect: f32,
) -> SceneCubes {
    let mut scene = SceneCubes::new();
    for position in positions {
        scene.add(cuboid_at(arena, *position, size, aspect));
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_cuboid_has_full_geometry() {
        let mut arena = GeometryArena::new();
        let cuboid = unit_cuboid(&mut arena);
        assert_eq!(cuboid.triangle_count(&arena), 12);
        assert_eq!(cuboid.color(&arena), Some(test_color()));
    }

    #[test]
    fn dev_data_parses_back() {
        let data = dev_data_at(Vec3::new(0.1, 0.2, 0.3), 0.1);
        let block = format::parse_block(&data).unwrap();
        assert_eq!(block.position, [0.1, 0.2, 0.3]);
        assert_eq!(block.triangles.len(), 12);
    }

    #[test]
    fn scene_fixture_adds_all_positions() {
        let mut arena = GeometryArena::new();
        let scene = scene_with_cuboids(
            &mut arena,
            &[Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0)],
            0.1,
            1.0,
        );
        assert_eq!(scene.len(), 2);
    }
}
