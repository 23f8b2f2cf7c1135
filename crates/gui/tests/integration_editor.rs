//! Integration tests for the editing core: pick a face, expand the
//! placement under symmetry, commit cuboids, then round-trip the scene
//! through the development format and run the export culling pass.

use glam::Vec3;

use cubed_gui_lib::cursor::BlockCursor;
use cubed_gui_lib::fixtures::{self, TEST_SIZE, TEST_TARGET};
use cubed_gui_lib::scene::{GeometryArena, SceneCubes, Source};
use cubed_gui_lib::session::Session;
use cubed_gui_lib::shape::SymmetryMode;
use cubed_gui_lib::viewport::picking::Ray;

/// Hover the +Z face of the cuboid at `seed`, return the preview position.
fn pick_and_preview(scene: &SceneCubes, cursor: &mut BlockCursor, origin: Vec3) -> Option<Vec3> {
    let ray = Ray::new(origin, -origin);
    let hit = scene.ray_hit(&ray)?;
    let base = scene.get(hit.0)?.position();
    cursor.place_on_face(Some((base, hit.1)));
    Some(cursor.next_position())
}

#[test]
fn place_remove_flow() {
    let mut arena = GeometryArena::new();
    let mut scene = SceneCubes::new();
    scene.add(fixtures::cuboid_at(&mut arena, Vec3::ZERO, TEST_SIZE, 1.0));

    let mut cursor = BlockCursor::new(fixtures::unit_cuboid(&mut arena));
    let preview = pick_and_preview(&scene, &mut cursor, Vec3::new(0.0, 0.0, 5.0)).unwrap();
    assert!((preview - Vec3::new(0.0, 0.0, TEST_SIZE)).length() < 1e-5);

    // Commit the placement
    let id = scene.create(
        "cuboid",
        Some(preview),
        TEST_SIZE,
        Source::Inline(fixtures::dev_data_at(Vec3::ZERO, TEST_SIZE)),
        TEST_TARGET,
        1.0,
        &mut arena,
    );
    assert_eq!(scene.len(), 2);
    scene.refresh_obbs();

    // The new cuboid is now the closest hit from the same viewpoint
    let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
    let (picked, _) = scene.ray_hit(&ray).unwrap();
    assert_eq!(picked, id);

    // Secondary-click removal destroys exactly the picked cuboid
    assert!(scene.destroy(picked, &mut arena));
    assert_eq!(scene.len(), 1);
}

#[test]
fn symmetric_placement_commits_all_mirrors() {
    let mut arena = GeometryArena::new();
    let mut scene = SceneCubes::new();
    let mut session = Session::new();
    session.set_template(fixtures::unit_cuboid(&mut arena));
    session.toggle_symmetry(SymmetryMode::AllAxis);

    let seed = Vec3::new(0.1, 0.1, 0.0);
    let template_data = session.template().unwrap().dev_data(&arena);
    for position in session.placement_positions(seed) {
        scene.create(
            "cuboid",
            Some(position),
            TEST_SIZE,
            Source::Inline(template_data.clone()),
            TEST_TARGET,
            1.0,
            &mut arena,
        );
    }

    assert_eq!(scene.len(), 4);
    let positions: Vec<Vec3> = scene.iter().map(|c| c.position()).collect();
    for expected in [
        seed,
        Vec3::new(-0.1, 0.1, 0.0),
        Vec3::new(0.1, -0.1, 0.0),
        Vec3::new(-0.1, -0.1, 0.0),
    ] {
        assert!(positions.iter().any(|p| (*p - expected).length() < 1e-6));
    }
}

#[test]
fn save_load_export_pipeline() {
    let mut arena = GeometryArena::new();
    let aspect = 16.0 / 9.0;

    // A plus-shaped object: center plus six axis neighbors
    let mut positions = vec![Vec3::ZERO];
    for axis in 0..3 {
        let mut offset = Vec3::ZERO;
        offset[axis] = TEST_SIZE;
        positions.push(offset);
        positions.push(-offset);
    }
    let mut scene = fixtures::scene_with_cuboids(&mut arena, &positions, TEST_SIZE, aspect);

    // Save: development data reloads to numerically equivalent state
    let saved = scene.dev_data(&arena);
    let mut reloaded = SceneCubes::new();
    let count = reloaded
        .load_from_data(&saved, TEST_SIZE, TEST_TARGET, aspect, &mut arena)
        .unwrap();
    assert_eq!(count, 7);
    for (a, b) in scene.iter().zip(reloaded.iter()) {
        assert!((a.position() - b.position()).length() < 1e-5);
        assert_eq!(a.triangle_count(&arena), b.triangle_count(&arena));
    }

    // Export: the center cuboid of the plus is not fully surrounded (its
    // corners see daylight along the diagonals), so everything survives
    let exported = scene.export_data(&mut arena);
    let triangle_lines = exported
        .lines()
        .filter(|l| l.split_whitespace().count() == 18)
        .count();
    assert_eq!(triangle_lines, 7 * 12);
}

#[test]
fn export_unstretches_vertex_data() {
    let mut arena = GeometryArena::new();
    let aspect = 2.0;
    let mut scene = fixtures::scene_with_cuboids(&mut arena, &[Vec3::ZERO], TEST_SIZE, aspect);

    let dev = scene.dev_data(&arena);
    let export = scene.export_data(&mut arena);

    let dev_block = shared::format::parse_block(&dev).unwrap();
    let export_block = shared::format::parse_block(&export).unwrap();

    for (stretched, plain) in dev_block.triangles.iter().zip(&export_block.triangles) {
        for i in 0..3 {
            let s = stretched.position(i);
            let t = plain.position(i);
            assert!((s.x - t.x).abs() < 1e-6);
            assert!((s.y - t.y * aspect).abs() < 1e-6);
            assert!((s.z - t.z).abs() < 1e-6);
        }
    }
}
