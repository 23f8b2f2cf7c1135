//! Scene state: the cuboid collection, its per-target index and dirty
//! flags, ray queries across the whole collection, and the batch OBB
//! refresh that runs before every frame.

pub mod arena;
pub mod cuboid;
pub mod occlusion;

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use rayon::prelude::*;
use uuid::Uuid;

use shared::format::{self, FormatError};

pub use arena::{BufferId, GeometryArena, Triangle};
pub use cuboid::{Cuboid, Source};

use crate::viewport::picking::{ray_obb_face, FaceHit, Ray};

/// Opaque shader/target handle. Assigned by the target registry; the scene
/// only ever compares it for equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

#[derive(Default)]
pub struct SceneCubes {
    cuboids: Vec<Cuboid>,
    /// Derived index: which cuboids use each render target.
    target_groups: HashMap<TargetId, Vec<Uuid>>,
    /// Targets whose view/projection uniforms must be re-pushed.
    needs_update: HashMap<TargetId, bool>,
    /// Bumped on every mutation; gates GPU buffer re-upload.
    version: u64,
}

impl SceneCubes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bump the version without any other bookkeeping.
    pub fn notify_mutated(&mut self) {
        self.version += 1;
    }

    pub fn len(&self) -> usize {
        self.cuboids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuboids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cuboid> {
        self.cuboids.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&Cuboid> {
        self.cuboids.iter().find(|cuboid| cuboid.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Cuboid> {
        self.cuboids.iter_mut().find(|cuboid| cuboid.id == id)
    }

    // ── Creation / removal ───────────────────────────────────

    /// Instantiate a cuboid and append it, marking its target dirty.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        name: &str,
        position: Option<Vec3>,
        size: f32,
        source: Source,
        target: TargetId,
        aspect: f32,
        arena: &mut GeometryArena,
    ) -> Uuid {
        let cuboid = Cuboid::new(name, position, size, source, target, aspect, arena);
        let id = cuboid.id;
        self.add(cuboid);
        id
    }

    /// Append a pre-built cuboid.
    pub fn add(&mut self, cuboid: Cuboid) {
        self.target_groups
            .entry(cuboid.target)
            .or_default()
            .push(cuboid.id);
        self.needs_update.insert(cuboid.target, true);
        self.cuboids.push(cuboid);
        self.notify_mutated();
    }

    /// Remove one cuboid by identity. Two cuboids with identical geometry
    /// remain distinguishable; only the picked one is removed.
    pub fn destroy(&mut self, id: Uuid, arena: &mut GeometryArena) -> bool {
        let Some(index) = self.cuboids.iter().position(|cuboid| cuboid.id == id) else {
            return false;
        };
        let cuboid = self.cuboids.remove(index);
        for (_, buffer) in cuboid.buffers() {
            arena.free(buffer);
        }
        if let Some(group) = self.target_groups.get_mut(&cuboid.target) {
            group.retain(|member| *member != id);
        }
        self.needs_update.insert(cuboid.target, true);
        self.notify_mutated();
        true
    }

    pub fn clear(&mut self, arena: &mut GeometryArena) {
        for cuboid in &self.cuboids {
            for (_, buffer) in cuboid.buffers() {
                arena.free(buffer);
            }
        }
        self.cuboids.clear();
        self.target_groups.clear();
        self.notify_mutated();
    }

    // ── Batch updates ────────────────────────────────────────

    /// Recompute every cuboid's OBB, fanned out over contiguous chunks.
    /// Compute-only: returns after all chunks complete, so GPU work that
    /// follows on the calling thread sees consistent state.
    pub fn refresh_obbs(&mut self) {
        if self.cuboids.is_empty() {
            return;
        }
        let chunk = self.cuboids.len().div_ceil(rayon::current_num_threads());
        self.cuboids.par_chunks_mut(chunk).for_each(|chunk| {
            for cuboid in chunk {
                cuboid.update_obb();
            }
        });
    }

    /// Re-thread a new viewport aspect ratio through every cuboid.
    pub fn rescale_all(&mut self, aspect: f32) {
        for cuboid in &mut self.cuboids {
            cuboid.set_aspect(aspect);
        }
        self.notify_mutated();
    }

    /// Mark targets of visible cuboids dirty, then drain the dirty set.
    /// The renderer re-pushes view/projection uniforms for the returned
    /// targets only.
    pub fn targets_needing_update(&mut self, view_projection: &Mat4) -> Vec<TargetId> {
        for cuboid in &self.cuboids {
            if cuboid.is_visible(view_projection) {
                self.needs_update.insert(cuboid.target, true);
            }
        }

        let mut targets: Vec<TargetId> = self
            .needs_update
            .iter()
            .filter(|(_, dirty)| **dirty)
            .map(|(target, _)| *target)
            .collect();
        targets.sort();
        for target in &targets {
            self.needs_update.insert(*target, false);
        }
        targets
    }

    // ── Ray queries ──────────────────────────────────────────

    /// Closest hit across the whole collection: the smallest non-negative
    /// entry distance wins. Linear scan, every cuboid tested.
    pub fn ray_hit(&self, ray: &Ray) -> Option<(Uuid, FaceHit)> {
        let mut best: Option<(Uuid, FaceHit)> = None;
        for cuboid in &self.cuboids {
            if let Some(hit) = ray_obb_face(ray, cuboid.obb()) {
                if hit.t < 0.0 {
                    continue;
                }
                if best.as_ref().is_none_or(|(_, b)| hit.t < b.t) {
                    best = Some((cuboid.id, hit));
                }
            }
        }
        best
    }

    /// Variant returning a mutable handle, so destructive handlers operate
    /// on exactly the cuboid that was picked.
    pub fn ray_hit_mut(&mut self, ray: &Ray) -> Option<(&mut Cuboid, FaceHit)> {
        let mut best: Option<(usize, FaceHit)> = None;
        for (index, cuboid) in self.cuboids.iter().enumerate() {
            if let Some(hit) = ray_obb_face(ray, cuboid.obb()) {
                if hit.t < 0.0 {
                    continue;
                }
                if best.as_ref().is_none_or(|(_, b)| hit.t < b.t) {
                    best = Some((index, hit));
                }
            }
        }
        match best {
            Some((index, hit)) => Some((&mut self.cuboids[index], hit)),
            None => None,
        }
    }

    // ── Color ────────────────────────────────────────────────

    pub fn set_color(&mut self, id: Uuid, color: Vec3, arena: &mut GeometryArena) {
        if let Some(index) = self.cuboids.iter().position(|cuboid| cuboid.id == id) {
            self.cuboids[index].set_color(arena, color);
            self.notify_mutated();
        }
    }

    // ── Persistence ──────────────────────────────────────────

    /// Development serialization of the whole scene: blocks back-to-back,
    /// vertex Y aspect-stretched.
    pub fn dev_data(&self, arena: &GeometryArena) -> String {
        let mut out = String::new();
        for cuboid in &self.cuboids {
            out.push_str(&cuboid.dev_data(arena));
        }
        out
    }

    /// Export serialization: removes geometry hidden on every sampled ray,
    /// then writes true (unstretched) blocks.
    pub fn export_data(&mut self, arena: &mut GeometryArena) -> String {
        occlusion::remove_hidden_geometry(self, arena);
        let mut out = String::new();
        for cuboid in &self.cuboids {
            out.push_str(&cuboid.export_data(arena));
        }
        out
    }

    /// Replace the scene with the cuboids parsed from development-format
    /// text. On a parse error the scene is left unchanged.
    pub fn load_from_data(
        &mut self,
        data: &str,
        size: f32,
        target: TargetId,
        aspect: f32,
        arena: &mut GeometryArena,
    ) -> Result<usize, FormatError> {
        let blocks = format::parse_blocks(data)?;
        self.clear(arena);
        for (i, block) in blocks.iter().enumerate() {
            let local = block.with_y_scaled(1.0 / aspect);
            let cuboid = Cuboid::from_block(
                &format!("cuboid_{i}"),
                &local,
                None,
                size,
                None,
                target,
                aspect,
                arena,
            );
            self.add(cuboid);
        }
        Ok(blocks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, TEST_TARGET};

    fn ray_toward_origin_from_z() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z)
    }

    #[test]
    fn single_cuboid_head_on_hit() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.1, 1.0));

        let (_, hit) = scene.ray_hit(&ray_toward_origin_from_z()).unwrap();
        assert!((hit.t - 4.95).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn closest_hit_wins_among_overlapping_cuboids() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        let far = fixtures::cuboid_at(&mut arena, Vec3::new(0.0, 0.0, -0.05), 0.2, 1.0);
        let near = fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.2, 1.0);
        let far_id = far.id;
        let near_id = near.id;
        scene.add(far);
        scene.add(near);

        let (id, hit) = scene.ray_hit(&ray_toward_origin_from_z()).unwrap();
        assert_eq!(id, near_id);
        assert_ne!(id, far_id);
        // The reported face belongs to the returned cuboid
        assert!((hit.t - (5.0 - 0.1)).abs() < 1e-4);
    }

    #[test]
    fn no_hit_when_scene_is_missed() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::new(3.0, 0.0, 0.0), 0.1, 1.0));
        assert!(scene.ray_hit(&ray_toward_origin_from_z()).is_none());
    }

    #[test]
    fn destroy_removes_only_the_picked_duplicate() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        // Two identical cuboids at the same position
        let first = fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.1, 1.0);
        let second = fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.1, 1.0);
        let first_id = first.id;
        scene.add(first);
        scene.add(second);

        assert!(scene.destroy(first_id, &mut arena));
        assert_eq!(scene.len(), 1);
        assert!(scene.get(first_id).is_none());
        // Destroying the same identity again is a no-op
        assert!(!scene.destroy(first_id, &mut arena));
    }

    #[test]
    fn mutation_through_collection_is_observed_by_refresh() {
        // Regression for by-value iteration: a position edit through the
        // collection must be visible to the OBB refresh the render pass
        // consumes.
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        let id = scene.create(
            "cuboid",
            Some(Vec3::ZERO),
            0.1,
            Source::Inline(fixtures::dev_data_at(Vec3::ZERO, 0.1)),
            TEST_TARGET,
            2.0,
            &mut arena,
        );

        scene.get_mut(id).unwrap().set_position(Vec3::new(0.0, 0.3, 0.0));
        scene.refresh_obbs();

        let cuboid = scene.get(id).unwrap();
        assert!((cuboid.obb().center.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn mutable_hit_variant_picks_the_same_cuboid() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::new(0.0, 0.0, -1.0), 0.1, 1.0));
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.1, 1.0));

        let ray = ray_toward_origin_from_z();
        let picked_id = scene.ray_hit(&ray).unwrap().0;

        let (cuboid, hit) = scene.ray_hit_mut(&ray).unwrap();
        assert_eq!(cuboid.id, picked_id);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);

        // The handle mutates the stored cuboid, not a copy
        cuboid.set_position(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(
            scene.get(picked_id).unwrap().position(),
            Vec3::new(2.0, 0.0, 0.0)
        );
    }

    #[test]
    fn dirty_targets_drain_after_query() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.1, 1.0));

        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(70.0f32.to_radians(), 1.0, 0.1, 100.0);
        let vp = projection * view;

        let first = scene.targets_needing_update(&vp);
        assert_eq!(first, vec![TEST_TARGET]);
        // Visible cuboid marks its target again on the next query
        let second = scene.targets_needing_update(&vp);
        assert_eq!(second, vec![TEST_TARGET]);

        // With nothing visible the drained set stays empty
        let away = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 4.0), Vec3::Y);
        let vp_away = projection * away;
        assert!(scene.targets_needing_update(&vp_away).is_empty());
    }

    #[test]
    fn save_then_load_round_trips_scene_data() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        let aspect = 16.0 / 9.0;
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::new(0.1, 0.2, 0.3), 0.1, aspect));
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::new(-0.1, 0.0, 0.4), 0.1, aspect));

        let saved = scene.dev_data(&arena);
        let originals: Vec<_> = scene.iter().map(|c| c.to_block(&arena)).collect();

        let mut reloaded = SceneCubes::new();
        let count = reloaded
            .load_from_data(&saved, 0.1, TEST_TARGET, aspect, &mut arena)
            .unwrap();
        assert_eq!(count, 2);

        for (original, loaded) in originals.iter().zip(reloaded.iter()) {
            let block = loaded.to_block(&arena);
            assert!((original.position_vec() - block.position_vec()).length() < 1e-5);
            assert_eq!(original.triangles.len(), block.triangles.len());
            for (a, b) in original.triangles.iter().zip(&block.triangles) {
                for i in 0..3 {
                    assert!((a.position(i) - b.position(i)).abs().max_element() < 1e-5);
                    assert!((a.color(i) - b.color(i)).abs().max_element() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn failed_load_leaves_scene_unchanged() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        scene.add(fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.1, 1.0));

        let result = scene.load_from_data("not geometry", 0.1, TEST_TARGET, 1.0, &mut arena);
        assert!(result.is_err());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn version_advances_on_mutation() {
        let mut arena = GeometryArena::new();
        let mut scene = SceneCubes::new();
        let v0 = scene.version();
        let id = scene.create(
            "cuboid",
            Some(Vec3::ZERO),
            0.1,
            Source::Inline(fixtures::dev_data_at(Vec3::ZERO, 0.1)),
            TEST_TARGET,
            1.0,
            &mut arena,
        );
        let v1 = scene.version();
        assert!(v1 > v0);
        scene.destroy(id, &mut arena);
        assert!(scene.version() > v1);
    }
}
