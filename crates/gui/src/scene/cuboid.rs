//! A cuboid primitive: triangle geometry grouped by render target plus the
//! transform pipeline that keeps picking aligned with aspect-ratio
//! compensated rendering.
//!
//! Two parallel transforms are tracked. The "true" state is the committed,
//! unstretched one used for persistence; the working state absorbs
//! transient translations (the placement preview) and can be fully undone
//! with `reset_translation`. The stretched model matrix is always the
//! working matrix composed with a diagonal scale whose Y factor is the
//! viewport aspect ratio, and the OBB used for picking derives from it.

use std::collections::HashMap;
use std::path::PathBuf;

use glam::{Mat3, Mat4, Vec3, Vec4};
use uuid::Uuid;

use shared::{format, ObjectBlock};

use super::arena::{BufferId, GeometryArena, Triangle};
use super::TargetId;
use crate::viewport::picking::Obb;

/// Vertex positions must match a corner within this distance to count as
/// touching it (export culling).
pub const CORNER_MATCH_EPSILON: f32 = 1e-3;

/// Corner offsets in half-extent units, in the canonical order minXYZ
/// first, +Z half second. Wireframe edges and visibility tests index into
/// this order.
pub const CORNER_OFFSETS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Where a cuboid's geometry comes from: a file on disk or text already in
/// memory (a template clone, or one block of a multi-object file).
#[derive(Clone, Debug)]
pub enum Source {
    Path(PathBuf),
    Inline(String),
}

impl Source {
    /// Read development-format text and recover the local (unstretched)
    /// geometry block. Missing files and malformed data are reported and
    /// degrade to an empty block; callers tolerate zero-triangle cuboids.
    fn load(&self, aspect: f32) -> ObjectBlock {
        let data = match self {
            Source::Path(path) => match std::fs::read_to_string(path) {
                Ok(data) => data,
                Err(err) => {
                    tracing::error!(path = %path.display(), %err, "failed to read cuboid file");
                    return ObjectBlock::default();
                }
            },
            Source::Inline(text) => text.clone(),
        };

        match format::parse_block(&data) {
            Ok(block) => block.with_y_scaled(1.0 / aspect),
            Err(err) => {
                tracing::error!(%err, "invalid cuboid data");
                ObjectBlock::default()
            }
        }
    }

    fn path(&self) -> Option<PathBuf> {
        match self {
            Source::Path(path) => Some(path.clone()),
            Source::Inline(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct Cuboid {
    pub id: Uuid,
    pub name: String,
    pub target: TargetId,
    /// File the geometry was read from, if any.
    pub source_path: Option<PathBuf>,

    /// Triangle buffers grouped by render target. Handles, not buffers:
    /// copies of this cuboid alias the same vertex data.
    geometry: HashMap<TargetId, BufferId>,

    size: Vec3,
    stretched_size: Vec3,
    aspect: f32,

    true_position: Vec3,
    translated_true_position: Vec3,
    true_model: Mat4,
    model: Mat4,
    stretched_model: Mat4,

    obb: Obb,
    corners: [Vec3; 8],
}

impl Cuboid {
    /// Create from a file path or in-memory development-format text.
    /// `position: None` keeps the position stored in the data.
    pub fn new(
        name: &str,
        position: Option<Vec3>,
        size: f32,
        source: Source,
        target: TargetId,
        aspect: f32,
        arena: &mut GeometryArena,
    ) -> Self {
        let block = source.load(aspect);
        Self::from_block(name, &block, position, size, source.path(), target, aspect, arena)
    }

    /// Core constructor from an already-local geometry block.
    #[allow(clippy::too_many_arguments)]
    pub fn from_block(
        name: &str,
        block: &ObjectBlock,
        position: Option<Vec3>,
        size: f32,
        source_path: Option<PathBuf>,
        target: TargetId,
        aspect: f32,
        arena: &mut GeometryArena,
    ) -> Self {
        let triangles: Vec<Triangle> = block
            .triangles
            .iter()
            .map(|record| Triangle::new(*record))
            .collect();
        let buffer = arena.insert(triangles);

        let mut cuboid = Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            target,
            source_path,
            geometry: HashMap::from([(target, buffer)]),
            size: Vec3::splat(size),
            stretched_size: Vec3::splat(size) * Vec3::new(1.0, aspect, 1.0),
            aspect,
            true_position: Vec3::ZERO,
            translated_true_position: Vec3::ZERO,
            true_model: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            stretched_model: Mat4::IDENTITY,
            obb: Obb::default(),
            corners: [Vec3::ZERO; 8],
        };

        cuboid.set_position(position.unwrap_or_else(|| block.position_vec()));
        cuboid.commit_translation();
        cuboid
    }

    /// Copy that shares geometry buffers with the original but has its own
    /// identity. A color edit through either copy is seen by both.
    pub fn clone_shared(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy
    }

    // ── Positional state ─────────────────────────────────────

    /// Working (translated, unstretched) position.
    pub fn position(&self) -> Vec3 {
        self.translated_true_position
    }

    /// Committed position, restored by `reset_translation`.
    pub fn true_position(&self) -> Vec3 {
        self.true_position
    }

    /// Position with the aspect-ratio Y stretch applied; this is where the
    /// cuboid renders and where its OBB is centered.
    pub fn stretched_position(&self) -> Vec3 {
        self.stretched_model.w_axis.truncate()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.translated_true_position = position;
        self.model.w_axis = Vec4::new(position.x, position.y, position.z, 1.0);
        self.update_stretch();
    }

    pub fn translate(&mut self, translation: Vec3) {
        self.set_position(self.translated_true_position + translation);
    }

    /// Undo transient translations, restoring the committed transforms.
    pub fn reset_translation(&mut self) {
        self.translated_true_position = self.true_position;
        self.model = self.true_model;
        self.update_stretch();
    }

    /// Make the working transform the committed one.
    pub fn commit_translation(&mut self) {
        self.true_position = self.translated_true_position;
        self.true_model = self.model;
    }

    // ── Size / aspect ────────────────────────────────────────

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn stretched_size(&self) -> Vec3 {
        self.stretched_size
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Re-thread a new viewport aspect ratio (window resize).
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_stretch();
    }

    fn update_stretch(&mut self) {
        let stretch = Vec3::new(1.0, self.aspect, 1.0);
        self.stretched_model = self.model * Mat4::from_scale(stretch);
        // The translation column stretches too, so stretched.y = y * aspect
        self.stretched_model.w_axis = self.model.w_axis * stretch.extend(1.0);
        self.stretched_size = self.size * stretch;
        self.update_obb();
    }

    // ── Render state ─────────────────────────────────────────

    pub fn stretched_model(&self) -> Mat4 {
        self.stretched_model
    }

    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.stretched_model).inverse().transpose()
    }

    // ── OBB ──────────────────────────────────────────────────

    /// Recompute axes, half-extents and corners from the stretched model.
    /// Called for every cuboid each frame before picking and rendering.
    pub fn update_obb(&mut self) {
        let basis = Mat3::from_mat4(self.stretched_model);
        let columns = [basis.x_axis, basis.y_axis, basis.z_axis];

        let mut axes = [Vec3::X, Vec3::Y, Vec3::Z];
        let mut scale = Vec3::ONE;
        for i in 0..3 {
            let length = columns[i].length();
            if length > f32::EPSILON {
                axes[i] = columns[i] / length;
            }
            scale[i] = length;
        }

        let center = self.stretched_position();
        let half_extents = self.size * 0.5 * scale;
        self.obb = Obb {
            center,
            axes,
            half_extents,
        };

        for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
            self.corners[i] = center
                + axes[0] * (offset[0] * half_extents.x)
                + axes[1] * (offset[1] * half_extents.y)
                + axes[2] * (offset[2] * half_extents.z);
        }
    }

    pub fn obb(&self) -> &Obb {
        &self.obb
    }

    /// World-space (stretched) corners, for visibility and wireframes.
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Unstretched corners around the working position, for export culling.
    pub fn true_corners(&self) -> [Vec3; 8] {
        let center = self.translated_true_position;
        let half = self.size * 0.5;
        CORNER_OFFSETS.map(|offset| center + Vec3::from_array(offset) * half)
    }

    /// Coarse frustum test: visible when any corner lands inside the
    /// [-1, 1]^3 device volume. A corner outside one axis does not veto
    /// another corner that qualifies.
    pub fn is_visible(&self, view_projection: &Mat4) -> bool {
        for corner in &self.corners {
            let clip = *view_projection * corner.extend(1.0);
            let ndc = clip / clip.w;
            if (-1.0..=1.0).contains(&ndc.x)
                && (-1.0..=1.0).contains(&ndc.y)
                && (-1.0..=1.0).contains(&ndc.z)
            {
                return true;
            }
        }
        false
    }

    // ── Geometry access ──────────────────────────────────────

    pub fn buffers(&self) -> impl Iterator<Item = (TargetId, BufferId)> + '_ {
        self.geometry.iter().map(|(target, buffer)| (*target, *buffer))
    }

    pub fn triangle_count(&self, arena: &GeometryArena) -> usize {
        self.geometry
            .values()
            .map(|buffer| arena.get(*buffer).len())
            .sum()
    }

    pub fn set_color(&mut self, arena: &mut GeometryArena, color: Vec3) {
        for buffer in self.geometry.values() {
            arena.set_color(*buffer, color);
        }
    }

    /// Color of the first triangle's first vertex, or None when empty.
    pub fn color(&self, arena: &GeometryArena) -> Option<Vec3> {
        self.geometry
            .values()
            .flat_map(|buffer| arena.get(*buffer))
            .next()
            .map(|triangle| triangle.record.color(0))
    }

    /// Delete every triangle with a vertex on one of `corners` (working
    /// position plus local vertex, matched within `CORNER_MATCH_EPSILON`).
    pub fn remove_triangles_matching(
        &mut self,
        arena: &mut GeometryArena,
        corners: &[Vec3],
    ) -> usize {
        let position = self.translated_true_position;
        let mut removed = 0;

        for buffer in self.geometry.values() {
            if let Some(triangles) = arena.get_mut(*buffer) {
                let before = triangles.len();
                triangles.retain(|triangle| {
                    !(0..3).any(|i| {
                        let vertex = triangle.record.position(i) + position;
                        corners
                            .iter()
                            .any(|corner| (vertex - *corner).abs().max_element() < CORNER_MATCH_EPSILON)
                    })
                });
                removed += before - triangles.len();
            }
        }
        removed
    }

    // ── Serialization ────────────────────────────────────────

    /// The cuboid as a local-geometry block at its working position.
    pub fn to_block(&self, arena: &GeometryArena) -> ObjectBlock {
        let mut triangles = Vec::new();
        for buffer in self.geometry.values() {
            triangles.extend(arena.get(*buffer).iter().map(|t| t.record));
        }
        ObjectBlock::new(self.translated_true_position, triangles)
    }

    /// Development serialization: vertex Y stretched by the aspect ratio.
    /// `Source::load` undoes the stretch, so save then load round-trips.
    pub fn dev_data(&self, arena: &GeometryArena) -> String {
        format::write_block(&self.to_block(arena).with_y_scaled(self.aspect))
    }

    /// Export serialization: true (unstretched) geometry, portable outside
    /// the editor.
    pub fn export_data(&self, arena: &GeometryArena) -> String {
        format::write_block(&self.to_block(arena))
    }
}
