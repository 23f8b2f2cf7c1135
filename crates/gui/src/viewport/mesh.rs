//! CPU-side mesh building: the cuboid primitive, GPU interleaving, and the
//! grid/axes line meshes.

use glam::Vec3;
use shared::{ObjectBlock, TriangleRecord, TRIANGLE_FLOATS, VERTEX_FLOATS};

use crate::scene::Triangle;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y,
/// norm.z, r, g, b], non-indexed (three vertices per triangle).
#[derive(Clone, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Clone, Default)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 7
    }
}

// ── Cuboid primitive ─────────────────────────────────────────

/// Triangle records for a cuboid spanning ±size/2 around the origin, in the
/// fixed face order front/back/right/left/top/bottom, two triangles per
/// face. This order is also the order the records serialize in.
pub fn cuboid_records(size: f32, color: Vec3) -> Vec<TriangleRecord> {
    let h = size * 0.5;

    let faces: [[Vec3; 4]; 6] = [
        // Front (+Z)
        [
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ],
        // Back (-Z)
        [
            Vec3::new(h, -h, -h),
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(h, h, -h),
        ],
        // Right (+X)
        [
            Vec3::new(h, -h, h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(h, h, h),
        ],
        // Left (-X)
        [
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, h, -h),
        ],
        // Top (+Y)
        [
            Vec3::new(-h, h, h),
            Vec3::new(h, h, h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
        ],
        // Bottom (-Y)
        [
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, -h, h),
            Vec3::new(-h, -h, h),
        ],
    ];

    let mut records = Vec::with_capacity(12);
    for quad in &faces {
        records.push(triangle_record([quad[0], quad[1], quad[2]], color));
        records.push(triangle_record([quad[0], quad[2], quad[3]], color));
    }
    records
}

/// A cuboid primitive as a format block positioned at the origin.
pub fn cuboid_block(size: f32, color: Vec3) -> ObjectBlock {
    ObjectBlock::new(Vec3::ZERO, cuboid_records(size, color))
}

fn triangle_record(positions: [Vec3; 3], color: Vec3) -> TriangleRecord {
    let mut v = [0.0f32; TRIANGLE_FLOATS];
    for (i, p) in positions.iter().enumerate() {
        let base = i * VERTEX_FLOATS;
        v[base] = p.x;
        v[base + 1] = p.y;
        v[base + 2] = p.z;
        v[base + 3] = color.x;
        v[base + 4] = color.y;
        v[base + 5] = color.z;
    }
    TriangleRecord(v)
}

// ── GPU interleaving ─────────────────────────────────────────

/// Expand 18-float triangle records plus their derived normals into the
/// 27-float-per-triangle layout the mesh shader consumes.
pub fn interleave(triangles: &[Triangle]) -> MeshData {
    let mut vertices = Vec::with_capacity(triangles.len() * 27);
    for triangle in triangles {
        let n = triangle.normal;
        for i in 0..3 {
            let p = triangle.record.position(i);
            let c = triangle.record.color(i);
            vertices.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, c.x, c.y, c.z]);
        }
    }
    MeshData { vertices }
}

/// Wireframe line vertices for a box given its 8 corners in the canonical
/// corner order (see `scene::cuboid::CORNER_OFFSETS`).
pub fn wireframe_lines(corners: &[Vec3; 8], color: [f32; 4]) -> LineMeshData {
    const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];

    let mut vertices = Vec::with_capacity(24 * 7);
    for (a, b) in EDGES {
        push_line_vert(&mut vertices, corners[a], color);
        push_line_vert(&mut vertices, corners[b], color);
    }
    LineMeshData { vertices }
}

// ── Grid and axes ────────────────────────────────────────────

pub fn grid(range: i32, cell_size: f32, opacity: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let grid_color = [0.25_f32, 0.25, 0.25, opacity];
    let origin_color_x = [0.5_f32, 0.2, 0.2, opacity * 0.7];
    let origin_color_z = [0.2_f32, 0.2, 0.5, opacity * 0.7];

    let extent = range as f32 * cell_size;

    for i in -range..=range {
        let f = i as f32 * cell_size;
        let color = if i == 0 { origin_color_z } else { grid_color };
        // Line along Z
        push_line_vert(&mut vertices, Vec3::new(f, 0.0, -extent), color);
        push_line_vert(&mut vertices, Vec3::new(f, 0.0, extent), color);

        let color = if i == 0 { origin_color_x } else { grid_color };
        // Line along X
        push_line_vert(&mut vertices, Vec3::new(-extent, 0.0, f), color);
        push_line_vert(&mut vertices, Vec3::new(extent, 0.0, f), color);
    }

    LineMeshData { vertices }
}

pub fn axes(length: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let r = [0.9_f32, 0.2, 0.2, 1.0];
    let g = [0.2_f32, 0.8, 0.2, 1.0];
    let b = [0.2_f32, 0.3, 0.9, 1.0];

    push_line_vert(&mut vertices, Vec3::ZERO, r);
    push_line_vert(&mut vertices, Vec3::new(length, 0.0, 0.0), r);
    push_line_vert(&mut vertices, Vec3::ZERO, g);
    push_line_vert(&mut vertices, Vec3::new(0.0, length, 0.0), g);
    push_line_vert(&mut vertices, Vec3::ZERO, b);
    push_line_vert(&mut vertices, Vec3::new(0.0, 0.0, length), b);

    LineMeshData { vertices }
}

fn push_line_vert(v: &mut Vec<f32>, p: Vec3, c: [f32; 4]) {
    v.extend_from_slice(&[p.x, p.y, p.z, c[0], c[1], c[2], c[3]]);
}
