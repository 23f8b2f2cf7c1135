//! Shared value types for the Cubed geometry format.
//!
//! This crate owns the on-disk representation of an object: a position line
//! followed by flat 18-float triangle records. It is GL-free so the codec
//! can be exercised from tests and tooling without a window.

pub mod format;

use glam::Vec3;

/// Floats per serialized triangle: 3 vertices x (position.xyz + color.rgb).
pub const TRIANGLE_FLOATS: usize = 18;

/// Floats per vertex inside a triangle record.
pub const VERTEX_FLOATS: usize = 6;

/// Indices of the vertex Y coordinates inside a triangle record.
pub const VERTEX_Y_INDICES: [usize; 3] = [1, 7, 13];

/// One triangle as a flat attribute block: `[x y z r g b] * 3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleRecord(pub [f32; TRIANGLE_FLOATS]);

impl TriangleRecord {
    /// Position of vertex `i` (0..3).
    pub fn position(&self, i: usize) -> Vec3 {
        let base = i * VERTEX_FLOATS;
        Vec3::new(self.0[base], self.0[base + 1], self.0[base + 2])
    }

    pub fn set_position(&mut self, i: usize, p: Vec3) {
        let base = i * VERTEX_FLOATS;
        self.0[base] = p.x;
        self.0[base + 1] = p.y;
        self.0[base + 2] = p.z;
    }

    /// Color of vertex `i` (0..3).
    pub fn color(&self, i: usize) -> Vec3 {
        let base = i * VERTEX_FLOATS + 3;
        Vec3::new(self.0[base], self.0[base + 1], self.0[base + 2])
    }

    /// Set the same color on all three vertices.
    pub fn set_color(&mut self, color: Vec3) {
        for i in 0..3 {
            let base = i * VERTEX_FLOATS + 3;
            self.0[base] = color.x;
            self.0[base + 1] = color.y;
            self.0[base + 2] = color.z;
        }
    }

    /// Multiply every vertex Y by `factor`.
    pub fn scale_y(&mut self, factor: f32) {
        for idx in VERTEX_Y_INDICES {
            self.0[idx] *= factor;
        }
    }

    /// Face normal from the cross product of two edges. Degenerate
    /// triangles yield a zero vector rather than an error.
    pub fn face_normal(&self) -> Vec3 {
        let e1 = self.position(1) - self.position(0);
        let e2 = self.position(2) - self.position(0);
        e1.cross(e2).normalize_or_zero()
    }
}

/// One object's block in a geometry file: a position plus its triangles.
///
/// Vertex data is object-local; the position line carries the object's
/// translation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectBlock {
    pub position: [f32; 3],
    pub triangles: Vec<TriangleRecord>,
}

impl ObjectBlock {
    pub fn new(position: Vec3, triangles: Vec<TriangleRecord>) -> Self {
        Self {
            position: position.to_array(),
            triangles,
        }
    }

    pub fn position_vec(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Copy with every vertex Y multiplied by `factor` (development files
    /// store aspect-stretched Y; export files store true Y).
    pub fn with_y_scaled(&self, factor: f32) -> Self {
        let mut out = self.clone();
        for tri in &mut out.triangles {
            tri.scale_y(factor);
        }
        out
    }
}
