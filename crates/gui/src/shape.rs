//! Shape expansion: turning one placement position into the set of
//! positions that are instantiated together.

use glam::Vec3;

/// What a single placement expands into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShapeKind {
    #[default]
    None,
    Symmetry,
    /// Recognized but not functionally implemented.
    Sphere,
    /// Recognized but not functionally implemented.
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SymmetryMode {
    #[default]
    None,
    AllAxis,
    /// Per-axis modes are recognized but have no expansion yet; the seed
    /// alone is returned.
    XAxis,
    YAxis,
    ZAxis,
}

/// Current shape state: kind, symmetry mode and the expanded positions for
/// the last seed. Recomputed every time the placement cursor moves.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    pub kind: ShapeKind,
    pub symmetry: SymmetryMode,
    positions: Vec<Vec3>,
}

impl Shape {
    pub fn set_seed(&mut self, seed: Vec3) {
        self.positions = match self.kind {
            ShapeKind::Symmetry => symmetry_positions(seed, self.symmetry),
            _ => vec![seed],
        };
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn clear(&mut self) {
        self.kind = ShapeKind::None;
        self.symmetry = SymmetryMode::None;
        self.positions.clear();
    }
}

/// Mirror a seed position under a symmetry mode. A coordinate at exactly
/// zero has no distinct mirror and produces no duplicate, so all-axis
/// symmetry yields between 1 and 8 distinct positions.
pub fn symmetry_positions(seed: Vec3, mode: SymmetryMode) -> Vec<Vec3> {
    let mut positions = vec![seed];
    let Vec3 { x, y, z } = seed;

    if mode == SymmetryMode::AllAxis {
        if x != 0.0 {
            positions.push(Vec3::new(-x, y, z));
        }
        if y != 0.0 {
            positions.push(Vec3::new(x, -y, z));
        }
        if z != 0.0 {
            positions.push(Vec3::new(x, y, -z));
        }
        if x != 0.0 && y != 0.0 {
            positions.push(Vec3::new(-x, -y, z));
        }
        if y != 0.0 && z != 0.0 {
            positions.push(Vec3::new(x, -y, -z));
        }
        if x != 0.0 && z != 0.0 {
            positions.push(Vec3::new(-x, y, -z));
        }
        if x != 0.0 && y != 0.0 && z != 0.0 {
            positions.push(Vec3::new(-x, -y, -z));
        }
    }

    positions
}
