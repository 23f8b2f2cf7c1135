//! Placement cursor: a preview cuboid that snaps to the face the pointer
//! is hovering.

use glam::Vec3;

use crate::scene::Cuboid;
use crate::viewport::picking::FaceHit;

const AXES: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

pub struct BlockCursor {
    pub cuboid: Cuboid,
    current_translation: Vec3,
    pub visible: bool,
}

impl BlockCursor {
    /// The cursor owns a preview cuboid, usually a shared clone of the
    /// session's placement template.
    pub fn new(cuboid: Cuboid) -> Self {
        Self {
            cuboid,
            current_translation: Vec3::ZERO,
            visible: false,
        }
    }

    /// Snap the preview one cuboid-width off the struck face of the hovered
    /// cuboid. No hit fully resets the transient translation and hides the
    /// cursor.
    pub fn place_on_face(&mut self, hit: Option<(Vec3, FaceHit)>) {
        let Some((base_position, face)) = hit else {
            self.current_translation = Vec3::ZERO;
            self.cuboid.reset_translation();
            self.visible = false;
            return;
        };

        // Step along the struck axis in true (unstretched) space; adjacent
        // cuboid centers differ by exactly one edge length.
        let step = AXES[face.axis] * face.sign * self.cuboid.size()[face.axis];
        let new_translation = base_position + step;

        if new_translation != self.current_translation {
            self.cuboid.reset_translation();
            self.cuboid.translate(new_translation);
            self.current_translation = new_translation;
        }
        self.visible = true;
    }

    /// Where the next cuboid would be committed.
    pub fn next_position(&self) -> Vec3 {
        self.cuboid.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::scene::GeometryArena;
    use crate::viewport::picking::{ray_obb_face, Ray};

    fn face_hit(axis: usize, sign: f32) -> FaceHit {
        FaceHit {
            t: 1.0,
            axis,
            sign,
            normal: AXES[axis] * sign,
        }
    }

    #[test]
    fn no_hit_hides_and_resets() {
        let mut arena = GeometryArena::new();
        let mut cursor = BlockCursor::new(fixtures::unit_cuboid(&mut arena));

        cursor.place_on_face(Some((Vec3::ZERO, face_hit(0, 1.0))));
        assert!(cursor.visible);

        cursor.place_on_face(None);
        assert!(!cursor.visible);
        assert_eq!(cursor.next_position(), Vec3::ZERO);
    }

    #[test]
    fn snaps_one_edge_length_off_the_face() {
        let mut arena = GeometryArena::new();
        let mut cursor = BlockCursor::new(fixtures::unit_cuboid(&mut arena));

        let base = Vec3::new(0.1, 0.2, 0.0);
        cursor.place_on_face(Some((base, face_hit(1, -1.0))));
        assert!(cursor.visible);
        assert!((cursor.next_position() - Vec3::new(0.1, 0.1, 0.0)).length() < 1e-6);
    }

    #[test]
    fn rehover_of_same_face_does_not_accumulate() {
        let mut arena = GeometryArena::new();
        let mut cursor = BlockCursor::new(fixtures::unit_cuboid(&mut arena));

        let base = Vec3::ZERO;
        cursor.place_on_face(Some((base, face_hit(2, 1.0))));
        let first = cursor.next_position();
        cursor.place_on_face(Some((base, face_hit(2, 1.0))));
        assert_eq!(cursor.next_position(), first);
        assert!((first - Vec3::new(0.0, 0.0, 0.1)).length() < 1e-6);
    }

    #[test]
    fn picked_face_drives_the_preview_position() {
        // End to end: ray against a cuboid's OBB, hit face into the cursor
        let mut arena = GeometryArena::new();
        let target = fixtures::cuboid_at(&mut arena, Vec3::ZERO, 0.1, 1.0);
        let mut cursor = BlockCursor::new(fixtures::unit_cuboid(&mut arena));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = ray_obb_face(&ray, target.obb()).unwrap();
        cursor.place_on_face(Some((target.position(), hit)));

        assert!((cursor.next_position() - Vec3::new(0.0, 0.0, 0.1)).length() < 1e-6);
    }
}
