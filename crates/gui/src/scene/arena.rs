//! Geometry buffer arena.
//!
//! Cuboids hold `BufferId` handles into this arena instead of owning their
//! triangle lists, so every copy of a cuboid observes the same vertex data
//! after a color or position edit.

use glam::Vec3;
use shared::TriangleRecord;

/// Stable handle to a triangle buffer in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// One triangle: its flat attribute record plus the derived face normal.
#[derive(Clone, Debug)]
pub struct Triangle {
    pub record: TriangleRecord,
    pub normal: Vec3,
}

impl Triangle {
    pub fn new(record: TriangleRecord) -> Self {
        let normal = record.face_normal();
        Self { record, normal }
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.record.set_color(color);
    }

    /// Move one vertex; the face normal must be re-derived afterwards.
    pub fn set_vertex_position(&mut self, i: usize, p: Vec3) {
        self.record.set_position(i, p);
        self.normal = self.record.face_normal();
    }
}

#[derive(Default)]
pub struct GeometryArena {
    slots: Vec<Option<Vec<Triangle>>>,
    free: Vec<u32>,
}

impl GeometryArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triangles: Vec<Triangle>) -> BufferId {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(triangles);
            BufferId(index)
        } else {
            self.slots.push(Some(triangles));
            BufferId((self.slots.len() - 1) as u32)
        }
    }

    /// Freed or unknown handles yield an empty slice, so a cuboid with no
    /// geometry stays harmless to downstream consumers.
    pub fn get(&self, id: BufferId) -> &[Triangle] {
        self.slots
            .get(id.0 as usize)
            .and_then(|slot| slot.as_deref())
            .unwrap_or(&[])
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut Vec<Triangle>> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn set_color(&mut self, id: BufferId, color: Vec3) {
        if let Some(triangles) = self.get_mut(id) {
            for triangle in triangles {
                triangle.set_color(color);
            }
        }
    }

    pub fn free(&mut self, id: BufferId) {
        if let Some(slot) = self.slots.get_mut(id.0 as usize) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TRIANGLE_FLOATS;

    fn triangle() -> Triangle {
        let mut v = [0.0f32; TRIANGLE_FLOATS];
        v[6] = 1.0; // second vertex at (1, 0, 0)
        v[13] = 1.0; // third vertex at (0, 1, 0)
        Triangle::new(TriangleRecord(v))
    }

    #[test]
    fn handles_alias_the_same_buffer() {
        let mut arena = GeometryArena::new();
        let id = arena.insert(vec![triangle()]);
        let copy = id;

        arena.set_color(id, Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(arena.get(copy)[0].record.color(0), Vec3::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn freed_handle_reads_empty() {
        let mut arena = GeometryArena::new();
        let id = arena.insert(vec![triangle()]);
        arena.free(id);
        assert!(arena.get(id).is_empty());
        assert!(arena.is_empty());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = GeometryArena::new();
        let a = arena.insert(vec![triangle()]);
        arena.free(a);
        let b = arena.insert(vec![triangle(), triangle()]);
        assert_eq!(a, b);
        assert_eq!(arena.get(b).len(), 2);
    }

    #[test]
    fn face_normal_follows_vertex_edits() {
        let mut tri = triangle();
        assert!((tri.normal - Vec3::Z).length() < 1e-6);

        tri.set_vertex_position(2, Vec3::new(0.0, 0.0, 1.0));
        assert!((tri.normal - Vec3::NEG_Y).length() < 1e-6);
    }
}
