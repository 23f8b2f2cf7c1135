use glam::Vec3;

/// A ray in world space
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Oriented bounding box: center, 3 unit axes, half-extents per axis.
///
/// Axes come from the owning cuboid's *stretched* model matrix so that
/// picking matches what is rendered after aspect-ratio compensation.
#[derive(Clone, Copy, Debug)]
pub struct Obb {
    pub center: Vec3,
    pub axes: [Vec3; 3],
    pub half_extents: Vec3,
}

impl Default for Obb {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
            half_extents: Vec3::ZERO,
        }
    }
}

/// Which face of an OBB a ray entered through.
#[derive(Clone, Copy, Debug)]
pub struct FaceHit {
    /// Entry distance along the ray (the slab test's t_min).
    pub t: f32,
    /// Index of the box axis whose slab was entered last (0..3).
    pub axis: usize,
    /// -1.0 when the ray entered from the negative side of that axis.
    pub sign: f32,
    /// Outward unit normal of the struck face: `axes[axis] * sign`.
    pub normal: Vec3,
}

/// Projections smaller than this count as parallel to a slab face pair.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Ray-OBB intersection using the slab method over the box's own axes.
/// Returns the entry distance, or None.
pub fn ray_obb(ray: &Ray, obb: &Obb) -> Option<f32> {
    ray_obb_face(ray, obb).map(|hit| hit.t)
}

/// Slab test that also reports which face the ray entered through.
///
/// The face is the slab boundary that produced the largest entry t, signed
/// by which side of the axis the ray came from.
pub fn ray_obb_face(ray: &Ray, obb: &Obb) -> Option<FaceHit> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::MAX;
    let mut face: Option<(usize, f32)> = None;

    let to_center = obb.center - ray.origin;

    for (i, axis) in obb.axes.iter().enumerate() {
        let axis_projection = ray.direction.dot(*axis);
        let distance = to_center.dot(*axis);
        let half = obb.half_extents[i];

        if axis_projection.abs() > PARALLEL_EPSILON {
            let mut t1 = (distance - half) / axis_projection;
            let mut t2 = (distance + half) / axis_projection;

            let entering_negative = t1 < t2;
            if !entering_negative {
                std::mem::swap(&mut t1, &mut t2);
            }

            if t1 > t_min {
                t_min = t1;
                face = Some((i, if entering_negative { -1.0 } else { 1.0 }));
            }
            t_max = t_max.min(t2);

            if t_min > t_max {
                return None;
            }
        } else if -distance > half || distance > half {
            // Parallel to this face pair and outside the slab
            return None;
        }
    }

    face.map(|(axis, sign)| FaceHit {
        t: t_min,
        axis,
        sign,
        normal: obb.axes[axis] * sign,
    })
}
