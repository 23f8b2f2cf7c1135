//! Free-fly camera for the 3D viewport

use glam::{Mat4, Vec3, Vec4};

use cubed_gui_lib::viewport::picking::Ray;

const WORLD_UP: Vec3 = Vec3::Y;
const NEAR_PLANE: f32 = 0.01;
const FAR_PLANE: f32 = 100.0;

/// Free-fly camera: WASD-style translation plus pointer-drag look.
#[derive(Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Horizontal look angle in degrees
    pub yaw: f32,
    /// Vertical look angle in degrees, clamped to ±89
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub move_speed: f32,
    pub sensitivity: f32,

    front: Vec3,
    right: Vec3,
    up: Vec3,
    /// Held movement per axis: -1, 0 or +1 (x = strafe, y = vertical,
    /// z = forward)
    move_dir: [i8; 3],
}

impl FlyCamera {
    pub fn new(position: Vec3, fov: f32, move_speed: f32, sensitivity: f32) -> Self {
        let mut camera = Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov,
            move_speed,
            sensitivity,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: WORLD_UP,
            move_dir: [0; 3],
        };
        camera.update_directions();
        camera
    }

    // ── Keyboard movement ────────────────────────────────────

    pub fn start_move(&mut self, axis: usize, direction: i8) {
        self.move_dir[axis] = direction;
    }

    /// Release one direction; an opposing key still held keeps its axis.
    pub fn stop_move(&mut self, axis: usize, direction: i8) {
        if self.move_dir[axis] == direction {
            self.move_dir[axis] = 0;
        }
    }

    pub fn is_moving(&self) -> bool {
        self.move_dir != [0; 3]
    }

    /// Apply one frame of held-key movement. Returns whether the camera
    /// moved (the caller keeps repainting only while it does).
    pub fn update_movement(&mut self) -> bool {
        if !self.is_moving() {
            return false;
        }

        let strafe = self.front.cross(WORLD_UP).normalize_or_zero();
        self.position += strafe * (self.move_dir[0] as f32 * self.move_speed);
        self.position += WORLD_UP * (self.move_dir[1] as f32 * self.move_speed);
        self.position += self.front * (self.move_dir[2] as f32 * self.move_speed);
        true
    }

    // ── Pointer look ─────────────────────────────────────────

    /// Apply a pointer drag delta in pixels.
    pub fn look(&mut self, dx: f32, dy: f32) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }

        self.yaw -= dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;

        self.pitch = self.pitch.clamp(-89.0, 89.0);
        if self.yaw > 360.0 {
            self.yaw -= 360.0;
        }
        if self.yaw < 0.0 {
            self.yaw += 360.0;
        }

        self.update_directions();
        true
    }

    fn update_directions(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(WORLD_UP).normalize_or_zero();
        self.up = self.right.cross(self.front).normalize_or_zero();
    }

    // ── Matrices ─────────────────────────────────────────────

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    // ── Picking ──────────────────────────────────────────────

    /// Cast a world-space ray through a cursor position in the viewport
    /// rect: cursor to NDC, unproject through the inverse projection into
    /// eye space, then into world space through the inverse view.
    pub fn screen_ray(&self, cursor: egui::Pos2, rect: egui::Rect) -> Ray {
        let aspect = rect.width() / rect.height();

        let x = (2.0 * (cursor.x - rect.left())) / rect.width() - 1.0;
        let y = 1.0 - (2.0 * (cursor.y - rect.top())) / rect.height();

        let mut eye = self.projection_matrix(aspect).inverse() * Vec4::new(x, y, -1.0, 1.0);
        eye.z = -1.0; // keep the direction pointing forward
        eye.w = 0.0;

        let world = self.view_matrix().inverse() * eye;

        Ray::new(self.position, world.truncate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1280.0, 720.0))
    }

    #[test]
    fn center_ray_follows_the_view_direction() {
        let camera = FlyCamera::new(Vec3::new(0.0, 0.0, 5.0), 70.0, 0.025, 0.1);
        let ray = camera.screen_ray(egui::pos2(640.0, 360.0), viewport_rect());

        assert!((ray.origin - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn corner_rays_diverge_from_center() {
        let camera = FlyCamera::new(Vec3::ZERO, 70.0, 0.025, 0.1);
        let rect = viewport_rect();
        let left = camera.screen_ray(egui::pos2(0.0, 360.0), rect);
        let right = camera.screen_ray(egui::pos2(1280.0, 360.0), rect);

        assert!(left.direction.x < -0.1);
        assert!(right.direction.x > 0.1);
        assert!((left.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn opposing_keys_release_cleanly() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 70.0, 0.5, 0.1);
        camera.start_move(2, 1);
        camera.start_move(2, -1);
        // Releasing the direction that is no longer active is a no-op
        camera.stop_move(2, 1);
        assert!(camera.is_moving());
        camera.stop_move(2, -1);
        assert!(!camera.is_moving());
    }

    #[test]
    fn forward_movement_tracks_the_front_vector() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 70.0, 0.5, 0.1);
        camera.start_move(2, 1);
        assert!(camera.update_movement());
        assert!((camera.position - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 70.0, 0.025, 1.0);
        camera.look(0.0, 500.0);
        assert!(camera.pitch <= 89.0);
        camera.look(0.0, -2000.0);
        assert!(camera.pitch >= -89.0);
    }
}
