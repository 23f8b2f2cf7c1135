//! Editor session: the placement template and its color, shape/symmetry
//! state, and save/load/export file handling.
//!
//! Dialogs live in the app layer; this module receives already-chosen
//! paths. A cancelled dialog therefore never reaches these functions.

use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};

use crate::scene::{Cuboid, GeometryArena};
use crate::shape::{Shape, ShapeKind, SymmetryMode};

/// Name of a session that has never been saved.
pub const UNTITLED: &str = "untitled";

/// Extension of development files (aspect-stretched, editor round-trip).
pub const DEV_EXTENSION: &str = "cubed_dev";

/// Extension of exported files (unstretched, portable).
pub const EXPORT_EXTENSION: &str = "cubed";

pub struct Session {
    /// Color applied to the placement template, RGBA in 0..1.
    pub color: Vec4,
    /// False whenever the scene has edits not yet on disk.
    pub saved: bool,
    pub shape: Shape,

    object_path: Option<PathBuf>,
    object_name: String,
    export_path: Option<PathBuf>,
    template: Option<Cuboid>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            saved: true,
            shape: Shape::default(),
            object_path: None,
            object_name: UNTITLED.to_string(),
            export_path: None,
            template: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn object_path(&self) -> Option<&Path> {
        self.object_path.as_deref()
    }

    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }

    pub fn is_untitled(&self) -> bool {
        self.object_name == UNTITLED
    }

    pub fn mark_dirty(&mut self) {
        self.saved = false;
    }

    // ── Placement template ───────────────────────────────────

    pub fn set_template(&mut self, cuboid: Cuboid) {
        self.template = Some(cuboid);
    }

    pub fn template(&self) -> Option<&Cuboid> {
        self.template.as_ref()
    }

    pub fn template_mut(&mut self) -> Option<&mut Cuboid> {
        self.template.as_mut()
    }

    /// Set the session color and recolor the template (a cursor preview
    /// sharing the template's buffers sees the change too).
    pub fn set_color(&mut self, color: Vec4, arena: &mut GeometryArena) {
        self.color = color;
        if let Some(template) = &mut self.template {
            template.set_color(arena, color.truncate());
        }
    }

    /// Adopt the color of a picked face. `None` (nothing was hit) is a
    /// silent no-op.
    pub fn adopt_face_color(&mut self, color: Option<Vec3>, arena: &mut GeometryArena) {
        if let Some(color) = color {
            self.set_color(color.extend(1.0), arena);
        }
    }

    // ── Shape / symmetry ─────────────────────────────────────

    pub fn set_shape(&mut self, kind: ShapeKind) {
        match kind {
            ShapeKind::None => self.shape.clear(),
            ShapeKind::Symmetry => {
                self.shape.kind = ShapeKind::Symmetry;
                if self.shape.symmetry == SymmetryMode::None {
                    self.shape.symmetry = SymmetryMode::AllAxis;
                }
            }
            // Sphere and square shapes are recognized but not implemented
            ShapeKind::Sphere | ShapeKind::Square => {
                self.shape.kind = kind;
            }
        }
    }

    /// Toggle symmetry placement on/off.
    pub fn toggle_symmetry(&mut self, mode: SymmetryMode) {
        if self.shape.kind == ShapeKind::Symmetry {
            self.shape.clear();
        } else {
            self.shape.symmetry = mode;
            self.set_shape(ShapeKind::Symmetry);
        }
    }

    pub fn symmetry_enabled(&self) -> bool {
        self.shape.kind == ShapeKind::Symmetry
    }

    /// All positions one placement at `seed` expands into.
    pub fn placement_positions(&mut self, seed: Vec3) -> Vec<Vec3> {
        self.shape.set_seed(seed);
        self.shape.positions().to_vec()
    }

    // ── Saving / loading / exporting ─────────────────────────

    /// Record the file this session saves to; the session name follows the
    /// file name.
    pub fn set_object_path(&mut self, path: PathBuf) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            self.object_name = name.to_string();
        }
        self.object_path = Some(path);
    }

    /// Write development data to the session file. Returns false when no
    /// file has been chosen yet (the caller must prompt first) or the
    /// write fails.
    pub fn save(&mut self, data: &str) -> bool {
        let Some(path) = &self.object_path else {
            return false;
        };
        match std::fs::write(path, data) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "saved object");
                self.saved = true;
                true
            }
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "failed to save object");
                false
            }
        }
    }

    /// Read a development file and adopt it as the session file.
    pub fn load_from(&mut self, path: PathBuf) -> Option<String> {
        match std::fs::read_to_string(&path) {
            Ok(data) => {
                self.set_object_path(path);
                self.saved = true;
                Some(data)
            }
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "failed to load object");
                None
            }
        }
    }

    /// Write export data to the chosen path.
    pub fn export_to(&mut self, path: PathBuf, data: &str) -> bool {
        match std::fs::write(&path, data) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "exported object");
                self.export_path = Some(path);
                true
            }
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "failed to export object");
                false
            }
        }
    }

    /// Back to an untitled, saved-clean session (new scene).
    pub fn reset(&mut self) {
        self.object_path = None;
        self.object_name = UNTITLED.to_string();
        self.saved = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn new_session_is_untitled_and_clean() {
        let session = Session::new();
        assert!(session.is_untitled());
        assert!(session.saved);
        assert!(session.object_path().is_none());
    }

    #[test]
    fn set_color_recolors_template_and_shared_preview() {
        let mut arena = GeometryArena::new();
        let mut session = Session::new();
        session.set_template(fixtures::unit_cuboid(&mut arena));
        let preview = session.template().unwrap().clone_shared();

        session.set_color(Vec4::new(0.3, 0.6, 0.9, 1.0), &mut arena);
        assert_eq!(preview.color(&arena), Some(Vec3::new(0.3, 0.6, 0.9)));
    }

    #[test]
    fn adopt_face_color_ignores_missing_hit() {
        let mut arena = GeometryArena::new();
        let mut session = Session::new();
        session.set_template(fixtures::unit_cuboid(&mut arena));

        let before = session.color;
        session.adopt_face_color(None, &mut arena);
        assert_eq!(session.color, before);

        session.adopt_face_color(Some(Vec3::new(0.1, 0.2, 0.3)), &mut arena);
        assert_eq!(session.color, Vec4::new(0.1, 0.2, 0.3, 1.0));
    }

    #[test]
    fn toggle_symmetry_flips_shape_state() {
        let mut session = Session::new();
        assert!(!session.symmetry_enabled());

        session.toggle_symmetry(SymmetryMode::AllAxis);
        assert!(session.symmetry_enabled());
        assert_eq!(session.placement_positions(Vec3::new(0.1, 0.0, 0.0)).len(), 2);

        session.toggle_symmetry(SymmetryMode::AllAxis);
        assert!(!session.symmetry_enabled());
        assert_eq!(session.placement_positions(Vec3::new(0.1, 0.0, 0.0)).len(), 1);
    }

    #[test]
    fn save_without_path_is_refused() {
        let mut session = Session::new();
        assert!(!session.save("0 0 0\n"));
    }

    #[test]
    fn save_load_round_trip_through_files() {
        let dir = std::env::temp_dir().join("cubed_session_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("object.{DEV_EXTENSION}"));

        let mut session = Session::new();
        session.set_object_path(path.clone());
        session.mark_dirty();
        assert!(session.save("0.5 0 0\n"));
        assert!(session.saved);
        assert_eq!(session.object_name(), &format!("object.{DEV_EXTENSION}"));

        let mut other = Session::new();
        let data = other.load_from(path.clone()).unwrap();
        assert_eq!(data, "0.5 0 0\n");
        assert!(!other.is_untitled());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_missing_file_is_reported_not_fatal() {
        let mut session = Session::new();
        let missing = PathBuf::from("/nonexistent/object.cubed_dev");
        assert!(session.load_from(missing).is_none());
        assert!(session.is_untitled());
    }
}
