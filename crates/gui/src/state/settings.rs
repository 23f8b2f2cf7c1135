//! Application settings

use serde::{Deserialize, Serialize};

/// Which movement keyset drives the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Keyset {
    #[default]
    Wasd,
    Arrows,
}

impl Keyset {
    pub fn display_name(&self) -> &'static str {
        match self {
            Keyset::Wasd => "WASD",
            Keyset::Arrows => "Arrow keys",
        }
    }

    pub fn all() -> &'static [Keyset] {
        &[Keyset::Wasd, Keyset::Arrows]
    }
}

/// Free-fly camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Units moved per frame while a movement key is held
    pub move_speed: f32,
    /// Degrees of look rotation per pixel of pointer drag
    pub sensitivity: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 0.025,
            sensitivity: 0.1,
            fov: 70.0,
        }
    }
}

/// Grid display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Show grid
    pub visible: bool,
    /// Grid cell size
    pub size: f32,
    /// Number of grid lines in each direction from origin
    pub range: i32,
    /// Grid line opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            size: 0.1,
            range: 10,
            opacity: 0.6,
        }
    }
}

/// Axis display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Show axes
    pub visible: bool,
    /// Axis line length
    pub length: f32,
    /// Axis line thickness
    pub thickness: f32,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            visible: true,
            length: 0.5,
            thickness: 2.0,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Draw per-cuboid wireframe outlines
    pub wireframes: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [6, 13, 26],
            wireframes: true,
        }
    }
}

/// Editing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Edge length of newly placed cuboids
    pub cuboid_size: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self { cuboid_size: 0.1 }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    pub keyset: Keyset,
    pub camera: CameraSettings,
    pub grid: GridSettings,
    pub axes: AxisSettings,
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub editor: EditorSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "cubed", "cubed") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    return settings;
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "cubed", "cubed") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    let _ = std::fs::write(config_path, json);
                }
            }
        }
    }
}
