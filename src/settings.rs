//! Game settings and tuning
//!
//! Loaded from an optional JSON file; every missing field falls back to the
//! built-in defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::renderer::{Viewport, WallPalette};
use crate::renderer::color::STANDARD_WALLS;
use crate::sim::SimTuning;

/// Errors loading or saving a settings file
#[derive(Debug)]
pub enum SettingsError {
    /// File could not be read or written
    Io(String),
    /// File is not valid settings JSON
    Parse(String),
    /// Settings could not be encoded as JSON
    Serialize(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::Parse(msg) => write!(f, "Settings parse error: {}", msg),
            SettingsError::Serialize(msg) => write!(f, "Settings serialize error: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    /// Columns rendered (one ray each)
    pub screen_width: u32,
    pub screen_height: u32,

    // === Player ===
    /// Tiles per second
    pub move_speed: f32,
    /// Radians per second
    pub rotation_speed: f32,

    // === Pursuers ===
    /// Tiles per second
    pub pursuer_speed: f32,
    /// Minimum seconds between replans
    pub path_cooldown: f32,
    pub capture_radius: f32,

    // === Collectibles ===
    pub pickup_radius: f32,
    /// Fraction of collectibles needed to win
    pub win_fraction: f32,

    /// Seeds the pursuer pulse offsets
    pub seed: u64,

    /// Wall symbol to RGB
    pub wall_colors: BTreeMap<String, [u8; 3]>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,

            move_speed: PLAYER_MOVE_SPEED,
            rotation_speed: PLAYER_ROT_SPEED,

            pursuer_speed: PURSUER_SPEED,
            path_cooldown: PATH_COOLDOWN,
            capture_radius: CAPTURE_RADIUS,

            pickup_radius: PICKUP_RADIUS,
            win_fraction: WIN_FRACTION,

            seed: 0,

            wall_colors: STANDARD_WALLS
                .iter()
                .map(|(symbol, c)| (symbol.to_string(), [c.r, c.g, c.b]))
                .collect(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("{}: {}", path.display(), e)))?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| SettingsError::Io(format!("{}: {}", path.display(), e)))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.screen_width.max(1), self.screen_height.max(1))
    }

    /// Wall colors; an empty table means the built-in materials
    pub fn palette(&self) -> WallPalette {
        if self.wall_colors.is_empty() {
            WallPalette::standard()
        } else {
            WallPalette::from_table(&self.wall_colors)
        }
    }

    pub fn tuning(&self) -> SimTuning {
        SimTuning::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Rgba;

    #[test]
    fn test_defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.viewport(), Viewport::new(960, 600));
        assert_eq!(settings.tuning(), SimTuning::default());
        assert_eq!(settings.palette(), WallPalette::standard());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "pursuer_speed": 2.5, "seed": 42 }"#).unwrap();
        assert_eq!(settings.pursuer_speed, 2.5);
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.move_speed, PLAYER_MOVE_SPEED);
        assert_eq!(settings.wall_colors.len(), 5);
    }

    #[test]
    fn test_custom_wall_colors() {
        let settings = Settings::from_json(r#"{ "wall_colors": { "9": [1, 2, 3] } }"#).unwrap();
        let palette = settings.palette();
        assert_eq!(palette.color_for('9'), Rgba::rgb(1, 2, 3));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_error_messages_name_the_stage() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(err.to_string().starts_with("Settings parse error: "));
        let err = SettingsError::Serialize("key must be a string".into());
        assert_eq!(err.to_string(), "Settings serialize error: key must be a string");
        assert!(Settings::default().to_json().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("labyrinth-settings-missing.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(Settings::load(&path), Err(SettingsError::Io(_))));
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("labyrinth-settings-{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.win_fraction = 0.75;
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }
}
