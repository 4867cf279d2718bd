//! Server settings with persistence
//!
//! Settings are saved to `~/.config/globe/server.toml` unless a path is given
//! on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use globe_world::{ChunkConfig, ScrubConfig, TerrainConfig, WorldPreset, DEFAULT_POLAR_START_FRACTION};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub world: WorldSettings,
    pub polar: PolarSettings,
    pub simulation: SimulationSettings,
}

impl ServerSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("globe"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("server.toml"))
    }

    /// Load settings from the default location, or return defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// World creation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub preset: WorldPreset,
    /// Terrain seed
    pub seed: u32,
    /// World floor
    pub min_y: i32,
    /// Number of block layers above the floor
    pub height: u32,
    /// Chunks kept loaded around each player
    pub load_radius: u32,
    /// Chunks past this distance from every player are unloaded
    pub unload_radius: u32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        let chunks = ChunkConfig::default();
        Self {
            preset: WorldPreset::Globe,
            seed: 42,
            min_y: chunks.min_y,
            height: chunks.height,
            load_radius: chunks.load_radius,
            unload_radius: chunks.unload_radius,
        }
    }
}

impl WorldSettings {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            min_y: self.min_y,
            height: self.height,
            load_radius: self.load_radius,
            unload_radius: self.unload_radius,
        }
    }

    pub fn terrain_config(&self) -> TerrainConfig {
        TerrainConfig {
            seed: self.seed,
            ..Default::default()
        }
    }
}

/// Polar dressing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarSettings {
    /// Master switch for the polar pass
    pub enabled: bool,
    /// Band start as a fraction of the border radius
    pub start_fraction: f64,
    pub budget: u16,
    pub vertical_window: i32,
    pub border_margin: i32,
}

impl Default for PolarSettings {
    fn default() -> Self {
        let scrub = ScrubConfig::default();
        Self {
            enabled: true,
            start_fraction: DEFAULT_POLAR_START_FRACTION,
            budget: scrub.budget,
            vertical_window: scrub.vertical_window,
            border_margin: scrub.border_margin,
        }
    }
}

impl PolarSettings {
    pub fn scrub_config(&self) -> ScrubConfig {
        ScrubConfig {
            budget: self.budget,
            vertical_window: self.vertical_window,
            border_margin: self.border_margin,
        }
    }
}

/// Headless simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Ticks to run before shutting down (0 runs until killed)
    pub ticks: u64,
    /// Ticks per second
    pub tps: u32,
    /// Pace ticks against the wall clock instead of running flat out
    pub realtime: bool,
    /// Debug-level logging
    pub verbose: bool,
    pub players: Vec<PlayerSpawn>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            ticks: 1200,
            tps: 20,
            realtime: false,
            verbose: false,
            players: vec![
                PlayerSpawn {
                    name: "north".into(),
                    x: 8.5,
                    z: -12_808.5,
                    wander: true,
                },
                PlayerSpawn {
                    name: "south".into(),
                    x: 8.5,
                    z: 12_808.5,
                    wander: false,
                },
                PlayerSpawn {
                    name: "equator".into(),
                    x: 0.5,
                    z: 0.5,
                    wander: true,
                },
            ],
        }
    }
}

/// A simulated player placed at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpawn {
    pub name: String,
    pub x: f32,
    pub z: f32,
    /// Random-walk a little every tick
    #[serde(default)]
    pub wander: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: ServerSettings = toml::from_str(
            r#"
            [world]
            preset = "globe_small"

            [polar]
            budget = 64
            "#,
        )
        .unwrap();
        assert_eq!(settings.world.preset, WorldPreset::GlobeSmall);
        assert_eq!(settings.world.seed, 42);
        assert_eq!(settings.polar.budget, 64);
        assert_eq!(settings.polar.vertical_window, 24);
        assert!(settings.polar.enabled);
        assert_eq!(settings.simulation.players.len(), 3);
    }

    #[test]
    fn test_settings_survive_save() {
        let mut settings = ServerSettings::default();
        settings.polar.start_fraction = 0.9;
        settings.simulation.players.truncate(1);

        let text = toml::to_string_pretty(&settings).unwrap();
        let back: ServerSettings = toml::from_str(&text).unwrap();
        assert_eq!(back.polar.start_fraction, 0.9);
        assert_eq!(back.simulation.players.len(), 1);
        assert_eq!(back.simulation.players[0].name, "north");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("globe-settings-test-missing/server.toml");
        let settings = ServerSettings::load_from(&path);
        assert_eq!(settings.world.preset, WorldPreset::Globe);
    }

    #[test]
    fn test_broken_file_uses_defaults() {
        let dir = std::env::temp_dir().join(format!("globe-settings-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("server.toml");
        fs::write(&path, "[world\npreset = ").unwrap();
        let settings = ServerSettings::load_from(&path);
        assert_eq!(settings.polar.budget, 16);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_section_conversions() {
        let settings = ServerSettings::default();
        let chunks = settings.world.chunk_config();
        assert!(chunks.validate().is_ok());
        assert_eq!(settings.world.terrain_config().seed, 42);
        assert!(settings.polar.scrub_config().validate().is_ok());
    }
}
