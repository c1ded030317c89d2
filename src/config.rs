use std::error::Error;
use std::path::Path;

use serde::Deserialize;

/// Engine tunables; every field falls back to its default when absent.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_max_chunks")] pub max_chunks: usize,
    #[serde(default = "default_workers")] pub workers: usize,
    #[serde(default = "default_view_radius")] pub view_radius: i32,
    #[serde(default = "default_force_radius")] pub force_radius: i32,
    #[serde(default = "default_day_length")] pub day_length: i32,
    #[serde(default = "default_show_lights")] pub show_lights: bool,
    #[serde(default = "default_fov")] pub fov: f32,
    #[serde(default = "default_aspect")] pub aspect: f32,
    #[serde(default = "default_hit_distance")] pub hit_distance: f32,
    #[serde(default = "default_player_height")] pub player_height: i32,
    #[serde(default = "default_position_interval")] pub position_interval: f64,
}

fn default_max_chunks() -> usize { 8192 }
fn default_workers() -> usize { 32 }
fn default_view_radius() -> i32 { 10 }
fn default_force_radius() -> i32 { 2 }
fn default_day_length() -> i32 { 600 }
fn default_show_lights() -> bool { true }
fn default_fov() -> f32 { 80.0 }
fn default_aspect() -> f32 { 4.0 / 3.0 }
fn default_hit_distance() -> f32 { 8.0 }
fn default_player_height() -> i32 { 2 }
fn default_position_interval() -> f64 { 0.1 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chunks: default_max_chunks(),
            workers: default_workers(),
            view_radius: default_view_radius(),
            force_radius: default_force_radius(),
            day_length: default_day_length(),
            show_lights: default_show_lights(),
            fov: default_fov(),
            aspect: default_aspect(),
            hit_distance: default_hit_distance(),
            player_height: default_player_height(),
            position_interval: default_position_interval(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: EngineConfig = toml::from_str(s)?;
        if cfg.max_chunks == 0 {
            return Err("max_chunks must be at least 1".into());
        }
        if !(1..=24).contains(&cfg.view_radius) {
            return Err(format!("view_radius {} outside 1..=24", cfg.view_radius).into());
        }
        Ok(cfg)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<EngineConfig, Box<dyn Error>> {
    let s = std::fs::read_to_string(path).map_err(|e| format!("read error {}: {e}", path.display()))?;
    EngineConfig::from_toml_str(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = EngineConfig::from_toml_str("workers = 4\nshow_lights = false\n").unwrap();
        assert_eq!(cfg.workers, 4);
        assert!(!cfg.show_lights);
        assert_eq!(cfg.view_radius, 10);
        assert_eq!(cfg.day_length, 600);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(EngineConfig::from_toml_str("view_radius = 30").is_err());
        assert!(EngineConfig::from_toml_str("max_chunks = 0").is_err());
        assert!(EngineConfig::from_toml_str("workers = \"many\"").is_err());
        assert!(load_config_from_path(Path::new("/nonexistent/tessel.toml")).is_err());
    }
}
