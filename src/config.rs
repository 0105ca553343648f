use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{GameError, GameResult};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Logic ticks per second.
    pub tick_rate: u32,
    /// Logical low-resolution target the projection maps onto.
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Ticks between roamer spawns while a wave is running.
    pub wave_interval: u32,
    /// How long a narrated line lasts without a sound card.
    pub line_seconds: f64,
    /// Fixed RNG seed; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            viewport_width: 320,
            viewport_height: 180,
            wave_interval: 30,
            line_seconds: 3.0,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Seconds per logic tick.
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }
}

pub fn load_config_from_path(path: &Path) -> GameResult<GameConfig> {
    let raw = fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GameConfig =
        serde_json::from_str(&raw).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> GameResult<()> {
    if config.tick_rate == 0 {
        return Err(GameError::InvalidConfig("tick_rate must be > 0".to_string()));
    }
    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(GameError::InvalidConfig(format!(
            "viewport must be non-empty, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }
    if config.wave_interval == 0 {
        return Err(GameError::InvalidConfig(
            "wave_interval must be > 0".to_string(),
        ));
    }
    if !config.line_seconds.is_finite() || config.line_seconds <= 0.0 {
        return Err(GameError::InvalidConfig(
            "line_seconds must be a positive number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "fake_news_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let path = temp_file_path("partial");
        fs::write(&path, r#"{ "seed": 7, "wave_interval": 12 }"#).expect("write config");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.wave_interval, 12);
        assert_eq!(config.tick_rate, 60);
        assert_eq!((config.viewport_width, config.viewport_height), (320, 180));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_zero_tick_rate() {
        let path = temp_file_path("zero_tick");
        fs::write(&path, r#"{ "tick_rate": 0 }"#).expect("write config");

        let err = load_config_from_path(&path).expect_err("zero tick rate should fail");
        assert!(err.to_string().contains("tick_rate"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_malformed_json() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ tick_rate: ").expect("write config");

        let err = load_config_from_path(&path).expect_err("malformed json should fail");
        assert!(matches!(err, GameError::ConfigParse { .. }));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = temp_file_path("absent");
        let err = load_config_from_path(&path).expect_err("absent file should fail");
        assert!(matches!(err, GameError::ConfigRead { .. }));
    }

    #[test]
    fn rejects_non_positive_line_seconds() {
        let config = GameConfig {
            line_seconds: 0.0,
            ..GameConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn tick_dt_matches_rate() {
        let config = GameConfig::default();
        assert!((config.tick_dt() - 1.0 / 60.0).abs() < 1e-12);
    }
}
