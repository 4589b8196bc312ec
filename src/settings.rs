//! Game settings and balance
//!
//! Persisted in LocalStorage on the web; native builds use defaults.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::ItemCategory;

/// Allowed drift when checking that category weights sum to 1.0
const WEIGHT_EPSILON: f64 = 1e-6;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Session ===
    /// Countdown length in seconds
    pub time_limit_secs: u32,

    // === Difficulty ===
    /// Fall speed at level 1 (units per simulation step)
    pub base_fall_speed: f32,
    /// Fall speed added per level gained
    pub fall_speed_step: f32,
    /// Spawn interval at level 1
    pub base_spawn_interval_ms: u32,
    /// Spawn interval removed per level gained
    pub spawn_interval_step_ms: u32,
    /// Spawn interval never drops below this
    pub min_spawn_interval_ms: u32,
    /// Score needed per level
    pub points_per_level: i64,

    // === Items ===
    /// Item categories in declaration order (weights sum to 1.0)
    pub categories: Vec<ItemCategory>,

    // === Pose input ===
    /// Minimum classifier probability for a frame to count
    pub label_threshold: f32,
    /// Consecutive confident frames before a label becomes stable
    pub smoothing_frames: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit_secs: 60,

            base_fall_speed: 2.0,
            fall_speed_step: 0.5,
            base_spawn_interval_ms: 1500,
            spawn_interval_step_ms: 200,
            min_spawn_interval_ms: 500,
            points_per_level: 500,

            categories: ItemCategory::defaults(),

            label_threshold: 0.7,
            smoothing_frames: 3,
        }
    }
}

impl Settings {
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "pose_catch_settings";

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check balance values the simulation relies on
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(GameError::InvalidSettings("no item categories".into()));
        }
        for cat in &self.categories {
            if !(cat.selection_weight > 0.0 && cat.selection_weight <= 1.0) {
                return Err(GameError::InvalidSettings(format!(
                    "category {} has weight {} outside (0, 1]",
                    cat.name, cat.selection_weight
                )));
            }
        }
        let total: f64 = self.categories.iter().map(|c| c.selection_weight).sum();
        if (total - 1.0).abs() > WEIGHT_EPSILON {
            return Err(GameError::InvalidSettings(format!(
                "category weights sum to {total}, expected 1.0"
            )));
        }
        if self.points_per_level <= 0 {
            return Err(GameError::InvalidSettings(
                "points_per_level must be positive".into(),
            ));
        }
        if self.time_limit_secs == 0 {
            return Err(GameError::InvalidSettings(
                "time_limit_secs must be positive".into(),
            ));
        }
        if self.base_fall_speed <= 0.0 || self.fall_speed_step < 0.0 {
            return Err(GameError::InvalidSettings(
                "fall speed must be positive and non-decreasing".into(),
            ));
        }
        if self.min_spawn_interval_ms > self.base_spawn_interval_ms {
            return Err(GameError::InvalidSettings(
                "min_spawn_interval_ms exceeds base_spawn_interval_ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.label_threshold) || self.smoothing_frames == 0 {
            return Err(GameError::InvalidSettings(
                "label_threshold must be in [0, 1] and smoothing_frames at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Spawn interval after `levels_gained` level-ups
    pub fn spawn_interval_for(&self, levels_gained: u32) -> u32 {
        self.base_spawn_interval_ms
            .saturating_sub(self.spawn_interval_step_ms.saturating_mul(levels_gained))
            .max(self.min_spawn_interval_ms)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native builds have no storage; always the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_spawn_interval_floor() {
        let s = Settings::default();
        assert_eq!(s.spawn_interval_for(0), 1500);
        assert_eq!(s.spawn_interval_for(1), 1300);
        assert_eq!(s.spawn_interval_for(5), 500);
        assert_eq!(s.spawn_interval_for(50), 500);
    }

    #[test]
    fn test_native_load_is_default() {
        let s = Settings::load();
        assert_eq!(s.points_per_level, 500);
        assert_eq!(s.time_limit_secs, Settings::default().time_limit_secs);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{"time_limit_secs": 30}"#).unwrap();
        assert_eq!(s.time_limit_secs, 30);
        assert_eq!(s.base_spawn_interval_ms, 1500);
        assert_eq!(s.categories.len(), 3);
    }

    #[test]
    fn test_bad_weights_rejected() {
        let mut s = Settings::default();
        s.categories[0].selection_weight = 0.9;
        assert!(matches!(s.validate(), Err(GameError::InvalidSettings(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(Settings::from_json("{"), Err(GameError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let s = Settings::default();
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(s, back);
    }
}
