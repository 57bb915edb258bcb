//! Reveal options with TOML preset support.
//!
//! Trigger settings (threshold, root margin, fallback timers) and the shape
//! of the preset entrance sequences. Options serialize to/from TOML so a
//! site can keep per-section presets, e.g. `presets/hero.toml`.

mod entrance;
mod trigger;

use std::path::Path;

pub use entrance::EntranceOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use trigger::TriggerOptions;

use crate::error::RevealError;

/// Top-level options container. Both sections use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[trigger]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct RevealOptions {
    /// When entrances fire.
    pub trigger: TriggerOptions,
    /// How preset entrances move.
    pub entrance: EntranceOptions,
}

impl RevealOptions {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(RevealOptions)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, RevealError> {
        let options: Self = toml::from_str(content)
            .map_err(|e| RevealError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, RevealError> {
        let content = std::fs::read_to_string(path).map_err(RevealError::Io)?;
        let options = Self::from_toml_str(&content)?;
        log::info!("loaded reveal options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), RevealError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RevealError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(RevealError::Io)?;
        }
        std::fs::write(path, content).map_err(RevealError::Io)
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), RevealError> {
        let threshold = self.trigger.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(RevealError::InvalidOption {
                field: "trigger.threshold",
                reason: format!("{threshold} is outside 0..=1"),
            });
        }
        if self.entrance.overlap_ms > self.entrance.duration_ms {
            return Err(RevealError::InvalidOption {
                field: "entrance.overlap_ms",
                reason: format!(
                    "{}ms overlap exceeds the {}ms step duration",
                    self.entrance.overlap_ms, self.entrance.duration_ms
                ),
            });
        }
        if !self.entrance.distance_px.is_finite() {
            return Err(RevealError::InvalidOption {
                field: "entrance.distance_px",
                reason: "must be finite".to_owned(),
            });
        }
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .filter_map(|path| {
                path.file_stem().and_then(|s| s.to_str()).map(str::to_owned)
            })
            .collect();
        names.sort();
        names
    }
}
