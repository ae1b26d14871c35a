//! Layout constants and feature switches for the Jianpu writer.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::JianpuError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JianpuConfig {
    /// Measures grouped onto one line per part.
    #[serde(default = "JianpuConfig::default_measures_per_line")]
    pub measures_per_line: usize,
    /// Line groups per page before a `[fenye]` break.
    #[serde(default = "JianpuConfig::default_lines_per_page")]
    pub lines_per_page: usize,
    /// 1-based part number rendered around the bass octave centre.
    #[serde(default = "JianpuConfig::default_bass_part")]
    pub bass_part: Option<usize>,
    /// 1-based part number rendered as rhythm plus a harmony track.
    #[serde(default = "JianpuConfig::default_chord_part")]
    pub chord_part: Option<usize>,
    /// Spell flats as the sharp of the degree below.
    #[serde(default = "JianpuConfig::default_flat_to_sharp")]
    pub flat_to_sharp: bool,
    /// Abort on grace/tie contract violations instead of logging them.
    #[serde(default = "JianpuConfig::default_strict_contracts")]
    pub strict_contracts: bool,
}

impl JianpuConfig {
    fn default_measures_per_line() -> usize {
        5
    }
    fn default_lines_per_page() -> usize {
        4
    }
    fn default_bass_part() -> Option<usize> {
        Some(3)
    }
    fn default_chord_part() -> Option<usize> {
        Some(4)
    }
    fn default_flat_to_sharp() -> bool {
        true
    }
    fn default_strict_contracts() -> bool {
        true
    }

    /// Parse a TOML document; missing keys fall back to their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, JianpuError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, JianpuError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            JianpuError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), JianpuError> {
        if self.measures_per_line == 0 {
            return Err(JianpuError::Config("measures_per_line must be at least 1".into()));
        }
        if self.lines_per_page == 0 {
            return Err(JianpuError::Config("lines_per_page must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for JianpuConfig {
    fn default() -> Self {
        Self {
            measures_per_line: Self::default_measures_per_line(),
            lines_per_page: Self::default_lines_per_page(),
            bass_part: Self::default_bass_part(),
            chord_part: Self::default_chord_part(),
            flat_to_sharp: Self::default_flat_to_sharp(),
            strict_contracts: Self::default_strict_contracts(),
        }
    }
}
