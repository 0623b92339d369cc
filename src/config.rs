//! Difficulty and configuration settings handed to the simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Simulation settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub isp_multiplier: f64,       // applied to every engine and booster Isp
    pub dry_mass_multiplier: f64,  // applied to booster dry-mass fractions
    pub unrestricted_thrust: bool, // thrust normal magnitude scales thrust
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            isp_multiplier: 1.0,
            dry_mass_multiplier: 1.0,
            unrestricted_thrust: false,
        }
    }
}

impl SimSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.isp_multiplier.is_finite() && self.isp_multiplier > 0.0) {
            return Err(SettingsError::Invalid {
                field: "isp_multiplier",
                value: self.isp_multiplier,
            });
        }
        if !(self.dry_mass_multiplier.is_finite() && self.dry_mass_multiplier >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "dry_mass_multiplier",
                value: self.dry_mass_multiplier,
            });
        }
        Ok(())
    }

    /// Parse settings from a JSON document. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: SimSettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting {field} = {value}")]
    Invalid { field: &'static str, value: f64 },
}

/// Load settings from a JSON file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<SimSettings, SettingsError> {
    let text = std::fs::read_to_string(path)?;
    SimSettings::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_take_defaults() {
        let s = SimSettings::from_json(r#"{ "isp_multiplier": 0.5 }"#).unwrap();
        assert_eq!(s.isp_multiplier, 0.5);
        assert_eq!(s.dry_mass_multiplier, 1.0);
        assert!(!s.unrestricted_thrust);
    }

    #[test]
    fn rejects_non_positive_isp_multiplier() {
        let err = SimSettings::from_json(r#"{ "isp_multiplier": 0.0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "isp_multiplier", .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "dry_mass_multiplier": 2.0, "unrestricted_thrust": true }}"#).unwrap();
        let s = load_settings(file.path()).unwrap();
        assert_eq!(s.dry_mass_multiplier, 2.0);
        assert!(s.unrestricted_thrust);
    }
}
