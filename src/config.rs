//! Cleaning configuration: units, minimisation mode, and tolerances. Loaded
//! from an optional TOML file and validated the way the controller config
//! here validates its own cross-field constraints.

use crate::error::{GcodeCleanError, Result};
use crate::geometry::Units;

/// Which letters a given minimisation mode drops when unchanged since their
/// last emission.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimisationMode {
    Soft,
    Medium,
    Hard,
    Custom,
}

impl MinimisationMode {
    /// The sticky-letter set this mode dedups by default. `Custom` carries no
    /// default and must be paired with `Config::custom_letters`.
    pub fn default_letters(&self) -> Vec<char> {
        match self {
            MinimisationMode::Soft => vec!['F', 'Z'],
            MinimisationMode::Medium | MinimisationMode::Hard => {
                vec!['A', 'B', 'C', 'D', 'F', 'G', 'H', 'L', 'M', 'N', 'P', 'R', 'S', 'T', 'X', 'Y', 'Z']
            }
            MinimisationMode::Custom => Vec::new(),
        }
    }

    /// `hard` drops the word separator; every other mode keeps single spaces.
    pub fn drops_separators(&self) -> bool {
        matches!(self, MinimisationMode::Hard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigUnits {
    Metric,
    Imperial,
}

impl From<ConfigUnits> for Units {
    fn from(u: ConfigUnits) -> Self {
        match u {
            ConfigUnits::Metric => Units::Metric,
            ConfigUnits::Imperial => Units::Imperial,
        }
    }
}

/// Cleaning configuration. Every field has a default so an empty/absent TOML
/// file is a valid configuration.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    pub units: ConfigUnits,
    pub minimisation: MinimisationMode,
    /// Only consulted when `minimisation == Custom`.
    pub custom_letters: Vec<char>,
    pub general_tolerance: f64,
    pub arc_tolerance: f64,
    pub vertical_clamp: f64,
    pub annotate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: ConfigUnits::Metric,
            minimisation: MinimisationMode::Soft,
            custom_letters: Vec::new(),
            general_tolerance: 0.001,
            arc_tolerance: 0.001,
            vertical_clamp: 1.0,
            annotate: false,
        }
    }
}

impl Config {
    /// Parses a TOML string into a `Config`, then validates and clamps
    /// tolerances into range for the declared units.
    pub fn parse(toml_str: &str) -> Result<Config> {
        let mut cfg: Config = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&mut self) -> Result<()> {
        if self.minimisation == MinimisationMode::Custom
            && self.custom_letters.iter().any(|l| matches!(l, 'I' | 'J' | 'K'))
        {
            return Err(GcodeCleanError::Config(
                "custom minimisation letters must not include I, J, or K".to_string(),
            ));
        }
        let units = Units::from(self.units);
        self.general_tolerance = crate::geometry::constrain_tolerance(self.general_tolerance, units);
        self.vertical_clamp = crate::geometry::constrain_z_clamp(self.vertical_clamp, units);
        Ok(())
    }

    /// The sticky letters `DedupSelectTokens` should consult.
    pub fn sticky_letters(&self) -> Vec<char> {
        match self.minimisation {
            MinimisationMode::Custom => self.custom_letters.clone(),
            ref mode => mode.default_letters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_soft_metric() {
        let cfg = Config::default();
        assert_eq!(cfg.minimisation, MinimisationMode::Soft);
        assert_eq!(cfg.units, ConfigUnits::Metric);
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.sticky_letters(), vec!['F', 'Z']);
    }

    #[test]
    fn general_tolerance_clamped_into_metric_range() {
        let cfg = Config::parse("general_tolerance = 5.0").unwrap();
        assert_eq!(cfg.general_tolerance, 0.01);
    }

    #[test]
    fn custom_minimisation_rejects_ijk() {
        let result = Config::parse("minimisation = \"custom\"\ncustom_letters = [\"I\"]");
        assert!(result.is_err());
    }

    #[test]
    fn custom_minimisation_accepts_other_letters() {
        let cfg = Config::parse("minimisation = \"custom\"\ncustom_letters = [\"F\", \"X\"]").unwrap();
        assert_eq!(cfg.sticky_letters(), vec!['F', 'X']);
    }

    #[test]
    fn hard_mode_drops_separators() {
        assert!(MinimisationMode::Hard.drops_separators());
        assert!(!MinimisationMode::Soft.drops_separators());
    }

    #[test]
    fn imperial_vertical_clamp_uses_imperial_bounds() {
        let cfg = Config::parse("units = \"imperial\"\nvertical_clamp = 100.0").unwrap();
        assert_eq!(cfg.vertical_clamp, 0.5);
    }
}
