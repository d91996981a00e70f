//! Runtime configuration for figure profiles, reference-model sampling and the
//! arrival search.

use super::constants::EARTH_LOD;
use crate::domain::EllipError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_LAYER_THICKNESS_KM: f64 = 50.0;
pub const DEFAULT_RAY_PARAMETER_SAMPLES: usize = 2_000;
pub const DEFAULT_DISTANCE_TOLERANCE_DEG: f64 = 1.0e-4;
pub const DEFAULT_DIFFRACTION_STEP_DEG: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EllipticityConfig {
    /// Length of day of the planet in seconds.
    pub length_of_day: f64,
    /// Sublayer thickness used when sampling analytic reference models.
    pub max_layer_thickness: f64,
    /// Number of ray parameters scanned when bracketing arrivals.
    pub ray_parameter_samples: usize,
    /// Accepted mismatch between the requested and traced distance.
    pub distance_tolerance_deg: f64,
    /// Sample spacing along diffracted segments.
    pub diffraction_step_deg: f64,
}

impl Default for EllipticityConfig {
    fn default() -> Self {
        Self {
            length_of_day: EARTH_LOD,
            max_layer_thickness: DEFAULT_MAX_LAYER_THICKNESS_KM,
            ray_parameter_samples: DEFAULT_RAY_PARAMETER_SAMPLES,
            distance_tolerance_deg: DEFAULT_DISTANCE_TOLERANCE_DEG,
            diffraction_step_deg: DEFAULT_DIFFRACTION_STEP_DEG,
        }
    }
}

impl EllipticityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("lengthOfDay", self.length_of_day),
            ("maxLayerThickness", self.max_layer_thickness),
            ("distanceToleranceDeg", self.distance_tolerance_deg),
            ("diffractionStepDeg", self.diffraction_step_deg),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: value.to_string(),
                });
            }
        }

        if self.ray_parameter_samples < 2 {
            return Err(ConfigError::InvalidValue {
                field: "rayParameterSamples",
                value: self.ray_parameter_samples.to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("configuration field '{field}' must be positive and finite, got {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl From<ConfigError> for EllipError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Read { .. } => EllipError::io_system("IO.CONFIG_READ", error.to_string()),
            _ => EllipError::input_validation("INPUT.CONFIG", error.to_string()),
        }
    }
}

pub fn load_config(config_path: impl AsRef<Path>) -> Result<EllipticityConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: EllipticityConfig =
        serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EllipticityConfig, load_config};
    use crate::common::constants::EARTH_LOD;
    use crate::domain::{EllipError, EllipErrorCategory};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_describe_the_earth() {
        let config = EllipticityConfig::default();
        assert_eq!(config.length_of_day, EARTH_LOD);
        assert_eq!(config.max_layer_thickness, 50.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "lengthOfDay": 88642.0, "rayParameterSamples": 500 }"#)
            .expect("config should be written");

        let config = load_config(&path).expect("config should load");
        assert_eq!(config.length_of_day, 88_642.0);
        assert_eq!(config.ray_parameter_samples, 500);
        assert_eq!(config.max_layer_thickness, 50.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "maxLayerThickness": -5.0 }"#).expect("config should be written");

        let error = load_config(&path).expect_err("negative thickness should fail");
        assert!(matches!(
            error,
            ConfigError::InvalidValue {
                field: "maxLayerThickness",
                ..
            }
        ));
    }

    #[test]
    fn missing_files_report_their_path() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("absent.json");
        let error = load_config(&path).expect_err("missing config should fail");
        assert!(error.to_string().contains("absent.json"));

        let converted: EllipError = error.into();
        assert_eq!(converted.category(), EllipErrorCategory::IoSystemError);
        assert_eq!(converted.placeholder(), "IO.CONFIG_READ");
    }
}
