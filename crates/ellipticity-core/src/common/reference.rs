//! Bundled reference Earth models.
//!
//! PREM is generated from its published polynomials in `x = r / 6371 km`
//! (isotropic, with the ocean replaced by the upper crust) and sampled into
//! sublayers inside which every property is linear in depth. ak135 ships as
//! its tabulated `.nd` rows and is linear between them.

use super::config::{DEFAULT_MAX_LAYER_THICKNESS_KM, EllipticityConfig};
use super::constants::{EARTH_LOD, EARTH_RADIUS_KM};
use crate::domain::{EllipError, ModelResult};
use crate::model::{Layer, NamedBoundaries, VelocityModel, parse_nd_source, read_nd_file};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const SUPPORTED_MODELS: [&str; 2] = ["prem", "ak135"];

const AK135_SOURCE: &str = include_str!("ak135.nd");

static PREM: OnceLock<ModelResult<VelocityModel>> = OnceLock::new();
static AK135: OnceLock<ModelResult<VelocityModel>> = OnceLock::new();

struct PremRegion {
    top_depth: f64,
    bot_depth: f64,
    density: &'static [f64],
    p_velocity: &'static [f64],
    s_velocity: &'static [f64],
}

const LOWER_MANTLE_DENSITY: &[f64] = &[7.9565, -6.4761, 5.5283, -3.0807];

const PREM_REGIONS: [PremRegion; 11] = [
    PremRegion {
        top_depth: 0.0,
        bot_depth: 15.0,
        density: &[2.6],
        p_velocity: &[5.8],
        s_velocity: &[3.2],
    },
    PremRegion {
        top_depth: 15.0,
        bot_depth: 24.4,
        density: &[2.9],
        p_velocity: &[6.8],
        s_velocity: &[3.9],
    },
    PremRegion {
        top_depth: 24.4,
        bot_depth: 220.0,
        density: &[2.6910, 0.6924],
        p_velocity: &[4.1875, 3.9382],
        s_velocity: &[2.1519, 2.3481],
    },
    PremRegion {
        top_depth: 220.0,
        bot_depth: 400.0,
        density: &[7.1089, -3.8045],
        p_velocity: &[20.3926, -12.2569],
        s_velocity: &[8.9496, -4.4597],
    },
    PremRegion {
        top_depth: 400.0,
        bot_depth: 600.0,
        density: &[11.2494, -8.0298],
        p_velocity: &[39.7027, -32.6166],
        s_velocity: &[22.3512, -18.5856],
    },
    PremRegion {
        top_depth: 600.0,
        bot_depth: 670.0,
        density: &[5.3197, -1.4836],
        p_velocity: &[19.0957, -9.8672],
        s_velocity: &[9.9839, -4.9324],
    },
    PremRegion {
        top_depth: 670.0,
        bot_depth: 771.0,
        density: LOWER_MANTLE_DENSITY,
        p_velocity: &[29.2766, -23.6027, 5.5242, -2.5514],
        s_velocity: &[22.3459, -17.2473, -2.0834, 0.9783],
    },
    PremRegion {
        top_depth: 771.0,
        bot_depth: 2741.0,
        density: LOWER_MANTLE_DENSITY,
        p_velocity: &[24.9520, -40.4673, 51.4832, -26.6419],
        s_velocity: &[11.1671, -13.7818, 17.4575, -9.2777],
    },
    PremRegion {
        top_depth: 2741.0,
        bot_depth: 2891.0,
        density: LOWER_MANTLE_DENSITY,
        p_velocity: &[15.3891, -5.3181, 5.5242, -2.5514],
        s_velocity: &[6.9254, 1.4672, -2.0834, 0.9783],
    },
    PremRegion {
        top_depth: 2891.0,
        bot_depth: 5149.5,
        density: &[12.5815, -1.2638, -3.6426, -5.5281],
        p_velocity: &[11.0487, -4.0362, 4.8023, -13.5732],
        s_velocity: &[0.0],
    },
    PremRegion {
        top_depth: 5149.5,
        bot_depth: 6371.0,
        density: &[13.0885, 0.0, -8.8381],
        p_velocity: &[11.2622, 0.0, -6.3640],
        s_velocity: &[3.6678, 0.0, -4.4475],
    },
];

const PREM_BOUNDARIES: NamedBoundaries = NamedBoundaries {
    moho: Some(24.4),
    cmb: Some(2891.0),
    icb: Some(5149.5),
};

fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| acc * x + coefficient)
}

fn prem_layers(max_layer_thickness: f64) -> Vec<Layer> {
    let mut layers = Vec::new();
    for region in &PREM_REGIONS {
        let thickness = region.bot_depth - region.top_depth;
        let count = (thickness / max_layer_thickness - 1.0e-9).ceil().max(1.0) as usize;
        let depth_at = |step: usize| {
            if step == count {
                region.bot_depth
            } else {
                region.top_depth + thickness * step as f64 / count as f64
            }
        };
        let sample = |depth: f64| {
            let x = (EARTH_RADIUS_KM - depth) / EARTH_RADIUS_KM;
            (
                polynomial(region.p_velocity, x),
                polynomial(region.s_velocity, x),
                polynomial(region.density, x),
            )
        };

        for step in 0..count {
            let top_depth = depth_at(step);
            let bot_depth = depth_at(step + 1);
            let (top_p_velocity, top_s_velocity, top_density) = sample(top_depth);
            let (bot_p_velocity, bot_s_velocity, bot_density) = sample(bot_depth);
            layers.push(Layer {
                top_depth,
                bot_depth,
                top_p_velocity,
                bot_p_velocity,
                top_s_velocity,
                bot_s_velocity,
                top_density,
                bot_density,
            });
        }
    }
    layers
}

/// PREM sampled with the given sublayer thickness and rotation period.
pub fn build_prem(max_layer_thickness: f64, length_of_day: f64) -> ModelResult<VelocityModel> {
    if !max_layer_thickness.is_finite() || max_layer_thickness <= 0.0 {
        return Err(EllipError::input_validation(
            "INPUT.LAYER_THICKNESS",
            format!(
                "sublayer thickness must be positive, got {}",
                max_layer_thickness
            ),
        ));
    }
    VelocityModel::with_length_of_day(
        "prem",
        prem_layers(max_layer_thickness),
        PREM_BOUNDARIES,
        length_of_day,
    )
}

/// Shared PREM instance built with the default sampling.
pub fn prem() -> ModelResult<&'static VelocityModel> {
    PREM.get_or_init(|| build_prem(DEFAULT_MAX_LAYER_THICKNESS_KM, EARTH_LOD))
        .as_ref()
        .map_err(Clone::clone)
}

/// ak135 with the given rotation period.
pub fn build_ak135(length_of_day: f64) -> ModelResult<VelocityModel> {
    let (layers, boundaries) = parse_nd_source(AK135_SOURCE).map_err(|error| {
        EllipError::internal(
            "INTERNAL.BUNDLED_MODEL",
            format!("bundled ak135 table is malformed: {}", error),
        )
    })?;
    VelocityModel::with_length_of_day("ak135", layers, boundaries, length_of_day)
}

/// Shared ak135 instance.
pub fn ak135() -> ModelResult<&'static VelocityModel> {
    AK135
        .get_or_init(|| build_ak135(EARTH_LOD))
        .as_ref()
        .map_err(Clone::clone)
}

/// Looks up a bundled model by case-insensitive name.
pub fn reference_model(name: &str) -> ModelResult<&'static VelocityModel> {
    match name.trim().to_ascii_lowercase().as_str() {
        "prem" => prem(),
        "ak135" => ak135(),
        _ => Err(unknown_model(name)),
    }
}

fn unknown_model(name: &str) -> EllipError {
    EllipError::input_validation(
        "INPUT.UNKNOWN_MODEL",
        format!(
            "unknown reference model '{}'; supported models: {} (or a path to an .nd file)",
            name,
            SUPPORTED_MODELS.join(", ")
        ),
    )
}

/// Where a velocity model comes from: a bundled name or an `.nd` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Named(String),
    File(PathBuf),
}

impl ModelSource {
    /// Bundled names win; anything that looks like a path is read from disk.
    pub fn from_argument(argument: &str) -> Self {
        let lowered = argument.trim().to_ascii_lowercase();
        if SUPPORTED_MODELS.contains(&lowered.as_str()) {
            return Self::Named(lowered);
        }

        let path = Path::new(argument);
        let has_nd_extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("nd"));
        if has_nd_extension || path.exists() {
            Self::File(path.to_path_buf())
        } else {
            Self::Named(argument.to_string())
        }
    }

    /// Resolves the model; the shared instance is reused when the configuration
    /// matches its defaults.
    pub fn resolve(&self, config: &EllipticityConfig) -> ModelResult<Cow<'static, VelocityModel>> {
        match self {
            Self::Named(name) => {
                let shared = reference_model(name)?;
                let default_rotation = config.length_of_day == EARTH_LOD;
                // Only PREM is resampled; ak135 keeps its tabulated rows.
                let default_sampling = shared.name() != "prem"
                    || config.max_layer_thickness == DEFAULT_MAX_LAYER_THICKNESS_KM;
                if default_rotation && default_sampling {
                    return Ok(Cow::Borrowed(shared));
                }
                tracing::debug!(
                    model = %name,
                    max_layer_thickness = config.max_layer_thickness,
                    length_of_day = config.length_of_day,
                    "rebuilding reference model with custom settings"
                );
                let rebuilt = match shared.name() {
                    "prem" => build_prem(config.max_layer_thickness, config.length_of_day)?,
                    _ => build_ak135(config.length_of_day)?,
                };
                Ok(Cow::Owned(rebuilt))
            }
            Self::File(path) => read_nd_file(path, config.length_of_day).map(Cow::Owned),
        }
    }
}
