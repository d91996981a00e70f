//! JSON ray-path documents.
//!
//! A document holds one arrival or an array of arrivals:
//! `{ "phase", "source_depth", "distance", "ray_param", "path": [{ "p", "time",
//! "dist", "depth", "wave"? }] }` with the ray parameter in s/radian, `dist` in
//! radians and depths in km. Untagged samples get their wave types inferred
//! from segment delay times; explicit tags are kept.

use crate::domain::{Arrival, EllipError, EllipResult, RaySample, WaveType};
use crate::model::{Side, VelocityModel};
use crate::numerics::vertical_slowness;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RayPathPoint {
    pub p: f64,
    pub time: f64,
    pub dist: f64,
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<WaveType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RayPathRecord {
    pub phase: String,
    pub source_depth: f64,
    /// Epicentral distance in degrees.
    pub distance: f64,
    pub ray_param: f64,
    pub path: Vec<RayPathPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RayPathDocument {
    Many(Vec<RayPathRecord>),
    One(RayPathRecord),
}

#[derive(Debug, thiserror::Error)]
pub enum RayPathError {
    #[error("failed to read ray paths '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse ray paths '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write ray paths '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ray paths could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<RayPathError> for EllipError {
    fn from(error: RayPathError) -> Self {
        match error {
            RayPathError::Read { .. } => EllipError::io_system("IO.RAY_PATH_READ", error.to_string()),
            RayPathError::Write { .. } => {
                EllipError::io_system("IO.RAY_PATH_WRITE", error.to_string())
            }
            RayPathError::Parse { .. } => {
                EllipError::input_validation("INPUT.RAY_PATH", error.to_string())
            }
            RayPathError::Serialize(_) => {
                EllipError::internal("INTERNAL.RAY_PATH", error.to_string())
            }
        }
    }
}

pub fn parse_ray_paths(source: &str, origin: &Path) -> Result<Vec<RayPathRecord>, RayPathError> {
    let document: RayPathDocument =
        serde_json::from_str(source).map_err(|source| RayPathError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
    Ok(match document {
        RayPathDocument::Many(records) => records,
        RayPathDocument::One(record) => vec![record],
    })
}

/// Reads a ray-path document and converts it into arrivals, tagging wave types
/// where the file leaves them out.
pub fn load_ray_paths(path: impl AsRef<Path>, model: &VelocityModel) -> EllipResult<Vec<Arrival>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| RayPathError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_ray_paths(&source, path)?;
    let arrivals: Vec<Arrival> = records
        .iter()
        .filter_map(|record| {
            let arrival = record_to_arrival(record, model);
            if arrival.is_none() {
                warn!(phase = record.phase.as_str(), "skipping ray path without samples");
            }
            arrival
        })
        .collect();
    debug!(path = %path.display(), arrivals = arrivals.len(), "loaded ray paths");
    Ok(arrivals)
}

pub fn record_to_arrival(record: &RayPathRecord, model: &VelocityModel) -> Option<Arrival> {
    let last = record.path.last()?;
    let mut path: Vec<RaySample> = record
        .path
        .iter()
        .map(|point| {
            RaySample::new(
                point.p,
                point.time,
                point.dist,
                point.depth,
                point.wave.unwrap_or(WaveType::P),
            )
        })
        .collect();
    if record.path.iter().any(|point| point.wave.is_none()) {
        infer_wave_types(&mut path, model);
        for (sample, point) in path.iter_mut().zip(&record.path) {
            if let Some(wave) = point.wave {
                sample.wave = wave;
            }
        }
    }

    Some(Arrival {
        phase: record.phase.clone(),
        source_depth: record.source_depth,
        distance: record.distance,
        ray_param: record.ray_param,
        time: last.time,
        path,
    })
}

pub fn arrival_to_record(arrival: &Arrival) -> RayPathRecord {
    RayPathRecord {
        phase: arrival.phase.clone(),
        source_depth: arrival.source_depth,
        distance: arrival.distance,
        ray_param: arrival.ray_param,
        path: arrival
            .path
            .iter()
            .map(|sample| RayPathPoint {
                p: sample.ray_param,
                time: sample.time,
                dist: sample.distance,
                depth: sample.depth,
                wave: Some(sample.wave),
            })
            .collect(),
    }
}

pub fn write_ray_paths(path: impl AsRef<Path>, arrivals: &[Arrival]) -> EllipResult<()> {
    let path = path.as_ref();
    let records: Vec<RayPathRecord> = arrivals.iter().map(arrival_to_record).collect();
    let mut content = serde_json::to_string_pretty(&records).map_err(RayPathError::from)?;
    content.push('\n');
    fs::write(path, content).map_err(|source| RayPathError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Tags every sample with P or S by splitting the path at discontinuities and
/// matching each segment's delay time `T - pΔ` against both wave types.
/// Constant-depth segments keep the type of the segment before them.
pub fn infer_wave_types(path: &mut [RaySample], model: &VelocityModel) {
    if path.len() < 2 {
        return;
    }

    let mut breaks: Vec<usize> = vec![0];
    breaks.extend((1..path.len() - 1).filter(|&index| model.is_discontinuity(path[index].depth)));
    breaks.push(path.len() - 1);

    let mut previous: Option<WaveType> = None;
    let mut first_wave: Option<WaveType> = None;
    for pair in breaks.windows(2) {
        let segment = &path[pair[0]..=pair[1]];
        let wave = classify_segment(segment, model)
            .or(previous)
            .unwrap_or(WaveType::P);
        first_wave.get_or_insert(wave);
        for sample in &mut path[pair[0] + 1..=pair[1]] {
            sample.wave = wave;
        }
        previous = Some(wave);
    }
    if let Some(wave) = first_wave {
        path[0].wave = wave;
    }
}

/// `None` for a diffracted (constant depth) segment.
fn classify_segment(segment: &[RaySample], model: &VelocityModel) -> Option<WaveType> {
    let (near, far) = if segment[0].depth < segment[segment.len() - 1].depth {
        (segment[0], segment[1])
    } else {
        (segment[segment.len() - 2], segment[segment.len() - 1])
    };
    if near.depth == far.depth {
        return None;
    }

    let observed = (far.time - near.time) - near.ray_param * (near.distance - far.distance).abs();
    let misfit = |wave: WaveType| {
        (expected_delay_time(near.ray_param, near.depth, far.depth, wave, model) - observed).abs()
    };
    if misfit(WaveType::P) < misfit(WaveType::S) {
        Some(WaveType::P)
    } else {
        Some(WaveType::S)
    }
}

/// Delay time between two depths from a trapezoid in `ln r`; zero when the
/// wave cannot propagate at the first depth.
fn expected_delay_time(
    ray_param: f64,
    depth0: f64,
    depth1: f64,
    wave: WaveType,
    model: &VelocityModel,
) -> f64 {
    let (side0, side1) = if depth1 >= depth0 {
        (Side::Below, Side::Above)
    } else {
        (Side::Above, Side::Below)
    };
    let velocity0 = match side0 {
        Side::Below => model.evaluate_below(depth0, wave),
        Side::Above => model.evaluate_above(depth0, wave),
    };
    if velocity0 <= 0.0 {
        return 0.0;
    }

    let radius0 = model.radius() - depth0;
    let radius1 = model.radius() - depth1;
    let velocity1 = match side1 {
        Side::Below => model.evaluate_below(depth1, wave),
        Side::Above => model.evaluate_above(depth1, wave),
    };

    if ray_param == 0.0 {
        return 0.5 * (1.0 / velocity0 + 1.0 / velocity1) * (radius1 - radius0).abs();
    }
    let slowness0 = vertical_slowness(radius0 / velocity0, ray_param);
    let slowness1 = vertical_slowness(radius1 / velocity1, ray_param);
    0.5 * (slowness0 + slowness1) * (radius1 / radius0).ln().abs()
}
