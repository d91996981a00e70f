pub mod errors;

pub use errors::{ComputeResult, EllipError, EllipErrorCategory, EllipResult, ModelResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveType {
    P,
    S,
}

impl WaveType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P => "p",
            Self::S => "s",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "p" => Some(Self::P),
            "s" => Some(Self::S),
            _ => None,
        }
    }
}

impl Display for WaveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One point of a ray path. `wave` describes the ray segment that ends at this
/// sample; the first sample of a path carries the type of the first segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySample {
    /// Ray parameter in s/radian.
    pub ray_param: f64,
    /// Cumulative travel time in seconds.
    pub time: f64,
    /// Cumulative epicentral distance in radians.
    pub distance: f64,
    /// Depth in km.
    pub depth: f64,
    pub wave: WaveType,
}

impl RaySample {
    pub const fn new(ray_param: f64, time: f64, distance: f64, depth: f64, wave: WaveType) -> Self {
        Self {
            ray_param,
            time,
            distance,
            depth,
            wave,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    pub phase: String,
    pub source_depth: f64,
    /// Requested epicentral distance in degrees.
    pub distance: f64,
    /// Ray parameter in s/radian.
    pub ray_param: f64,
    /// Spherical-Earth travel time in seconds.
    pub time: f64,
    pub path: Vec<RaySample>,
}

impl Arrival {
    pub fn ray_param_per_degree(&self) -> f64 {
        self.ray_param.to_radians()
    }

    /// Distance actually travelled along the path, in degrees.
    pub fn path_distance(&self) -> f64 {
        self.path
            .last()
            .map(|sample| sample.distance.to_degrees())
            .unwrap_or(0.0)
    }

    pub fn bottoming_depth(&self) -> f64 {
        self.path
            .iter()
            .map(|sample| sample.depth)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalRequest {
    pub phase: String,
    pub source_depth: f64,
    pub distance: f64,
}

impl ArrivalRequest {
    pub fn new(phase: impl Into<String>, source_depth: f64, distance: f64) -> Self {
        Self {
            phase: phase.into(),
            source_depth,
            distance,
        }
    }
}

/// Ellipticity coefficients (σ0, σ1, σ2).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coefficients([f64; 3]);

impl Coefficients {
    pub const ZERO: Self = Self([0.0; 3]);

    pub const fn new(sigma0: f64, sigma1: f64, sigma2: f64) -> Self {
        Self([sigma0, sigma1, sigma2])
    }

    pub const fn from_array(values: [f64; 3]) -> Self {
        Self(values)
    }

    pub const fn as_array(&self) -> [f64; 3] {
        self.0
    }

    pub const fn sigma0(&self) -> f64 {
        self.0[0]
    }

    pub const fn sigma1(&self) -> f64 {
        self.0[1]
    }

    pub const fn sigma2(&self) -> f64 {
        self.0[2]
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self(self.0.map(|value| value * factor))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|value| *value == 0.0)
    }

    pub fn max_abs_difference(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(lhs, rhs)| (lhs - rhs).abs())
            .fold(0.0, f64::max)
    }
}

impl Add for Coefficients {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
        ])
    }
}

impl AddAssign for Coefficients {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Coefficients {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Index<usize> for Coefficients {
    type Output = f64;

    fn index(&self, order: usize) -> &f64 {
        &self.0[order]
    }
}

impl Display for Coefficients {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}, {:.4})",
            self.0[0], self.0[1], self.0[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Arrival, ArrivalRequest, Coefficients, RaySample, WaveType};

    #[test]
    fn wave_type_tokens_are_case_insensitive() {
        assert_eq!(WaveType::from_token("P"), Some(WaveType::P));
        assert_eq!(WaveType::from_token(" s "), Some(WaveType::S));
        assert_eq!(WaveType::from_token("K"), None);
        assert_eq!(WaveType::S.to_string(), "s");
    }

    #[test]
    fn coefficients_accumulate_componentwise() {
        let total: Coefficients = [
            Coefficients::new(1.0, -2.0, 0.5),
            Coefficients::new(0.25, 0.5, -0.5),
        ]
        .into_iter()
        .sum();

        assert_eq!(total, Coefficients::new(1.25, -1.5, 0.0));
        assert_eq!(total[1], -1.5);
        assert_eq!(total.scaled(2.0), Coefficients::new(2.5, -3.0, 0.0));
        assert!(Coefficients::ZERO.is_zero());
        assert_eq!(total.to_string(), "(1.2500, -1.5000, 0.0000)");
    }

    #[test]
    fn coefficients_serialize_as_plain_triples() {
        let json = serde_json::to_string(&Coefficients::new(-0.5, 0.25, 1.0))
            .expect("coefficients should serialize");
        assert_eq!(json, "[-0.5,0.25,1.0]");
    }

    #[test]
    fn arrival_reports_path_geometry() {
        let arrival = Arrival {
            phase: "PcP".to_string(),
            source_depth: 10.0,
            distance: 30.0,
            ray_param: 180.0 / std::f64::consts::PI,
            time: 540.0,
            path: vec![
                RaySample::new(1.0, 0.0, 0.0, 10.0, WaveType::P),
                RaySample::new(1.0, 270.0, 0.25, 2891.0, WaveType::P),
                RaySample::new(1.0, 540.0, 30.0_f64.to_radians(), 0.0, WaveType::P),
            ],
        };

        assert!((arrival.ray_param_per_degree() - 1.0).abs() < 1.0e-12);
        assert!((arrival.path_distance() - 30.0).abs() < 1.0e-9);
        assert_eq!(arrival.bottoming_depth(), 2891.0);

        let request = ArrivalRequest::new("PcP", 10.0, 30.0);
        assert_eq!(request.phase, "PcP");
    }
}
