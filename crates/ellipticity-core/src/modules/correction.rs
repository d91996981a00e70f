//! Scalar travel-time corrections from ellipticity coefficients.

use super::coefficients::arrival_coefficients;
use crate::domain::{Arrival, Coefficients};
use crate::model::VelocityModel;
use crate::numerics::weighted_alp2_all;
use serde::Serialize;

/// `δt = Σ σ_m P̃_{2,m}(cos θ0) cos(m ζ)` for receiver azimuth ζ and source
/// co-latitude θ0, both in degrees.
pub fn correction_from_coefficients(
    coefficients: &Coefficients,
    azimuth_deg: f64,
    colatitude_deg: f64,
) -> f64 {
    let legendre = weighted_alp2_all(colatitude_deg.to_radians());
    let azimuth = azimuth_deg.to_radians();
    (0..3)
        .map(|order| coefficients[order] * legendre[order] * (order as f64 * azimuth).cos())
        .sum()
}

pub fn latitude_to_colatitude(latitude_deg: f64) -> f64 {
    90.0 - latitude_deg
}

/// Same as [`correction_from_coefficients`] with a geographic source latitude.
pub fn correction_from_latitude(
    coefficients: &Coefficients,
    azimuth_deg: f64,
    latitude_deg: f64,
) -> f64 {
    correction_from_coefficients(
        coefficients,
        azimuth_deg,
        latitude_to_colatitude(latitude_deg),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalCorrection {
    pub phase: String,
    pub source_depth: f64,
    pub distance: f64,
    /// Ray parameter in s/degree.
    pub ray_param: f64,
    pub travel_time: f64,
    pub coefficients: Coefficients,
    pub correction: f64,
    pub corrected_time: f64,
}

impl ArrivalCorrection {
    pub fn new(arrival: &Arrival, coefficients: Coefficients, correction: f64) -> Self {
        Self {
            phase: arrival.phase.clone(),
            source_depth: arrival.source_depth,
            distance: arrival.distance,
            ray_param: arrival.ray_param_per_degree(),
            travel_time: arrival.time,
            coefficients,
            correction,
            corrected_time: arrival.time + correction,
        }
    }
}

/// Coefficients and corrections for every arrival at one receiver.
pub fn correct_arrivals(
    arrivals: &[Arrival],
    model: &VelocityModel,
    azimuth_deg: f64,
    latitude_deg: f64,
) -> Vec<ArrivalCorrection> {
    arrivals
        .iter()
        .map(|arrival| {
            let coefficients = arrival_coefficients(arrival, model);
            let correction = correction_from_latitude(&coefficients, azimuth_deg, latitude_deg);
            ArrivalCorrection::new(arrival, coefficients, correction)
        })
        .collect()
}
