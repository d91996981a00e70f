//! Contribution of a single leg to the ellipticity coefficients.
//!
//! The depth integral is evaluated in vertical slowness `q = sqrt(η² - p²)`,
//! which vanishes at turning points and keeps the integrand finite there.

use super::legs::{Leg, LegDirection};
use crate::domain::{Coefficients, RaySample};
use crate::model::{Side, VelocityModel};
use crate::numerics::{distance_weights, trapezoid_abs, vertical_slowness};

/// Trapezoidal integral plus the boundary terms at both ends of the leg.
pub fn leg_contribution(leg: &Leg<'_>, model: &VelocityModel) -> Coefficients {
    let samples = leg.samples;
    if samples.len() < 2 || leg.direction == LegDirection::Horizontal {
        return Coefficients::ZERO;
    }

    let ray_param = samples[0].ray_param;
    let deepest = leg.deepest();
    let mut slowness = Vec::with_capacity(samples.len());
    let mut integrands: [Vec<f64>; 3] = Default::default();
    for sample in samples {
        let side = if sample.depth == deepest {
            Side::Above
        } else {
            Side::Below
        };
        let terms = model.kernel_terms(sample.depth, leg.wave, side);
        slowness.push(vertical_slowness(terms.eta, ray_param));
        let weights = distance_weights(sample.distance);
        for (order, integrand) in integrands.iter_mut().enumerate() {
            integrand.push(terms.structure * terms.epsilon * weights[order]);
        }
    }

    let mut total = [0.0; 3];
    for (order, integrand) in integrands.iter().enumerate() {
        total[order] = trapezoid_abs(integrand, &slowness).unwrap_or(0.0);
    }
    let mut contribution = Coefficients::from_array(total);

    let last = samples.len() - 1;
    if leg.start.has_boundary_term() {
        contribution += boundary_term(&samples[0], &samples[1], leg, model);
    }
    if leg.end.has_boundary_term() {
        contribution += boundary_term(&samples[last], &samples[last - 1], leg, model);
    }
    contribution
}

/// `-s q ε λ_m(Δ)` at a leg end, with `q` taken on the side of the neighbouring
/// sample and `s` the sign of the depth step away from that neighbour.
fn boundary_term(
    end: &RaySample,
    neighbour: &RaySample,
    leg: &Leg<'_>,
    model: &VelocityModel,
) -> Coefficients {
    if end.depth == neighbour.depth {
        return Coefficients::ZERO;
    }

    let side = if neighbour.depth >= end.depth {
        Side::Below
    } else {
        Side::Above
    };
    let sign = if end.depth > neighbour.depth { 1.0 } else { -1.0 };
    let terms = model.kernel_terms(end.depth, leg.wave, side);
    let slowness = vertical_slowness(terms.eta, end.ray_param);
    let scale = -sign * slowness * terms.epsilon;
    Coefficients::from_array(distance_weights(end.distance).map(|weight| scale * weight))
}
