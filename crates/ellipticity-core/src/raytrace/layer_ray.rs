//! Closed-form ray integrals through slices where `η(r) = r / v(r)` follows a
//! power law between the slice end points.

use crate::domain::WaveType;
use crate::model::VelocityModel;
use crate::numerics::vertical_slowness;

/// Below this power-law exponent the slice is treated as having constant η.
const FLAT_EXPONENT: f64 = 1.0e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DescentPoint {
    pub(crate) depth: f64,
    /// Distance from the start of the descent, radians.
    pub(crate) distance: f64,
    /// Time from the start of the descent, seconds.
    pub(crate) time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DescentMode {
    /// Must arrive at the bottom depth without turning.
    Reach,
    /// Must turn above the bottom depth.
    Turn,
}

/// Slice boundaries between `top` and `bottom`: every layer boundary plus the
/// extra cuts, sorted and unique.
fn slice_depths(model: &VelocityModel, top: f64, bottom: f64, extra: &[f64]) -> Vec<f64> {
    let mut cuts = vec![top];
    cuts.extend(
        model
            .layers()
            .iter()
            .map(|layer| layer.top_depth)
            .chain(extra.iter().copied())
            .filter(|depth| top < *depth && *depth < bottom),
    );
    cuts.push(bottom);
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();
    cuts
}

/// Follows a down-going ray with ray parameter `p` (s/rad) from `top` towards
/// `bottom`. Returns `None` when the ray cannot satisfy `mode`.
pub(crate) fn descend(
    model: &VelocityModel,
    wave: WaveType,
    top: f64,
    bottom: f64,
    ray_param: f64,
    extra_cuts: &[f64],
    mode: DescentMode,
) -> Option<Vec<DescentPoint>> {
    let radius = model.radius();
    let mut points = vec![DescentPoint {
        depth: top,
        distance: 0.0,
        time: 0.0,
    }];
    if top >= bottom {
        return match mode {
            DescentMode::Reach => Some(points),
            DescentMode::Turn => None,
        };
    }

    let mut distance = 0.0;
    let mut time = 0.0;
    let cuts = slice_depths(model, top, bottom, extra_cuts);
    for (slice_index, pair) in cuts.windows(2).enumerate() {
        let (upper, lower) = (pair[0], pair[1]);
        let layer = model.layer(model.layer_number_below(upper));
        let upper_velocity = layer.velocity_at(upper, wave);
        let lower_velocity = layer.velocity_at(lower, wave);
        if upper_velocity <= 0.0 || lower_velocity <= 0.0 {
            return None;
        }

        let upper_radius = radius - upper;
        let lower_radius = radius - lower;
        let upper_eta = upper_radius / upper_velocity;
        let lower_eta = if lower_radius > 0.0 {
            lower_radius / lower_velocity
        } else {
            0.0
        };

        if upper_eta < ray_param {
            // The ray cannot enter this slice and turns at its top.
            return match mode {
                DescentMode::Turn if slice_index > 0 => Some(points),
                _ => None,
            };
        }

        let exponent = if lower_radius <= 0.0 {
            1.0
        } else if upper_eta == lower_eta {
            0.0
        } else {
            (upper_eta / lower_eta).ln() / (upper_radius / lower_radius).ln()
        };

        if lower_eta < ray_param || lower_radius <= 0.0 {
            if mode == DescentMode::Reach {
                return None;
            }
            let turning_radius = upper_radius * (ray_param / upper_eta).powf(1.0 / exponent);
            distance += (ray_param / upper_eta).min(1.0).acos() / exponent.abs();
            time += vertical_slowness(upper_eta, ray_param) / exponent.abs();
            points.push(DescentPoint {
                depth: radius - turning_radius,
                distance,
                time,
            });
            return Some(points);
        }

        if exponent.abs() < FLAT_EXPONENT {
            let slowness = vertical_slowness(upper_eta, ray_param);
            let log_ratio = (upper_radius / lower_radius).ln();
            distance += ray_param / slowness * log_ratio;
            time += upper_eta * upper_eta / slowness * log_ratio;
        } else {
            let upper_angle = (ray_param / upper_eta).min(1.0).acos();
            let lower_angle = (ray_param / lower_eta).min(1.0).acos();
            distance += (upper_angle - lower_angle).abs() / exponent.abs();
            time += (vertical_slowness(upper_eta, ray_param)
                - vertical_slowness(lower_eta, ray_param))
            .abs()
                / exponent.abs();
        }
        points.push(DescentPoint {
            depth: lower,
            distance,
            time,
        });
    }

    match mode {
        DescentMode::Reach => Some(points),
        DescentMode::Turn => None,
    }
}
