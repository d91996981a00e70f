//! Hydrostatic ellipticity of figure from Clairaut's equation with Radau's
//! approximation.

use super::Layer;
use crate::common::constants::{DENSITY_TO_SI, GRAVITATIONAL_CONSTANT, KM_TO_M, PI, PI2};
use crate::domain::{EllipError, ModelResult};
use crate::numerics::cumulative_trapezoid;

/// Flattening at the top and bottom of every model layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureProfile {
    top_epsilon: Vec<f64>,
    bot_epsilon: Vec<f64>,
}

impl FigureProfile {
    pub(crate) fn from_layers(
        layers: &[Layer],
        radius: f64,
        length_of_day: f64,
    ) -> ModelResult<Self> {
        if !length_of_day.is_finite() || length_of_day <= 0.0 {
            return Err(EllipError::input_validation(
                "INPUT.LENGTH_OF_DAY",
                format!("length of day must be positive, got {}", length_of_day),
            ));
        }

        let count = layers.len();
        let mut top_radius = Vec::with_capacity(count);
        let mut radau = Vec::with_capacity(count);
        let mut mass = 0.0;
        let mut inertia = 0.0;
        let mut previous_volume = 0.0;
        let mut previous_moment = 0.0;

        for layer in layers.iter().rev() {
            let r = (radius - layer.top_depth) * KM_TO_M;
            let volume = 4.0 / 3.0 * PI * r.powi(3);
            let moment = 8.0 / 15.0 * PI * r.powi(5);
            let density = layer.mean_density() * DENSITY_TO_SI;
            mass += density * (volume - previous_volume);
            inertia += density * (moment - previous_moment);
            previous_volume = volume;
            previous_moment = moment;

            let inertia_ratio = inertia / (mass * r * r);
            radau.push(6.25 * (1.0 - 1.5 * inertia_ratio).powi(2) - 1.0);
            top_radius.push(r);
        }

        let angular_velocity = PI2 / length_of_day;
        let surface_radius = radius * KM_TO_M;
        let rotation_ratio =
            surface_radius.powi(3) * angular_velocity.powi(2) / (GRAVITATIONAL_CONSTANT * mass);
        let surface_radau = radau[count - 1];
        let surface_epsilon = 5.0 * rotation_ratio / (2.0 * surface_radau + 4.0);

        let integrand: Vec<f64> = radau
            .iter()
            .zip(&top_radius)
            .map(|(eta, r)| eta / r)
            .collect();
        let integral = cumulative_trapezoid(&integrand, &top_radius).ok_or_else(|| {
            EllipError::internal("INTERNAL.FIGURE", "figure integrand and radii differ in length")
        })?;
        let last = integral[count - 1];
        let outward: Vec<f64> = integral
            .iter()
            .map(|value| surface_epsilon * (value - last).exp())
            .collect();

        // outward[k] is the flattening at the top of the k-th layer counted from
        // the centre; the centre takes the innermost value.
        let at_boundary = |k: usize| if k == 0 { outward[0] } else { outward[k - 1] };
        let top_epsilon = (0..count).map(|index| at_boundary(count - index)).collect();
        let bot_epsilon = (0..count).map(|index| at_boundary(count - index - 1)).collect();

        Ok(Self {
            top_epsilon,
            bot_epsilon,
        })
    }

    pub fn surface_epsilon(&self) -> f64 {
        self.top_epsilon[0]
    }

    pub fn top_epsilon(&self) -> &[f64] {
        &self.top_epsilon
    }

    pub fn bot_epsilon(&self) -> &[f64] {
        &self.bot_epsilon
    }

    pub(crate) fn epsilon_in_layer(&self, index: usize, layer: &Layer, depth: f64) -> f64 {
        let top = self.top_epsilon[index];
        let bot = self.bot_epsilon[index];
        top + (bot - top) * (depth - layer.top_depth) / layer.thickness()
    }
}
