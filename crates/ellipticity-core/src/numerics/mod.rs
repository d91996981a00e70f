pub mod legendre;

pub use legendre::{distance_weights, weighted_alp2, weighted_alp2_all};

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// Trapezoidal rule of `integrand` against the absolute increments of `abscissa`.
///
/// Returns `None` when the slices differ in length.
pub fn trapezoid_abs(integrand: &[f64], abscissa: &[f64]) -> Option<f64> {
    if integrand.len() != abscissa.len() {
        return None;
    }

    let mut sum = 0.0;
    let mut correction = 0.0;
    for (values, points) in integrand.windows(2).zip(abscissa.windows(2)) {
        let step = (points[1] - points[0]).abs();
        kahan_add(&mut sum, &mut correction, 0.5 * (values[0] + values[1]) * step);
    }

    Some(sum)
}

/// Cumulative trapezoidal integral starting at zero, same length as the input.
pub fn cumulative_trapezoid(integrand: &[f64], abscissa: &[f64]) -> Option<Vec<f64>> {
    if integrand.len() != abscissa.len() {
        return None;
    }

    let mut cumulative = Vec::with_capacity(integrand.len());
    let mut running = 0.0;
    if !integrand.is_empty() {
        cumulative.push(0.0);
    }
    for (values, points) in integrand.windows(2).zip(abscissa.windows(2)) {
        running += 0.5 * (values[0] + values[1]) * (points[1] - points[0]);
        cumulative.push(running);
    }

    Some(cumulative)
}

/// Vertical slowness `sqrt(eta^2 - p^2)`, clamped to zero past the turning point.
pub fn vertical_slowness(eta: f64, ray_param: f64) -> f64 {
    (eta * eta - ray_param * ray_param).max(0.0).sqrt()
}
