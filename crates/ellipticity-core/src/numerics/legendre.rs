//! Schmidt semi-normalized associated Legendre functions of degree 2.

use crate::common::constants::TWO_THIRDS;

/// `P̃_{2,m}(cos theta)` for one order; `None` when `order > 2`.
pub fn weighted_alp2(order: usize, theta: f64) -> Option<f64> {
    weighted_alp2_all(theta).get(order).copied()
}

/// `P̃_{2,m}(cos theta)` for `m = 0, 1, 2`.
///
/// The normalization is `sqrt((2 - δ_0m) (2 - m)! / (2 + m)!)`, which makes the
/// m = 1 and m = 2 prefactors `sqrt(1/3)` and `sqrt(1/12)`.
pub fn weighted_alp2_all(theta: f64) -> [f64; 3] {
    let (sin, cos) = theta.sin_cos();
    [
        0.5 * (3.0 * cos * cos - 1.0),
        (1.0_f64 / 3.0).sqrt() * 3.0 * cos * sin,
        (1.0_f64 / 12.0).sqrt() * 3.0 * sin * sin,
    ]
}

/// Distance weights `λ_m(Δ) = -(2/3) P̃_{2,m}(cos Δ)` used by the ray integrals.
pub fn distance_weights(distance: f64) -> [f64; 3] {
    weighted_alp2_all(distance).map(|value| -TWO_THIRDS * value)
}
