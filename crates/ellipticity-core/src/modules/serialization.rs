use super::correction::ArrivalCorrection;

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

/// Phase, ray parameter (s/deg), spherical time, correction and corrected time.
pub fn render_correction_table(rows: &[ArrivalCorrection]) -> String {
    let mut table = format!(
        "{:<10}{:>14}{:>14}{:>14}{:>14}\n",
        "Phase", "p (s/deg)", "Time (s)", "Corr (s)", "Corrected (s)"
    );
    for row in rows {
        table.push_str(&format!(
            "{:<10}{}{}{}{}\n",
            row.phase,
            format_fixed_f64(row.ray_param, 14, 4),
            format_fixed_f64(row.travel_time, 14, 3),
            format_fixed_f64(row.correction, 14, 4),
            format_fixed_f64(row.corrected_time, 14, 3),
        ));
    }
    table
}

/// Phase, spherical time and the three coefficients.
pub fn render_coefficient_table(rows: &[ArrivalCorrection]) -> String {
    let mut table = format!(
        "{:<10}{:>14}{:>12}{:>12}{:>12}\n",
        "Phase", "Time (s)", "sigma0", "sigma1", "sigma2"
    );
    for row in rows {
        table.push_str(&format!(
            "{:<10}{}{}{}{}\n",
            row.phase,
            format_fixed_f64(row.travel_time, 14, 3),
            format_fixed_f64(row.coefficients.sigma0(), 12, 4),
            format_fixed_f64(row.coefficients.sigma1(), 12, 4),
            format_fixed_f64(row.coefficients.sigma2(), 12, 4),
        ));
    }
    table
}
