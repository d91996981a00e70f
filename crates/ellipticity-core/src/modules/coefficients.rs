use super::integrate::leg_contribution;
use super::legs::split_legs;
use crate::domain::{Arrival, Coefficients, RaySample};
use crate::model::VelocityModel;
use crate::numerics::stable_sum;
use tracing::debug;

/// Ellipticity coefficients (σ0, σ1, σ2) of a whole ray path.
///
/// Paths with a single sample or at constant depth give zero.
pub fn ellipticity_coefficients(path: &[RaySample], model: &VelocityModel) -> Coefficients {
    let contributions: Vec<Coefficients> = split_legs(path, model)
        .iter()
        .enumerate()
        .map(|(index, leg)| {
            let contribution = leg_contribution(leg, model);
            debug!(
                leg = index,
                wave = %leg.wave,
                direction = ?leg.direction,
                start = ?leg.start,
                end = ?leg.end,
                samples = leg.samples.len(),
                sigma0 = contribution.sigma0(),
                sigma1 = contribution.sigma1(),
                sigma2 = contribution.sigma2(),
                "leg contribution"
            );
            contribution
        })
        .collect();

    let per_order = |order: usize| {
        let terms: Vec<f64> = contributions.iter().map(|leg| leg[order]).collect();
        stable_sum(&terms)
    };
    Coefficients::new(per_order(0), per_order(1), per_order(2))
}

pub fn arrival_coefficients(arrival: &Arrival, model: &VelocityModel) -> Coefficients {
    ellipticity_coefficients(&arrival.path, model)
}

/// Coefficients for each arrival, in order.
pub fn batch_coefficients(arrivals: &[Arrival], model: &VelocityModel) -> Vec<Coefficients> {
    arrivals
        .iter()
        .map(|arrival| arrival_coefficients(arrival, model))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{batch_coefficients, ellipticity_coefficients};
    use crate::domain::{Arrival, Coefficients, RaySample, WaveType};
    use crate::model::tests::toy_model;

    fn vertical_path(depths: &[f64]) -> Vec<RaySample> {
        depths
            .iter()
            .enumerate()
            .map(|(index, depth)| RaySample::new(0.0, index as f64, 0.0, *depth, WaveType::P))
            .collect()
    }

    #[test]
    fn degenerate_paths_have_zero_coefficients() {
        let model = toy_model();
        assert_eq!(ellipticity_coefficients(&[], &model), Coefficients::ZERO);
        assert_eq!(
            ellipticity_coefficients(&vertical_path(&[300.0]), &model),
            Coefficients::ZERO
        );
        assert_eq!(
            ellipticity_coefficients(&vertical_path(&[300.0, 300.0, 300.0]), &model),
            Coefficients::ZERO
        );
    }

    #[test]
    fn vertical_reflection_doubles_the_one_way_path() {
        let model = toy_model();
        let down = vertical_path(&[0.0, 250.0, 500.0, 1000.0, 1500.0, 2000.0]);
        let mut round_trip = down.clone();
        round_trip.extend(down.iter().rev().skip(1).copied());

        let one_way = ellipticity_coefficients(&down, &model);
        let both_ways = ellipticity_coefficients(&round_trip, &model);
        assert!(!one_way.is_zero());
        assert!(both_ways.max_abs_difference(&one_way.scaled(2.0)) < 1.0e-12);
    }

    #[test]
    fn small_sample_changes_give_small_coefficient_changes() {
        let model = toy_model();
        let base = vertical_path(&[0.0, 250.0, 500.0, 750.0]);
        let mut nudged = base.clone();
        nudged[2].depth += 1.0e-6;

        let reference = ellipticity_coefficients(&base, &model);
        let perturbed = ellipticity_coefficients(&nudged, &model);
        assert!(reference.max_abs_difference(&perturbed) < 1.0e-6);
    }

    #[test]
    fn batches_follow_arrival_order() {
        let model = toy_model();
        let arrival = |depths: &[f64]| Arrival {
            phase: "P".to_string(),
            source_depth: depths[0],
            distance: 0.0,
            ray_param: 0.0,
            time: 1.0,
            path: vertical_path(depths),
        };
        let arrivals = [arrival(&[0.0, 500.0]), arrival(&[100.0])];
        let batch = batch_coefficients(&arrivals, &model);
        assert_eq!(batch.len(), 2);
        assert!(!batch[0].is_zero());
        assert!(batch[1].is_zero());
    }
}
