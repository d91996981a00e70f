//! Splitting ray paths into legs of one wave type and one depth direction.

use crate::domain::{RaySample, WaveType};
use crate::model::VelocityModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegDirection {
    Down,
    Up,
    /// Constant depth, as along a diffracted segment.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegBoundary {
    Source,
    Receiver,
    Interface,
    Turning,
}

impl LegBoundary {
    /// Turning points carry no boundary term.
    pub fn has_boundary_term(self) -> bool {
        !matches!(self, Self::Turning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg<'a> {
    pub wave: WaveType,
    pub direction: LegDirection,
    pub start: LegBoundary,
    pub end: LegBoundary,
    pub samples: &'a [RaySample],
}

impl Leg<'_> {
    pub fn deepest(&self) -> f64 {
        self.samples
            .iter()
            .map(|sample| sample.depth)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

fn is_reversal(before: f64, at: f64, after: f64) -> bool {
    let incoming = at - before;
    let outgoing = after - at;
    incoming * outgoing < 0.0 || (incoming == 0.0) != (outgoing == 0.0)
}

fn direction_of(samples: &[RaySample]) -> LegDirection {
    let first = samples[0].depth;
    let last = samples[samples.len() - 1].depth;
    if last > first {
        LegDirection::Down
    } else if last < first {
        LegDirection::Up
    } else {
        LegDirection::Horizontal
    }
}

/// Breaks `path` at every interior sample lying on a discontinuity, where the
/// depth direction reverses or where the wave type changes.
pub fn split_legs<'a>(path: &'a [RaySample], model: &VelocityModel) -> Vec<Leg<'a>> {
    if path.len() < 2 {
        return Vec::new();
    }

    let last = path.len() - 1;
    let wave_changes_at = |index: usize| index < last && path[index + 1].wave != path[index].wave;
    let classify = |index: usize| {
        if index == 0 {
            LegBoundary::Source
        } else if index == last {
            LegBoundary::Receiver
        } else if model.is_discontinuity(path[index].depth) || wave_changes_at(index) {
            LegBoundary::Interface
        } else {
            LegBoundary::Turning
        }
    };

    let mut breaks = vec![0];
    for index in 1..last {
        let on_interface = model.is_discontinuity(path[index].depth);
        let reverses = is_reversal(
            path[index - 1].depth,
            path[index].depth,
            path[index + 1].depth,
        );
        if on_interface || reverses || wave_changes_at(index) {
            breaks.push(index);
        }
    }
    breaks.push(last);

    breaks
        .windows(2)
        .map(|pair| {
            let samples = &path[pair[0]..=pair[1]];
            Leg {
                wave: samples[1].wave,
                direction: direction_of(samples),
                start: classify(pair[0]),
                end: classify(pair[1]),
                samples,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LegBoundary, LegDirection, split_legs};
    use crate::domain::{RaySample, WaveType};
    use crate::model::tests::toy_model;

    fn sample(depth: f64, distance: f64, wave: WaveType) -> RaySample {
        RaySample::new(100.0, distance * 10.0, distance, depth, wave)
    }

    #[test]
    fn turning_ray_splits_at_its_deepest_point() {
        let model = toy_model();
        let path = [
            sample(0.0, 0.0, WaveType::P),
            sample(500.0, 0.1, WaveType::P),
            sample(800.0, 0.2, WaveType::P),
            sample(500.0, 0.3, WaveType::P),
            sample(0.0, 0.4, WaveType::P),
        ];
        let legs = split_legs(&path, &model);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].direction, LegDirection::Down);
        assert_eq!(legs[0].start, LegBoundary::Source);
        assert_eq!(legs[0].end, LegBoundary::Turning);
        assert_eq!(legs[1].direction, LegDirection::Up);
        assert_eq!(legs[1].start, LegBoundary::Turning);
        assert_eq!(legs[1].end, LegBoundary::Receiver);
        assert_eq!(legs[0].deepest(), 800.0);
    }

    #[test]
    fn interfaces_and_conversions_break_legs() {
        let model = toy_model();
        let path = [
            sample(0.0, 0.0, WaveType::S),
            sample(1000.0, 0.1, WaveType::S),
            sample(2000.0, 0.2, WaveType::S),
            sample(1000.0, 0.3, WaveType::P),
            sample(0.0, 0.4, WaveType::P),
        ];
        let legs = split_legs(&path, &model);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].wave, WaveType::S);
        assert_eq!(legs[0].end, LegBoundary::Interface);
        assert_eq!(legs[1].wave, WaveType::P);
        assert_eq!(legs[1].start, LegBoundary::Interface);
        assert_eq!(legs[1].samples.len(), 3);
    }

    #[test]
    fn constant_depth_runs_become_horizontal_legs() {
        let model = toy_model();
        let path = [
            sample(1500.0, 0.0, WaveType::P),
            sample(2000.0, 0.1, WaveType::P),
            sample(2000.0, 0.2, WaveType::P),
            sample(2000.0, 0.3, WaveType::P),
            sample(1500.0, 0.4, WaveType::P),
        ];
        let legs = split_legs(&path, &model);
        let directions: Vec<_> = legs.iter().map(|leg| leg.direction).collect();
        assert_eq!(
            directions,
            vec![
                LegDirection::Down,
                LegDirection::Horizontal,
                LegDirection::Horizontal,
                LegDirection::Up,
            ]
        );
    }

    #[test]
    fn short_paths_have_no_legs() {
        let model = toy_model();
        assert!(split_legs(&[], &model).is_empty());
        assert!(split_legs(&[sample(10.0, 0.0, WaveType::P)], &model).is_empty());
    }

    #[test]
    fn turning_boundaries_skip_the_boundary_term() {
        assert!(!LegBoundary::Turning.has_boundary_term());
        assert!(LegBoundary::Source.has_boundary_term());
        assert!(LegBoundary::Interface.has_boundary_term());
    }
}
