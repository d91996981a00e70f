//! Ray paths and arrivals through a layered velocity model.

mod layer_ray;
pub mod phase;

pub use phase::{LegSpan, PhaseError, PhasePlan, PlannedLeg, Station, TurnRegion};

use crate::common::config::EllipticityConfig;
use crate::common::constants::PI2;
use crate::domain::{Arrival, ArrivalRequest, ComputeResult, EllipError, RaySample, WaveType};
use crate::model::VelocityModel;
use layer_ray::{DescentMode, DescentPoint, descend};
use tracing::{debug, info};

const BISECTION_ITERATIONS: usize = 60;

/// Produces arrivals with sampled ray paths for a phase request.
pub trait RayTracer {
    fn arrivals(&self, request: &ArrivalRequest) -> ComputeResult<Vec<Arrival>>;
}

#[derive(Debug, Clone, Copy)]
pub struct LayeredRayTracer<'a> {
    model: &'a VelocityModel,
    config: EllipticityConfig,
}

impl<'a> LayeredRayTracer<'a> {
    pub fn new(model: &'a VelocityModel, config: EllipticityConfig) -> Self {
        Self { model, config }
    }

    pub fn model(&self) -> &'a VelocityModel {
        self.model
    }

    /// Traces `plan` with ray parameter `ray_param`; diffracted legs add
    /// `diffracted_arc` radians along the core-mantle boundary.
    pub fn trace(
        &self,
        plan: &PhasePlan,
        ray_param: f64,
        source_depth: f64,
        diffracted_arc: f64,
    ) -> Option<Vec<RaySample>> {
        let extra_cuts = [source_depth];
        let mut path: Vec<RaySample> = Vec::new();
        let mut distance = 0.0;
        let mut time = 0.0;

        for leg in plan.legs() {
            match *leg {
                PlannedLeg::Diffracted { wave } => {
                    let steps = (diffracted_arc.to_degrees() / self.config.diffraction_step_deg)
                        .floor()
                        .max(1.0) as usize;
                    let depth = self.model.cmb_depth();
                    for step in 1..=steps {
                        let fraction = step as f64 / steps as f64;
                        path.push(RaySample::new(
                            ray_param,
                            time + ray_param * diffracted_arc * fraction,
                            distance + diffracted_arc * fraction,
                            depth,
                            wave,
                        ));
                    }
                    distance += diffracted_arc;
                    time += ray_param * diffracted_arc;
                }
                PlannedLeg::Down { wave, from, to } => {
                    let top = self.station_depth(from, source_depth);
                    let points = match to {
                        LegSpan::Fixed(station) => descend(
                            self.model,
                            wave,
                            top,
                            self.station_depth(station, source_depth),
                            ray_param,
                            &extra_cuts,
                            DescentMode::Reach,
                        ),
                        LegSpan::Turn(region) => descend(
                            self.model,
                            wave,
                            top,
                            self.turn_limit(region),
                            ray_param,
                            &extra_cuts,
                            DescentMode::Turn,
                        ),
                    }?;
                    if path.is_empty() {
                        path.push(RaySample::new(ray_param, 0.0, 0.0, points[0].depth, wave));
                    }
                    for point in &points[1..] {
                        path.push(RaySample::new(
                            ray_param,
                            time + point.time,
                            distance + point.distance,
                            point.depth,
                            wave,
                        ));
                    }
                    let (leg_distance, leg_time) = leg_totals(&points);
                    distance += leg_distance;
                    time += leg_time;
                }
                PlannedLeg::Up { wave, from, to } => {
                    let top = self.station_depth(to, source_depth);
                    let points = match from {
                        LegSpan::Fixed(station) => descend(
                            self.model,
                            wave,
                            top,
                            self.station_depth(station, source_depth),
                            ray_param,
                            &extra_cuts,
                            DescentMode::Reach,
                        ),
                        LegSpan::Turn(region) => descend(
                            self.model,
                            wave,
                            top,
                            self.turn_limit(region),
                            ray_param,
                            &extra_cuts,
                            DescentMode::Turn,
                        ),
                    }?;
                    let (leg_distance, leg_time) = leg_totals(&points);
                    if path.is_empty() {
                        let start = points[points.len() - 1].depth;
                        path.push(RaySample::new(ray_param, 0.0, 0.0, start, wave));
                    }
                    for point in points.iter().rev().skip(1) {
                        path.push(RaySample::new(
                            ray_param,
                            time + leg_time - point.time,
                            distance + leg_distance - point.distance,
                            point.depth,
                            wave,
                        ));
                    }
                    distance += leg_distance;
                    time += leg_time;
                }
            }
        }

        Some(path)
    }

    fn station_depth(&self, station: Station, source_depth: f64) -> f64 {
        match station {
            Station::Source => source_depth,
            Station::Surface => 0.0,
            Station::Cmb => self.model.cmb_depth(),
            Station::Icb => self.model.iocb_depth(),
        }
    }

    fn turn_limit(&self, region: TurnRegion) -> f64 {
        match region {
            TurnRegion::Mantle => self.model.cmb_depth(),
            TurnRegion::OuterCore => self.model.iocb_depth(),
            TurnRegion::InnerCore => self.model.radius(),
        }
    }

    fn validate_request(&self, request: &ArrivalRequest) -> ComputeResult<()> {
        let depth = request.source_depth;
        if !depth.is_finite() || depth < 0.0 || depth >= self.model.cmb_depth() {
            return Err(EllipError::input_validation(
                "INPUT.SOURCE_DEPTH",
                format!(
                    "source depth must lie between the surface and the core-mantle boundary \
                     ({} km), got {} km",
                    self.model.cmb_depth(),
                    depth
                ),
            ));
        }
        if !request.distance.is_finite() {
            return Err(EllipError::input_validation(
                "INPUT.DISTANCE",
                format!("distance must be finite, got {}", request.distance),
            ));
        }
        Ok(())
    }

    fn diffracted_arrival(
        &self,
        plan: &PhasePlan,
        wave: WaveType,
        request: &ArrivalRequest,
        target: f64,
    ) -> Option<Vec<RaySample>> {
        let cmb = self.model.cmb_depth();
        let ray_param = (self.model.radius() - cmb) / self.model.evaluate_above(cmb, wave);
        let geometric = self.trace(plan, ray_param, request.source_depth, 0.0)?;
        let reached = geometric.last()?.distance;
        if reached > target {
            debug!(
                phase = plan.name(),
                reached_deg = reached.to_degrees(),
                "diffraction starts beyond the requested distance"
            );
            return None;
        }
        self.trace(plan, ray_param, request.source_depth, target - reached)
    }

    fn ray_parameter_roots(&self, plan: &PhasePlan, source_depth: f64, target: f64) -> Vec<f64> {
        let wave = plan.first_wave();
        let max_ray_param = (self.model.radius() - source_depth)
            / self.model.evaluate_below(source_depth, wave);
        let tolerance = self.config.distance_tolerance_deg.to_radians();
        let misfit = |ray_param: f64| {
            self.trace(plan, ray_param, source_depth, 0.0)
                .and_then(|path| path.last().map(|sample| sample.distance - target))
        };

        let samples = self.config.ray_parameter_samples;
        let grid: Vec<f64> = (0..samples)
            .map(|index| max_ray_param * index as f64 / samples as f64)
            .collect();
        let values: Vec<Option<f64>> = grid.iter().map(|&ray_param| misfit(ray_param)).collect();

        let mut roots = Vec::new();
        for index in 0..samples.saturating_sub(1) {
            let (Some(left), Some(right)) = (values[index], values[index + 1]) else {
                continue;
            };
            if left == 0.0 {
                roots.push(grid[index]);
                continue;
            }
            if left * right >= 0.0 {
                continue;
            }

            let (mut low, mut high, mut low_value) = (grid[index], grid[index + 1], left);
            for _ in 0..BISECTION_ITERATIONS {
                let middle = 0.5 * (low + high);
                let Some(value) = misfit(middle) else {
                    break;
                };
                if value * low_value <= 0.0 {
                    high = middle;
                } else {
                    low = middle;
                    low_value = value;
                }
            }

            let root = 0.5 * (low + high);
            match misfit(root) {
                Some(value) if value.abs() < tolerance => roots.push(root),
                _ => debug!(
                    phase = plan.name(),
                    ray_param = root,
                    "discarding bracket across a distance jump"
                ),
            }
        }
        roots
    }
}

impl RayTracer for LayeredRayTracer<'_> {
    fn arrivals(&self, request: &ArrivalRequest) -> ComputeResult<Vec<Arrival>> {
        self.validate_request(request)?;
        let plan = PhasePlan::parse(&request.phase)?;
        let target = folded_distance(request.distance).to_radians();

        let paths: Vec<Vec<RaySample>> = match plan.diffracted_wave() {
            Some(wave) => self
                .diffracted_arrival(&plan, wave, request, target)
                .into_iter()
                .collect(),
            None => {
                let mut targets = vec![target];
                if PI2 - target != target {
                    targets.push(PI2 - target);
                }
                targets
                    .into_iter()
                    .flat_map(|goal| self.ray_parameter_roots(&plan, request.source_depth, goal))
                    .filter_map(|ray_param| {
                        self.trace(&plan, ray_param, request.source_depth, 0.0)
                    })
                    .collect()
            }
        };

        let mut arrivals: Vec<Arrival> = paths
            .into_iter()
            .filter_map(|path| {
                let last = *path.last()?;
                Some(Arrival {
                    phase: plan.name().to_string(),
                    source_depth: request.source_depth,
                    distance: request.distance,
                    ray_param: last.ray_param,
                    time: last.time,
                    path,
                })
            })
            .collect();
        arrivals.sort_by(|lhs, rhs| lhs.time.total_cmp(&rhs.time));

        for arrival in &arrivals {
            debug!(
                phase = arrival.phase.as_str(),
                ray_param = arrival.ray_param,
                time = arrival.time,
                samples = arrival.path.len(),
                "traced arrival"
            );
        }
        info!(
            phase = plan.name(),
            source_depth = request.source_depth,
            distance = request.distance,
            arrivals = arrivals.len(),
            "arrival search finished"
        );
        Ok(arrivals)
    }
}

fn leg_totals(points: &[DescentPoint]) -> (f64, f64) {
    points
        .last()
        .map(|point| (point.distance, point.time))
        .unwrap_or((0.0, 0.0))
}

/// Epicentral distance folded into [0, 180] degrees.
fn folded_distance(distance: f64) -> f64 {
    let wrapped = distance.rem_euclid(360.0);
    if wrapped > 180.0 {
        360.0 - wrapped
    } else {
        wrapped
    }
}
