//! Spherically symmetric layered reference models.
//!
//! Every property varies linearly with depth inside a layer; a discontinuity is
//! a shared boundary where the P or S velocity of the adjacent layers differs.

mod figure;
mod parser;

pub use figure::FigureProfile;
pub use parser::{NamedBoundaries, NdParseError, parse_nd_source, read_nd_file};

use crate::common::constants::{DEPTH_TOLERANCE_KM, EARTH_LOD};
use crate::domain::{EllipError, ModelResult, WaveType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub top_depth: f64,
    pub bot_depth: f64,
    pub top_p_velocity: f64,
    pub bot_p_velocity: f64,
    pub top_s_velocity: f64,
    pub bot_s_velocity: f64,
    pub top_density: f64,
    pub bot_density: f64,
}

impl Layer {
    pub fn thickness(&self) -> f64 {
        self.bot_depth - self.top_depth
    }

    pub fn top_velocity(&self, wave: WaveType) -> f64 {
        match wave {
            WaveType::P => self.top_p_velocity,
            WaveType::S => self.top_s_velocity,
        }
    }

    pub fn bot_velocity(&self, wave: WaveType) -> f64 {
        match wave {
            WaveType::P => self.bot_p_velocity,
            WaveType::S => self.bot_s_velocity,
        }
    }

    pub fn velocity_at(&self, depth: f64, wave: WaveType) -> f64 {
        let top = self.top_velocity(wave);
        top + self.velocity_gradient(wave) * (depth - self.top_depth)
    }

    /// Depth derivative of the velocity, constant inside the layer.
    pub fn velocity_gradient(&self, wave: WaveType) -> f64 {
        (self.bot_velocity(wave) - self.top_velocity(wave)) / self.thickness()
    }

    pub fn mean_density(&self) -> f64 {
        0.5 * (self.top_density + self.bot_density)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VelocityModel {
    name: String,
    radius: f64,
    layers: Vec<Layer>,
    cmb_depth: f64,
    iocb_depth: f64,
    discontinuities: Vec<f64>,
    figure: FigureProfile,
}

impl VelocityModel {
    pub fn new(
        name: impl Into<String>,
        layers: Vec<Layer>,
        boundaries: NamedBoundaries,
    ) -> ModelResult<Self> {
        Self::with_length_of_day(name, layers, boundaries, EARTH_LOD)
    }

    pub fn with_length_of_day(
        name: impl Into<String>,
        layers: Vec<Layer>,
        boundaries: NamedBoundaries,
        length_of_day: f64,
    ) -> ModelResult<Self> {
        let name = name.into();
        validate_layers(&name, &layers)?;

        let radius = layers[layers.len() - 1].bot_depth;
        let discontinuities = discontinuity_depths(&layers);
        let cmb_depth = boundaries
            .cmb
            .or_else(|| liquid_top_depth(&layers))
            .unwrap_or(radius);
        let iocb_depth = boundaries
            .icb
            .or_else(|| solid_top_below(&layers, cmb_depth))
            .unwrap_or(radius);
        if !(cmb_depth <= iocb_depth && iocb_depth <= radius) {
            return Err(EllipError::input_validation(
                "INPUT.MODEL_BOUNDARIES",
                format!(
                    "model '{}' has core boundaries out of order: cmb={} km, icb={} km",
                    name, cmb_depth, iocb_depth
                ),
            ));
        }

        let figure = FigureProfile::from_layers(&layers, radius, length_of_day)?;
        tracing::debug!(
            model = %name,
            layers = layers.len(),
            cmb_depth,
            iocb_depth,
            surface_flattening = figure.surface_epsilon(),
            "built velocity model"
        );

        Ok(Self {
            name,
            radius,
            layers,
            cmb_depth,
            iocb_depth,
            discontinuities,
            figure,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Planetary radius in km.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn cmb_depth(&self) -> f64 {
        self.cmb_depth
    }

    pub fn iocb_depth(&self) -> f64 {
        self.iocb_depth
    }

    pub fn figure(&self) -> &FigureProfile {
        &self.figure
    }

    /// Surface and every depth where the P or S velocity jumps; the centre is
    /// not included.
    pub fn discontinuity_depths(&self) -> &[f64] {
        &self.discontinuities
    }

    pub fn is_discontinuity(&self, depth: f64) -> bool {
        self.discontinuities
            .iter()
            .any(|candidate| (candidate - depth).abs() <= DEPTH_TOLERANCE_KM)
    }

    /// Index of the layer with `top <= depth < bot`; the centre maps to the
    /// deepest layer.
    pub fn layer_number_below(&self, depth: f64) -> usize {
        let index = self.layers.partition_point(|layer| layer.bot_depth <= depth);
        index.min(self.layers.len() - 1)
    }

    /// Index of the layer with `top < depth <= bot`; the surface maps to the
    /// shallowest layer.
    pub fn layer_number_above(&self, depth: f64) -> usize {
        let index = self.layers.partition_point(|layer| layer.bot_depth < depth);
        index.min(self.layers.len() - 1)
    }

    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    pub fn evaluate_below(&self, depth: f64, wave: WaveType) -> f64 {
        self.layers[self.layer_number_below(depth)].velocity_at(depth, wave)
    }

    pub fn evaluate_above(&self, depth: f64, wave: WaveType) -> f64 {
        self.layers[self.layer_number_above(depth)].velocity_at(depth, wave)
    }

    /// Ellipticity of figure at `depth`; depths above the surface read the
    /// surface value.
    pub fn epsilon(&self, depth: f64) -> f64 {
        let depth = depth.max(0.0);
        let index = if depth == 0.0 {
            self.layer_number_below(0.0)
        } else {
            self.layer_number_above(depth)
        };
        self.figure.epsilon_in_layer(index, &self.layers[index], depth)
    }

    /// Ratio `r / v` (s) on the requested side of `depth`.
    pub fn eta(&self, depth: f64, wave: WaveType, side: Side) -> f64 {
        let velocity = match side {
            Side::Above => self.evaluate_above(depth, wave),
            Side::Below => self.evaluate_below(depth, wave),
        };
        (self.radius - depth) / velocity
    }

    /// Structure terms at `depth` taken from the layer on `side`.
    pub fn kernel_terms(&self, depth: f64, wave: WaveType, side: Side) -> KernelTerms {
        let index = match side {
            Side::Above => self.layer_number_above(depth),
            Side::Below => self.layer_number_below(depth),
        };
        let layer = &self.layers[index];
        let velocity = layer.velocity_at(depth, wave);
        let radial_gradient = -layer.velocity_gradient(wave);
        let eta = (self.radius - depth) / velocity;
        let eta_gradient = eta * radial_gradient;
        KernelTerms {
            epsilon: self.epsilon(depth),
            eta,
            radial_gradient,
            structure: eta_gradient / (1.0 - eta_gradient),
        }
    }

    /// Structure terms at `r / a = radius_fraction`, from the layer below.
    pub fn kernel(&self, radius_fraction: f64, wave: WaveType) -> KernelTerms {
        let depth = (1.0 - radius_fraction) * self.radius;
        self.kernel_terms(depth, wave, Side::Below)
    }
}

/// Local structure quantities entering the ellipticity integrals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelTerms {
    pub epsilon: f64,
    /// `r / v` in s.
    pub eta: f64,
    /// `dv/dr` in s^-1.
    pub radial_gradient: f64,
    /// `η dv/dr / (1 - η dv/dr)`.
    pub structure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

fn validate_layers(name: &str, layers: &[Layer]) -> ModelResult<()> {
    let Some(first) = layers.first() else {
        return Err(EllipError::input_validation(
            "INPUT.MODEL_EMPTY",
            format!("model '{}' has no layers", name),
        ));
    };

    if first.top_depth != 0.0 {
        return Err(EllipError::input_validation(
            "INPUT.MODEL_SURFACE",
            format!(
                "model '{}' must start at the surface, first layer starts at {} km",
                name, first.top_depth
            ),
        ));
    }

    for (index, layer) in layers.iter().enumerate() {
        if !(layer.thickness() > 0.0) {
            return Err(EllipError::input_validation(
                "INPUT.MODEL_LAYER",
                format!(
                    "model '{}' layer {} has non-positive thickness ({} to {} km)",
                    name, index, layer.top_depth, layer.bot_depth
                ),
            ));
        }

        let values = [
            layer.top_p_velocity,
            layer.bot_p_velocity,
            layer.top_s_velocity,
            layer.bot_s_velocity,
            layer.top_density,
            layer.bot_density,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(EllipError::input_validation(
                "INPUT.MODEL_LAYER",
                format!("model '{}' layer {} has non-finite properties", name, index),
            ));
        }

        if layer.top_p_velocity <= 0.0
            || layer.bot_p_velocity <= 0.0
            || layer.top_density <= 0.0
            || layer.bot_density <= 0.0
            || layer.top_s_velocity < 0.0
            || layer.bot_s_velocity < 0.0
        {
            return Err(EllipError::input_validation(
                "INPUT.MODEL_LAYER",
                format!(
                    "model '{}' layer {} at {} km needs positive P velocity and density",
                    name, index, layer.top_depth
                ),
            ));
        }
    }

    for (index, pair) in layers.windows(2).enumerate() {
        if pair[0].bot_depth != pair[1].top_depth {
            return Err(EllipError::input_validation(
                "INPUT.MODEL_GAP",
                format!(
                    "model '{}' layers {} and {} are not contiguous ({} km vs {} km)",
                    name,
                    index,
                    index + 1,
                    pair[0].bot_depth,
                    pair[1].top_depth
                ),
            ));
        }
    }

    Ok(())
}

fn discontinuity_depths(layers: &[Layer]) -> Vec<f64> {
    let mut depths = vec![layers[0].top_depth];
    depths.extend(
        layers
            .windows(2)
            .filter(|pair| {
                pair[0].bot_p_velocity != pair[1].top_p_velocity
                    || pair[0].bot_s_velocity != pair[1].top_s_velocity
            })
            .map(|pair| pair[0].bot_depth),
    );
    depths
}

fn liquid_top_depth(layers: &[Layer]) -> Option<f64> {
    layers
        .windows(2)
        .find(|pair| pair[0].bot_s_velocity > 0.0 && pair[1].top_s_velocity == 0.0)
        .map(|pair| pair[0].bot_depth)
}

fn solid_top_below(layers: &[Layer], depth: f64) -> Option<f64> {
    layers
        .windows(2)
        .filter(|pair| pair[0].bot_depth > depth)
        .find(|pair| pair[0].bot_s_velocity == 0.0 && pair[1].top_s_velocity > 0.0)
        .map(|pair| pair[0].bot_depth)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Layer, NamedBoundaries, Side, VelocityModel};
    use crate::domain::{EllipErrorCategory, WaveType};

    pub(crate) fn layer(top: f64, bot: f64, vp: (f64, f64), vs: (f64, f64), rho: (f64, f64)) -> Layer {
        Layer {
            top_depth: top,
            bot_depth: bot,
            top_p_velocity: vp.0,
            bot_p_velocity: vp.1,
            top_s_velocity: vs.0,
            bot_s_velocity: vs.1,
            top_density: rho.0,
            bot_density: rho.1,
        }
    }

    /// Small three-shell planet: solid mantle, liquid outer core, solid inner core.
    pub(crate) fn toy_model() -> VelocityModel {
        VelocityModel::new(
            "toy",
            vec![
                layer(0.0, 1000.0, (6.0, 8.0), (3.5, 4.5), (3.0, 4.0)),
                layer(1000.0, 2000.0, (8.0, 10.0), (4.5, 5.5), (4.0, 5.0)),
                layer(2000.0, 3000.0, (9.0, 10.0), (0.0, 0.0), (10.0, 11.0)),
                layer(3000.0, 3500.0, (11.0, 11.2), (3.5, 3.6), (12.0, 12.5)),
            ],
            NamedBoundaries::default(),
        )
        .expect("toy model should be valid")
    }

    #[test]
    fn core_boundaries_are_inferred_from_shear_velocity() {
        let model = toy_model();
        assert_eq!(model.radius(), 3500.0);
        assert_eq!(model.cmb_depth(), 2000.0);
        assert_eq!(model.iocb_depth(), 3000.0);
        assert_eq!(model.discontinuity_depths(), &[0.0, 2000.0, 3000.0]);
        assert!(model.is_discontinuity(2000.0));
        assert!(!model.is_discontinuity(1000.0));
    }

    #[test]
    fn layer_lookup_distinguishes_sides_of_a_boundary() {
        let model = toy_model();
        assert_eq!(model.layer_number_below(0.0), 0);
        assert_eq!(model.layer_number_above(0.0), 0);
        assert_eq!(model.layer_number_below(2000.0), 2);
        assert_eq!(model.layer_number_above(2000.0), 1);
        assert_eq!(model.layer_number_below(3500.0), 3);

        assert_eq!(model.evaluate_above(2000.0, WaveType::P), 10.0);
        assert_eq!(model.evaluate_below(2000.0, WaveType::P), 9.0);
        assert_eq!(model.evaluate_below(500.0, WaveType::S), 4.0);
    }

    #[test]
    fn radial_gradient_has_opposite_sign_to_depth_gradient() {
        let model = toy_model();
        let below = model.kernel_terms(100.0, WaveType::P, Side::Below);
        assert!((below.radial_gradient + 2.0e-3).abs() < 1.0e-15);
        let above = model.kernel_terms(2000.0, WaveType::P, Side::Above);
        assert!((above.radial_gradient + 2.0e-3).abs() < 1.0e-15);
    }

    #[test]
    fn eta_uses_requested_side() {
        let model = toy_model();
        let above = model.eta(2000.0, WaveType::P, Side::Above);
        let below = model.eta(2000.0, WaveType::P, Side::Below);
        assert!((above - 150.0).abs() < 1.0e-12);
        assert!((below - 1500.0 / 9.0).abs() < 1.0e-12);
    }

    #[test]
    fn kernel_combines_figure_and_velocity_structure() {
        let model = toy_model();
        let terms = model.kernel(1.0, WaveType::P);
        assert_eq!(terms.epsilon, model.figure().surface_epsilon());
        assert!((terms.eta - 3500.0 / 6.0).abs() < 1.0e-12);
        let product = terms.eta * terms.radial_gradient;
        assert!((terms.structure - product / (1.0 - product)).abs() < 1.0e-15);

        let above = model.kernel_terms(2000.0, WaveType::P, Side::Above);
        assert!((above.eta - 150.0).abs() < 1.0e-12);
        assert_eq!(above.radial_gradient, -2.0e-3);
    }

    #[test]
    fn invalid_layer_stacks_are_rejected() {
        let error = VelocityModel::new("empty", Vec::new(), NamedBoundaries::default())
            .expect_err("empty model should fail");
        assert_eq!(error.category(), EllipErrorCategory::InputValidationError);
        assert_eq!(error.placeholder(), "INPUT.MODEL_EMPTY");

        let gap = VelocityModel::new(
            "gap",
            vec![
                layer(0.0, 10.0, (5.0, 5.0), (3.0, 3.0), (2.0, 2.0)),
                layer(20.0, 30.0, (5.0, 5.0), (3.0, 3.0), (2.0, 2.0)),
            ],
            NamedBoundaries::default(),
        )
        .expect_err("gap should fail");
        assert_eq!(gap.placeholder(), "INPUT.MODEL_GAP");

        let liquid = VelocityModel::new(
            "liquid",
            vec![layer(0.0, 10.0, (0.0, 5.0), (0.0, 0.0), (2.0, 2.0))],
            NamedBoundaries::default(),
        )
        .expect_err("zero P velocity should fail");
        assert_eq!(liquid.placeholder(), "INPUT.MODEL_LAYER");
    }

    #[test]
    fn named_boundaries_override_inference() {
        let base = toy_model();
        let model = VelocityModel::new(
            "named",
            base.layers().to_vec(),
            NamedBoundaries {
                moho: Some(1000.0),
                cmb: Some(2000.0),
                icb: Some(3000.0),
            },
        )
        .expect("named model should be valid");
        assert_eq!(model.cmb_depth(), 2000.0);
        assert_eq!(model.iocb_depth(), 3000.0);
    }
}
