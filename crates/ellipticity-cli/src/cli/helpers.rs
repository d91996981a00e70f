use super::CliError;
use anyhow::Context;
use ellipticity_core::common::{EllipticityConfig, ModelSource, load_config};
use ellipticity_core::domain::{Arrival, ArrivalRequest, EllipError};
use ellipticity_core::model::VelocityModel;
use ellipticity_core::modules::ArrivalCorrection;
use ellipticity_core::modules::serialization::{render_coefficient_table, render_correction_table};
use ellipticity_core::raytrace::{LayeredRayTracer, RayTracer};
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

pub(super) fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OutputKind {
    Corrections,
    Coefficients,
}

/// Configuration and the model it was resolved against.
pub(super) struct Session {
    pub(super) config: EllipticityConfig,
    model: Cow<'static, VelocityModel>,
}

impl Session {
    pub(super) fn model(&self) -> &VelocityModel {
        &self.model
    }
}

pub(super) fn load_session(model: &str, config_path: Option<&Path>) -> Result<Session, CliError> {
    let config = match config_path {
        Some(path) => load_config(path)
            .map_err(|error| CliError::Compute(EllipError::from(error)))?,
        None => EllipticityConfig::default(),
    };
    let model = ModelSource::from_argument(model)
        .resolve(&config)
        .map_err(CliError::Compute)?;
    info!(model = model.name(), layers = model.layers().len(), "model ready");
    Ok(Session { config, model })
}

pub(super) fn parse_phase_list(phases: &str) -> Result<Vec<String>, CliError> {
    let parsed: Vec<String> = phases
        .split(',')
        .map(str::trim)
        .filter(|phase| !phase.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        return Err(CliError::Usage(
            "--phases needs at least one phase name".to_string(),
        ));
    }
    Ok(parsed)
}

/// Traces every phase; fails only when none of them arrives.
pub(super) fn trace_requested_arrivals(
    session: &Session,
    phases: &[String],
    source_depth: f64,
    distance: f64,
) -> Result<Vec<Arrival>, CliError> {
    let tracer = LayeredRayTracer::new(session.model(), session.config);
    let mut arrivals = Vec::new();
    for phase in phases {
        let found = tracer
            .arrivals(&ArrivalRequest::new(phase.as_str(), source_depth, distance))
            .map_err(CliError::Compute)?;
        if found.is_empty() {
            warn!(phase = phase.as_str(), distance, source_depth, "phase does not arrive");
        }
        arrivals.extend(found);
    }

    if arrivals.is_empty() {
        return Err(CliError::Compute(EllipError::computation(
            "COMPUTE.NO_ARRIVALS",
            format!(
                "no arrivals for {} at {} degrees from a {} km source",
                phases.join(","),
                distance,
                source_depth
            ),
        )));
    }
    Ok(arrivals)
}

pub(super) fn emit_rows(
    rows: &[ArrivalCorrection],
    json: bool,
    kind: OutputKind,
) -> Result<(), CliError> {
    let rendered = if json {
        let mut document =
            serde_json::to_string_pretty(rows).context("failed to serialize corrections")?;
        document.push('\n');
        document
    } else {
        match kind {
            OutputKind::Corrections => render_correction_table(rows),
            OutputKind::Coefficients => render_coefficient_table(rows),
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_session, parse_phase_list};
    use crate::cli::CliError;
    use ellipticity_core::domain::EllipErrorCategory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn phase_lists_ignore_blanks_and_whitespace() {
        let phases = parse_phase_list(" P, PcP ,,PKiKP").expect("phase list should parse");
        assert_eq!(phases, ["P", "PcP", "PKiKP"]);
        assert!(matches!(parse_phase_list(" , "), Err(CliError::Usage(_))));
    }

    #[test]
    fn sessions_report_configuration_failures_by_category() {
        let temp = TempDir::new().expect("tempdir should be created");
        let config_path = temp.path().join("config.json");
        fs::write(&config_path, "{ not json").expect("config should be written");

        let Err(CliError::Compute(error)) = load_session("prem", Some(&config_path)) else {
            panic!("malformed configuration should fail");
        };
        assert_eq!(error.category(), EllipErrorCategory::InputValidationError);

        let missing = temp.path().join("missing.json");
        let Err(CliError::Compute(error)) = load_session("prem", Some(&missing)) else {
            panic!("missing configuration should fail");
        };
        assert_eq!(error.category(), EllipErrorCategory::IoSystemError);
    }
}
