use super::CliError;
use super::helpers::*;
use ellipticity_core::domain::EllipError;
use ellipticity_core::modules::{correct_arrivals, load_ray_paths, write_ray_paths};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct ModelFlags {
    /// Bundled model name (prem, ak135) or path to an .nd model file
    #[arg(long, default_value = "prem")]
    model: String,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ReceiverFlags {
    /// Azimuth from the source to the receiver in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    azimuth: f64,

    /// Source latitude in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    latitude: f64,
}

#[derive(clap::Args)]
pub(super) struct RequestArgs {
    /// Source depth in km
    #[arg(long)]
    depth: f64,

    /// Epicentral distance in degrees
    #[arg(long)]
    distance: f64,

    /// Comma-separated phase names
    #[arg(long, default_value = "P")]
    phases: String,

    /// Write the traced ray paths to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    #[command(flatten)]
    receiver: ReceiverFlags,

    #[command(flatten)]
    model: ModelFlags,
}

#[derive(clap::Args)]
pub(super) struct PathsArgs {
    /// JSON ray-path file (one arrival or an array)
    #[arg(value_name = "file")]
    file: PathBuf,

    /// Print coefficients instead of corrections
    #[arg(long)]
    coefficients: bool,

    #[command(flatten)]
    receiver: ReceiverFlags,

    #[command(flatten)]
    model: ModelFlags,
}

pub(super) fn run_correction_command(args: RequestArgs) -> Result<i32, CliError> {
    run_request(args, OutputKind::Corrections)
}

pub(super) fn run_coefficients_command(args: RequestArgs) -> Result<i32, CliError> {
    run_request(args, OutputKind::Coefficients)
}

fn run_request(args: RequestArgs, kind: OutputKind) -> Result<i32, CliError> {
    let phases = parse_phase_list(&args.phases)?;
    let session = load_session(&args.model.model, args.model.config.as_deref())?;
    let arrivals = trace_requested_arrivals(&session, &phases, args.depth, args.distance)?;

    if let Some(export) = &args.export {
        write_ray_paths(export, &arrivals).map_err(CliError::Compute)?;
    }

    let rows = correct_arrivals(
        &arrivals,
        session.model(),
        args.receiver.azimuth,
        args.receiver.latitude,
    );
    emit_rows(&rows, args.model.json, kind)?;
    Ok(0)
}

pub(super) fn run_paths_command(args: PathsArgs) -> Result<i32, CliError> {
    let session = load_session(&args.model.model, args.model.config.as_deref())?;
    let arrivals = load_ray_paths(&args.file, session.model()).map_err(CliError::Compute)?;
    if arrivals.is_empty() {
        return Err(CliError::Compute(EllipError::computation(
            "COMPUTE.NO_ARRIVALS",
            format!("ray-path file '{}' holds no usable arrivals", args.file.display()),
        )));
    }

    let rows = correct_arrivals(
        &arrivals,
        session.model(),
        args.receiver.azimuth,
        args.receiver.latitude,
    );
    let kind = if args.coefficients {
        OutputKind::Coefficients
    } else {
        OutputKind::Corrections
    };
    emit_rows(&rows, args.model.json, kind)?;
    Ok(0)
}
