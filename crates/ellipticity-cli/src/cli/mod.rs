mod commands;
mod helpers;

use clap::Parser;
use ellipticity_core::domain::EllipError;

pub fn run_from_env() -> i32 {
    helpers::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    run(args).unwrap_or_else(|error| {
        let diagnostic = error.as_ellip_error();
        tracing::debug!(category = diagnostic.category().label(), "command failed");
        eprintln!("{}", diagnostic.diagnostic_line());
        eprintln!("{}", diagnostic.exit_line());
        diagnostic.exit_code()
    })
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("ellipticity".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "ellipticity",
    version,
    about = "Ellipticity corrections for seismic travel times"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Trace the requested phases and print travel-time corrections
    Correction(commands::RequestArgs),
    /// Trace the requested phases and print the ellipticity coefficients
    Coefficients(commands::RequestArgs),
    /// Correct arrivals read from a JSON ray-path file
    Paths(commands::PathsArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Correction(args) => commands::run_correction_command(args),
        CliCommand::Coefficients(args) => commands::run_coefficients_command(args),
        CliCommand::Paths(args) => commands::run_paths_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(EllipError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_ellip_error(&self) -> EllipError {
        match self {
            Self::Usage(message) => EllipError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => EllipError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
