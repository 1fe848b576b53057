//! Command-line interface for the fuel-cost estimation engine.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod estimate;
mod seed;

pub use error::CliError;

use estimate::EstimateArgs;
use seed::SeedArgs;

pub(crate) const ARG_ESTIMATE_REQUEST: &str = "request";
pub(crate) const ARG_REFERENCE_DB: &str = "reference-db";
pub(crate) const ARG_AS_OF: &str = "as-of";
pub(crate) const ARG_SEED_OUTPUT: &str = "output";
pub(crate) const ARG_SEED_DATASET: &str = "dataset";
pub(crate) const ENV_ESTIMATE_REQUEST: &str = "FUELCOST_CMDS_ESTIMATE_REQUEST_PATH";
pub(crate) const ENV_SEED_OUTPUT: &str = "FUELCOST_CMDS_SEED_OUTPUT";
pub(crate) const DEFAULT_REFERENCE_DB: &str = "fuelcost.db";

/// Run the fuel-cost CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Estimate(args) => estimate::run_estimate(args),
        Command::Seed(args) => seed::run_seed(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fuelcost",
    about = "Estimate and rank fuel costs for cargo transport",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate fuel costs for a JSON request against a reference database.
    Estimate(EstimateArgs),
    /// Write reference data into a SQLite database.
    Seed(SeedArgs),
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match fuelcost_data::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
