//! Entry point for the `fuelcost` command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;
use eyre::WrapErr;
use fuelcost_cli::CliError;

fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    match fuelcost_cli::run() {
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        outcome => outcome.wrap_err("fuelcost command failed"),
    }
}
