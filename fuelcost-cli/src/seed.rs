//! Seed command implementation for the fuel-cost CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use fuelcost_data::{ReferenceDataset, SeedSummary, default_dataset, load_dataset};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_SEED_DATASET, ARG_SEED_OUTPUT, CliError, ENV_SEED_OUTPUT, require_existing, write_json,
};

/// CLI arguments for the `seed` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Validate a reference dataset and write it to a SQLite \
                 database. Without --dataset the bundled reference data is \
                 used. Existing reference rows are replaced.",
    about = "Write reference data into a SQLite database"
)]
#[ortho_config(prefix = "FUELCOST")]
pub(crate) struct SeedArgs {
    /// Destination SQLite database.
    #[arg(long = ARG_SEED_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// JSON reference dataset to load instead of the bundled one.
    #[arg(long = ARG_SEED_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
}

impl SeedArgs {
    pub(crate) fn into_config(self) -> Result<SeedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SeedConfig::try_from(merged)
    }
}

/// Resolved `seed` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SeedConfig {
    /// Destination database.
    pub(crate) output: Utf8PathBuf,
    /// Dataset file, or `None` for the bundled dataset.
    pub(crate) dataset: Option<Utf8PathBuf>,
}

impl SeedConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.dataset {
            Some(path) => require_existing(path, ARG_SEED_DATASET),
            None => Ok(()),
        }
    }

    fn load_dataset(&self) -> Result<ReferenceDataset, CliError> {
        let dataset = match &self.dataset {
            Some(path) => load_dataset(path)?,
            None => default_dataset()?,
        };
        Ok(dataset)
    }
}

impl TryFrom<SeedArgs> for SeedConfig {
    type Error = CliError;

    fn try_from(args: SeedArgs) -> Result<Self, Self::Error> {
        let output = args.output.ok_or(CliError::MissingArgument {
            field: ARG_SEED_OUTPUT,
            env: ENV_SEED_OUTPUT,
        })?;
        Ok(Self {
            output,
            dataset: args.dataset,
        })
    }
}

pub(super) fn run_seed(args: SeedArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_seed_with(args, &mut stdout)
}

pub(super) fn run_seed_with(args: SeedArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let summary = execute_seed(args)?;
    write_json(writer, &summary)
}

fn execute_seed(args: SeedArgs) -> Result<SeedSummary, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let catalog = config.load_dataset()?.into_catalog()?;
    fuelcost_data::persist_reference_data(&config.output, &catalog).map_err(|source| {
        CliError::Seed {
            path: config.output.clone(),
            source,
        }
    })
}
