//! Estimate command implementation for the fuel-cost CLI.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use clap::Parser;
use fuelcost_core::store::DATE_FORMAT;
use fuelcost_core::{
    EstimateRequest, EstimateResponse, EstimateRow, Estimator, ExcludedCandidate,
    FuelCostEstimator, SqliteReferenceStore,
};
use fuelcost_data::fs::open_utf8_file;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_AS_OF, ARG_ESTIMATE_REQUEST, ARG_REFERENCE_DB, CliError, DEFAULT_REFERENCE_DB,
    ENV_ESTIMATE_REQUEST, require_existing, write_json,
};

/// CLI arguments for the `estimate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Estimate fuel costs for a JSON-encoded EstimateRequest. \
                 Vehicles, efficiency bands and fuel prices are read from a \
                 SQLite reference database written by `fuelcost seed`.",
    about = "Estimate and rank fuel costs for a request"
)]
#[ortho_config(prefix = "FUELCOST")]
pub(crate) struct EstimateArgs {
    /// Path to a JSON file containing an EstimateRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// SQLite reference database (defaults to `fuelcost.db`).
    #[arg(long = ARG_REFERENCE_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) reference_db: Option<Utf8PathBuf>,
    /// Price date (YYYY-MM-DD) overriding the request's `asOf`.
    #[arg(long = ARG_AS_OF, value_name = "date")]
    #[serde(default)]
    pub(crate) as_of: Option<String>,
}

impl EstimateArgs {
    pub(crate) fn into_config(self) -> Result<EstimateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        EstimateConfig::try_from(merged)
    }
}

/// Resolved `estimate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EstimateConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Path to the SQLite reference database.
    pub(crate) reference_db: Utf8PathBuf,
    /// Price date override.
    pub(crate) as_of: Option<NaiveDate>,
}

impl EstimateConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_ESTIMATE_REQUEST)?;
        require_existing(&self.reference_db, ARG_REFERENCE_DB)?;
        Ok(())
    }
}

impl TryFrom<EstimateArgs> for EstimateConfig {
    type Error = CliError;

    fn try_from(args: EstimateArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_ESTIMATE_REQUEST,
            env: ENV_ESTIMATE_REQUEST,
        })?;
        let reference_db = args
            .reference_db
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_REFERENCE_DB));
        let as_of = args
            .as_of
            .map(|value| {
                NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
                    .map_err(|source| CliError::InvalidAsOf { value, source })
            })
            .transpose()?;
        Ok(Self {
            request_path,
            reference_db,
            as_of,
        })
    }
}

/// JSON document printed by the `estimate` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct EstimateOutput {
    /// Ranked rows, best first.
    pub(crate) estimates: Vec<EstimateRow>,
    /// Candidates dropped from the ranking.
    pub(crate) excluded: Vec<ExcludedCandidate>,
}

impl From<&EstimateResponse> for EstimateOutput {
    fn from(response: &EstimateResponse) -> Self {
        let currency = response
            .price
            .as_ref()
            .map(|point| point.currency.as_str());
        Self {
            estimates: response
                .estimates
                .iter()
                .map(|estimate| EstimateRow::from_estimate(estimate, currency))
                .collect(),
            excluded: response.excluded.clone(),
        }
    }
}

/// Builds an estimator for the current estimate invocation.
pub(super) trait EstimatorBuilder {
    fn build(&self, config: &EstimateConfig) -> Result<Box<dyn Estimator>, CliError>;
}

pub(super) struct DefaultEstimatorBuilder;

impl EstimatorBuilder for DefaultEstimatorBuilder {
    fn build(&self, config: &EstimateConfig) -> Result<Box<dyn Estimator>, CliError> {
        let store = SqliteReferenceStore::open(config.reference_db.as_std_path())?;
        Ok(Box::new(FuelCostEstimator::new(store)))
    }
}

pub(super) fn run_estimate(args: EstimateArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_estimate_with(args, &DefaultEstimatorBuilder, &mut stdout)
}

pub(super) fn run_estimate_with(
    args: EstimateArgs,
    builder: &dyn EstimatorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let output = execute_estimate(args, builder)?;
    write_json(writer, &output)
}

fn execute_estimate(
    args: EstimateArgs,
    builder: &dyn EstimatorBuilder,
) -> Result<EstimateOutput, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let mut request = load_estimate_request(&config.request_path)?;
    if config.as_of.is_some() {
        request.as_of = config.as_of;
    }
    request
        .validate()
        .map_err(|source| CliError::InvalidEstimateRequest {
            path: config.request_path.clone(),
            source,
        })?;
    let estimator = builder.build(&config)?;
    let response = estimator
        .estimate(&request)
        .map_err(|source| CliError::Estimate {
            path: config.request_path.clone(),
            source,
        })?;
    info!(
        "ranked {} vehicles ({} excluded) for {}",
        response.estimates.len(),
        response.excluded.len(),
        config.request_path
    );
    Ok(EstimateOutput::from(&response))
}

/// Loads a JSON-encoded [`EstimateRequest`] from disk.
pub(super) fn load_estimate_request(path: &Utf8Path) -> Result<EstimateRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenEstimateRequest {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        CliError::ParseEstimateRequest {
            path: path.to_path_buf(),
            source,
        }
    })
}
