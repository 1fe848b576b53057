//! Error types emitted by the fuel-cost CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fuelcost_core::{EstimateError, EstimateRequestValidationError, SqliteReferenceStoreError};
use fuelcost_data::{DatasetError, PersistReferenceError};
use thiserror::Error;

/// Errors emitted by the fuel-cost CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the CLI flag.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Name of the CLI flag.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Name of the CLI flag.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Name of the CLI flag.
        field: &'static str,
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// `--as-of` is not a `YYYY-MM-DD` date.
    #[error("invalid --as-of date {value:?}: {source}")]
    InvalidAsOf {
        /// Rejected input.
        value: String,
        /// Underlying error.
        #[source]
        source: chrono::ParseError,
    },
    /// Opening the estimate request file failed.
    #[error("failed to open estimate request at {path:?}: {source}")]
    OpenEstimateRequest {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Estimate request JSON could not be decoded.
    #[error("failed to parse estimate request JSON at {path:?}: {source}")]
    ParseEstimateRequest {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The estimate request payload failed validation.
    #[error("estimate request in {path:?} failed validation: {source}")]
    InvalidEstimateRequest {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: EstimateRequestValidationError,
    },
    /// Opening the reference database failed.
    #[error(transparent)]
    OpenReferenceStore(#[from] SqliteReferenceStoreError),
    /// The estimator rejected the request.
    #[error("estimation for {path:?} failed: {source}")]
    Estimate {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: EstimateError,
    },
    /// Loading the reference dataset failed.
    #[error("failed to load reference dataset: {0}")]
    Dataset(#[from] DatasetError),
    /// Persisting reference data to SQLite failed.
    #[error("failed to seed reference database {path:?}: {source}")]
    Seed {
        /// Path involved in the failure.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: PersistReferenceError,
    },
    /// Serialising command output failed.
    #[error("failed to serialise command output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
