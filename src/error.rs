// ./src/error.rs
//! Error types for the ProofPack pipeline
//!
//! Each stage owns a small error enum; they fold into the crate-wide
//! [`Error`] so callers can match on the stage that failed or just
//! propagate with `?`.

use thiserror::Error;

use crate::pipeline::Stage;

/// The main error type for the ProofPack library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Ingestion errors
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Benchmarking errors
    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),

    /// Proof stage errors
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// Orchestration errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the caller can fix the input and retry.
    ///
    /// Misuse errors (`NoInputData`, `StageOutOfOrder`) are not recoverable
    /// from a correctly driven frontend; they indicate a bug in the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Ingest(IngestError::UnsupportedFormat(_))
                | Error::Proof(ProofError::InvalidConstraint { .. })
                | Error::Config(_)
        )
    }
}

/// Errors raised while turning uploaded JSON into a transaction set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The JSON value is not one of the accepted shapes
    #[error("Unsupported JSON format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised by the benchmarking engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BenchmarkError {
    /// The transaction set is empty
    #[error("No transaction data to analyze")]
    NoInputData,

    /// A compression runner failed to produce output
    #[error("Compression runner `{method}` failed: {reason}")]
    Compression { method: String, reason: String },
}

/// Errors raised by the proof stage simulator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProofError {
    /// A declared constraint is malformed
    #[error("Invalid constraint `{field}`: {reason}")]
    InvalidConstraint { field: &'static str, reason: String },
}

/// Errors raised by the pipeline orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineError {
    /// A stage was requested before its predecessor produced output
    #[error("Cannot enter {requested:?} stage: missing {missing} output")]
    StageOutOfOrder { requested: Stage, missing: &'static str },

    /// The background worker running a stage panicked or was aborted
    #[error("Stage task failed: {0}")]
    TaskFailed(String),
}

/// Errors raised while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    /// The config file is not valid TOML for `PipelineConfig`
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
