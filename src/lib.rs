// ./src/lib.rs
//! ProofPack: compression benchmarking and commitment pipeline for
//! blockchain-style transaction batches.

pub mod benchmark;
pub mod commitment;
pub mod compression;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod pipeline;
pub mod proof;
pub mod summary;
pub mod types;

pub use benchmark::BenchmarkEngine;
pub use commitment::{compute_root, Bytes32, EMPTY_ROOT};
pub use config::{CommitmentScheme, PipelineConfig};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineEvent, PipelineState, Stage};
pub use proof::{Constraints, ProofArtifact};
pub use summary::PipelineSummary;
pub use types::{BenchmarkReport, CompressionMethodResult, Transaction, TransactionSet};
