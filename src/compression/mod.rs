//! Pluggable compression strategies measured by the benchmarking engine.
//!
//! Every runner sees the same serialized bytes and reports a size and an
//! elapsed time. Reported times never fall below the runner's floor, so a
//! sub-millisecond run does not show up as zero.

pub mod deflate;
pub mod hash_tree;
pub mod rle;

use std::time::Instant;

pub use deflate::DeflateRunner;
pub use hash_tree::HashTreeRunner;
pub use rle::RleRunner;

use crate::config::PipelineConfig;
use crate::error::BenchmarkError;

/// What a runner is measured against.
#[derive(Debug, Clone, Copy)]
pub struct CompressionInput<'a> {
    pub bytes: &'a [u8],
    pub transaction_count: usize,
}

/// Raw measurement produced by a single runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOutput {
    pub method: String,
    pub description: String,
    pub technique: String,
    pub compressed_size: usize,
    pub time_ms: u64,
    pub is_estimate: bool,
}

pub trait CompressionRunner: Send + Sync {
    /// Display name, unique within a benchmark.
    fn method(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn technique(&self) -> &'static str;

    /// Minimum reported wall time in milliseconds.
    fn min_time_ms(&self) -> u64;

    /// `true` when the size is modelled rather than produced by encoding.
    fn is_estimate(&self) -> bool {
        false
    }

    fn compressed_size(&self, input: &CompressionInput<'_>) -> Result<usize, BenchmarkError>;

    /// Measures `compressed_size` and wraps it with timing and labels.
    fn run(&self, input: &CompressionInput<'_>) -> Result<RunnerOutput, BenchmarkError> {
        let start = Instant::now();
        let compressed_size = self.compressed_size(input)?;
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(RunnerOutput {
            method: self.method().to_string(),
            description: self.description().to_string(),
            technique: self.technique().to_string(),
            compressed_size,
            time_ms: elapsed.max(self.min_time_ms()),
            is_estimate: self.is_estimate(),
        })
    }
}

/// The reference runners in evaluation order: deflate, hash tree, run-length.
pub fn default_runners(config: &PipelineConfig) -> Vec<Box<dyn CompressionRunner>> {
    vec![
        Box::new(DeflateRunner::new(config.timing_floor_ms.deflate)),
        Box::new(HashTreeRunner::new(
            config.hash_tree.root_bytes,
            config.hash_tree.proof_bytes_per_transaction,
            config.timing_floor_ms.hash_tree,
        )),
        Box::new(RleRunner::new(config.rle.min_run, config.timing_floor_ms.rle)),
    ]
}
