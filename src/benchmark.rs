// src/benchmark.rs
//! Benchmarking engine.
//!
//! Serializes a transaction set once, commits to it, runs every compression
//! runner over the same bytes in a fixed order and normalizes the results.

use tracing::debug;

use crate::commitment::merkle::{compute_root, prefixed};
use crate::compression::{default_runners, CompressionInput, CompressionRunner, RunnerOutput};
use crate::config::{CommitmentScheme, PipelineConfig};
use crate::error::BenchmarkError;
use crate::types::{canonical_bytes, BenchmarkReport, CompressionMethodResult, TransactionSet};

pub struct BenchmarkEngine {
    runners: Vec<Box<dyn CompressionRunner>>,
    scheme: CommitmentScheme,
    efficiency_scale: f64,
}

impl BenchmarkEngine {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_runners(default_runners(config), config.commitment_scheme, config.efficiency_scale)
    }

    pub fn with_runners(
        runners: Vec<Box<dyn CompressionRunner>>,
        scheme: CommitmentScheme,
        efficiency_scale: f64,
    ) -> Self {
        Self { runners, scheme, efficiency_scale }
    }

    pub fn runner_count(&self) -> usize {
        self.runners.len()
    }

    pub fn benchmark(&self, set: &TransactionSet) -> Result<BenchmarkReport, BenchmarkError> {
        self.benchmark_with_progress(set, |_, _, _| {})
    }

    /// Like [`benchmark`](Self::benchmark), calling `on_method(done, total, method)`
    /// after each runner finishes.
    pub fn benchmark_with_progress<F>(
        &self,
        set: &TransactionSet,
        mut on_method: F,
    ) -> Result<BenchmarkReport, BenchmarkError>
    where
        F: FnMut(usize, usize, &str),
    {
        if set.is_empty() {
            return Err(BenchmarkError::NoInputData);
        }

        let bytes = canonical_bytes(&set.transactions).map_err(|e| BenchmarkError::Compression {
            method: "serialization".to_string(),
            reason: e.to_string(),
        })?;
        let original_size = bytes.len();
        let merkle_root = prefixed(&compute_root(&set.transactions, self.scheme));

        let input = CompressionInput { bytes: &bytes, transaction_count: set.len() };
        let total = self.runners.len();
        let mut methods = Vec::with_capacity(total);
        for (index, runner) in self.runners.iter().enumerate() {
            let output = runner.run(&input)?;
            debug!(
                target: "proofpack::benchmark",
                method = %output.method,
                compressed_size = output.compressed_size,
                time_ms = output.time_ms,
                "runner finished"
            );
            methods.push(measure(output, original_size, self.efficiency_scale));
            on_method(index + 1, total, runner.method());
        }

        Ok(BenchmarkReport {
            original_size,
            methods,
            transaction_count: set.len(),
            is_real_data: set.is_real_data,
            merkle_root,
            file_name: set.file_name.clone(),
        })
    }
}

/// Derives ratio, percentage and efficiency for one runner output.
pub fn measure(output: RunnerOutput, original_size: usize, efficiency_scale: f64) -> CompressionMethodResult {
    let space_saved = original_size as i64 - output.compressed_size as i64;
    let (compression_ratio, saved_fraction) = if original_size == 0 {
        (0.0, 0.0)
    } else {
        (
            output.compressed_size as f64 / original_size as f64,
            space_saved as f64 / original_size as f64,
        )
    };

    CompressionMethodResult {
        method: output.method,
        description: output.description,
        technique: output.technique,
        original_size,
        compressed_size: output.compressed_size,
        space_saved,
        compression_ratio,
        compression_percentage: fixed((1.0 - compression_ratio) * 100.0, 1),
        time_ms: output.time_ms,
        efficiency: fixed(saved_fraction / efficiency_scale, 2),
        is_estimate: output.is_estimate,
    }
}

/// The result with the highest compression percentage; ties go to the
/// earliest in evaluation order.
pub fn select_best(results: &[CompressionMethodResult]) -> Option<&CompressionMethodResult> {
    results.iter().fold(None, |best, current| match best {
        Some(best) if current.percentage_value() <= best.percentage_value() => Some(best),
        _ => Some(current),
    })
}

/// Fixed-point rendering without a negative zero.
fn fixed(value: f64, decimals: usize) -> String {
    let rendered = format!("{value:.decimals$}");
    match rendered.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => rendered,
    }
}
