// src/types/report.rs

use serde::{Deserialize, Serialize};

use crate::benchmark::select_best;

/// Normalized measurement of one compression method over one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionMethodResult {
    pub method: String,
    pub description: String,
    pub technique: String,
    pub original_size: usize,
    pub compressed_size: usize,
    /// `original_size - compressed_size`; negative when the method expands the input.
    pub space_saved: i64,
    /// `compressed_size / original_size`; lower is better.
    pub compression_ratio: f64,
    /// `(1 - compression_ratio) * 100`, one decimal.
    pub compression_percentage: String,
    pub time_ms: u64,
    /// Space saved per original byte divided by the configured scale, two decimals.
    pub efficiency: String,
    /// Set when `compressed_size` is a structural estimate rather than bytes
    /// actually produced by an encoder.
    pub is_estimate: bool,
}

impl CompressionMethodResult {
    /// Numeric reading of `compression_percentage`.
    pub fn percentage_value(&self) -> f64 {
        self.compression_percentage.parse().unwrap_or(f64::NEG_INFINITY)
    }
}

/// Output of the benchmark stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub original_size: usize,
    /// Evaluation order, not rank order.
    pub methods: Vec<CompressionMethodResult>,
    pub transaction_count: usize,
    pub is_real_data: bool,
    /// `0x`-prefixed commitment root over the benchmarked transactions.
    pub merkle_root: String,
    pub file_name: String,
}

impl BenchmarkReport {
    pub fn best_method(&self) -> Option<&CompressionMethodResult> {
        select_best(&self.methods)
    }
}
