// src/compression/hash_tree.rs

use super::{CompressionInput, CompressionRunner};
use crate::error::BenchmarkError;

pub const METHOD: &str = "Merkle Tree";

/// Sizing model for replacing the transaction list with a root plus one
/// proof element per transaction. No bytes are encoded; the result is
/// `root_bytes + proof_bytes_per_transaction * transaction_count`.
#[derive(Debug, Clone)]
pub struct HashTreeRunner {
    root_bytes: usize,
    proof_bytes_per_transaction: usize,
    min_time_ms: u64,
}

impl HashTreeRunner {
    pub fn new(root_bytes: usize, proof_bytes_per_transaction: usize, min_time_ms: u64) -> Self {
        Self { root_bytes, proof_bytes_per_transaction, min_time_ms }
    }

    pub fn estimate(&self, transaction_count: usize) -> usize {
        self.root_bytes
            .saturating_add(self.proof_bytes_per_transaction.saturating_mul(transaction_count))
    }
}

impl CompressionRunner for HashTreeRunner {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn description(&self) -> &'static str {
        "Cryptographic hash tree (size estimate: root plus one proof per transaction)"
    }

    fn technique(&self) -> &'static str {
        "SHA-256 hashing"
    }

    fn min_time_ms(&self) -> u64 {
        self.min_time_ms
    }

    fn is_estimate(&self) -> bool {
        true
    }

    fn compressed_size(&self, input: &CompressionInput<'_>) -> Result<usize, BenchmarkError> {
        Ok(self.estimate(input.transaction_count))
    }
}
