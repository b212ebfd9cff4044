// File: src/types/mod.rs

pub mod report;
pub mod transaction;

// Re-export core types
pub use report::{BenchmarkReport, CompressionMethodResult};
pub use transaction::{canonical_bytes, Quantity, Transaction, TransactionSet};
