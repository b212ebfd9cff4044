// src/summary.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commitment::tree_depth;
use crate::config::CommitmentScheme;
use crate::format::format_bytes;
use crate::proof::{CircuitMetrics, Constraints, ProofArtifact, ProofMetrics};
use crate::types::{BenchmarkReport, TransactionSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMethod {
    pub method: String,
    pub compression_percentage: String,
    pub compressed_size: usize,
    pub compressed_size_display: String,
    pub space_saved: i64,
    pub is_estimate: bool,
}

/// Read-only aggregation of every stage output, produced by the Report stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub file_name: String,
    pub is_real_data: bool,
    pub transaction_count: usize,
    pub total_value: f64,
    pub total_gas: u64,
    pub original_size: usize,
    pub original_size_display: String,
    pub methods_tested: usize,
    pub best_method: Option<BestMethod>,
    pub merkle_root: String,
    pub commitment_scheme: CommitmentScheme,
    pub tree_depth: usize,
    pub constraints: Constraints,
    pub circuit: CircuitMetrics,
    pub metrics: ProofMetrics,
    pub public_signals: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl PipelineSummary {
    pub fn build(
        set: &TransactionSet,
        report: &BenchmarkReport,
        artifact: &ProofArtifact,
        constraints: &Constraints,
        scheme: CommitmentScheme,
    ) -> Self {
        let best_method = report.best_method().map(|best| BestMethod {
            method: best.method.clone(),
            compression_percentage: best.compression_percentage.clone(),
            compressed_size: best.compressed_size,
            compressed_size_display: format_bytes(best.compressed_size as u64),
            space_saved: best.space_saved,
            is_estimate: best.is_estimate,
        });

        Self {
            file_name: report.file_name.clone(),
            is_real_data: report.is_real_data,
            transaction_count: report.transaction_count,
            total_value: set.total_value(),
            total_gas: set.total_gas(),
            original_size: report.original_size,
            original_size_display: format_bytes(report.original_size as u64),
            methods_tested: report.methods.len(),
            best_method,
            merkle_root: report.merkle_root.clone(),
            commitment_scheme: scheme,
            tree_depth: tree_depth(report.transaction_count),
            constraints: constraints.clone(),
            circuit: artifact.circuit.clone(),
            metrics: artifact.metrics.clone(),
            public_signals: artifact.public_signals.clone(),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkEngine;
    use crate::config::PipelineConfig;
    use crate::proof::simulate_proof;

    #[test]
    fn test_summary_from_sample() {
        let set = TransactionSet::sample();
        let report = BenchmarkEngine::new(&PipelineConfig::default()).benchmark(&set).unwrap();
        let constraints = Constraints::default();
        let artifact = simulate_proof(&report, &constraints).unwrap();

        let summary = PipelineSummary::build(&set, &report, &artifact, &constraints, CommitmentScheme::Flat);
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.methods_tested, 3);
        assert_eq!(summary.tree_depth, 2);
        assert_eq!(summary.total_gas, 46000);
        assert!(!summary.is_real_data);
        assert_eq!(summary.merkle_root, report.merkle_root);
        assert_eq!(summary.public_signals[0], report.merkle_root);
        assert_eq!(
            summary.best_method.as_ref().map(|b| b.method.as_str()),
            report.best_method().map(|b| b.method.as_str())
        );
    }
}
