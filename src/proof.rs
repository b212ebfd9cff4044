// src/proof.rs
//! Proof stage simulator.
//!
//! No constraint system is built and nothing is proven. The simulator checks
//! that the declared constraints are well formed and emits a fixed-shape
//! artifact whose placeholder group elements are derived from the commitment
//! and constraints, so the same inputs always give the same artifact.
//! Circuit metrics are a function of the transaction count and the enabled
//! checks.

use serde::{Deserialize, Serialize};

use crate::commitment::digest_str;
use crate::error::ProofError;
use crate::format::format_bytes;
use crate::types::BenchmarkReport;

/// Progress labels for the simulated proving steps, in order.
pub const PROOF_STEPS: [&str; 5] = [
    "Initializing circuit compiler...",
    "Building constraint system...",
    "Generating witness...",
    "Computing proof...",
    "Verifying proof...",
];

// Illustrative per-circuit and per-transaction constraint costs.
const BASE_CONSTRAINTS: u64 = 64;
const VALUE_RANGE_CONSTRAINTS: u64 = 64;
const GAS_RANGE_CONSTRAINTS: u64 = 32;
const BALANCE_CONSTRAINTS: u64 = 96;
const DOUBLE_SPEND_CONSTRAINTS: u64 = 32;
const PRIVATE_INPUTS_PER_TRANSACTION: u64 = 4;
const PROVING_MICROS_PER_CONSTRAINT: u64 = 3_800;
const CIRCUIT_BYTES_PER_WIRE: u64 = 13;
const PROOF_SIZE_BYTES: u64 = 256;
const VERIFICATION_TIME: &str = "12ms";

/// User-declared bounds the proof claims over the committed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Non-negative decimal, e.g. `"2.0"`.
    pub max_value: String,
    /// Non-negative integer, e.g. `"100000"`.
    pub gas_limit: String,
    pub balance_check: bool,
    pub no_double_spend: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_value: "2.0".to_string(),
            gas_limit: "100000".to_string(),
            balance_check: true,
            no_double_spend: true,
        }
    }
}

impl Constraints {
    /// Checks both numeric fields, returning `(max_value, gas_limit)`.
    pub fn validate(&self) -> Result<(f64, u64), ProofError> {
        let max_value = parse_decimal("maxValue", &self.max_value)?;
        let gas_limit = parse_integer("gasLimit", &self.gas_limit)?;
        Ok((max_value, gas_limit))
    }
}

fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, ProofError> {
    let s = raw.trim();
    let well_formed = !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.matches('.').count() <= 1;
    if !well_formed {
        return Err(ProofError::InvalidConstraint {
            field,
            reason: format!("`{raw}` is not a non-negative decimal"),
        });
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProofError::InvalidConstraint { field, reason: format!("`{raw}` is out of range") })
}

fn parse_integer(field: &'static str, raw: &str) -> Result<u64, ProofError> {
    let s = raw.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProofError::InvalidConstraint {
            field,
            reason: format!("`{raw}` is not a non-negative integer"),
        });
    }
    s.parse::<u64>()
        .map_err(|_| ProofError::InvalidConstraint { field, reason: format!("`{raw}` is out of range") })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPoints {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    pub vk_alpha_1: Vec<String>,
    pub vk_beta_2: Vec<Vec<String>>,
    pub vk_gamma_2: Vec<Vec<String>>,
    pub vk_delta_2: Vec<Vec<String>>,
    pub vk_alphabeta_12: String,
    #[serde(rename = "IC")]
    pub ic: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitMetrics {
    pub constraints: u64,
    pub private_inputs: u64,
    pub public_inputs: u64,
    pub wires: u64,
}

impl CircuitMetrics {
    pub fn estimate(transaction_count: usize, constraints: &Constraints, public_inputs: usize) -> Self {
        let mut per_transaction = VALUE_RANGE_CONSTRAINTS + GAS_RANGE_CONSTRAINTS;
        if constraints.balance_check {
            per_transaction += BALANCE_CONSTRAINTS;
        }
        if constraints.no_double_spend {
            per_transaction += DOUBLE_SPEND_CONSTRAINTS;
        }
        let count = transaction_count as u64;
        let total = BASE_CONSTRAINTS + per_transaction * count;
        Self {
            constraints: total,
            private_inputs: PRIVATE_INPUTS_PER_TRANSACTION * count,
            public_inputs: public_inputs as u64,
            // roughly 1.4 wires per constraint
            wires: total + total * 5 / 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofMetrics {
    pub proving_time: String,
    pub verification_time: String,
    pub proof_size: String,
    pub circuit_size: String,
}

impl ProofMetrics {
    fn estimate(circuit: &CircuitMetrics) -> Self {
        let proving_micros = circuit.constraints * PROVING_MICROS_PER_CONSTRAINT;
        Self {
            proving_time: format!("{:.1}s", proving_micros as f64 / 1_000_000.0),
            verification_time: VERIFICATION_TIME.to_string(),
            proof_size: format!("{PROOF_SIZE_BYTES} bytes"),
            circuit_size: format_bytes(circuit.wires * CIRCUIT_BYTES_PER_WIRE),
        }
    }
}

/// Placeholder proof bound to one commitment and one constraint set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
    pub proof: ProofPoints,
    /// `[commitment, maxValue, gasLimit]`.
    pub public_signals: Vec<String>,
    pub verification_key: VerificationKey,
    pub circuit: CircuitMetrics,
    pub metrics: ProofMetrics,
}

impl ProofArtifact {
    /// Whether this artifact is exactly what the simulator yields for the inputs.
    pub fn is_bound_to(&self, commitment: &str, transaction_count: usize, constraints: &Constraints) -> bool {
        synthesize(commitment, transaction_count, constraints).is_ok_and(|expected| &expected == self)
    }

    pub fn commitment(&self) -> Option<&str> {
        self.public_signals.first().map(String::as_str)
    }
}

/// Simulates the proof for a benchmark report's commitment.
pub fn simulate_proof(report: &BenchmarkReport, constraints: &Constraints) -> Result<ProofArtifact, ProofError> {
    synthesize(&report.merkle_root, report.transaction_count, constraints)
}

/// Builds the artifact for `commitment` over `transaction_count` transactions.
pub fn synthesize(
    commitment: &str,
    transaction_count: usize,
    constraints: &Constraints,
) -> Result<ProofArtifact, ProofError> {
    constraints.validate()?;

    let public_signals = vec![
        commitment.to_string(),
        constraints.max_value.clone(),
        constraints.gas_limit.clone(),
    ];
    let seed = digest_str(&format!(
        "{commitment}|{}|{}|{}|{}|{transaction_count}",
        constraints.max_value, constraints.gas_limit, constraints.balance_check, constraints.no_double_spend
    ));
    let element = Placeholder { seed: &seed };

    let proof = ProofPoints {
        pi_a: element.g1("pi_a", 3),
        pi_b: element.g2("pi_b"),
        pi_c: element.g1("pi_c", 3),
    };
    let verification_key = VerificationKey {
        vk_alpha_1: element.g1("vk_alpha_1", 2),
        vk_beta_2: element.g2("vk_beta_2"),
        vk_gamma_2: element.g2("vk_gamma_2"),
        vk_delta_2: element.g2("vk_delta_2"),
        vk_alphabeta_12: "processed".to_string(),
        ic: element.g1("IC", public_signals.len() + 1),
    };
    let circuit = CircuitMetrics::estimate(transaction_count, constraints, public_signals.len());
    let metrics = ProofMetrics::estimate(&circuit);

    Ok(ProofArtifact { proof, public_signals, verification_key, circuit, metrics })
}

/// Deterministic hex coordinates derived from a seed.
struct Placeholder<'a> {
    seed: &'a str,
}

impl Placeholder<'_> {
    fn coordinate(&self, label: &str, index: usize) -> String {
        format!("0x{}", digest_str(&format!("{}:{label}:{index}", self.seed)))
    }

    fn g1(&self, label: &str, len: usize) -> Vec<String> {
        (0..len).map(|i| self.coordinate(label, i)).collect()
    }

    fn g2(&self, label: &str) -> Vec<Vec<String>> {
        (0..2).map(|row| (0..2).map(|col| self.coordinate(label, row * 2 + col)).collect()).collect()
    }
}
