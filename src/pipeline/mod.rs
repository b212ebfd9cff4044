// src/pipeline/mod.rs
//! # Pipeline Orchestrator
//!
//! A linear four-stage state machine: Ingest → Benchmark → Prove → Report.
//!
//! [`Pipeline`] is the only writer of [`PipelineState`]. Stage work returns
//! values; the orchestrator commits them once the stage has fully succeeded,
//! so a failed or cancelled (dropped) stage future leaves the state exactly
//! as it was. Committing a stage's output discards every later stage's
//! output, which keeps "output present ⇔ stage completed" true.
//!
//! Stages are driven through `&mut self`, so two stages can never run at the
//! same time on one pipeline. Progress is published on a broadcast channel
//! obtained from [`Pipeline::subscribe`].

pub mod progress;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

pub use progress::{CancelOnDrop, PipelineEvent, ProgressReporter};

use crate::benchmark::BenchmarkEngine;
use crate::config::PipelineConfig;
use crate::error::{BenchmarkError, PipelineError, Result};
use crate::proof::{synthesize, Constraints, ProofArtifact, PROOF_STEPS};
use crate::summary::PipelineSummary;
use crate::types::{BenchmarkReport, TransactionSet};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Load a transaction set.
    #[default]
    Ingest,
    /// Measure compression methods and compute the commitment.
    Benchmark,
    /// Simulate a proof over the commitment.
    Prove,
    /// Aggregate every output for presentation.
    Report,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Ingest, Stage::Benchmark, Stage::Prove, Stage::Report];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Benchmark => "benchmark",
            Stage::Prove => "prove",
            Stage::Report => "report",
        }
    }

    /// Name of the output this stage produces.
    pub fn output_name(&self) -> &'static str {
        match self {
            Stage::Ingest => "transaction set",
            Stage::Benchmark => "benchmark report",
            Stage::Prove => "proof artifact",
            Stage::Report => "summary",
        }
    }
}

/// The single mutable aggregate of a pipeline session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    stage: Stage,
    transaction_set: Option<TransactionSet>,
    benchmark_report: Option<BenchmarkReport>,
    proof_artifact: Option<ProofArtifact>,
    /// Constraints the current artifact was produced with.
    constraints: Option<Constraints>,
    summary: Option<PipelineSummary>,
}

impl PipelineState {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn transaction_set(&self) -> Option<&TransactionSet> {
        self.transaction_set.as_ref()
    }

    pub fn benchmark_report(&self) -> Option<&BenchmarkReport> {
        self.benchmark_report.as_ref()
    }

    pub fn proof_artifact(&self) -> Option<&ProofArtifact> {
        self.proof_artifact.as_ref()
    }

    pub fn constraints(&self) -> Option<&Constraints> {
        self.constraints.as_ref()
    }

    pub fn summary(&self) -> Option<&PipelineSummary> {
        self.summary.as_ref()
    }

    /// Ingest counts as complete only once a non-empty set is loaded.
    pub fn is_complete(&self, stage: Stage) -> bool {
        match stage {
            Stage::Ingest => self.transaction_set.as_ref().is_some_and(|set| !set.is_empty()),
            Stage::Benchmark => self.benchmark_report.is_some(),
            Stage::Prove => self.proof_artifact.is_some(),
            Stage::Report => self.summary.is_some(),
        }
    }

    /// Share of stages completed, 0–100.
    pub fn completion_percent(&self) -> u8 {
        let done = Stage::ALL.iter().filter(|s| self.is_complete(**s)).count();
        (done * 100 / Stage::ALL.len()) as u8
    }

    /// Fails unless every stage before `stage` has produced its output.
    pub fn require_predecessors(&self, stage: Stage) -> std::result::Result<(), PipelineError> {
        match Stage::ALL.iter().take_while(|s| **s < stage).find(|s| !self.is_complete(**s)) {
            Some(missing) => Err(PipelineError::StageOutOfOrder { requested: stage, missing: missing.output_name() }),
            None => Ok(()),
        }
    }

    /// Drops the outputs of every stage strictly after `stage`.
    fn invalidate_after(&mut self, stage: Stage) {
        if stage < Stage::Benchmark {
            self.benchmark_report = None;
        }
        if stage < Stage::Prove {
            self.proof_artifact = None;
            self.constraints = None;
        }
        if stage < Stage::Report {
            self.summary = None;
        }
    }
}

pub struct Pipeline {
    id: Uuid,
    config: PipelineConfig,
    engine: Arc<BenchmarkEngine>,
    state: PipelineState,
    events: broadcast::Sender<PipelineEvent>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let engine = BenchmarkEngine::new(&config);
        Self::with_engine(config, engine)
    }

    /// Uses a custom engine, e.g. one with additional runners.
    pub fn with_engine(config: PipelineConfig, engine: BenchmarkEngine) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        Self { id: Uuid::new_v4(), config, engine: Arc::new(engine), state: PipelineState::default(), events }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    fn reporter(&self, stage: Stage) -> ProgressReporter {
        ProgressReporter::new(stage, self.events.clone())
    }

    /// Replaces the transaction set and discards every later output.
    ///
    /// Only a non-empty set advances the position to Benchmark; an empty one
    /// is kept so that benchmarking it reports `NoInputData`.
    pub fn ingest(&mut self, set: TransactionSet) {
        let reporter = self.reporter(Stage::Ingest);
        info!(
            target: "proofpack::pipeline",
            session = %self.id,
            file = %set.file_name,
            transactions = set.len(),
            real_data = set.is_real_data,
            "transaction set ingested"
        );
        let message = format!("Loaded {} transactions", set.len());
        let next = if set.is_empty() {
            warn!(target: "proofpack::pipeline", session = %self.id, "empty transaction set; staying at ingest");
            Stage::Ingest
        } else {
            Stage::Benchmark
        };
        self.state.transaction_set = Some(set);
        self.state.invalidate_after(Stage::Ingest);
        self.state.stage = next;
        reporter.report(100, message);
        reporter.complete();
    }

    /// Parses uploaded JSON and ingests it. On failure the state is untouched.
    pub fn ingest_json(&mut self, bytes: &[u8], file_name: Option<&str>) -> Result<()> {
        match TransactionSet::from_json_slice(bytes, file_name) {
            Ok(set) => {
                self.ingest(set);
                Ok(())
            }
            Err(e) => {
                warn!(target: "proofpack::pipeline", session = %self.id, error = %e, "ingestion rejected");
                Err(self.reporter(Stage::Ingest).fail(e.into()))
            }
        }
    }

    pub fn ingest_sample(&mut self) {
        self.ingest(TransactionSet::sample());
    }

    /// Moves the current position to `stage`.
    ///
    /// Going back (or staying) is always allowed and discards outputs of
    /// stages after `stage`. Going forward requires every earlier output.
    pub fn navigate(&mut self, stage: Stage) -> Result<()> {
        if stage > self.state.stage {
            self.state.require_predecessors(stage)?;
        } else {
            self.state.invalidate_after(stage);
        }
        info!(
            target: "proofpack::pipeline",
            session = %self.id,
            from = self.state.stage.as_str(),
            to = stage.as_str(),
            "stage navigation"
        );
        self.state.stage = stage;
        Ok(())
    }

    /// Benchmarks the current transaction set on a blocking worker.
    pub async fn run_benchmark(&mut self) -> Result<BenchmarkReport> {
        let reporter = Arc::new(self.reporter(Stage::Benchmark));
        if self.state.transaction_set.as_ref().is_some_and(TransactionSet::is_empty) {
            warn!(target: "proofpack::pipeline", session = %self.id, "benchmark requested on an empty set");
            return Err(reporter.fail(BenchmarkError::NoInputData.into()));
        }
        if let Err(e) = self.state.require_predecessors(Stage::Benchmark) {
            return Err(reporter.fail(e.into()));
        }
        let Some(set) = self.state.transaction_set.clone() else {
            return Err(reporter.fail(
                PipelineError::StageOutOfOrder { requested: Stage::Benchmark, missing: Stage::Ingest.output_name() }
                    .into(),
            ));
        };

        info!(
            target: "proofpack::pipeline",
            session = %self.id,
            transactions = set.len(),
            methods = self.engine.runner_count(),
            "benchmark started"
        );
        reporter.report(10, "Starting compression analysis...");

        let engine = Arc::clone(&self.engine);
        let worker = Arc::clone(&reporter);
        let _guard = CancelOnDrop(Arc::clone(&reporter));
        reporter.report(30, "Computing commitment and running compression methods...");
        let outcome = tokio::task::spawn_blocking(move || {
            engine.benchmark_with_progress(&set, |done, total, method| {
                worker.report((30 + 60 * done / total) as u8, format!("Measured {method}"));
            })
        })
        .await;

        let report = match outcome {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                warn!(target: "proofpack::pipeline", session = %self.id, error = %e, "benchmark failed");
                return Err(reporter.fail(e.into()));
            }
            Err(join) => {
                warn!(target: "proofpack::pipeline", session = %self.id, error = %join, "benchmark worker died");
                return Err(reporter.fail(PipelineError::TaskFailed(join.to_string()).into()));
            }
        };

        self.state.benchmark_report = Some(report.clone());
        self.state.invalidate_after(Stage::Benchmark);
        self.state.stage = Stage::Prove;

        info!(
            target: "proofpack::pipeline",
            session = %self.id,
            merkle_root = %report.merkle_root,
            original_size = report.original_size,
            best = report.best_method().map(|b| b.method.as_str()).unwrap_or_default(),
            "benchmark complete"
        );
        reporter.report(
            100,
            format!(
                "Analyzed {} transactions with {} compression methods",
                report.transaction_count,
                report.methods.len()
            ),
        );
        reporter.complete();
        Ok(report)
    }

    /// Simulates a proof over the committed benchmark report.
    pub async fn run_proof(&mut self, constraints: Constraints) -> Result<ProofArtifact> {
        let reporter = self.reporter(Stage::Prove);
        if let Err(e) = self.state.require_predecessors(Stage::Prove) {
            return Err(reporter.fail(e.into()));
        }
        let Some(report) = self.state.benchmark_report.as_ref() else {
            return Err(reporter.fail(
                PipelineError::StageOutOfOrder { requested: Stage::Prove, missing: Stage::Benchmark.output_name() }
                    .into(),
            ));
        };
        let commitment = report.merkle_root.clone();
        let transaction_count = report.transaction_count;

        if let Err(e) = constraints.validate() {
            warn!(target: "proofpack::pipeline", session = %self.id, error = %e, "constraints rejected");
            return Err(reporter.fail(e.into()));
        }

        info!(target: "proofpack::pipeline", session = %self.id, commitment = %commitment, "proof simulation started");
        let delay = Duration::from_millis(self.config.proof_step_delay_ms);
        let step_share = (100 / PROOF_STEPS.len()) as u8;
        let mut artifact = None;
        for (index, step) in PROOF_STEPS.iter().enumerate() {
            reporter.report(index as u8 * step_share, *step);
            pace(delay).await;
            match index {
                3 => {
                    artifact = Some(
                        synthesize(&commitment, transaction_count, &constraints)
                            .map_err(|e| reporter.fail(e.into()))?,
                    );
                }
                4 => {
                    let bound = artifact
                        .as_ref()
                        .is_some_and(|a| a.is_bound_to(&commitment, transaction_count, &constraints));
                    if !bound {
                        return Err(reporter.fail(
                            PipelineError::TaskFailed("proof artifact does not match its inputs".to_string()).into(),
                        ));
                    }
                }
                _ => {}
            }
        }
        let Some(artifact) = artifact else {
            return Err(reporter.fail(PipelineError::TaskFailed("no proof artifact produced".to_string()).into()));
        };

        self.state.proof_artifact = Some(artifact.clone());
        self.state.constraints = Some(constraints);
        self.state.invalidate_after(Stage::Prove);
        self.state.stage = Stage::Report;

        info!(
            target: "proofpack::pipeline",
            session = %self.id,
            constraints = artifact.circuit.constraints,
            wires = artifact.circuit.wires,
            "proof simulation complete"
        );
        reporter.report(
            100,
            format!("Circuit with {} constraints compiled and proven", artifact.circuit.constraints),
        );
        reporter.complete();
        Ok(artifact)
    }

    /// Aggregates all outputs into the Report stage summary.
    pub fn finalize(&mut self) -> Result<PipelineSummary> {
        let reporter = self.reporter(Stage::Report);
        if let Err(e) = self.state.require_predecessors(Stage::Report) {
            return Err(reporter.fail(e.into()));
        }
        let (Some(set), Some(report), Some(artifact), Some(constraints)) = (
            self.state.transaction_set.as_ref(),
            self.state.benchmark_report.as_ref(),
            self.state.proof_artifact.as_ref(),
            self.state.constraints.as_ref(),
        ) else {
            return Err(reporter.fail(
                PipelineError::StageOutOfOrder { requested: Stage::Report, missing: Stage::Prove.output_name() }
                    .into(),
            ));
        };

        let summary = PipelineSummary::build(set, report, artifact, constraints, self.config.commitment_scheme);
        self.state.summary = Some(summary.clone());
        self.state.stage = Stage::Report;

        info!(target: "proofpack::pipeline", session = %self.id, file = %summary.file_name, "report ready");
        reporter.report(100, "Results ready");
        reporter.complete();
        Ok(summary)
    }

    /// Runs Benchmark, Prove and Report over the already ingested set.
    pub async fn run_to_report(&mut self, constraints: Constraints) -> Result<PipelineSummary> {
        self.run_benchmark().await?;
        self.run_proof(constraints).await?;
        self.finalize()
    }
}

async fn pace(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
