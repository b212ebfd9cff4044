use proofpack::error::{Error, IngestError, PipelineError, ProofError};
use proofpack::pipeline::PipelineEvent;
use proofpack::{Constraints, Pipeline, PipelineConfig, Stage, Transaction, TransactionSet};

fn transactions() -> Vec<Transaction> {
    vec![
        Transaction::new("0xAAA", "0xalice", "0xbob", "1.5"),
        Transaction::new("0xBBB", "0xbob", "0xcarol", "0.25"),
        Transaction::new("0xCCC", "0xcarol", "0xdave", "0.75"),
    ]
}

fn set(transactions: Vec<Transaction>) -> TransactionSet {
    TransactionSet::new(transactions, true, "scenario.json").unwrap()
}

#[tokio::test]
async fn test_three_transaction_scenario() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    pipeline.ingest(set(transactions()));
    let report = pipeline.run_benchmark().await.unwrap();

    assert_eq!(report.methods.len(), 3);
    assert_eq!(report.transaction_count, 3);
    assert!(report.merkle_root.starts_with("0x"));

    let mut reversed = transactions();
    reversed.reverse();
    pipeline.ingest(set(reversed));
    let reversed_report = pipeline.run_benchmark().await.unwrap();
    assert_ne!(report.merkle_root, reversed_report.merkle_root);
}

#[tokio::test]
async fn test_public_signals_carry_commitment_and_bounds() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    pipeline.ingest(set(transactions()));
    let report = pipeline.run_benchmark().await.unwrap();

    let constraints = Constraints {
        max_value: "2.0".to_string(),
        gas_limit: "100000".to_string(),
        ..Constraints::default()
    };
    let artifact = pipeline.run_proof(constraints.clone()).await.unwrap();

    assert_eq!(artifact.public_signals, vec![report.merkle_root.clone(), "2.0".to_string(), "100000".to_string()]);
    assert!(artifact.is_bound_to(&report.merkle_root, 3, &constraints));
    assert_eq!(pipeline.state().stage(), Stage::Report);
}

#[tokio::test]
async fn test_prove_is_refused_without_report() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    pipeline.ingest_sample();

    let err = pipeline.run_proof(Constraints::default()).await.unwrap_err();
    assert!(matches!(err, Error::Pipeline(PipelineError::StageOutOfOrder { requested: Stage::Prove, .. })));
    assert!(!err.is_recoverable());
}

#[tokio::test]
async fn test_reingest_clears_downstream_outputs() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    pipeline.ingest(set(transactions()));
    pipeline.run_to_report(Constraints::default()).await.unwrap();

    pipeline
        .ingest_json(br#"{"result": [{"hash": "0x1", "from": "0xa", "to": null, "value": "0x10"}]}"#, None)
        .unwrap();

    let state = pipeline.state();
    assert_eq!(state.transaction_set().map(|s| s.len()), Some(1));
    assert!(state.benchmark_report().is_none());
    assert!(state.proof_artifact().is_none());
    assert!(state.summary().is_none());
}

#[tokio::test]
async fn test_backward_navigation_invalidates_downstream() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    pipeline.ingest(set(transactions()));
    pipeline.run_to_report(Constraints::default()).await.unwrap();

    pipeline.navigate(Stage::Ingest).unwrap();
    let state = pipeline.state();
    assert_eq!(state.stage(), Stage::Ingest);
    assert!(state.transaction_set().is_some());
    assert!(state.benchmark_report().is_none());
    assert_eq!(state.completion_percent(), 25);

    assert!(pipeline.navigate(Stage::Prove).is_err());
    pipeline.navigate(Stage::Benchmark).unwrap();
}

#[tokio::test]
async fn test_progress_is_monotonic_and_terminates() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    let mut events = pipeline.subscribe();
    pipeline.ingest(set(transactions()));
    pipeline.run_benchmark().await.unwrap();
    pipeline.run_proof(Constraints::default()).await.unwrap();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    for stage in [Stage::Benchmark, Stage::Prove] {
        let stage_events: Vec<_> = received.iter().filter(|e| e.stage() == stage).collect();
        let percents: Vec<u8> = stage_events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert!(!percents.is_empty());
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{stage:?}: {percents:?}");
        assert_eq!(percents.last(), Some(&100));
        assert_eq!(stage_events.last(), Some(&&PipelineEvent::Completed { stage }));
        assert_eq!(stage_events.iter().filter(|e| e.is_terminal()).count(), 1);
    }
}

#[tokio::test]
async fn test_invalid_constraint_is_recoverable() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    let mut events = pipeline.subscribe();
    pipeline.ingest(set(transactions()));
    pipeline.run_benchmark().await.unwrap();
    let before = pipeline.state().clone();

    let bad = Constraints { gas_limit: "-5".to_string(), ..Constraints::default() };
    let err = pipeline.run_proof(bad).await.unwrap_err();
    assert!(matches!(err, Error::Proof(ProofError::InvalidConstraint { field: "gasLimit", .. })));
    assert!(err.is_recoverable());
    assert_eq!(pipeline.state(), &before);

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    assert!(matches!(last, Some(PipelineEvent::Failed { stage: Stage::Prove, .. })));

    pipeline.run_proof(Constraints::default()).await.unwrap();
}

#[tokio::test]
async fn test_unsupported_upload_is_recoverable() {
    let mut pipeline = Pipeline::new(PipelineConfig::default());
    pipeline.ingest(set(transactions()));
    pipeline.run_benchmark().await.unwrap();
    let before = pipeline.state().clone();

    let bodies: [&[u8]; 3] = [br#"{"rows": []}"#, b"42", b"not json"];
    for body in bodies {
        let err = pipeline.ingest_json(body, Some("bad.json")).unwrap_err();
        assert!(matches!(err, Error::Ingest(IngestError::UnsupportedFormat(_))));
        assert_eq!(pipeline.state(), &before);
    }
}

#[tokio::test]
async fn test_summary_serializes_for_collaborators() {
    let mut pipeline = Pipeline::new(PipelineConfig { proof_step_delay_ms: 1, ..PipelineConfig::default() });
    pipeline.ingest_sample();
    let summary = pipeline.run_to_report(Constraints::default()).await.unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["transactionCount"], 2);
    assert_eq!(json["methodsTested"], 3);
    assert_eq!(json["isRealData"], false);
    assert_eq!(json["commitmentScheme"], "flat");
    assert!(json["merkleRoot"].as_str().unwrap().starts_with("0x"));
    assert!(json["generatedAt"].is_string());

    let state = serde_json::to_value(pipeline.state()).unwrap();
    assert_eq!(state["stage"], "report");
}
