// src/pipeline/progress.rs

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use super::Stage;
use crate::error::Error;

/// Structured payload published while a stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PipelineEvent {
    Progress { stage: Stage, percent: u8, message: String },
    Completed { stage: Stage },
    Failed { stage: Stage, error: String },
}

impl PipelineEvent {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineEvent::Progress { stage, .. }
            | PipelineEvent::Completed { stage }
            | PipelineEvent::Failed { stage, .. } => *stage,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PipelineEvent::Progress { .. })
    }
}

/// Publishes events for one invocation of one stage.
///
/// Reported percentages never decrease: a lower value than one already sent
/// is raised to the previous value. Once [`cancel`](Self::cancel)led, the
/// reporter publishes nothing further, so a worker outliving its invocation
/// cannot interleave with the next one.
#[derive(Debug)]
pub struct ProgressReporter {
    stage: Stage,
    sender: broadcast::Sender<PipelineEvent>,
    last: AtomicU8,
    cancelled: AtomicBool,
}

impl ProgressReporter {
    pub fn new(stage: Stage, sender: broadcast::Sender<PipelineEvent>) -> Self {
        Self { stage, sender, last: AtomicU8::new(0), cancelled: AtomicBool::new(false) }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn report(&self, percent: u8, message: impl Into<String>) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        self.publish(PipelineEvent::Progress {
            stage: self.stage,
            percent: previous.max(percent),
            message: message.into(),
        });
    }

    pub fn complete(&self) {
        self.publish(PipelineEvent::Completed { stage: self.stage });
    }

    /// Publishes the failure and hands the error back for propagation.
    pub fn fail(&self, error: Error) -> Error {
        self.publish(PipelineEvent::Failed { stage: self.stage, error: error.to_string() });
        error
    }

    fn publish(&self, event: PipelineEvent) {
        if self.is_cancelled() {
            trace!(target: "proofpack::progress", stage = self.stage.as_str(), "event from cancelled invocation dropped");
            return;
        }
        match self.sender.send(event.clone()) {
            Ok(receivers) => {
                debug!(
                    target: "proofpack::progress",
                    stage = self.stage.as_str(),
                    receivers,
                    event = ?event,
                    "pipeline event published"
                );
            }
            Err(_) => {
                trace!(
                    target: "proofpack::progress",
                    stage = self.stage.as_str(),
                    "no active pipeline event subscribers"
                );
            }
        }
    }
}

/// Cancels the wrapped reporter when dropped.
///
/// Held across the await of a background worker; if the awaiting future is
/// dropped, the worker's remaining events are silenced.
#[derive(Debug)]
pub struct CancelOnDrop(pub Arc<ProgressReporter>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
