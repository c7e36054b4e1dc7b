//! Progress reporting for configuration runs.
//!
//! A [`ProgressReporter`] is a per-run handle; concurrent runs each own their
//! own channel so events never interleave across requests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// Orchestration stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    Validating,
    Topic,
    Alarms,
    Access,
    Provisioning,
    Dashboard,
    Completed,
}

impl ProgressStage {
    /// Nominal completion percentage when the stage starts.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Validating => 5,
            Self::Topic => 15,
            Self::Alarms => 30,
            Self::Access => 50,
            Self::Provisioning => 65,
            Self::Dashboard => 90,
            Self::Completed => 100,
        }
    }
}

/// One progress update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub run_id: String,
    pub percent: u8,
    pub stage: ProgressStage,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Handle over an optional progress channel.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressReporter {
    pub fn new(sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Reporter that drops every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Create a reporter together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn stage(&self, run_id: &str, stage: ProgressStage, message: impl Into<String>) {
        self.emit(run_id, stage, stage.percent(), message);
    }

    pub fn emit(&self, run_id: &str, stage: ProgressStage, percent: u8, message: impl Into<String>) {
        let Some(sender) = &self.sender else {
            return;
        };
        // A closed receiver only means nobody is listening anymore.
        let _ = sender.send(ProgressEvent {
            run_id: run_id.to_string(),
            percent: percent.min(100),
            stage,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }
}
