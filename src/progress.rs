//! Progress notifications for a research run
//!
//! The pipeline reports what it is doing through a [`ProgressSink`]. Sinks are
//! fire-and-forget: `notify` must not block and its outcome never affects the
//! run. Events arrive in the order they happen.

use crate::types::{PipelineState, Stage};
use tokio::sync::mpsc;

/// A single notification emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The orchestrator moved between states
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    /// A deep research request is about to be sent
    ResearchInFlight { query: String },
    /// The research call failed; the run continues with a degraded report
    ToolFailure { message: String },
    /// Report produced by the research agent, before elaboration
    InitialReport(String),
    /// Report produced by the elaboration agent
    FinalReport(String),
    /// A run-level failure, keyed by the stage it happened in
    Error { stage: Stage, message: String },
}

/// Receiver of progress notifications
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: ProgressEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn notify(&self, _event: ProgressEvent) {}
}

/// Writes events to the `tracing` log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn notify(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StateChanged { from, to } => {
                tracing::info!(%from, %to, "pipeline state changed");
            }
            ProgressEvent::ResearchInFlight { query } => {
                tracing::info!(%query, "deep research in progress");
            }
            ProgressEvent::ToolFailure { message } => {
                tracing::warn!(%message, "deep research failed");
            }
            ProgressEvent::InitialReport(report) => {
                tracing::info!(chars = report.len(), "initial report ready");
            }
            ProgressEvent::FinalReport(report) => {
                tracing::info!(chars = report.len(), "final report ready");
            }
            ProgressEvent::Error { stage, message } => {
                tracing::error!(%stage, %message, "research run failed");
            }
        }
    }
}

/// Forwards events over an unbounded tokio channel
///
/// Sending never blocks. Events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn notify(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}
