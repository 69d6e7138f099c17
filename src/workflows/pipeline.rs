//! Research pipeline orchestrator
//!
//! Sequences the research agent and the elaboration agent for one topic,
//! reports progress to a sink, and returns both reports.

use crate::agents::{Agent, ElaborationAgent, InitialReport, ResearchAgent, ResearchSummary};
use crate::llm::LLMClientFactoryTrait;
use crate::progress::{NoopSink, ProgressEvent, ProgressSink};
use crate::research::ResearchClientFactory;
use crate::types::{AppError, Credentials, PipelineState, ResolvedCredentials, Result, Stage};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Output from a completed research run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Identifier attached to the run's log span
    pub run_id: Uuid,
    /// Topic as researched (trimmed)
    pub topic: String,
    /// Report from the research agent
    pub initial_report: String,
    /// Report from the elaboration agent
    pub final_report: String,
    /// What the deep research call produced
    pub research: ResearchSummary,
    /// One entry per agent invocation, in order
    pub steps: Vec<PipelineStep>,
    /// Wall-clock duration of the whole run in milliseconds
    pub duration_ms: u64,
}

/// A single agent invocation within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    /// The agent that executed this step
    pub agent_name: String,
    /// Length of the agent's output in characters
    pub output_chars: usize,
    /// Unix timestamp when this step finished
    pub timestamp: i64,
    /// Duration of this step in milliseconds
    pub duration_ms: u64,
}

impl PipelineStep {
    fn record(agent_name: &str, output: &str, started: Instant) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            output_chars: output.chars().count(),
            timestamp: Utc::now().timestamp(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Tracks the state of one run and reports every transition
struct RunState {
    current: PipelineState,
    sink: Arc<dyn ProgressSink>,
}

impl RunState {
    fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            current: PipelineState::Idle,
            sink,
        }
    }

    fn transition(&mut self, to: PipelineState) -> Result<()> {
        let from = self.current;
        if !from.can_transition_to(to) {
            return Err(AppError::Internal(format!(
                "Invalid pipeline transition: {} -> {}",
                from, to
            )));
        }
        self.current = to;
        tracing::info!(%from, %to, "pipeline state changed");
        self.sink.notify(ProgressEvent::StateChanged { from, to });
        Ok(())
    }
}

/// Runs the research-then-elaborate pipeline.
///
/// Holds no per-run state and can be shared through an `Arc`. Credentials are
/// passed to each [`run`](Orchestrator::run) call.
pub struct Orchestrator {
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
    research_factory: Arc<dyn ResearchClientFactory>,
    sink: Arc<dyn ProgressSink>,
    fail_fast: bool,
}

impl Orchestrator {
    pub fn new(
        llm_factory: Arc<dyn LLMClientFactoryTrait>,
        research_factory: Arc<dyn ResearchClientFactory>,
    ) -> Self {
        Self {
            llm_factory,
            research_factory,
            sink: Arc::new(NoopSink),
            fail_fast: false,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Skip synthesis when the research call fails
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Research a topic and elaborate on the findings.
    ///
    /// Validation happens before any agent or network call. A configuration
    /// error leaves the run idle and emits no state change.
    pub async fn run(&self, topic: &str, credentials: &Credentials) -> Result<PipelineOutput> {
        let topic = topic.trim();
        let resolved = match Self::validate(topic, credentials) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(error = %e, "research run rejected");
                self.sink.notify(ProgressEvent::Error {
                    stage: Stage::Validation,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research_run", %run_id, topic = %topic);
        self.execute(run_id, topic, resolved).instrument(span).await
    }

    fn validate(topic: &str, credentials: &Credentials) -> Result<ResolvedCredentials> {
        if topic.is_empty() {
            return Err(AppError::Configuration(
                "Research topic must not be empty".to_string(),
            ));
        }
        credentials.resolve()
    }

    async fn execute(
        &self,
        run_id: Uuid,
        topic: &str,
        credentials: ResolvedCredentials,
    ) -> Result<PipelineOutput> {
        let started = Instant::now();
        let mut state = RunState::new(self.sink.clone());
        let mut steps = Vec::with_capacity(2);

        tracing::info!(model = %self.llm_factory.model_name(), "starting research run");
        state.transition(PipelineState::Researching)?;

        let step_started = Instant::now();
        let initial = match self.research_stage(topic, &credentials).await {
            Ok(initial) => initial,
            Err(e) => return Err(self.fail(&mut state, Stage::Research, e)),
        };
        steps.push(PipelineStep::record(
            "research_agent",
            &initial.report,
            step_started,
        ));
        self.sink
            .notify(ProgressEvent::InitialReport(initial.report.clone()));

        state.transition(PipelineState::Elaborating)?;

        let step_started = Instant::now();
        let final_report = match self
            .elaboration_stage(topic, &initial.report, &credentials)
            .await
        {
            Ok(report) => report,
            Err(e) => return Err(self.fail(&mut state, Stage::Elaboration, e)),
        };
        steps.push(PipelineStep::record(
            "elaboration_agent",
            &final_report,
            step_started,
        ));
        self.sink
            .notify(ProgressEvent::FinalReport(final_report.clone()));

        state.transition(PipelineState::Done)?;

        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            duration_ms,
            sources = initial.summary.sources_count,
            research_succeeded = initial.summary.succeeded,
            "research run completed"
        );

        Ok(PipelineOutput {
            run_id,
            topic: topic.to_string(),
            initial_report: initial.report,
            final_report,
            research: initial.summary,
            steps,
            duration_ms,
        })
    }

    async fn research_stage(
        &self,
        topic: &str,
        credentials: &ResolvedCredentials,
    ) -> Result<InitialReport> {
        let llm = self
            .llm_factory
            .create_client(&credentials.model_api_key)
            .await?;
        let research = self
            .research_factory
            .create_client(&credentials.research_api_key, self.sink.clone());

        let agent = ResearchAgent::new(llm, research).with_fail_fast(self.fail_fast);
        tracing::debug!(agent = agent.name(), "invoking agent");
        agent.research(topic).await
    }

    async fn elaboration_stage(
        &self,
        topic: &str,
        initial_report: &str,
        credentials: &ResolvedCredentials,
    ) -> Result<String> {
        let llm = self
            .llm_factory
            .create_client(&credentials.model_api_key)
            .await?;

        let agent = ElaborationAgent::new(llm);
        tracing::debug!(agent = agent.name(), "invoking agent");
        agent.elaborate(topic, initial_report).await
    }

    fn fail(&self, state: &mut RunState, stage: Stage, error: AppError) -> AppError {
        tracing::error!(%stage, error = %error, "research run failed");
        self.sink.notify(ProgressEvent::Error {
            stage,
            message: error.to_string(),
        });
        if let Err(e) = state.transition(PipelineState::Failed) {
            tracing::error!(error = %e, "could not record failure state");
        }
        error
    }
}
