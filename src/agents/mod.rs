//! Research and elaboration agents
//!
//! An agent is a set of instructions, optional capabilities, and an
//! input/output text contract backed by an [`LLMClient`](crate::llm::LLMClient).

pub mod elaboration;
pub mod research;

use crate::types::Result;
use async_trait::async_trait;

pub use elaboration::ElaborationAgent;
pub use research::{InitialReport, ResearchAgent, ResearchSummary};

/// Base trait for all agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Execute the agent with the given input
    async fn execute(&self, input: &str) -> Result<String>;

    /// Get the agent's system prompt
    fn system_prompt(&self) -> String;

    /// Short identifier used in logs and pipeline steps
    fn name(&self) -> &str;
}
