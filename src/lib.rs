//! # deepr - deep research, then elaboration
//!
//! deepr turns a research topic into a long-form report in two stages:
//!
//! 1. A **research agent** makes exactly one Firecrawl deep research call
//!    (depth 3, 180 s, 10 URLs) and organizes the returned analysis and
//!    sources into a cited report.
//! 2. An **elaboration agent** expands that report with explanations,
//!    examples and case studies.
//!
//! It can be used as the `deepr` binary or embedded as a library.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use deepr::{Credentials, FirecrawlClientFactory, LLMClientFactory, Orchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> deepr::Result<()> {
//!     let orchestrator = Orchestrator::new(
//!         Arc::new(LLMClientFactory::new("https://api.openai.com/v1", "gpt-4o-mini")),
//!         Arc::new(FirecrawlClientFactory::default()),
//!     );
//!
//!     // The Firecrawl key may be omitted here; FIRECRAWL_API_KEY is used instead.
//!     let credentials = Credentials {
//!         model_api_key: std::env::var("OPENAI_API_KEY").ok(),
//!         research_api_key: None,
//!     };
//!
//!     let run = orchestrator.run("quantum computing", &credentials).await?;
//!     println!("{}", run.final_report);
//!     Ok(())
//! }
//! ```
//!
//! ## Progress
//!
//! Pass a [`ProgressSink`] to [`Orchestrator::with_sink`] to observe a run.
//! [`progress::ChannelSink`] forwards events over a tokio channel for UIs.
//!
//! ## Modules
//!
//! - [`agents`] - Research and elaboration agents
//! - [`cli`] - Command-line parsing and console output
//! - [`llm`] - OpenAI-compatible LLM client
//! - [`progress`] - Progress events and sinks
//! - [`research`] - Firecrawl deep research client
//! - [`types`] - Credentials, research data, pipeline states and errors
//! - [`utils`] - TOML configuration
//! - [`workflows`] - The pipeline orchestrator

#![warn(rustdoc::missing_crate_level_docs)]

/// Research and elaboration agents.
pub mod agents;
/// Command-line interface.
pub mod cli;
/// LLM client abstractions.
pub mod llm;
/// Progress notifications.
pub mod progress;
/// Deep research service integration.
pub mod research;
/// Core types (credentials, research data, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Research pipeline orchestration.
pub mod workflows;

// Re-export commonly used types
pub use agents::{Agent, ElaborationAgent, ResearchAgent};
pub use llm::{LLMClient, LLMClientFactory, LLMClientFactoryTrait};
pub use progress::{ProgressEvent, ProgressSink};
pub use research::{FirecrawlClient, FirecrawlClientFactory, ResearchClient};
pub use types::{AppError, Credentials, ResearchRequest, ResearchResult, Result};
pub use utils::toml_config::DeeprConfig;
pub use workflows::{Orchestrator, PipelineOutput};
