//! Research Pipeline Module
//!
//! Runs the two-stage research pipeline: a research agent backed by one deep
//! research call, followed by an elaboration agent that expands its report.
//!
//! # States
//!
//! ```text
//! Idle -> Researching -> Elaborating -> Done
//!              |              |
//!              +--> Failed <--+
//! ```
//!
//! A failed research call is not a pipeline failure: the research agent
//! reports it and elaboration still runs. Only LLM faults reach `Failed`.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use deepr::llm::LLMClientFactory;
//! use deepr::research::FirecrawlClientFactory;
//! use deepr::types::Credentials;
//! use deepr::workflows::Orchestrator;
//!
//! let orchestrator = Orchestrator::new(
//!     Arc::new(LLMClientFactory::new("https://api.openai.com/v1", "gpt-4o-mini")),
//!     Arc::new(FirecrawlClientFactory::default()),
//! );
//!
//! let output = orchestrator
//!     .run("quantum computing", &Credentials::new("sk-...", "fc-..."))
//!     .await?;
//! println!("{}", output.final_report);
//! ```

pub mod pipeline;

pub use pipeline::{Orchestrator, PipelineOutput, PipelineStep};
