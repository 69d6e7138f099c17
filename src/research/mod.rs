//! Deep Research Service Integration
//!
//! This module talks to the Firecrawl deep research REST API, which crawls
//! the web for a query server-side and returns a final analysis plus the
//! sources it used.
//!
//! # Architecture
//!
//! - [`client::ResearchClient`] - The capability the research agent depends on
//! - [`client::FirecrawlClient`] - REST implementation over `reqwest`
//! - [`client::ResearchClientFactory`] - Builds a client per run from a resolved key
//!
//! # Usage
//!
//! ```ignore
//! use deepr::research::{FirecrawlClient, ResearchClient};
//! use deepr::types::ResearchRequest;
//!
//! let client = FirecrawlClient::new(Some("fc-..."));
//! let result = client
//!     .deep_research(&ResearchRequest::with_policy("latest developments in AI"))
//!     .await;
//!
//! println!("{} sources", result.sources_count());
//! ```
//!
//! # Failure Handling
//!
//! The client never returns an error. Missing keys, non-2xx responses,
//! timeouts and unparseable bodies all become `ResearchResult::Failure`, so
//! the research agent always receives a well-formed result.

/// Firecrawl REST client and the research capability trait.
pub mod client;

pub use client::{
    FirecrawlClient, FirecrawlClientFactory, ResearchClient, ResearchClientFactory,
    DEFAULT_TIMEOUT, FIRECRAWL_API_BASE,
};
