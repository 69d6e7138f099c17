//! LLM Provider Clients and Abstractions
//!
//! The agents treat the language model as a black box: instructions and an
//! input go in, text comes out. This module provides that boundary.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait every client implements
//! - [`LLMClientFactoryTrait`] - Builds a client from the model-provider key
//! - [`LLMClientFactory`] - Factory for OpenAI-compatible endpoints
//!
//! Any server that speaks the OpenAI chat completions protocol works by
//! changing `api_base` (OpenAI, OpenRouter, a local Ollama `/v1`, ...).
//!
//! # Example
//!
//! ```ignore
//! use deepr::llm::{LLMClientFactory, LLMClientFactoryTrait};
//!
//! let factory = LLMClientFactory::new("https://api.openai.com/v1", "gpt-4o-mini");
//! let client = factory.create_client(&api_key).await?;
//!
//! let response = client.generate_with_system("You are terse.", "What is 2+2?").await?;
//! println!("{}", response);
//! ```

/// Core LLM client trait and client factory.
pub mod client;
/// OpenAI-compatible chat completions client.
pub mod openai;

pub use client::{LLMClient, LLMClientFactory, LLMClientFactoryTrait};
pub use openai::OpenAIClient;
