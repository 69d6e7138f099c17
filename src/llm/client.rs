//! LLM client abstractions
//!
//! The agents only need one capability from a language model: given
//! instructions and an input, produce text. [`LLMClient`] expresses that, and
//! [`LLMClientFactoryTrait`] builds a client from the model-provider key once
//! a run has validated its credentials.

use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate with conversation history
    async fn generate_with_history(
        &self,
        messages: &[(String, String)], // (role, content) pairs
    ) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let messages = vec![
            ("system".to_string(), system.to_string()),
            ("user".to_string(), prompt.to_string()),
        ];
        self.generate_with_history(&messages).await
    }

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Creates LLM clients for a run from the model-provider key
#[async_trait]
pub trait LLMClientFactoryTrait: Send + Sync {
    async fn create_client(&self, api_key: &str) -> Result<Box<dyn LLMClient>>;

    /// Model the created clients will use
    fn model_name(&self) -> &str;
}

/// Factory for OpenAI-compatible chat completion clients
///
/// # Example
///
/// ```rust,ignore
/// use deepr::llm::{LLMClientFactory, LLMClientFactoryTrait};
///
/// let factory = LLMClientFactory::new("https://api.openai.com/v1", "gpt-4o-mini");
/// let client = factory.create_client("sk-...").await?;
/// let text = client.generate_with_system("Be brief.", "What is Rust?").await?;
/// ```
#[derive(Debug, Clone)]
pub struct LLMClientFactory {
    api_base: String,
    model: String,
    temperature: Option<f32>,
}

impl LLMClientFactory {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl LLMClientFactoryTrait for LLMClientFactory {
    async fn create_client(&self, api_key: &str) -> Result<Box<dyn LLMClient>> {
        Ok(Box::new(
            super::openai::OpenAIClient::new(api_key, &self.api_base, &self.model)
                .with_temperature(self.temperature),
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingLLM {
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LLMClient for RecordingLLM {
        async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok("ok".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_generate_with_system_builds_two_messages() {
        let llm = RecordingLLM {
            seen: Mutex::new(Vec::new()),
        };

        let out = llm.generate_with_system("be terse", "hello").await.unwrap();
        assert_eq!(out, "ok");

        let seen = llm.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("system".to_string(), "be terse".to_string()),
                ("user".to_string(), "hello".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_factory_creates_client_for_model() {
        let factory = LLMClientFactory::new("https://api.openai.com/v1", "gpt-4o-mini")
            .with_temperature(Some(0.2));
        assert_eq!(factory.model_name(), "gpt-4o-mini");
        assert_eq!(factory.api_base(), "https://api.openai.com/v1");

        let client = factory.create_client("sk-test").await.unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }
}
