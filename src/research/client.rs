//! Firecrawl deep research client
//!
//! Wraps the single `POST /v1/deep-research` call. Every outcome, including
//! missing credentials, HTTP errors, timeouts and malformed bodies, comes back
//! as a [`ResearchResult`]; nothing escapes as an error.

use crate::progress::{NoopSink, ProgressEvent, ProgressSink};
use crate::types::{resolve_research_key, ResearchRequest, ResearchResult, Source};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Production Firecrawl API base URL
pub const FIRECRAWL_API_BASE: &str = "https://api.firecrawl.dev";

/// Deep research endpoint path, relative to the API base
pub const DEEP_RESEARCH_PATH: &str = "/v1/deep-research";

/// Upper bound on a single deep research attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Capability handed to the research agent
#[async_trait]
pub trait ResearchClient: Send + Sync {
    /// Run one deep research call. Never fails; failures are a result variant.
    async fn deep_research(&self, request: &ResearchRequest) -> ResearchResult;
}

/// REST client for Firecrawl deep research
pub struct FirecrawlClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    timeout: Duration,
    sink: Arc<dyn ProgressSink>,
}

impl FirecrawlClient {
    /// Create a client from a session key, falling back to `FIRECRAWL_API_KEY`
    pub fn new(session_key: Option<&str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: FIRECRAWL_API_BASE.to_string(),
            api_key: resolve_research_key(session_key),
            timeout: DEFAULT_TIMEOUT,
            sink: Arc::new(NoopSink),
        }
    }

    /// Point the client at a different API base (self-hosted or test server)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Full URL of the deep research endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_base, DEEP_RESEARCH_PATH)
    }

    fn fail(&self, message: String) -> ResearchResult {
        tracing::warn!(error = %message, "deep research call failed");
        self.sink.notify(ProgressEvent::ToolFailure {
            message: message.clone(),
        });
        ResearchResult::failure(message)
    }

    /// Interpret a 2xx body. A missing or non-object `data` means empty fields.
    fn parse_success(body: &Value) -> ResearchResult {
        let data = body.get("data").filter(|d| d.is_object());

        let final_analysis = data
            .and_then(|d| d.get("finalAnalysis"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        let sources: Vec<Source> = data
            .and_then(|d| d.get("sources"))
            .and_then(Value::as_array)
            .map(|entries| entries.iter().cloned().map(Source::from_value).collect())
            .unwrap_or_default();

        ResearchResult::success(final_analysis, sources)
    }
}

#[async_trait]
impl ResearchClient for FirecrawlClient {
    async fn deep_research(&self, request: &ResearchRequest) -> ResearchResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return self.fail("Missing Firecrawl API key".to_string());
        };

        self.sink.notify(ProgressEvent::ResearchInFlight {
            query: request.query.clone(),
        });
        tracing::debug!(
            endpoint = %self.endpoint(),
            max_depth = request.max_depth,
            time_limit = request.time_limit_seconds,
            max_urls = request.max_urls,
            "sending deep research request"
        );

        let response = match self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return self.fail(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let status_error = response.error_for_status_ref().err().map(|e| e.to_string());
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status_error.unwrap_or_else(|| format!("HTTP status {}", status))
            } else {
                body
            };
            return self.fail(message);
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return self.fail(e.to_string()),
        };

        let result = Self::parse_success(&body);
        tracing::info!(
            sources = result.sources_count(),
            "deep research completed"
        );
        result
    }
}

/// Builds a research client for one run
///
/// The orchestrator resolves the key up front and asks the factory for a
/// client wired to the run's progress sink.
pub trait ResearchClientFactory: Send + Sync {
    fn create_client(&self, api_key: &str, sink: Arc<dyn ProgressSink>) -> Arc<dyn ResearchClient>;
}

/// Factory for [`FirecrawlClient`] instances sharing one base URL and timeout
#[derive(Debug, Clone)]
pub struct FirecrawlClientFactory {
    api_base: String,
    timeout: Duration,
}

impl FirecrawlClientFactory {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FirecrawlClientFactory {
    fn default() -> Self {
        Self::new(FIRECRAWL_API_BASE)
    }
}

impl ResearchClientFactory for FirecrawlClientFactory {
    fn create_client(&self, api_key: &str, sink: Arc<dyn ProgressSink>) -> Arc<dyn ResearchClient> {
        Arc::new(
            FirecrawlClient::new(Some(api_key))
                .with_api_base(self.api_base.as_str())
                .with_timeout(self.timeout)
                .with_sink(sink),
        )
    }
}
