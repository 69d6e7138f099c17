use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============= Credentials =============

/// Environment variable consulted when no session research key is provided
pub const FIRECRAWL_API_KEY_ENV: &str = "FIRECRAWL_API_KEY";

/// Secrets supplied by the caller for a single run.
///
/// The research key falls back to [`FIRECRAWL_API_KEY_ENV`]; the model key
/// has no fallback here.
#[derive(Clone, Default)]
pub struct Credentials {
    pub model_api_key: Option<String>,
    pub research_api_key: Option<String>,
}

/// Credentials after validation, both keys guaranteed non-empty
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub model_api_key: String,
    pub research_api_key: String,
}

impl Credentials {
    pub fn new(model_api_key: impl Into<String>, research_api_key: impl Into<String>) -> Self {
        Self {
            model_api_key: Some(model_api_key.into()),
            research_api_key: Some(research_api_key.into()),
        }
    }

    /// The model-provider key, if present and non-blank
    pub fn model_api_key(&self) -> Option<&str> {
        non_blank(self.model_api_key.as_deref())
    }

    /// The research-service key: session value first, then the environment
    pub fn research_api_key(&self) -> Option<String> {
        resolve_research_key(self.research_api_key.as_deref())
    }

    /// Snapshot both keys, failing if either is missing
    pub fn resolve(&self) -> Result<ResolvedCredentials> {
        match (self.model_api_key(), self.research_api_key()) {
            (Some(model), Some(research)) => Ok(ResolvedCredentials {
                model_api_key: model.to_string(),
                research_api_key: research,
            }),
            (None, Some(_)) => Err(AppError::Configuration(
                "Missing OpenAI API key".to_string(),
            )),
            (Some(_), None) => Err(AppError::Configuration(
                "Missing Firecrawl API key".to_string(),
            )),
            (None, None) => Err(AppError::Configuration(
                "Missing OpenAI and Firecrawl API keys".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("model_api_key", &self.model_api_key.as_deref().map(mask_secret))
            .field(
                "research_api_key",
                &self.research_api_key.as_deref().map(mask_secret),
            )
            .finish()
    }
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("model_api_key", &mask_secret(&self.model_api_key))
            .field("research_api_key", &mask_secret(&self.research_api_key))
            .finish()
    }
}

/// Resolve the research-service key from a session value or the environment
pub fn resolve_research_key(session_key: Option<&str>) -> Option<String> {
    non_blank(session_key)
        .map(str::to_string)
        .or_else(|| {
            std::env::var(FIRECRAWL_API_KEY_ENV)
                .ok()
                .filter(|k| !k.trim().is_empty())
        })
}

/// Hide a secret for display, keeping a short prefix for recognition
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ============= Research Types =============

/// Fixed crawl depth used by the research agent
pub const RESEARCH_MAX_DEPTH: u32 = 3;
/// Fixed service-side time budget used by the research agent
pub const RESEARCH_TIME_LIMIT_SECS: u32 = 180;
/// Fixed URL budget used by the research agent
pub const RESEARCH_MAX_URLS: u32 = 10;

/// Body of a deep research call. Field names are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    #[serde(rename = "maxDepth")]
    pub max_depth: u32,
    #[serde(rename = "timeLimit")]
    pub time_limit_seconds: u32,
    #[serde(rename = "maxUrls")]
    pub max_urls: u32,
}

impl ResearchRequest {
    pub fn new(
        query: impl Into<String>,
        max_depth: u32,
        time_limit_seconds: u32,
        max_urls: u32,
    ) -> Result<Self> {
        for (name, value) in [
            ("max_depth", max_depth),
            ("time_limit_seconds", time_limit_seconds),
            ("max_urls", max_urls),
        ] {
            if value == 0 {
                return Err(AppError::InvalidInput(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        Ok(Self {
            query: query.into(),
            max_depth,
            time_limit_seconds,
            max_urls,
        })
    }

    /// Request with the fixed research policy (depth 3, 180s, 10 URLs)
    pub fn with_policy(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_depth: RESEARCH_MAX_DEPTH,
            time_limit_seconds: RESEARCH_TIME_LIMIT_SECS,
            max_urls: RESEARCH_MAX_URLS,
        }
    }
}

/// A source returned by the research service. Unknown fields are kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Source {
    /// Build a source from an arbitrary JSON entry without failing
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => match serde_json::from_value(Value::Object(map.clone())) {
                Ok(source) => source,
                Err(_) => {
                    // A mistyped known field is dropped; leaving it in `extra`
                    // would collide with the typed field when serialized.
                    let mut extra = map;
                    let mut take = |key: &str| match extra.remove(key) {
                        Some(Value::String(text)) => Some(text),
                        _ => None,
                    };
                    let url = take("url").unwrap_or_default();
                    let title = take("title");
                    let description = take("description");
                    Source {
                        url,
                        title,
                        description,
                        extra,
                    }
                }
            },
            Value::String(url) => Source {
                url,
                ..Default::default()
            },
            other => {
                let mut extra = Map::new();
                extra.insert("value".to_string(), other);
                Source {
                    extra,
                    ..Default::default()
                }
            }
        }
    }

    /// Title if present, otherwise the URL
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.url)
    }
}

/// Outcome of a single deep research call. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResearchResult {
    Success {
        final_analysis: String,
        sources: Vec<Source>,
        sources_count: usize,
    },
    Failure {
        message: String,
    },
}

impl ResearchResult {
    /// Successful result; `sources_count` is derived from `sources`
    pub fn success(final_analysis: impl Into<String>, sources: Vec<Source>) -> Self {
        let sources_count = sources.len();
        ResearchResult::Success {
            final_analysis: final_analysis.into(),
            sources,
            sources_count,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ResearchResult::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResearchResult::Success { .. })
    }

    pub fn sources_count(&self) -> usize {
        match self {
            ResearchResult::Success { sources_count, .. } => *sources_count,
            ResearchResult::Failure { .. } => 0,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ResearchResult::Failure { message } => Some(message),
            ResearchResult::Success { .. } => None,
        }
    }
}

// ============= Pipeline Types =============

/// Orchestrator state for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Researching,
    Elaborating,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Researching)
                | (Researching, Elaborating)
                | (Elaborating, Done)
                | (Researching, Failed)
                | (Elaborating, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Researching => "researching",
            PipelineState::Elaborating => "elaborating",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Stage an error notification belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validation,
    Research,
    Elaboration,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Research => "research",
            Stage::Elaboration => "elaboration",
        };
        f.write_str(name)
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
