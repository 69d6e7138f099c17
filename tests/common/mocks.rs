//! Mock implementations for testing.
//!
//! Scripted LLM clients and factories, a recording research client, and a
//! sink that keeps every progress event, shared across test files.

use async_trait::async_trait;
use deepr::llm::{LLMClient, LLMClientFactoryTrait};
use deepr::progress::{ProgressEvent, ProgressSink};
use deepr::research::{ResearchClient, ResearchClientFactory};
use deepr::types::{AppError, PipelineState, ResearchRequest, ResearchResult, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a mock LLM call returns
#[derive(Debug, Clone)]
pub enum Reply {
    /// Return this text
    Text(String),
    /// Return `echo: <user input>`
    Echo,
    /// Fail with `AppError::LLM`
    Fail(String),
}

/// One recorded LLM invocation
#[derive(Debug, Clone)]
pub struct LlmCall {
    pub system: String,
    pub user: String,
}

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<Reply>,
    calls: Vec<LlmCall>,
}

/// Replies shared by every client a [`MockLLMFactory`] creates.
///
/// Replies are consumed in call order; once the script runs out every call
/// echoes its input.
#[derive(Clone, Default)]
pub struct LlmScript {
    state: Arc<Mutex<ScriptState>>,
}

impl LlmScript {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                replies: replies.into(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn next(&self, call: LlmCall) -> Reply {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.replies.pop_front().unwrap_or(Reply::Echo)
    }
}

/// Mock LLM client driven by an [`LlmScript`]
#[derive(Clone)]
pub struct MockLLMClient {
    script: LlmScript,
}

impl MockLLMClient {
    pub fn new(script: LlmScript) -> Self {
        Self { script }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        let find = |role: &str| {
            messages
                .iter()
                .rev()
                .find(|(r, _)| r == role)
                .map(|(_, content)| content.clone())
                .unwrap_or_default()
        };
        let call = LlmCall {
            system: find("system"),
            user: find("user"),
        };
        let user = call.user.clone();

        match self.script.next(call) {
            Reply::Text(text) => Ok(text),
            Reply::Echo => Ok(format!("echo: {}", user)),
            Reply::Fail(message) => Err(AppError::LLM(message)),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock LLM factory that never touches the network.
///
/// Counts how many clients were created and which keys they were given.
#[derive(Default)]
pub struct MockLLMFactory {
    script: LlmScript,
    created: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl MockLLMFactory {
    pub fn new(script: LlmScript) -> Self {
        Self {
            script,
            created: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    /// A factory whose clients reply with the given texts in order
    pub fn with_replies(replies: &[&str]) -> Self {
        Self::new(LlmScript::new(
            replies.iter().map(|r| Reply::Text(r.to_string())).collect(),
        ))
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.script.calls()
    }
}

#[async_trait]
impl LLMClientFactoryTrait for MockLLMFactory {
    async fn create_client(&self, api_key: &str) -> Result<Box<dyn LLMClient>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(api_key.to_string());
        Ok(Box::new(MockLLMClient::new(self.script.clone())))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Research client that returns a canned result and records every request
pub struct MockResearchClient {
    result: ResearchResult,
    requests: Mutex<Vec<ResearchRequest>>,
}

impl MockResearchClient {
    pub fn new(result: ResearchResult) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ResearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResearchClient for MockResearchClient {
    async fn deep_research(&self, request: &ResearchRequest) -> ResearchResult {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

/// Factory that hands out one shared [`MockResearchClient`]
pub struct MockResearchFactory {
    client: Arc<MockResearchClient>,
    keys: Mutex<Vec<String>>,
}

impl MockResearchFactory {
    pub fn new(result: ResearchResult) -> Self {
        Self {
            client: Arc::new(MockResearchClient::new(result)),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ResearchRequest> {
        self.client.requests()
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

impl ResearchClientFactory for MockResearchFactory {
    fn create_client(
        &self,
        api_key: &str,
        _sink: Arc<dyn ProgressSink>,
    ) -> Arc<dyn ResearchClient> {
        self.keys.lock().unwrap().push(api_key.to_string());
        self.client.clone()
    }
}

/// Sink that keeps every event in order
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Target states of every `StateChanged` event, in order
    pub fn states(&self) -> Vec<PipelineState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::StateChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn notify(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
