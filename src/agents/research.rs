use crate::{
    agents::Agent,
    llm::LLMClient,
    research::ResearchClient,
    types::{ResearchRequest, ResearchResult, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

const RESEARCH_AGENT_INSTRUCTIONS: &str = r#"You are a research assistant that performs deep web research on any topic.
A single deep research call (max_depth=3, time_limit=180, max_urls=10) has been made on your behalf and its result is included in the input.

1) Organize the findings into a structured report with clear sections.
2) Include citations from the provided sources. Cite only the numbered sources listed in the input; never invent sources.
3) Highlight key insights.
4) If the research call failed, state that plainly at the top of the report. Do not write as if research had been performed."#;

/// What the single research call produced, without the result itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub succeeded: bool,
    pub sources_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ResearchResult> for ResearchSummary {
    fn from(result: &ResearchResult) -> Self {
        Self {
            succeeded: result.is_success(),
            sources_count: result.sources_count(),
            error: result.error_message().map(str::to_string),
        }
    }
}

/// Report written by the research agent
#[derive(Debug, Clone)]
pub struct InitialReport {
    pub report: String,
    pub summary: ResearchSummary,
}

/// Agent that runs one deep research call and turns it into a report.
///
/// The research capability is injected, and the agent makes the call itself
/// with the fixed policy from [`ResearchRequest::with_policy`].
pub struct ResearchAgent {
    llm: Box<dyn LLMClient>,
    research: Arc<dyn ResearchClient>,
    fail_fast: bool,
}

impl ResearchAgent {
    pub fn new(llm: Box<dyn LLMClient>, research: Arc<dyn ResearchClient>) -> Self {
        Self {
            llm,
            research,
            fail_fast: false,
        }
    }

    /// When set, a failed research call yields a labelled "research
    /// unavailable" report and the LLM is not invoked.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Research a topic and synthesize the initial report
    pub async fn research(&self, topic: &str) -> Result<InitialReport> {
        let request = ResearchRequest::with_policy(topic);
        let result = self.research.deep_research(&request).await;
        let summary = ResearchSummary::from(&result);

        if self.fail_fast {
            if let ResearchResult::Failure { message } = &result {
                tracing::info!("research failed, returning unavailable report");
                return Ok(InitialReport {
                    report: Self::unavailable_report(topic, message),
                    summary,
                });
            }
        }

        let prompt = Self::build_prompt(topic, &result);
        let report = self
            .llm
            .generate_with_system(RESEARCH_AGENT_INSTRUCTIONS, &prompt)
            .await?;

        Ok(InitialReport { report, summary })
    }

    fn build_prompt(topic: &str, result: &ResearchResult) -> String {
        let mut prompt = format!("RESEARCH TOPIC: {}\n\nDEEP RESEARCH RESULT\n", topic);

        match result {
            ResearchResult::Success {
                final_analysis,
                sources,
                sources_count,
            } => {
                let _ = writeln!(prompt, "status: success");
                let _ = writeln!(prompt, "sources_count: {}\n", sources_count);

                prompt.push_str("FINAL ANALYSIS:\n");
                if final_analysis.trim().is_empty() {
                    prompt.push_str("(the research service returned no analysis)\n");
                } else {
                    prompt.push_str(final_analysis);
                    prompt.push('\n');
                }

                prompt.push_str("\nSOURCES:\n");
                if sources.is_empty() {
                    prompt.push_str("No sources were returned. Do not cite any.\n");
                } else {
                    for (i, source) in sources.iter().enumerate() {
                        if source.url.is_empty() || source.label() == source.url {
                            let _ = writeln!(prompt, "[{}] {}", i + 1, source.label());
                        } else {
                            let _ =
                                writeln!(prompt, "[{}] {} - {}", i + 1, source.label(), source.url);
                        }
                    }
                }

                prompt.push_str(
                    "\nWrite the research report now. Cite only the numbered sources above.",
                );
            }
            ResearchResult::Failure { message } => {
                let _ = writeln!(prompt, "status: failed");
                let _ = writeln!(prompt, "error: {}\n", message);
                prompt.push_str(
                    "The deep research step failed, so there are no findings and no sources. \
                     Say clearly at the top of the report that the research step failed and why. \
                     Do not present background knowledge as research findings and do not cite any sources.",
                );
            }
        }

        prompt
    }

    fn unavailable_report(topic: &str, message: &str) -> String {
        format!(
            "# Research unavailable: {}\n\n\
             The deep research step failed, so no findings or sources were gathered.\n\n\
             **Reason:** {}\n",
            topic, message
        )
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    async fn execute(&self, input: &str) -> Result<String> {
        Ok(self.research(input).await?.report)
    }

    fn system_prompt(&self) -> String {
        RESEARCH_AGENT_INSTRUCTIONS.to_string()
    }

    fn name(&self) -> &str {
        "research_agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppError, Source};
    use serde_json::json;
    use std::sync::Mutex;

    struct EchoLLM;

    #[async_trait]
    impl LLMClient for EchoLLM {
        async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
            Ok(messages
                .last()
                .map(|(_, content)| content.clone())
                .unwrap_or_default())
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct FailingLLM;

    #[async_trait]
    impl LLMClient for FailingLLM {
        async fn generate_with_history(&self, _: &[(String, String)]) -> Result<String> {
            Err(AppError::LLM("provider outage".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct FixedResearch {
        result: ResearchResult,
        requests: Mutex<Vec<ResearchRequest>>,
    }

    impl FixedResearch {
        fn new(result: ResearchResult) -> Arc<Self> {
            Arc::new(Self {
                result,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ResearchClient for FixedResearch {
        async fn deep_research(&self, request: &ResearchRequest) -> ResearchResult {
            self.requests.lock().unwrap().push(request.clone());
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_single_call_with_fixed_policy() {
        let research = FixedResearch::new(ResearchResult::success("X", vec![]));
        let agent = ResearchAgent::new(Box::new(EchoLLM), research.clone());

        agent.research("quantum computing").await.unwrap();

        let requests = research.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], ResearchRequest::with_policy("quantum computing"));
    }

    #[tokio::test]
    async fn test_prompt_carries_analysis_and_sources() {
        let research = FixedResearch::new(ResearchResult::success(
            "X",
            vec![
                Source::from_value(json!({"url": "a"})),
                Source::from_value(json!({"url": "https://b.example", "title": "B"})),
            ],
        ));
        let agent = ResearchAgent::new(Box::new(EchoLLM), research);

        let initial = agent.research("topic").await.unwrap();
        assert!(initial.report.contains("FINAL ANALYSIS:\nX"));
        assert!(initial.report.contains("[1] a"));
        assert!(initial.report.contains("[2] B - https://b.example"));
        assert_eq!(initial.summary.sources_count, 2);
        assert!(initial.summary.succeeded);
    }

    #[tokio::test]
    async fn test_prompt_labels_source_with_null_url() {
        let research = FixedResearch::new(ResearchResult::success(
            "X",
            vec![Source::from_value(json!({"url": null, "title": "Orphan"}))],
        ));
        let agent = ResearchAgent::new(Box::new(EchoLLM), research);

        let initial = agent.research("topic").await.unwrap();
        assert!(initial.report.contains("[1] Orphan\n"));
    }

    #[tokio::test]
    async fn test_failure_is_surfaced_in_prompt() {
        let research = FixedResearch::new(ResearchResult::failure("rate limited"));
        let agent = ResearchAgent::new(Box::new(EchoLLM), research);

        let initial = agent.research("topic").await.unwrap();
        assert!(initial.report.contains("status: failed"));
        assert!(initial.report.contains("rate limited"));
        assert!(!initial.summary.succeeded);
        assert_eq!(initial.summary.error.as_deref(), Some("rate limited"));
    }

    #[tokio::test]
    async fn test_fail_fast_skips_llm() {
        let research = FixedResearch::new(ResearchResult::failure("timed out"));
        let agent = ResearchAgent::new(Box::new(FailingLLM), research).with_fail_fast(true);

        let initial = agent.research("fusion").await.unwrap();
        assert!(initial.report.starts_with("# Research unavailable: fusion"));
        assert!(initial.report.contains("timed out"));
    }

    #[tokio::test]
    async fn test_fail_fast_still_synthesizes_on_success() {
        let research = FixedResearch::new(ResearchResult::success("found it", vec![]));
        let agent = ResearchAgent::new(Box::new(EchoLLM), research).with_fail_fast(true);

        let initial = agent.research("fusion").await.unwrap();
        assert!(initial.report.contains("found it"));
    }

    #[tokio::test]
    async fn test_runtime_fault_propagates() {
        let research = FixedResearch::new(ResearchResult::success("X", vec![]));
        let agent = ResearchAgent::new(Box::new(FailingLLM), research);

        let err = agent.execute("topic").await.unwrap_err();
        assert!(matches!(err, AppError::LLM(_)));
    }

    #[test]
    fn test_agent_metadata() {
        let research = FixedResearch::new(ResearchResult::failure("n/a"));
        let agent = ResearchAgent::new(Box::new(EchoLLM), research);
        assert_eq!(agent.name(), "research_agent");
        assert!(agent.system_prompt().contains("never invent sources"));
    }
}
