use crate::{agents::Agent, llm::LLMClient, types::Result};
use async_trait::async_trait;

const ELABORATION_AGENT_INSTRUCTIONS: &str = r#"You enhance research reports:
- Add explanations, examples, and case studies.
- Expand key points with context and implications.
- Maintain structure and rigor, no fluff.
- Do not add citations or sources that are not already in the report.
- If the report says the research step failed, elaborate on that outcome instead of inventing findings."#;

/// Agent that expands an initial research report. Has no tools.
pub struct ElaborationAgent {
    llm: Box<dyn LLMClient>,
}

impl ElaborationAgent {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Combine topic and initial report into the agent's single input
    pub fn build_input(topic: &str, initial_report: &str) -> String {
        format!(
            "RESEARCH TOPIC: {}\n\n\
             INITIAL RESEARCH REPORT:\n{}\n\n\
             Enhance this report with additional detail, examples, and deeper insights. \
             Keep it factual and structured.",
            topic, initial_report
        )
    }

    /// Elaborate on a report. Runs even when the report is empty or describes
    /// a failed research step.
    pub async fn elaborate(&self, topic: &str, initial_report: &str) -> Result<String> {
        self.execute(&Self::build_input(topic, initial_report)).await
    }
}

#[async_trait]
impl Agent for ElaborationAgent {
    async fn execute(&self, input: &str) -> Result<String> {
        self.llm
            .generate_with_system(ELABORATION_AGENT_INSTRUCTIONS, input)
            .await
    }

    fn system_prompt(&self) -> String {
        ELABORATION_AGENT_INSTRUCTIONS.to_string()
    }

    fn name(&self) -> &str {
        "elaboration_agent"
    }
}
