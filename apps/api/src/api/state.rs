use std::sync::Arc;

use crate::agents::{startup_crew, AgentResult, CrewOutput, CrewSettings};
use crate::domain::StartupIdea;
use crate::llm::LlmClient;
use crate::tools::Tool;

/// Shared handler state
///
/// Holds only immutable collaborators; every request builds a fresh crew.
#[derive(Clone)]
pub struct AppState {
    pub crew: Arc<CrewSettings>,
    pub llm: Arc<dyn LlmClient>,
    pub search: Arc<dyn Tool>,
}

impl AppState {
    pub fn new(crew: CrewSettings, llm: Arc<dyn LlmClient>, search: Arc<dyn Tool>) -> Self {
        Self {
            crew: Arc::new(crew),
            llm,
            search,
        }
    }

    /// Build the blueprint crew for `idea` and run it to completion
    pub async fn run_blueprint(&self, idea: &StartupIdea) -> AgentResult<CrewOutput> {
        let crew = startup_crew(idea, &self.crew, self.search.clone())?;
        tracing::info!(crew_id = %crew.id, idea = %idea, "Kicking off crew");
        crew.kickoff(self.llm.as_ref()).await
    }
}
