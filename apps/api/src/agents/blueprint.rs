//! The startup blueprint crew: a market researcher followed by a technical
//! architect, both parameterized by the user's idea.

use std::sync::Arc;

use super::crew::Crew;
use super::errors::AgentResult;
use super::types::{AgentProfile, TaskSpec};
use crate::domain::StartupIdea;
use crate::llm::LlmSettings;
use crate::tools::Tool;

/// Knobs shared by every agent of the blueprint crew
#[derive(Debug, Clone, PartialEq)]
pub struct CrewSettings {
    pub llm: LlmSettings,
    pub max_iter: usize,
    pub max_rpm: Option<u32>,
}

impl Default for CrewSettings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            max_iter: 2,
            max_rpm: Some(1),
        }
    }
}

pub fn researcher(idea: &StartupIdea, settings: &CrewSettings, search: Arc<dyn Tool>) -> AgentProfile {
    AgentProfile::new(
        "Researcher",
        format!("Find 2 competitors for {}", idea),
        "Market analyst.",
        settings.llm.clone(),
    )
    .with_tool(search)
    .with_max_iter(settings.max_iter)
}

pub fn architect(idea: &StartupIdea, settings: &CrewSettings) -> AgentProfile {
    AgentProfile::new(
        "Architect",
        format!("Suggest a tech stack for {}", idea),
        "Cloud expert.",
        settings.llm.clone(),
    )
    .with_max_iter(settings.max_iter)
}

/// Build the two-agent, two-task crew for `idea`
///
/// The architect's task receives the researcher's output as context.
pub fn startup_crew(
    idea: &StartupIdea,
    settings: &CrewSettings,
    search: Arc<dyn Tool>,
) -> AgentResult<Crew> {
    let researcher = researcher(idea, settings, search);
    let architect = architect(idea, settings);

    let competitors = TaskSpec::new(
        format!("Identify 2 competitors for {}.", idea),
        "A bulleted list of 2 competitors.",
        &researcher,
    );
    let stack = TaskSpec::new(
        format!("Suggest 3 key technologies for the stack of {}.", idea),
        "A tech stack list.",
        &architect,
    )
    .with_context(&competitors);

    Crew::new(
        vec![researcher, architect],
        vec![competitors, stack],
        settings.max_rpm,
    )
}
