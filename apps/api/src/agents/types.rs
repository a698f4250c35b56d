use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::events::TimedEvent;
use crate::llm::LlmSettings;
use crate::tools::Tool;

/// Configuration of one agent: who it is, what it wants, what it may use
#[derive(Clone)]
pub struct AgentProfile {
    pub id: Uuid,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<Arc<dyn Tool>>,
    pub llm: LlmSettings,
    /// Maximum LLM calls spent on tool use before an answer is forced
    pub max_iter: usize,
    pub allow_delegation: bool,
}

impl AgentProfile {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: LlmSettings,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            llm,
            max_iter: 2,
            allow_delegation: false,
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl fmt::Debug for AgentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentProfile")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("backstory", &self.backstory)
            .field("tools", &self.tool_names())
            .field("llm", &self.llm)
            .field("max_iter", &self.max_iter)
            .field("allow_delegation", &self.allow_delegation)
            .finish()
    }
}

/// A unit of work assigned to one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: Uuid,
    pub description: String,
    pub expected_output: String,
    pub agent_id: Uuid,
    /// Earlier tasks whose output is handed to this one
    pub context: Vec<Uuid>,
}

impl TaskSpec {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: &AgentProfile,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent_id: agent.id,
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, task: &TaskSpec) -> Self {
        self.context.push(task.id);
        self
    }
}

/// Output of one finished task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: Uuid,
    pub agent_role: String,
    pub description: String,
    pub raw: String,
    pub completed_at: DateTime<Utc>,
}

/// Result of a whole crew run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewOutput {
    pub crew_id: Uuid,
    /// Output of the last task
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
    pub events: Vec<TimedEvent>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
