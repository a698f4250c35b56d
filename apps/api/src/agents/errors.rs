use thiserror::Error;
use uuid::Uuid;

use crate::llm::LlmError;

/// Errors that can occur while building or running a crew
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM API error: {0}")]
    LlmError(#[from] LlmError),

    #[error("Invalid response from LLM call for {role}: None or empty")]
    EmptyCompletion { role: String },

    #[error("Crew has no tasks to run")]
    NoTasks,

    #[error("Task {task} is assigned to agent {agent}, which is not part of the crew")]
    UnknownAgent { task: Uuid, agent: Uuid },

    #[error("Task {task} uses task {dependency} as context, but it does not run earlier")]
    InvalidContext { task: Uuid, dependency: Uuid },
}

pub type AgentResult<T> = Result<T, AgentError>;
