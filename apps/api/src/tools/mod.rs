//! Tools the agents may call while working on a task.

mod search;

pub use search::{format_results, truncate_chars, DuckDuckGoSearch, DEFAULT_SEARCH_ENDPOINT};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::llm::ToolDefinition;

/// Errors raised by a tool invocation
///
/// These are reported back to the model as the tool's result rather than
/// aborting the task.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Search backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the tool's arguments.
    fn parameters_schema(&self) -> Value;

    async fn run(&self, args: Value) -> Result<String, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters_schema())
    }
}
