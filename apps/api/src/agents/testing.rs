// Test doubles for the crew: a scripted LLM and a recording tool

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::{ChatRequest, ChatResponse, FunctionCall, LlmClient, LlmError, ToolCall};
use crate::tools::{Tool, ToolError};

/// Replays queued responses and records every request
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatResponse::text("unscripted answer")))
    }
}

pub fn tool_call(id: &str, name: &str, arguments: Value) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }],
        usage: None,
    }
}

/// Search stand-in returning a fixed result
#[derive(Default)]
pub struct StubSearch {
    pub queries: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl Tool for StubSearch {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "stub search"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"query": {"type": "string"}}})
    }

    async fn run(&self, args: Value) -> Result<String, ToolError> {
        let query = args["query"].as_str().unwrap_or_default().to_string();
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(ToolError::Backend("offline".to_string()));
        }
        Ok(format!("results for {}", query))
    }
}
