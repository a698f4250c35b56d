use std::collections::HashMap;

use super::errors::{AgentError, AgentResult};
use super::events::{CrewEvent, EventLog};
use super::prompts::library;
use super::types::{AgentProfile, TaskOutput, TaskSpec};
use crate::llm::{ChatMessage, ChatRequest, ChatResponse, LlmClient, RpmLimiter, ToolCall};

const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// Worker Agent that executes one task on behalf of an agent profile
///
/// Borrowed for the duration of a single task; the crew owns the profile,
/// the LLM client, and the rate limiter.
pub struct WorkerAgent<'a> {
    profile: &'a AgentProfile,
    llm: &'a dyn LlmClient,
    limiter: &'a RpmLimiter,
}

impl<'a> WorkerAgent<'a> {
    pub fn new(profile: &'a AgentProfile, llm: &'a dyn LlmClient, limiter: &'a RpmLimiter) -> Self {
        Self {
            profile,
            llm,
            limiter,
        }
    }

    /// Run `task` to a final answer
    ///
    /// Up to `max_iter` LLM calls may request tools. Once the cap is hit a
    /// last call with tools disabled forces the answer.
    pub async fn execute_task(
        &self,
        task: &TaskSpec,
        context: &[&TaskOutput],
        log: &mut EventLog,
    ) -> AgentResult<String> {
        let mut messages = vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(self.task_prompt(task, context)),
        ];
        let tool_definitions: Vec<_> = self.profile.tools.iter().map(|t| t.definition()).collect();

        for iteration in 0..self.profile.max_iter {
            let request = ChatRequest::new(&self.profile.llm, messages.clone())
                .with_tools(tool_definitions.clone());
            let response = self.call_llm(&request, log).await?;

            if response.tool_calls.is_empty() {
                return self.final_answer(response);
            }

            tracing::debug!(
                role = %self.profile.role,
                iteration,
                calls = response.tool_calls.len(),
                "Agent requested tools"
            );
            messages.push(ChatMessage::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let result = self.run_tool(call, log).await;
                messages.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        tracing::info!(
            role = %self.profile.role,
            max_iter = self.profile.max_iter,
            "Iteration cap reached, forcing final answer"
        );
        let nudge = library::force_final_answer()
            .render(&HashMap::from([("expected_output", task.expected_output.as_str())]));
        messages.push(ChatMessage::user(nudge));

        let request = ChatRequest::new(&self.profile.llm, messages)
            .with_tools(tool_definitions)
            .without_tool_calls();
        let response = self.call_llm(&request, log).await?;
        self.final_answer(response)
    }

    fn system_prompt(&self) -> String {
        library::agent_system().render(&HashMap::from([
            ("role", self.profile.role.as_str()),
            ("backstory", self.profile.backstory.as_str()),
            ("goal", self.profile.goal.as_str()),
        ]))
    }

    fn task_prompt(&self, task: &TaskSpec, context: &[&TaskOutput]) -> String {
        let context_section = if context.is_empty() {
            String::new()
        } else {
            let joined = context
                .iter()
                .map(|output| output.raw.as_str())
                .collect::<Vec<_>>()
                .join(CONTEXT_SEPARATOR);
            library::context_section().render(&HashMap::from([("context", joined.as_str())]))
        };

        library::task().render(&HashMap::from([
            ("description", task.description.as_str()),
            ("expected_output", task.expected_output.as_str()),
            ("context", context_section.as_str()),
        ]))
    }

    async fn call_llm(&self, request: &ChatRequest, log: &mut EventLog) -> AgentResult<ChatResponse> {
        let waited = self.limiter.acquire().await;
        if !waited.is_zero() {
            log.record(CrewEvent::RateLimited {
                waited_secs: waited.as_secs(),
            });
        }

        Ok(self.llm.chat(request).await?)
    }

    fn final_answer(&self, response: ChatResponse) -> AgentResult<String> {
        match response.content.map(|c| c.trim().to_string()) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(AgentError::EmptyCompletion {
                role: self.profile.role.clone(),
            }),
        }
    }

    /// Execute a tool call and render its outcome for the model
    ///
    /// Failures are returned as text so the model can recover.
    async fn run_tool(&self, call: &ToolCall, log: &mut EventLog) -> String {
        let name = call.function.name.as_str();
        let Some(tool) = self.profile.tools.iter().find(|t| t.name() == name) else {
            log.record(CrewEvent::ToolUsed {
                agent_role: self.profile.role.clone(),
                tool: name.to_string(),
                succeeded: false,
            });
            return format!(
                "Tool '{}' does not exist. Available tools: {}",
                name,
                self.profile.tool_names().join(", ")
            );
        };

        let arguments = if call.function.arguments.trim().is_empty() {
            "{}"
        } else {
            call.function.arguments.as_str()
        };
        let outcome = match serde_json::from_str(arguments) {
            Ok(args) => tool.run(args).await.map_err(|e| e.to_string()),
            Err(e) => Err(format!("Arguments are not valid JSON: {}", e)),
        };

        log.record(CrewEvent::ToolUsed {
            agent_role: self.profile.role.clone(),
            tool: name.to_string(),
            succeeded: outcome.is_ok(),
        });

        match outcome {
            Ok(output) => output,
            Err(error) => format!("Tool {} error: {}", name, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{tool_call, ScriptedLlm, StubSearch};
    use crate::llm::{LlmError, LlmSettings, Role};
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn researcher(search: Arc<StubSearch>) -> AgentProfile {
        AgentProfile::new(
            "Researcher",
            "Find 2 competitors for fjord tours",
            "Market analyst.",
            LlmSettings::default(),
        )
        .with_tool(search)
        .with_max_iter(2)
    }

    fn task(agent: &AgentProfile) -> TaskSpec {
        TaskSpec::new(
            "Identify 2 competitors for fjord tours.",
            "A bulleted list of 2 competitors.",
            agent,
        )
    }

    #[tokio::test]
    async fn plain_answer_finishes_in_one_call() {
        let profile = researcher(Arc::new(StubSearch::default()));
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::text("  - Acme\n- Globex  "))]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();

        let answer = WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[], &mut log)
            .await
            .unwrap();

        assert_eq!(answer, "- Acme\n- Globex");
        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::System);
        let system = requests[0].messages[0].content.as_deref().unwrap();
        assert!(system.contains("You are Researcher. Market analyst."));
        let user = requests[0].messages[1].content.as_deref().unwrap();
        assert!(user.contains("Identify 2 competitors for fjord tours."));
        assert!(requests[0].tools.as_ref().is_some_and(|t| t.len() == 1));
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let search = Arc::new(StubSearch::default());
        let profile = researcher(search.clone());
        let llm = ScriptedLlm::new(vec![
            Ok(tool_call("call_1", "duckduckgo_search", json!({"query": "fjord tour apps"}))),
            Ok(ChatResponse::text("- Acme")),
        ]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();

        let answer = WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[], &mut log)
            .await
            .unwrap();

        assert_eq!(answer, "- Acme");
        assert_eq!(*search.queries.lock().unwrap(), vec!["fjord tour apps"]);

        let requests = llm.requests();
        let second = &requests[1];
        let tool_message = second.messages.last().unwrap();
        assert_eq!(tool_message.role, Role::Tool);
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(
            tool_message.content.as_deref(),
            Some("results for fjord tour apps")
        );
        assert!(log.events().iter().any(|e| matches!(
            &e.event,
            CrewEvent::ToolUsed { succeeded: true, .. }
        )));
    }

    #[tokio::test]
    async fn tool_failure_is_reported_to_the_model() {
        let search = Arc::new(StubSearch {
            fail: true,
            ..Default::default()
        });
        let profile = researcher(search);
        let llm = ScriptedLlm::new(vec![
            Ok(tool_call("call_1", "duckduckgo_search", json!({"query": "x"}))),
            Ok(ChatResponse::text("- Acme")),
        ]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();

        let answer = WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[], &mut log)
            .await
            .unwrap();

        assert_eq!(answer, "- Acme");
        let tool_message = llm.requests()[1].messages.last().unwrap().clone();
        assert!(tool_message
            .content
            .unwrap()
            .starts_with("Tool duckduckgo_search error:"));
    }

    #[tokio::test]
    async fn unknown_tool_lists_available_tools() {
        let profile = researcher(Arc::new(StubSearch::default()));
        let llm = ScriptedLlm::new(vec![
            Ok(tool_call("call_1", "web_browser", json!({}))),
            Ok(ChatResponse::text("done")),
        ]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();

        WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[], &mut log)
            .await
            .unwrap();

        let tool_message = llm.requests()[1].messages.last().unwrap().clone();
        assert_eq!(
            tool_message.content.as_deref(),
            Some("Tool 'web_browser' does not exist. Available tools: duckduckgo_search")
        );
    }

    #[tokio::test]
    async fn iteration_cap_forces_final_answer() {
        let profile = researcher(Arc::new(StubSearch::default()));
        let llm = ScriptedLlm::new(vec![
            Ok(tool_call("call_1", "duckduckgo_search", json!({"query": "a"}))),
            Ok(tool_call("call_2", "duckduckgo_search", json!({"query": "b"}))),
            Ok(ChatResponse::text("- Acme\n- Globex")),
        ]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();

        let answer = WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[], &mut log)
            .await
            .unwrap();

        assert_eq!(answer, "- Acme\n- Globex");
        let requests = llm.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].tool_choice.as_deref(), Some("none"));
        let nudge = requests[2].messages.last().unwrap();
        assert_eq!(nudge.role, Role::User);
        assert!(nudge
            .content
            .as_deref()
            .unwrap()
            .contains("A bulleted list of 2 competitors."));
    }

    #[tokio::test]
    async fn empty_answer_is_an_error() {
        let profile = researcher(Arc::new(StubSearch::default()));
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::text("   "))]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();

        let err = WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[], &mut log)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::EmptyCompletion { ref role } if role == "Researcher"));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let profile = researcher(Arc::new(StubSearch::default()));
        let llm = ScriptedLlm::new(vec![Err(LlmError::Network("reset".into()))]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();

        let err = WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[], &mut log)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::LlmError(LlmError::Network(_))));
    }

    #[tokio::test]
    async fn context_outputs_are_included() {
        let profile = researcher(Arc::new(StubSearch::default()));
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::text("Rust, Postgres, Kafka"))]);
        let limiter = RpmLimiter::new(None);
        let mut log = EventLog::default();
        let earlier = TaskOutput {
            task_id: Uuid::new_v4(),
            agent_role: "Researcher".to_string(),
            description: "earlier".to_string(),
            raw: "- Acme\n- Globex".to_string(),
            completed_at: Utc::now(),
        };

        WorkerAgent::new(&profile, &llm, &limiter)
            .execute_task(&task(&profile), &[&earlier], &mut log)
            .await
            .unwrap();

        let user = llm.requests()[0].messages[1].content.clone().unwrap();
        assert!(user.contains("This is the context you're working with:\n- Acme\n- Globex"));
    }
}
