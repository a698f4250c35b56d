use chrono::Utc;
use uuid::Uuid;

use super::errors::{AgentError, AgentResult};
use super::events::{CrewEvent, EventLog};
use super::types::{AgentProfile, CrewOutput, TaskOutput, TaskSpec};
use super::worker::WorkerAgent;
use crate::llm::{LlmClient, RpmLimiter};

/// Crew of agents working through a fixed list of tasks in order
///
/// # Invariants
/// - There is at least one task
/// - Every task is assigned to an agent of this crew
/// - Context dependencies only point at tasks that run earlier
#[derive(Debug, Clone)]
pub struct Crew {
    pub id: Uuid,
    agents: Vec<AgentProfile>,
    tasks: Vec<TaskSpec>,
    max_rpm: Option<u32>,
}

impl Crew {
    /// Creates a crew, validating the task list against the agents
    pub fn new(
        agents: Vec<AgentProfile>,
        tasks: Vec<TaskSpec>,
        max_rpm: Option<u32>,
    ) -> AgentResult<Self> {
        if tasks.is_empty() {
            return Err(AgentError::NoTasks);
        }

        for (position, task) in tasks.iter().enumerate() {
            if !agents.iter().any(|a| a.id == task.agent_id) {
                return Err(AgentError::UnknownAgent {
                    task: task.id,
                    agent: task.agent_id,
                });
            }

            let earlier = &tasks[..position];
            if let Some(dependency) = task
                .context
                .iter()
                .find(|dep| !earlier.iter().any(|t| t.id == **dep))
            {
                return Err(AgentError::InvalidContext {
                    task: task.id,
                    dependency: *dependency,
                });
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            agents,
            tasks,
            max_rpm,
        })
    }

    pub fn agents(&self) -> &[AgentProfile] {
        &self.agents
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn max_rpm(&self) -> Option<u32> {
        self.max_rpm
    }

    fn agent(&self, task: &TaskSpec) -> AgentResult<&AgentProfile> {
        self.agents
            .iter()
            .find(|a| a.id == task.agent_id)
            .ok_or(AgentError::UnknownAgent {
                task: task.id,
                agent: task.agent_id,
            })
    }

    /// Run every task sequentially and return the last task's output
    ///
    /// All LLM calls of the run share one requests-per-minute budget.
    pub async fn kickoff(&self, llm: &dyn LlmClient) -> AgentResult<CrewOutput> {
        let started_at = Utc::now();
        let limiter = RpmLimiter::new(self.max_rpm);
        let mut log = EventLog::default();
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        log.record(CrewEvent::KickoffStarted {
            crew_id: self.id,
            task_count: self.tasks.len(),
        });

        for task in &self.tasks {
            let agent = self.agent(task)?;
            log.record(CrewEvent::TaskStarted {
                task_id: task.id,
                agent_role: agent.role.clone(),
            });

            let context: Vec<&TaskOutput> = task
                .context
                .iter()
                .filter_map(|dep| outputs.iter().find(|o| o.task_id == *dep))
                .collect();

            let worker = WorkerAgent::new(agent, llm, &limiter);
            let raw = match worker.execute_task(task, &context, &mut log).await {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::error!(crew_id = %self.id, role = %agent.role, error = %err, "Task failed");
                    return Err(err);
                }
            };

            outputs.push(TaskOutput {
                task_id: task.id,
                agent_role: agent.role.clone(),
                description: task.description.clone(),
                raw,
                completed_at: Utc::now(),
            });
            log.record(CrewEvent::TaskCompleted {
                task_id: task.id,
                agent_role: agent.role.clone(),
            });
        }

        log.record(CrewEvent::KickoffCompleted { crew_id: self.id });

        let raw = outputs
            .last()
            .map(|o| o.raw.clone())
            .unwrap_or_default();

        Ok(CrewOutput {
            crew_id: self.id,
            raw,
            tasks_output: outputs,
            events: log.into_events(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}
