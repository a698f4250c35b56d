// Crew event log
//
// Events are traced as they happen and kept on the crew output so the UI can
// show what the crew did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrewEvent {
    KickoffStarted { crew_id: Uuid, task_count: usize },
    TaskStarted { task_id: Uuid, agent_role: String },
    ToolUsed { agent_role: String, tool: String, succeeded: bool },
    RateLimited { waited_secs: u64 },
    TaskCompleted { task_id: Uuid, agent_role: String },
    KickoffCompleted { crew_id: Uuid },
}

impl fmt::Display for CrewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewEvent::KickoffStarted { task_count, .. } => {
                write!(f, "Crew started with {} tasks", task_count)
            }
            CrewEvent::TaskStarted { agent_role, .. } => write!(f, "{} is working", agent_role),
            CrewEvent::ToolUsed {
                agent_role,
                tool,
                succeeded: true,
            } => write!(f, "{} used {}", agent_role, tool),
            CrewEvent::ToolUsed {
                agent_role, tool, ..
            } => write!(f, "{} tried {} (failed)", agent_role, tool),
            CrewEvent::RateLimited { waited_secs } => {
                write!(f, "Waited {}s for the rate limit", waited_secs)
            }
            CrewEvent::TaskCompleted { agent_role, .. } => write!(f, "{} finished", agent_role),
            CrewEvent::KickoffCompleted { .. } => write!(f, "Success!"),
        }
    }
}

/// An event with the time it was recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: CrewEvent,
}

impl TimedEvent {
    pub fn now(event: CrewEvent) -> Self {
        Self {
            at: Utc::now(),
            event,
        }
    }
}

/// Ordered record of a crew run
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<TimedEvent>,
}

impl EventLog {
    /// Trace the event and keep it
    pub fn record(&mut self, event: CrewEvent) {
        tracing::info!(event = ?event, "{}", event);
        self.events.push(TimedEvent::now(event));
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TimedEvent> {
        self.events
    }
}
