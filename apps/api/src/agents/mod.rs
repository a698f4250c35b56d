// Agent system modules
//
// This module contains the crew runner: agent profiles, tasks, the
// per-task worker loop, and the prebuilt startup blueprint crew.

pub mod blueprint;
pub mod crew;
pub mod errors;
pub mod events;
pub mod prompts;
pub mod types;
pub mod worker;

#[cfg(test)]
mod testing;

// Re-export main types
pub use blueprint::{startup_crew, CrewSettings};
pub use crew::Crew;
pub use errors::{AgentError, AgentResult};
pub use events::{CrewEvent, TimedEvent};
pub use types::{AgentProfile, CrewOutput, TaskOutput, TaskSpec};
pub use worker::WorkerAgent;
