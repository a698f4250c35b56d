// Domain layer module exports
// The domain is independent of the LLM provider and the HTTP layer

pub mod idea;

pub use idea::{IdeaError, StartupIdea};
