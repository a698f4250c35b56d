use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons an idea is rejected before any agent runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdeaError {
    #[error("Please enter an idea first!")]
    Empty,
}

/// StartupIdea value object holding the user's free-text idea
///
/// # Invariants
/// - Surrounding whitespace is trimmed
/// - Is never empty after trimming
/// - Is immutable after construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupIdea(String);

impl StartupIdea {
    /// Creates a new StartupIdea value object
    ///
    /// # Returns
    /// * `Ok(StartupIdea)` - If the idea is usable
    /// * `Err(IdeaError)` - If the idea is blank
    ///
    /// # Example
    /// ```
    /// use startup_architect::domain::StartupIdea;
    ///
    /// let idea = StartupIdea::new("  AI for Norway travel ").expect("valid idea");
    /// assert_eq!(idea.as_str(), "AI for Norway travel");
    /// ```
    pub fn new(idea: impl AsRef<str>) -> Result<Self, IdeaError> {
        let trimmed = idea.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdeaError::Empty);
        }

        Ok(StartupIdea(trimmed.to_string()))
    }

    /// Returns the idea as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StartupIdea {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
