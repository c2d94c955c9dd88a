//! Error types for the lexidrift-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Parameter validation happens before any state mutation, so a failed
//! call never leaves an agent half-mutated.

use lexidrift_types::AgentId;

/// Errors that can occur during agent language operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A rate, probability, or weight was outside its valid range.
    #[error("invalid parameter {parameter}: {value} is outside the valid range")]
    InvalidParameter {
        /// The name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A message could not be generated because the agent knows no words.
    #[error("agent {agent_id} has an empty vocabulary and cannot generate content")]
    EmptyVocabulary {
        /// The agent that failed to produce content.
        agent_id: AgentId,
    },
}
