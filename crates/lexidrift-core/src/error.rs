//! Error types for the lexidrift-core crate.
//!
//! Validation errors are raised eagerly at the call that receives the bad
//! value, never deferred into the generation loop. A failed generation
//! step aborts the run rather than leaving agents half-mutated.

use lexidrift_agents::AgentError;
use lexidrift_types::AgentId;

/// Errors that can occur in the population coordinator.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A construction or run parameter was outside its valid range.
    #[error("invalid parameter {parameter}: {value} is outside the valid range")]
    InvalidParameter {
        /// The name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The pairing step produced an id absent from the live population.
    ///
    /// Sampling queries never raise this -- an unknown id there is a
    /// normal query miss. Pairing raising it indicates a bug in pair
    /// selection or a corrupted load.
    #[error("pairing resolved unknown agent: {0}")]
    UnknownAgent(AgentId),

    /// The generation counter would overflow.
    #[error("generation counter overflow: cannot advance beyond u64::MAX")]
    GenerationOverflow,

    /// An agent-level operation failed.
    #[error("agent operation failed: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// Reading or writing a save file failed.
    #[error("persistence I/O failure: {source}")]
    PersistenceIo {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A save file could not be serialized or parsed.
    #[error("persistence format failure: {source}")]
    PersistenceFormat {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A save file declared a format version this build cannot read.
    #[error("unsupported save format version {found}, expected {expected}")]
    UnsupportedFormatVersion {
        /// The version found in the file.
        found: u32,
        /// The version this build writes and reads.
        expected: u32,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config YAML: {source}")]
    Config {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },
}
