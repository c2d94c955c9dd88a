//! Error types for the engine binary.

use lexidrift_core::SimError;

/// Errors that can occur while driving a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A coordinator operation failed.
    #[error("simulation failure: {source}")]
    Sim {
        /// The underlying coordinator error.
        #[from]
        source: SimError,
    },
}
