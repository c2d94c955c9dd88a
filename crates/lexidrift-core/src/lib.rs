//! Population coordinator, generation loop, and persistence for the
//! lexidrift simulation.
//!
//! This crate drives the whole run: it owns the agents, pairs them for
//! communication each generation, triggers language evolution, collects
//! per-generation statistics, and snapshots everything to JSON. It is
//! the only holder of run state -- construct an [`EvolutionSimulator`]
//! explicitly and hand it to reporting collaborators; there is no global
//! simulator.
//!
//! # Modules
//!
//! - [`simulator`] -- [`EvolutionSimulator`]: the generation loop,
//!   pairing, and sampling queries
//! - [`params`] -- validated run parameters and YAML configuration
//! - [`stats`] -- per-generation statistics aggregation
//! - [`persist`] -- atomic JSON snapshot save/load
//! - [`error`] -- error types for coordinator operations ([`SimError`])

pub mod error;
pub mod params;
pub mod persist;
pub mod simulator;
pub mod stats;

// Re-export primary types at crate root for convenience.
pub use error::SimError;
pub use params::{RunConfig, SimulationParams};
pub use persist::{SAVE_FORMAT_VERSION, SaveDocument};
pub use simulator::{DEFAULT_SAMPLE_WORDS, EvolutionSimulator};
