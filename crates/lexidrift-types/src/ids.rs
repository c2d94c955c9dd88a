//! Type-safe identifier wrappers.
//!
//! Agents are numbered densely from 0 within their population, so
//! [`AgentId`] wraps a plain `u32` rather than a UUID -- the population
//! is fixed for a run's duration and ids double as stable positions in
//! saved data. [`RunId`] identifies a whole simulation run in persisted
//! snapshots and uses UUID v7 (time-ordered).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an agent within a population.
///
/// Immutable for the agent's lifetime. Populations are fixed-size, so
/// ids are assigned once, densely, at simulator construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Create an agent identifier from its population index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the inner index value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<AgentId> for u32 {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

/// Unique identifier for one simulation run.
///
/// Stamped into saved snapshots so separate runs (and re-saves of the
/// same run) can be told apart downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new run identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RunId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<RunId> for Uuid {
    fn from(id: RunId) -> Self {
        id.0
    }
}
