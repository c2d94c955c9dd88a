//! JSON snapshot persistence for whole simulation runs.
//!
//! A save captures everything observable: parameters, the full agent
//! population (vocabularies, grammars, derived counters), and the
//! per-generation history. Loading reconstructs a coordinator whose next
//! `run_simulation` call continues the generation counter from the
//! history's length.
//!
//! Writes go to a sibling temp file first and are renamed into place, so
//! a crash mid-write never leaves a truncated snapshot at the target
//! path. Saves never interleave with the generation loop.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lexidrift_agents::LanguageAgent;
use lexidrift_types::{GenerationStats, RunId};

use crate::error::SimError;
use crate::params::SimulationParams;
use crate::simulator::EvolutionSimulator;

/// The snapshot format version this build writes and reads.
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// The on-disk snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    /// Snapshot format version for forward-compatibility checks.
    pub format_version: u32,
    /// Identifier of the run that produced this snapshot.
    pub run_id: RunId,
    /// Wall-clock time the snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// The simulation parameters.
    pub parameters: SimulationParams,
    /// The full agent population.
    pub agents: Vec<LanguageAgent>,
    /// The ordered per-generation statistics history.
    pub history: Vec<GenerationStats>,
}

impl EvolutionSimulator {
    /// Write the full simulation state to `path` as pretty JSON.
    ///
    /// The write is atomic with respect to the target path: content goes
    /// to a `.tmp` sibling first, then renames over the target.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PersistenceIo`] on any filesystem failure and
    /// [`SimError::PersistenceFormat`] if serialization fails; failures
    /// are surfaced to the caller, never swallowed.
    pub fn save_simulation_data(&self, path: &Path) -> Result<(), SimError> {
        let document = SaveDocument {
            format_version: SAVE_FORMAT_VERSION,
            run_id: RunId::new(),
            saved_at: Utc::now(),
            parameters: self.params().clone(),
            agents: self.agents().to_vec(),
            history: self.generation_stats().to_vec(),
        };

        let bytes = serde_json::to_vec_pretty(&document)?;

        let staging = staging_path(path);
        std::fs::write(&staging, bytes)?;
        std::fs::rename(&staging, path)?;

        tracing::info!(
            path = %path.display(),
            generations = document.history.len(),
            agents = document.agents.len(),
            "simulation data saved"
        );
        Ok(())
    }

    /// Reconstruct a simulator from a snapshot written by
    /// [`Self::save_simulation_data`].
    ///
    /// The loaded coordinator's generation counter equals the history
    /// length, so further `run_simulation` calls extend the run.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PersistenceIo`] if the file cannot be read,
    /// [`SimError::PersistenceFormat`] if it is not a valid snapshot,
    /// [`SimError::UnsupportedFormatVersion`] on a version mismatch, and
    /// [`SimError::InvalidParameter`] if the stored parameters fail
    /// validation.
    pub fn load_simulation_data(path: &Path) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path)?;
        let document: SaveDocument = serde_json::from_str(&contents)?;

        if document.format_version != SAVE_FORMAT_VERSION {
            return Err(SimError::UnsupportedFormatVersion {
                found: document.format_version,
                expected: SAVE_FORMAT_VERSION,
            });
        }

        tracing::info!(
            path = %path.display(),
            run_id = %document.run_id,
            generations = document.history.len(),
            "simulation data loaded"
        );

        Self::from_parts(document.parameters, document.agents, document.history)
    }
}

/// The sibling temp path used for atomic writes.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use lexidrift_types::AgentId;

    use super::*;

    fn scratch_file(tag: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("lexidrift-{tag}-{}.json", uuid::Uuid::now_v7()));
        path
    }

    fn built_simulator(seed: u64) -> Option<EvolutionSimulator> {
        let params = SimulationParams {
            population_size: 5,
            mutation_rate: 0.2,
            communication_frequency: 0.6,
            error_rate: 0.15,
            seed,
        };
        let mut sim = EvolutionSimulator::new(params).ok()?;
        sim.run_simulation(8, false).ok()?;
        Some(sim)
    }

    #[test]
    fn roundtrip_preserves_observable_state() {
        let sim = built_simulator(21);
        assert!(sim.is_some());
        let Some(sim) = sim else { return };

        let path = scratch_file("roundtrip");
        assert!(sim.save_simulation_data(&path).is_ok());

        let loaded = EvolutionSimulator::load_simulation_data(&path);
        assert!(loaded.is_ok());
        if let Ok(loaded) = loaded {
            assert_eq!(loaded.params(), sim.params());
            assert_eq!(loaded.agents(), sim.agents());
            assert_eq!(loaded.generation_stats(), sim.generation_stats());
            assert_eq!(loaded.current_generation(), 8);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loaded_simulator_continues_the_counter() {
        let sim = built_simulator(22);
        assert!(sim.is_some());
        let Some(sim) = sim else { return };

        let path = scratch_file("continue");
        assert!(sim.save_simulation_data(&path).is_ok());

        let loaded = EvolutionSimulator::load_simulation_data(&path);
        assert!(loaded.is_ok());
        if let Ok(mut loaded) = loaded {
            assert!(loaded.run_simulation(4, false).is_ok());
            assert_eq!(loaded.current_generation(), 12);
            assert_eq!(loaded.generation_stats().len(), 12);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let path = scratch_file("missing");
        let result = EvolutionSimulator::load_simulation_data(&path);
        assert!(matches!(result, Err(SimError::PersistenceIo { .. })));
    }

    #[test]
    fn malformed_json_surfaces_format_error() {
        let path = scratch_file("malformed");
        assert!(std::fs::write(&path, b"{ not json").is_ok());
        let result = EvolutionSimulator::load_simulation_data(&path);
        assert!(matches!(result, Err(SimError::PersistenceFormat { .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn version_mismatch_rejected() {
        let sim = built_simulator(23);
        assert!(sim.is_some());
        let Some(sim) = sim else { return };

        let path = scratch_file("version");
        assert!(sim.save_simulation_data(&path).is_ok());

        // Rewrite the snapshot with a bumped version.
        let contents = std::fs::read_to_string(&path).unwrap_or_default();
        let reparsed: Result<SaveDocument, _> = serde_json::from_str(&contents);
        assert!(reparsed.is_ok());
        if let Ok(mut doc) = reparsed {
            doc.format_version = 99;
            let rewritten = serde_json::to_vec_pretty(&doc).unwrap_or_default();
            assert!(std::fs::write(&path, rewritten).is_ok());
        }

        let result = EvolutionSimulator::load_simulation_data(&path);
        assert!(matches!(
            result,
            Err(SimError::UnsupportedFormatVersion {
                found: 99,
                expected: SAVE_FORMAT_VERSION,
            })
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let sim = built_simulator(24);
        assert!(sim.is_some());
        let Some(sim) = sim else { return };

        let path = scratch_file("tempclean");
        assert!(sim.save_simulation_data(&path).is_ok());
        assert!(!staging_path(&path).exists());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn sample_works_on_loaded_population() {
        let sim = built_simulator(25);
        assert!(sim.is_some());
        let Some(sim) = sim else { return };

        let path = scratch_file("sample");
        assert!(sim.save_simulation_data(&path).is_ok());

        let loaded = EvolutionSimulator::load_simulation_data(&path);
        assert!(loaded.is_ok());
        if let Ok(loaded) = loaded {
            let sample = loaded.get_agent_language_sample(AgentId::new(0), 5);
            assert_eq!(sample.top_words.len(), 5);
            let fresh_sample = sim.get_agent_language_sample(AgentId::new(0), 5);
            assert_eq!(sample, fresh_sample);
        }

        let _ = std::fs::remove_file(&path);
    }
}
