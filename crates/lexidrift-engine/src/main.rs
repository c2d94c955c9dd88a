//! Simulation runner binary for lexidrift.
//!
//! Wires together configuration loading, the generation loop, language
//! sampling, and the JSON snapshot. There is no argument parser by
//! design: the only input is an optional config-file path as the first
//! argument, defaulting to `lexidrift.yaml` in the working directory
//! (missing file means defaults).
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load run configuration from YAML
//! 3. Construct the coordinator (parameters validated eagerly)
//! 4. Run the requested generations
//! 5. Log language samples for a few agents
//! 6. Write the JSON snapshot

mod error;

use std::path::Path;

use lexidrift_core::{DEFAULT_SAMPLE_WORDS, EvolutionSimulator, RunConfig};
use lexidrift_types::AgentId;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default config path when no argument is given.
const DEFAULT_CONFIG_PATH: &str = "lexidrift.yaml";

/// Agent ids sampled for the end-of-run report (missing ids are skipped
/// by the sampling query's empty-default contract).
const REPORT_AGENT_IDS: [u32; 3] = [0, 5, 10];

/// Application entry point for the simulation runner.
///
/// # Errors
///
/// Returns an error if configuration loading, the run itself, or the
/// final snapshot fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("lexidrift-engine starting");

    // 2. Load run configuration.
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
    let config = load_config(Path::new(&config_path))?;
    info!(
        population_size = config.simulation.population_size,
        generations = config.generations,
        mutation_rate = config.simulation.mutation_rate,
        communication_frequency = config.simulation.communication_frequency,
        error_rate = config.simulation.error_rate,
        seed = config.simulation.seed,
        "configuration loaded"
    );

    // 3. Construct the coordinator.
    let mut simulator =
        EvolutionSimulator::new(config.simulation.clone()).map_err(EngineError::from)?;

    // 4. Run the requested generations.
    simulator
        .run_simulation(config.generations, config.verbose)
        .map_err(EngineError::from)?;

    // 5. Log language samples for a few agents.
    report_samples(&simulator);

    // 6. Write the JSON snapshot.
    simulator
        .save_simulation_data(Path::new(&config.output_path))
        .map_err(EngineError::from)?;

    info!(
        output_path = config.output_path,
        generation = simulator.current_generation(),
        "lexidrift-engine finished"
    );
    Ok(())
}

/// Load run configuration, falling back to defaults when the file is
/// absent.
fn load_config(path: &Path) -> Result<RunConfig, EngineError> {
    if path.exists() {
        Ok(RunConfig::from_file(path).map_err(EngineError::from)?)
    } else {
        info!(path = %path.display(), "no config file found, using defaults");
        Ok(RunConfig::default())
    }
}

/// Log a language sample for each reporting agent id.
fn report_samples(simulator: &EvolutionSimulator) {
    for id in REPORT_AGENT_IDS {
        let sample = simulator.get_agent_language_sample(AgentId::new(id), DEFAULT_SAMPLE_WORDS);
        if sample.vocabulary_size == 0 {
            continue;
        }
        let top: Vec<&str> = sample
            .top_words
            .iter()
            .take(5)
            .map(|(token, _)| token.as_str())
            .collect();
        info!(
            agent_id = %sample.agent_id,
            generation = sample.generation,
            vocabulary_size = sample.vocabulary_size,
            grammar_rules = sample.grammar_rules_count,
            language_complexity = sample.language_complexity,
            top_words = ?top,
            "agent language sample"
        );
    }
}
