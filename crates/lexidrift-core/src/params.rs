//! Typed simulation parameters and configuration loading.
//!
//! Parameters are validated eagerly: an out-of-range value fails at the
//! call that receives it, before any agent exists, so no partial
//! coordinator is ever observable. The engine binary reads a small YAML
//! file mirroring these structs; all fields have defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Parameters governing one simulation run.
///
/// All rates are probabilities in [0.0, 1.0]; the population must hold at
/// least one agent. The seed makes every stochastic draw reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of agents in the fixed-size population.
    #[serde(default = "default_population_size")]
    pub population_size: u32,

    /// Per-word drift probability applied each generation.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    /// Fraction of the population exchanging messages each generation.
    #[serde(default = "default_communication_frequency")]
    pub communication_frequency: f64,

    /// Probability that a reception misreads the message.
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            communication_frequency: default_communication_frequency(),
            error_rate: default_error_rate(),
            seed: default_seed(),
        }
    }
}

impl SimulationParams {
    /// Validate every field, failing on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.population_size == 0 {
            return Err(SimError::InvalidParameter {
                parameter: "population_size",
                value: 0.0,
            });
        }
        check_rate("mutation_rate", self.mutation_rate)?;
        check_rate("communication_frequency", self.communication_frequency)?;
        check_rate("error_rate", self.error_rate)?;
        Ok(())
    }
}

/// Validate that a rate lies in [0.0, 1.0].
fn check_rate(parameter: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidParameter { parameter, value })
    }
}

/// Top-level run configuration for the engine binary.
///
/// Mirrors the structure of `lexidrift.yaml`. All fields have defaults,
/// so an empty file (or none at all) yields a runnable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// The simulation parameters.
    #[serde(default)]
    pub simulation: SimulationParams,

    /// Number of generations to execute.
    #[serde(default = "default_generations")]
    pub generations: u32,

    /// Whether to emit per-generation progress.
    #[serde(default = "default_true")]
    pub verbose: bool,

    /// Path the JSON snapshot is written to after the run.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationParams::default(),
            generations: default_generations(),
            verbose: true,
            output_path: default_output_path(),
        }
    }
}

impl RunConfig {
    /// Load run configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::PersistenceIo`] if the file cannot be read, or
    /// [`SimError::Config`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse run configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, SimError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_population_size() -> u32 {
    50
}

const fn default_mutation_rate() -> f64 {
    0.1
}

const fn default_communication_frequency() -> f64 {
    0.5
}

const fn default_error_rate() -> f64 {
    0.1
}

const fn default_seed() -> u64 {
    42
}

const fn default_generations() -> u32 {
    50
}

fn default_output_path() -> String {
    "lexidrift-run.json".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        let params = SimulationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.population_size, 50);
        assert_eq!(params.seed, 42);
    }

    #[test]
    fn zero_population_rejected() {
        let params = SimulationParams {
            population_size: 0,
            ..SimulationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimError::InvalidParameter {
                parameter: "population_size",
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_error_rate_rejected() {
        let params = SimulationParams {
            error_rate: 1.5,
            ..SimulationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimError::InvalidParameter {
                parameter: "error_rate",
                ..
            })
        ));
    }

    #[test]
    fn negative_mutation_rate_rejected() {
        let params = SimulationParams {
            mutation_rate: -0.01,
            ..SimulationParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
simulation:
  population_size: 12
  mutation_rate: 0.2
  communication_frequency: 0.4
  error_rate: 0.05
  seed: 7
generations: 30
verbose: false
output_path: out.json
";
        let config = RunConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.simulation.population_size, 12);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.generations, 30);
        assert!(!config.verbose);
        assert_eq!(config.output_path, "out.json");
    }

    #[test]
    fn parse_minimal_yaml_uses_defaults() {
        let yaml = "simulation:\n  seed: 9\n";
        let config = RunConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.simulation.seed, 9);
        assert_eq!(config.simulation.population_size, 50);
        assert_eq!(config.generations, 50);
        assert!(config.verbose);
    }
}
