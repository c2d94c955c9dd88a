//! The population coordinator and generation loop.
//!
//! [`EvolutionSimulator`] owns the agents, the seeded RNG, the monotonic
//! generation counter, and the append-only statistics history. One
//! generation runs in fixed phases:
//!
//! 1. **Communication** -- pair selection and message exchange, pairs
//!    processed in selection order.
//! 2. **Evolution** -- every agent drifts, whether or not it communicated.
//! 3. **Collection** -- a statistics snapshot is appended.
//! 4. **Advance** -- the generation counter increments (checked).
//!
//! Generations are strictly sequential; every stochastic draw comes from
//! the coordinator's single `StdRng`, so a fixed seed reproduces a run
//! exactly. `run_simulation` is idempotent to call again -- it continues
//! from the current generation rather than resetting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use lexidrift_agents::{LanguageAgent, lexicon};
use lexidrift_types::{AgentId, GenerationStats, LanguageSample, MessageType};

use crate::error::SimError;
use crate::params::SimulationParams;
use crate::stats;

/// Number of vocabulary entries a language sample carries by default.
pub const DEFAULT_SAMPLE_WORDS: usize = 10;

/// Number of grammar rules a language sample carries at most.
const SAMPLE_RULE_LIMIT: usize = 5;

/// The population coordinator for one simulation run.
#[derive(Debug)]
pub struct EvolutionSimulator {
    /// Validated run parameters.
    params: SimulationParams,
    /// The single RNG behind every stochastic draw.
    rng: StdRng,
    /// The live population, indexed by dense agent id.
    agents: Vec<LanguageAgent>,
    /// Monotonic generation counter; equals `history.len()` at rest.
    generation: u64,
    /// Append-only per-generation statistics.
    history: Vec<GenerationStats>,
}

impl EvolutionSimulator {
    /// Construct a coordinator with a freshly seeded population.
    ///
    /// Agents share the common seed vocabulary and basic grammar, get
    /// dense ids starting at 0, and the generation counter starts at 0.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if any parameter is outside
    /// its range; no partial coordinator is observable afterward.
    pub fn new(params: SimulationParams) -> Result<Self, SimError> {
        params.validate()?;

        let agents = seed_population(&params);
        let rng = StdRng::seed_from_u64(params.seed);

        Ok(Self {
            params,
            rng,
            agents,
            generation: 0,
            history: Vec::new(),
        })
    }

    /// Reassemble a coordinator from restored state.
    ///
    /// Used by persistence: the generation counter resumes from the
    /// history length and the RNG is reseeded deterministically from the
    /// seed and that counter.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if the parameters are
    /// invalid or the population size does not match the agent list.
    pub fn from_parts(
        params: SimulationParams,
        agents: Vec<LanguageAgent>,
        history: Vec<GenerationStats>,
    ) -> Result<Self, SimError> {
        params.validate()?;
        if agents.len() != usize::try_from(params.population_size).unwrap_or(usize::MAX) {
            return Err(SimError::InvalidParameter {
                parameter: "population_size",
                value: f64::from(params.population_size),
            });
        }

        let generation = u64::try_from(history.len()).unwrap_or(u64::MAX);
        let rng = StdRng::seed_from_u64(params.seed.wrapping_add(generation));

        Ok(Self {
            params,
            rng,
            agents,
            generation,
            history,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The validated run parameters.
    pub const fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// The current generation counter.
    pub const fn current_generation(&self) -> u64 {
        self.generation
    }

    /// The append-only statistics history, one entry per executed
    /// generation.
    pub fn generation_stats(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Immutable view of the live population.
    pub fn agents(&self) -> &[LanguageAgent] {
        &self.agents
    }

    // -----------------------------------------------------------------------
    // Run loop
    // -----------------------------------------------------------------------

    /// Execute `generations` further generations.
    ///
    /// Idempotent across calls: a second call continues from the current
    /// counter, extending the history rather than discarding it. With
    /// `verbose` set, progress is emitted through `tracing` (every tenth
    /// generation plus the final one); verbosity never alters simulation
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `generations` is zero,
    /// and propagates any generation-step failure, aborting the run.
    pub fn run_simulation(&mut self, generations: u32, verbose: bool) -> Result<(), SimError> {
        if generations == 0 {
            return Err(SimError::InvalidParameter {
                parameter: "generations",
                value: 0.0,
            });
        }

        if verbose {
            info!(
                population_size = self.params.population_size,
                generations,
                mutation_rate = self.params.mutation_rate,
                communication_frequency = self.params.communication_frequency,
                error_rate = self.params.error_rate,
                starting_generation = self.generation,
                "simulation starting"
            );
        }

        for step in 0..generations {
            self.run_generation()?;

            if verbose && (step % 10 == 0 || step.saturating_add(1) == generations) {
                self.log_latest();
            }
        }

        if verbose {
            info!(
                generation = self.generation,
                history_len = self.history.len(),
                "simulation complete"
            );
        }
        Ok(())
    }

    /// Execute one full generation: communicate, evolve, collect, advance.
    fn run_generation(&mut self) -> Result<(), SimError> {
        self.communication_round()?;

        for agent in &mut self.agents {
            agent.evolve_language(self.params.mutation_rate, &mut self.rng)?;
        }

        let snapshot = stats::collect(self.generation, &self.agents);
        self.history.push(snapshot);

        self.generation = self
            .generation
            .checked_add(1)
            .ok_or(SimError::GenerationOverflow)?;
        Ok(())
    }

    /// Run the communication protocol for one generation.
    ///
    /// Draws `round(communication_frequency * population_size)` exchanges.
    /// Each exchange picks a uniform sender, a uniform distinct receiver,
    /// and a uniform message type; the receiver processes the message with
    /// the run's error rate. Pairing ids are resolved against the live
    /// population -- an unresolvable id is a pairing bug and aborts.
    fn communication_round(&mut self) -> Result<(), SimError> {
        let population = self.params.population_size;
        if population < 2 {
            // A lone agent has no one to address.
            return Ok(());
        }

        for _ in 0..self.exchanges_per_generation() {
            let sender = AgentId::new(self.rng.random_range(0..population));
            let mut receiver_raw = self.rng.random_range(0..population.saturating_sub(1));
            if receiver_raw >= sender.into_inner() {
                receiver_raw = receiver_raw.saturating_add(1);
            }
            let receiver = AgentId::new(receiver_raw);

            let type_index = self.rng.random_range(0..MessageType::ALL.len());
            let message_type = MessageType::ALL
                .get(type_index)
                .copied()
                .unwrap_or(MessageType::Statement);

            let sender_index = self.agent_index(sender)?;
            let receiver_index = self.agent_index(receiver)?;

            let mut message = self
                .agents
                .get(sender_index)
                .ok_or(SimError::UnknownAgent(sender))?
                .generate_message(message_type, receiver, &mut self.rng)?;

            let success = self
                .agents
                .get_mut(receiver_index)
                .ok_or(SimError::UnknownAgent(receiver))?
                .receive_message(&mut message, self.params.error_rate, &mut self.rng)?;

            tracing::trace!(
                %sender,
                %receiver,
                %message_type,
                success,
                diverged = message.diverged(),
                "exchange"
            );
        }
        Ok(())
    }

    /// Exchanges drawn per generation: `round(frequency * population)`,
    /// never below zero.
    fn exchanges_per_generation(&self) -> u32 {
        let scaled =
            self.params.communication_frequency * f64::from(self.params.population_size);
        let rounded = scaled.round();
        if rounded <= 0.0 {
            return 0;
        }
        // The frequency is capped at 1.0, so the product fits in u32.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = rounded as u32;
        count
    }

    /// Resolve an agent id against the live population.
    fn agent_index(&self, id: AgentId) -> Result<usize, SimError> {
        let Some(index) = usize::try_from(id.into_inner()).ok() else {
            return Err(SimError::UnknownAgent(id));
        };
        match self.agents.get(index) {
            Some(agent) if agent.agent_id() == id => Ok(index),
            _ => Err(SimError::UnknownAgent(id)),
        }
    }

    /// Log the most recent generation snapshot.
    fn log_latest(&self) {
        if let Some(snapshot) = self.history.last() {
            info!(
                generation = snapshot.generation,
                mean_vocabulary_size = snapshot.mean_vocabulary_size,
                mean_grammar_rules = snapshot.mean_grammar_rules,
                mean_communication_success = snapshot.mean_communication_success,
                total_distinct_words = snapshot.total_distinct_words,
                "generation complete"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Sampling
    // -----------------------------------------------------------------------

    /// Sample one agent's language for reporting collaborators.
    ///
    /// Returns the top-`num_words` vocabulary entries by weight and a
    /// sample of grammar rules. An unknown `agent_id` yields the empty
    /// default sample -- a normal, recoverable query miss, never an error.
    pub fn get_agent_language_sample(&self, agent_id: AgentId, num_words: usize) -> LanguageSample {
        let Ok(index) = self.agent_index(agent_id) else {
            return LanguageSample::default();
        };
        let Some(agent) = self.agents.get(index) else {
            return LanguageSample::default();
        };

        LanguageSample {
            agent_id,
            generation: agent.generation(),
            top_words: agent.vocabulary().top_words(num_words),
            grammar_rules: agent
                .grammar_rules()
                .iter()
                .take(SAMPLE_RULE_LIMIT)
                .cloned()
                .collect(),
            vocabulary_size: agent.vocabulary_size(),
            grammar_rules_count: agent.grammar_rules_count(),
            language_complexity: agent.language_complexity(),
        }
    }
}

/// Seed the population: dense ids, shared vocabulary, basic grammar.
fn seed_population(params: &SimulationParams) -> Vec<LanguageAgent> {
    let capacity = usize::try_from(params.population_size).unwrap_or(0);
    let mut agents = Vec::with_capacity(capacity);
    for index in 0..params.population_size {
        agents.push(LanguageAgent::new(AgentId::new(index), &lexicon::SEED_WORDS));
    }
    agents
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
