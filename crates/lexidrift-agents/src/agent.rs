//! The language agent: message generation, interpretation, and drift.
//!
//! A [`LanguageAgent`] exclusively owns one [`Vocabulary`] and one ordered
//! grammar-rule sequence. All mutation goes through its methods, invoked
//! one at a time by the coordinator, which keeps the single-writer
//! invariant structural rather than conventional.
//!
//! # Reception outcomes
//!
//! [`LanguageAgent::receive_message`] distinguishes three cases:
//!
//! 1. **Error injected** (probability `error_rate`): the agent misreads
//!    the content, adopts perturbed tokens as new or reweighted entries
//!    tagged with a mishearing meaning, and returns `false`.
//! 2. **Recognition success**: no error, and enough of the tokens are
//!    already known. Recognized words are reinforced, a novel content
//!    pattern may become a grammar rule, and the call returns `true`.
//! 3. **Recognition failure**: no error, but the vocabulary gap is too
//!    wide. Nothing mutates and the call returns `false`.
//!
//! Statistics are derived from counters, never authoritative state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use lexidrift_types::{AgentId, GrammarRule, Message, MessageType, Vocabulary};

use crate::error::AgentError;
use crate::lexicon;

/// One agent's complete language state and communication history counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageAgent {
    /// Immutable identifier, unique within the population.
    agent_id: AgentId,
    /// The agent's own generation counter, advanced by each evolution step.
    generation: u64,
    /// The word inventory, exclusively owned.
    vocabulary: Vocabulary,
    /// Ordered grammar rules; later entries are more recently created.
    grammar_rules: Vec<GrammarRule>,
    /// Receptions that ended in recognition success.
    successful_communications: u64,
    /// All receptions, successful or not.
    total_communications: u64,
    /// Words added through mishearing or drift.
    words_coined: u64,
    /// Grammar rules added through learning or innovation.
    rules_coined: u64,
}

impl LanguageAgent {
    /// Create an agent with the given seed tokens at full weight and the
    /// basic starting grammar.
    pub fn new(agent_id: AgentId, seed_tokens: &[&str]) -> Self {
        Self {
            agent_id,
            generation: 0,
            vocabulary: lexicon::seed_vocabulary(seed_tokens, 0),
            grammar_rules: lexicon::seed_grammar_rules(),
            successful_communications: 0,
            total_communications: 0,
            words_coined: 0,
            rules_coined: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only accessors (never fail; zero/empty before any history)
    // -----------------------------------------------------------------------

    /// The agent's identifier.
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// The agent's own generation counter.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Immutable view of the word inventory.
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Immutable view of the ordered grammar rules.
    pub fn grammar_rules(&self) -> &[GrammarRule] {
        &self.grammar_rules
    }

    /// Number of distinct words known.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.word_count()
    }

    /// Number of grammar rules held.
    pub fn grammar_rules_count(&self) -> usize {
        self.grammar_rules.len()
    }

    /// Words added through mishearing or drift since creation.
    pub const fn words_coined(&self) -> u64 {
        self.words_coined
    }

    /// Grammar rules added through learning or innovation since creation.
    pub const fn rules_coined(&self) -> u64 {
        self.rules_coined
    }

    /// Total receptions processed, successful or not.
    pub const fn total_communications(&self) -> u64 {
        self.total_communications
    }

    /// Fraction of receptions that ended in recognition success.
    ///
    /// Always in [0.0, 1.0]; 0.0 for an agent with no history yet.
    pub fn communication_success_rate(&self) -> f64 {
        if self.total_communications == 0 {
            return 0.0;
        }
        ratio(self.successful_communications, self.total_communications)
    }

    /// Derived language-complexity score.
    ///
    /// `0.1 * |words| + 0.2 * |rules| + 0.05 * sum(|meanings|)`.
    pub fn language_complexity(&self) -> f64 {
        let meaning_count: usize = self.vocabulary.meanings.values().map(std::collections::BTreeSet::len).sum();
        approx(self.vocabulary.word_count()) * 0.1
            + approx(self.grammar_rules.len()) * 0.2
            + approx(meaning_count) * 0.05
    }

    // -----------------------------------------------------------------------
    // Message generation
    // -----------------------------------------------------------------------

    /// Generate a message of the given type addressed to `receiver_id`.
    ///
    /// Content tokens are drawn from the vocabulary weighted by usage
    /// weight, then grammar rules whose pattern occurs in the draft are
    /// rolled against their frequency and applied, the most recently
    /// created rule shadowing older rules with the same pattern. The
    /// sender's own state is untouched.
    ///
    /// Target resolution is the coordinator's responsibility; the agent
    /// has no population visibility.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyVocabulary`] if the agent knows no words.
    pub fn generate_message(
        &self,
        message_type: MessageType,
        receiver_id: AgentId,
        rng: &mut impl Rng,
    ) -> Result<Message, AgentError> {
        let draft = self.draft_content(message_type, rng)?;
        let content = self.apply_grammar(draft, rng);

        Ok(Message {
            sender_id: self.agent_id,
            receiver_id,
            content,
            message_type,
            generation: self.generation,
            original_content: None,
        })
    }

    /// Draft raw content for a message type before grammar application.
    fn draft_content(
        &self,
        message_type: MessageType,
        rng: &mut impl Rng,
    ) -> Result<String, AgentError> {
        match message_type {
            MessageType::Greeting => Ok(String::from(choose(&lexicon::GREETING_FORMS, rng))),
            MessageType::Question => {
                let interrogative = choose(&lexicon::QUESTION_WORDS, rng);
                let topic = self.select_weighted(rng)?;
                Ok(format!("{interrogative} {topic}"))
            }
            MessageType::Statement => {
                let subject = self.select_weighted(rng)?;
                let predicate = self.select_weighted(rng)?;
                Ok(format!("{subject} {predicate}"))
            }
            MessageType::Request => {
                let object = self.select_weighted(rng)?;
                Ok(format!("please {object}"))
            }
            MessageType::Response => self.select_weighted(rng),
        }
    }

    /// Weighted token selection: heavier words win proportionally more
    /// often; equal weights resolve through the inventory's sorted order
    /// under the single RNG stream.
    fn select_weighted(&self, rng: &mut impl Rng) -> Result<String, AgentError> {
        if self.vocabulary.words.is_empty() {
            return Err(AgentError::EmptyVocabulary {
                agent_id: self.agent_id,
            });
        }

        let total: f64 = self.vocabulary.words.values().sum();
        if total <= 0.0 {
            // All weights zero: uniform over the sorted inventory.
            let index = rng.random_range(0..self.vocabulary.words.len());
            return Ok(self
                .vocabulary
                .words
                .keys()
                .nth(index)
                .cloned()
                .unwrap_or_default());
        }

        let mut remaining = rng.random::<f64>() * total;
        for (token, weight) in &self.vocabulary.words {
            remaining -= *weight;
            if remaining < 0.0 {
                return Ok(token.clone());
            }
        }
        // Float rounding can leave a sliver; the heaviest-keyed last entry
        // absorbs it.
        Ok(self
            .vocabulary
            .words
            .keys()
            .next_back()
            .cloned()
            .unwrap_or_default())
    }

    /// Apply grammar rules to drafted content.
    ///
    /// For each distinct pattern the most recently created rule wins;
    /// each winning rule whose pattern occurs in the content is rolled
    /// against its frequency and, on success, substituted throughout.
    fn apply_grammar(&self, draft: String, rng: &mut impl Rng) -> String {
        let mut effective: std::collections::BTreeMap<&str, &GrammarRule> =
            std::collections::BTreeMap::new();
        for rule in &self.grammar_rules {
            // Later rules overwrite earlier ones sharing a pattern.
            effective.insert(rule.pattern.as_str(), rule);
        }

        let mut content = draft;
        for rule in effective.values() {
            if content.contains(&rule.pattern)
                && rng.random::<f64>() < rule.frequency.min(lexicon::MAX_WORD_WEIGHT)
            {
                content = content.replace(&rule.pattern, &rule.replacement);
            }
        }
        content
    }

    // -----------------------------------------------------------------------
    // Message reception
    // -----------------------------------------------------------------------

    /// Interpret a received message, possibly erroneously.
    ///
    /// Returns `true` iff no error was injected and the agent recognized
    /// the content (token overlap at or above the recognition threshold).
    /// On an injected error the message is rewritten in place: `content`
    /// becomes the corrupted reading and `original_content` records the
    /// sender's rendering, when the two actually diverge.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidParameter`] if `error_rate` is outside
    /// [0.0, 1.0]; validation happens before any mutation.
    pub fn receive_message(
        &mut self,
        message: &mut Message,
        error_rate: f64,
        rng: &mut impl Rng,
    ) -> Result<bool, AgentError> {
        lexicon::validate_rate("error_rate", error_rate)?;

        self.total_communications = self.total_communications.saturating_add(1);

        if rng.random::<f64>() < error_rate {
            self.misinterpret(message, rng);
            return Ok(false);
        }

        let tokens: Vec<&str> = message.content.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(false);
        }

        let known = tokens
            .iter()
            .filter(|token| self.vocabulary.contains(token))
            .count();
        if ratio_usize(known, tokens.len()) < lexicon::RECOGNITION_THRESHOLD {
            // Pure vocabulary gap: recognition failure, no mutation.
            return Ok(false);
        }

        for token in &tokens {
            self.reinforce(token);
        }
        self.learn_rule_from_novelty(&tokens, message.generation);

        self.successful_communications = self.successful_communications.saturating_add(1);
        Ok(true)
    }

    /// Corrupt the reading of a message and adopt the misheard tokens.
    fn misinterpret(&mut self, message: &mut Message, rng: &mut impl Rng) {
        let intended = message.content.clone();
        let mut heard_tokens: Vec<String> = Vec::new();
        let mut diverged = false;

        for token in intended.split_whitespace() {
            if rng.random::<f64>() < lexicon::TOKEN_CORRUPTION_CHANCE {
                let heard = lexicon::perturb_token(token, rng);
                if heard != token {
                    diverged = true;
                    self.adopt_misheard(&heard, token);
                }
                heard_tokens.push(heard);
            } else {
                heard_tokens.push(String::from(token));
            }
        }

        if diverged {
            message.content = heard_tokens.join(" ");
            message.original_content = Some(intended);
        }
    }

    /// Record a misheard token as a new or reweighted vocabulary entry,
    /// tagged with a meaning distinct from the sender's intended one.
    fn adopt_misheard(&mut self, heard: &str, intended: &str) {
        if let Some(weight) = self.vocabulary.words.get_mut(heard) {
            *weight = (*weight + lexicon::REINFORCEMENT_STEP).min(lexicon::MAX_WORD_WEIGHT);
        } else {
            self.vocabulary
                .words
                .insert(String::from(heard), lexicon::MISHEARD_WORD_WEIGHT);
            self.words_coined = self.words_coined.saturating_add(1);
            tracing::debug!(
                agent = %self.agent_id,
                heard,
                intended,
                "adopted misheard token"
            );
        }
        self.vocabulary
            .meanings
            .entry(String::from(heard))
            .or_default()
            .insert(format!("misheard:{intended}"));
    }

    /// Reinforce a recognized word's usage weight.
    fn reinforce(&mut self, token: &str) {
        if let Some(weight) = self.vocabulary.words.get_mut(token) {
            *weight = (*weight + lexicon::REINFORCEMENT_STEP).min(lexicon::MAX_WORD_WEIGHT);
        }
    }

    /// Record a novel grammar pattern from successfully recognized content.
    ///
    /// A recognized content that still carries an unfamiliar token is
    /// evidence of structure drifting elsewhere in the population: the
    /// receiver rationalizes the unfamiliar form toward a familiar one,
    /// recording `unfamiliar -> familiar` as a rule stamped with the
    /// message generation. Content made entirely of known tokens teaches
    /// nothing, so an undrifted population's grammar stays put.
    fn learn_rule_from_novelty(&mut self, tokens: &[&str], generation: u64) {
        let Some(novel) = tokens.iter().find(|t| !self.vocabulary.contains(t)) else {
            return;
        };
        let Some(anchor) = tokens.iter().find(|t| self.vocabulary.contains(t)) else {
            return;
        };
        if self.grammar_rules.iter().any(|rule| rule.pattern == **novel) {
            return;
        }
        self.grammar_rules.push(GrammarRule {
            pattern: String::from(*novel),
            replacement: String::from(*anchor),
            frequency: lexicon::LEARNED_RULE_FREQUENCY,
            generation_created: generation,
        });
        self.rules_coined = self.rules_coined.saturating_add(1);
    }

    // -----------------------------------------------------------------------
    // Evolution
    // -----------------------------------------------------------------------

    /// Apply one generation of autonomous drift.
    ///
    /// Each existing word spawns, with probability `mutation_rate`, a
    /// novel perturbed counterpart inheriting its meanings and half its
    /// weight; the source word remains. Independently, with probability
    /// `mutation_rate / 2`, a spontaneous grammar rule appears. Callable
    /// for agents that did not communicate this generation.
    ///
    /// Growth per call is bounded by the pre-call word count, and with
    /// `mutation_rate = 1.0` the vocabulary exactly doubles.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidParameter`] if `mutation_rate` is
    /// outside [0.0, 1.0]; validation happens before any mutation.
    pub fn evolve_language(
        &mut self,
        mutation_rate: f64,
        rng: &mut impl Rng,
    ) -> Result<(), AgentError> {
        lexicon::validate_rate("mutation_rate", mutation_rate)?;

        let snapshot: Vec<(String, f64)> = self
            .vocabulary
            .words
            .iter()
            .map(|(token, weight)| (token.clone(), *weight))
            .collect();

        for (token, weight) in snapshot {
            if rng.random::<f64>() < mutation_rate {
                let drifted = lexicon::perturb_token_novel(&token, &self.vocabulary.words, rng);
                let inherited = self.vocabulary.meanings.get(&token).cloned();
                self.vocabulary
                    .words
                    .insert(drifted.clone(), weight * lexicon::DRIFT_WEIGHT_FACTOR);
                if let Some(meanings) = inherited {
                    self.vocabulary.meanings.insert(drifted.clone(), meanings);
                }
                self.words_coined = self.words_coined.saturating_add(1);
                tracing::debug!(
                    agent = %self.agent_id,
                    source = token.as_str(),
                    drifted = drifted.as_str(),
                    "lexical drift"
                );
            }
        }

        if rng.random::<f64>() < mutation_rate / lexicon::SPONTANEOUS_RULE_DIVISOR {
            let rule = lexicon::spontaneous_rule(self.generation, rng);
            self.grammar_rules.push(rule);
            self.rules_coined = self.rules_coined.saturating_add(1);
        }

        self.generation = self.generation.saturating_add(1);
        Ok(())
    }
}

/// Ratio of two counters as a float.
#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    // Counters stay far below 2^52; the cast is exact in practice.
    numerator as f64 / denominator as f64
}

/// Ratio of two collection sizes as a float.
#[allow(clippy::cast_precision_loss)]
fn ratio_usize(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}

/// A collection size as a float, for derived scores.
#[allow(clippy::cast_precision_loss)]
fn approx(count: usize) -> f64 {
    count as f64
}

/// Uniform choice from a non-empty static slice.
fn choose<'a>(pool: &[&'a str], rng: &mut impl Rng) -> &'a str {
    let index = rng.random_range(0..pool.len());
    pool.get(index).copied().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
