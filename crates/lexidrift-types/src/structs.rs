//! Lexical state, message, and statistics records.
//!
//! These are value records: the behavior that mutates them (reinforcement,
//! perturbation, drift) lives in the `lexidrift-agents` crate. Everything
//! here round-trips through serde because whole populations are persisted
//! as JSON snapshots.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::MessageType;
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// An agent's private word inventory.
///
/// `words` maps each known token to a non-negative usage weight (weights
/// are relative and need not sum to 1). `meanings` maps tokens to meaning
/// tags; a token may be polysemous, and a token present in `words` but
/// absent from `meanings` reads as "unknown meaning" -- that is a valid
/// state, not an error. Individual entries carry no creation timestamp;
/// only the snapshot-level `generation_created` is tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Token to usage weight. Weights are non-negative floats.
    pub words: BTreeMap<String, f64>,
    /// Token to its set of meaning tags. May lack entries for known tokens.
    pub meanings: BTreeMap<String, BTreeSet<String>>,
    /// Generation index at which this vocabulary snapshot began.
    pub generation_created: u64,
}

impl Vocabulary {
    /// Create an empty vocabulary stamped with its starting generation.
    pub const fn new(generation_created: u64) -> Self {
        Self {
            words: BTreeMap::new(),
            meanings: BTreeMap::new(),
            generation_created,
        }
    }

    /// Number of distinct tokens known.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Whether a token is present in the word inventory.
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains_key(token)
    }

    /// The usage weight of a token, if known.
    pub fn weight_of(&self, token: &str) -> Option<f64> {
        self.words.get(token).copied()
    }

    /// The meaning tags of a token. `None` means "unknown meaning".
    pub fn meanings_of(&self, token: &str) -> Option<&BTreeSet<String>> {
        self.meanings.get(token)
    }

    /// The `limit` highest-weighted tokens, heaviest first.
    ///
    /// Equal weights fall back to the map's sorted token order, so the
    /// result is deterministic for a given vocabulary state.
    pub fn top_words(&self, limit: usize) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = self
            .words
            .iter()
            .map(|(token, weight)| (token.clone(), *weight))
            .collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        entries.truncate(limit);
        entries
    }
}

// ---------------------------------------------------------------------------
// GrammarRule
// ---------------------------------------------------------------------------

/// One abstract structural transform in an agent's grammar.
///
/// Rules live in an ordered sequence per agent; a rule created later
/// shadows an earlier rule with the same `pattern` during message
/// generation. The pattern is never executed as real grammar -- only its
/// count, weight, and novelty drive the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarRule {
    /// The substring this rule matches in drafted content.
    pub pattern: String,
    /// The substring substituted when the rule applies.
    pub replacement: String,
    /// Application weight, non-negative; rolled as a probability.
    pub frequency: f64,
    /// Generation index at which the rule appeared.
    pub generation_created: u64,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One communicative act between two agents in a given generation.
///
/// Noise is injected at receive time, so `content` as sent is the
/// sender's intended rendering and `original_content` is `None`. When the
/// receiver's interpretation diverges, the receiver rewrites `content` to
/// its corrupted reading and stores the intended rendering in
/// `original_content` for divergence auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The agent that produced the message.
    pub sender_id: AgentId,
    /// The agent the message is addressed to.
    pub receiver_id: AgentId,
    /// The transmitted text as currently interpreted.
    pub content: String,
    /// The communicative intent.
    pub message_type: MessageType,
    /// Generation index at which the message was sent.
    pub generation: u64,
    /// The pre-corruption content, populated only when interpretation
    /// diverged from what was sent.
    pub original_content: Option<String>,
}

impl Message {
    /// Whether the receiver's interpretation diverged from the sent text.
    pub const fn diverged(&self) -> bool {
        self.original_content.is_some()
    }
}

// ---------------------------------------------------------------------------
// GenerationStats
// ---------------------------------------------------------------------------

/// Aggregate population metrics for one completed generation.
///
/// Appended once per generation by the coordinator; the history of these
/// snapshots is what reporting and charting collaborators consume, so
/// they never need to re-derive trends from raw agent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// The generation index this snapshot describes.
    pub generation: u64,
    /// Mean vocabulary size across the population.
    pub mean_vocabulary_size: f64,
    /// Median vocabulary size across the population.
    pub median_vocabulary_size: f64,
    /// Mean grammar-rule count across the population.
    pub mean_grammar_rules: f64,
    /// Mean language-complexity score across the population.
    pub mean_language_complexity: f64,
    /// Mean per-agent communication success rate, in [0, 1].
    pub mean_communication_success: f64,
    /// Number of distinct tokens known anywhere in the population.
    pub total_distinct_words: u64,
}

// ---------------------------------------------------------------------------
// LanguageSample
// ---------------------------------------------------------------------------

/// A reporting sample of one agent's language.
///
/// Returned by the coordinator's sampling query. An unknown agent id
/// yields [`LanguageSample::default`] -- the empty sample is a normal
/// query miss, not a fault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageSample {
    /// The sampled agent, or the default id for an empty sample.
    pub agent_id: AgentId,
    /// The agent's generation counter at sampling time.
    pub generation: u64,
    /// Highest-weighted tokens, heaviest first.
    pub top_words: Vec<(String, f64)>,
    /// A sample of grammar rules (up to five).
    pub grammar_rules: Vec<GrammarRule>,
    /// Total vocabulary size at sampling time.
    pub vocabulary_size: usize,
    /// Total grammar-rule count at sampling time.
    pub grammar_rules_count: usize,
    /// The agent's derived language-complexity score.
    pub language_complexity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab_with(pairs: &[(&str, f64)]) -> Vocabulary {
        let mut v = Vocabulary::new(0);
        for (token, weight) in pairs {
            v.words.insert(String::from(*token), *weight);
        }
        v
    }

    // -----------------------------------------------------------------------
    // Vocabulary
    // -----------------------------------------------------------------------

    #[test]
    fn empty_vocabulary() {
        let v = Vocabulary::new(3);
        assert_eq!(v.word_count(), 0);
        assert_eq!(v.generation_created, 3);
        assert!(!v.contains("water"));
        assert!(v.top_words(10).is_empty());
    }

    #[test]
    fn missing_meaning_entry_is_not_an_error() {
        let v = vocab_with(&[("water", 1.0)]);
        assert!(v.contains("water"));
        assert!(v.meanings_of("water").is_none());
    }

    #[test]
    fn top_words_ordered_by_weight_then_token() {
        let v = vocab_with(&[("sun", 0.4), ("moon", 0.9), ("day", 0.4), ("night", 0.1)]);
        let top = v.top_words(3);
        let tokens: Vec<&str> = top.iter().map(|(t, _)| t.as_str()).collect();
        // moon is heaviest; day/sun tie at 0.4 and fall back to token order.
        assert_eq!(tokens, vec!["moon", "day", "sun"]);
    }

    #[test]
    fn top_words_truncates_to_limit() {
        let v = vocab_with(&[("a", 1.0), ("b", 0.5), ("c", 0.2)]);
        assert_eq!(v.top_words(2).len(), 2);
    }

    #[test]
    fn vocabulary_roundtrip_serde() {
        let mut v = vocab_with(&[("water", 0.7)]);
        v.meanings.insert(
            String::from("water"),
            [String::from("water")].into_iter().collect(),
        );
        let json = serde_json::to_string(&v).ok();
        assert!(json.is_some());
        let restored: Result<Vocabulary, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(v));
    }

    // -----------------------------------------------------------------------
    // Message
    // -----------------------------------------------------------------------

    #[test]
    fn message_as_sent_has_not_diverged() {
        let msg = Message {
            sender_id: AgentId::new(0),
            receiver_id: AgentId::new(1),
            content: String::from("hello"),
            message_type: MessageType::Greeting,
            generation: 0,
            original_content: None,
        };
        assert!(!msg.diverged());
    }

    #[test]
    fn message_with_original_content_has_diverged() {
        let msg = Message {
            sender_id: AgentId::new(0),
            receiver_id: AgentId::new(1),
            content: String::from("hellp"),
            message_type: MessageType::Greeting,
            generation: 4,
            original_content: Some(String::from("hello")),
        };
        assert!(msg.diverged());
    }
}
