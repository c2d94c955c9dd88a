//! Lexicon primitives: seed material, tuning constants, and token
//! perturbation.
//!
//! Everything stochastic takes an injected `&mut impl Rng` so the
//! coordinator's single seeded generator drives every draw and runs stay
//! reproducible.
//!
//! # Perturbation
//!
//! A perturbed token differs from its source by one edit operation:
//! substitute, insert, delete, or transpose, over the lowercase a-z
//! alphabet. [`perturb_token_novel`] additionally guarantees the result
//! is distinct from the source and absent from the given word inventory,
//! which is what makes drift strictly additive.

use std::collections::BTreeMap;

use rand::Rng;

use lexidrift_types::{GrammarRule, Vocabulary};

use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Tuning constants
// ---------------------------------------------------------------------------

/// Weight added to a recognized word on successful reception.
pub const REINFORCEMENT_STEP: f64 = 0.05;

/// Upper cap on any word's usage weight.
pub const MAX_WORD_WEIGHT: f64 = 1.0;

/// Starting weight for a word adopted through a misreading.
pub const MISHEARD_WORD_WEIGHT: f64 = 0.1;

/// Fraction of the source word's weight a drifted token inherits.
pub const DRIFT_WEIGHT_FACTOR: f64 = 0.5;

/// Per-token chance of corruption when a reception error is injected.
pub const TOKEN_CORRUPTION_CHANCE: f64 = 0.3;

/// Minimum fraction of known tokens required to recognize a message.
pub const RECOGNITION_THRESHOLD: f64 = 0.5;

/// Application weight assigned to a rule learned from received content.
pub const LEARNED_RULE_FREQUENCY: f64 = 0.3;

/// Divisor deriving the spontaneous-rule chance from the mutation rate.
pub const SPONTANEOUS_RULE_DIVISOR: f64 = 2.0;

// ---------------------------------------------------------------------------
// Seed material
// ---------------------------------------------------------------------------

/// The common word stock every agent starts from.
///
/// Includes every token the drafting pools can emit, so a freshly seeded
/// population shares full overlap: without injected error or drift, no
/// message carries an unfamiliar token.
pub const SEED_WORDS: [&str; 37] = [
    "hello", "goodbye", "yes", "no", "please", "thank", "you", "me", "i", "the", "a", "and", "or",
    "but", "is", "are", "was", "were", "have", "has", "water", "food", "house", "tree", "sun",
    "moon", "day", "night", "big", "small", "hi", "hey", "what", "how", "why", "when", "where",
];

/// Salutations a sender may open with.
pub const GREETING_FORMS: [&str; 3] = ["hello", "hi", "hey"];

/// Interrogatives used to draft question content.
pub const QUESTION_WORDS: [&str; 5] = ["what", "how", "why", "when", "where"];

/// Pattern pool for spontaneous grammar innovation.
const RULE_PATTERNS: [&str; 9] = ["the", "a", "and", "or", "but", "is", "are", "was", "were"];

/// Replacement pool for spontaneous grammar innovation.
const RULE_REPLACEMENTS: [&str; 9] = [
    "da", "an", "und", "oder", "aber", "ist", "sind", "war", "waren",
];

/// Build a vocabulary from seed tokens, all at full weight, each tagged
/// with itself as its sole meaning.
pub fn seed_vocabulary(tokens: &[&str], generation_created: u64) -> Vocabulary {
    let mut vocabulary = Vocabulary::new(generation_created);
    for token in tokens {
        vocabulary.words.insert(String::from(*token), 1.0);
        vocabulary.meanings.insert(
            String::from(*token),
            [String::from(*token)].into_iter().collect(),
        );
    }
    vocabulary
}

/// The basic grammar every agent starts with.
pub fn seed_grammar_rules() -> Vec<GrammarRule> {
    let seeds = [
        ("greeting", "hello", 1.0),
        ("farewell", "goodbye", 1.0),
        ("agreement", "yes", 1.0),
        ("disagreement", "no", 1.0),
        ("question_marker", "?", 0.8),
        ("statement_marker", ".", 0.9),
    ];
    seeds
        .iter()
        .map(|(pattern, replacement, frequency)| GrammarRule {
            pattern: String::from(*pattern),
            replacement: String::from(*replacement),
            frequency: *frequency,
            generation_created: 0,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a rate or probability lies in [0.0, 1.0].
///
/// # Errors
///
/// Returns [`AgentError::InvalidParameter`] for non-finite values or
/// values outside the range.
pub fn validate_rate(parameter: &'static str, value: f64) -> Result<(), AgentError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentError::InvalidParameter { parameter, value })
    }
}

/// Validate that a weight is finite and non-negative.
///
/// # Errors
///
/// Returns [`AgentError::InvalidParameter`] otherwise.
pub fn validate_weight(parameter: &'static str, value: f64) -> Result<(), AgentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AgentError::InvalidParameter { parameter, value })
    }
}

/// Construct a grammar rule, rejecting a negative application weight.
///
/// # Errors
///
/// Returns [`AgentError::InvalidParameter`] if `frequency` is negative
/// or non-finite.
pub fn new_rule(
    pattern: &str,
    replacement: &str,
    frequency: f64,
    generation_created: u64,
) -> Result<GrammarRule, AgentError> {
    validate_weight("frequency", frequency)?;
    Ok(GrammarRule {
        pattern: String::from(pattern),
        replacement: String::from(replacement),
        frequency,
        generation_created,
    })
}

/// Insert or overwrite a word at the given weight, rejecting negatives.
///
/// # Errors
///
/// Returns [`AgentError::InvalidParameter`] if `weight` is negative or
/// non-finite.
pub fn insert_word(vocabulary: &mut Vocabulary, token: &str, weight: f64) -> Result<(), AgentError> {
    validate_weight("weight", weight)?;
    vocabulary.words.insert(String::from(token), weight);
    Ok(())
}

// ---------------------------------------------------------------------------
// Perturbation
// ---------------------------------------------------------------------------

/// Draw a lowercase letter from the a-z alphabet.
fn random_letter(rng: &mut impl Rng) -> char {
    let offset: u8 = rng.random_range(0..26);
    char::from(b'a'.saturating_add(offset))
}

/// Apply one random edit operation to a token.
///
/// Operations: substitute, insert, delete, transpose. Tokens of length 1
/// or less are returned unchanged; callers needing guaranteed novelty
/// use [`perturb_token_novel`].
pub fn perturb_token(token: &str, rng: &mut impl Rng) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    if chars.len() <= 1 {
        return String::from(token);
    }

    match rng.random_range(0..4u8) {
        // Substitute one character.
        0 => {
            let pos = rng.random_range(0..chars.len());
            let letter = random_letter(rng);
            if let Some(slot) = chars.get_mut(pos) {
                *slot = letter;
            }
        }
        // Insert one character.
        1 => {
            let pos = rng.random_range(0..=chars.len());
            chars.insert(pos, random_letter(rng));
        }
        // Delete one character.
        2 => {
            let pos = rng.random_range(0..chars.len());
            chars.remove(pos);
        }
        // Transpose two adjacent characters.
        _ => {
            let pos = rng.random_range(0..chars.len().saturating_sub(1));
            chars.swap(pos, pos.saturating_add(1));
        }
    }

    chars.into_iter().collect()
}

/// Maximum re-rolls before novelty is forced by extension.
const NOVELTY_ATTEMPTS: u8 = 8;

/// Perturb a token into a variant guaranteed to be distinct from the
/// source and absent from `words`.
///
/// Re-rolls the single-edit perturbation a few times; if every roll
/// collides (or the token is too short to edit), the candidate is
/// extended with random letters until it is novel. Extension strictly
/// lengthens the candidate, so termination is guaranteed for any finite
/// inventory.
pub fn perturb_token_novel(
    token: &str,
    words: &BTreeMap<String, f64>,
    rng: &mut impl Rng,
) -> String {
    for _ in 0..NOVELTY_ATTEMPTS {
        let candidate = perturb_token(token, rng);
        if candidate != token && !words.contains_key(&candidate) {
            return candidate;
        }
    }

    let mut candidate = String::from(token);
    loop {
        candidate.push(random_letter(rng));
        if candidate != token && !words.contains_key(&candidate) {
            return candidate;
        }
    }
}

/// Invent a spontaneous grammar rule from the innovation pools.
pub fn spontaneous_rule(generation_created: u64, rng: &mut impl Rng) -> GrammarRule {
    let pattern_idx = rng.random_range(0..RULE_PATTERNS.len());
    let replacement_idx = rng.random_range(0..RULE_REPLACEMENTS.len());
    GrammarRule {
        pattern: String::from(RULE_PATTERNS.get(pattern_idx).copied().unwrap_or("the")),
        replacement: String::from(
            RULE_REPLACEMENTS
                .get(replacement_idx)
                .copied()
                .unwrap_or("da"),
        ),
        frequency: rng.random_range(0.1..0.8),
        generation_created,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    // -----------------------------------------------------------------------
    // 1. Seed material
    // -----------------------------------------------------------------------

    #[test]
    fn seed_vocabulary_tags_each_word_with_itself() {
        let vocabulary = seed_vocabulary(&SEED_WORDS, 0);
        assert_eq!(vocabulary.word_count(), SEED_WORDS.len());
        let meanings = vocabulary.meanings_of("water");
        assert!(meanings.is_some_and(|m| m.contains("water")));
    }

    #[test]
    fn seed_grammar_has_six_rules_at_generation_zero() {
        let rules = seed_grammar_rules();
        assert_eq!(rules.len(), 6);
        assert!(rules.iter().all(|r| r.generation_created == 0));
        assert!(rules.iter().all(|r| r.frequency >= 0.0));
    }

    // -----------------------------------------------------------------------
    // 2. Validation
    // -----------------------------------------------------------------------

    #[test]
    fn rates_outside_unit_interval_rejected() {
        assert!(validate_rate("error_rate", 1.5).is_err());
        assert!(validate_rate("error_rate", -0.1).is_err());
        assert!(validate_rate("error_rate", f64::NAN).is_err());
        assert!(validate_rate("error_rate", 0.0).is_ok());
        assert!(validate_rate("error_rate", 1.0).is_ok());
    }

    #[test]
    fn negative_rule_frequency_rejected() {
        let result = new_rule("the", "da", -0.5, 0);
        assert!(result.is_err());
    }

    #[test]
    fn negative_word_weight_rejected() {
        let mut vocabulary = Vocabulary::new(0);
        assert!(insert_word(&mut vocabulary, "water", -1.0).is_err());
        assert_eq!(vocabulary.word_count(), 0);
        assert!(insert_word(&mut vocabulary, "water", 0.5).is_ok());
        assert_eq!(vocabulary.word_count(), 1);
    }

    // -----------------------------------------------------------------------
    // 3. Perturbation
    // -----------------------------------------------------------------------

    #[test]
    fn perturbed_token_within_one_edit_of_source() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let perturbed = perturb_token("water", &mut rng);
            let len_diff = perturbed.chars().count().abs_diff(5);
            assert!(len_diff <= 1, "one edit changes length by at most 1");
        }
    }

    #[test]
    fn single_character_token_unchanged_by_raw_edit() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(perturb_token("i", &mut rng), "i");
        assert_eq!(perturb_token("", &mut rng), "");
    }

    #[test]
    fn novel_perturbation_never_collides() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut words: BTreeMap<String, f64> = BTreeMap::new();
        words.insert(String::from("i"), 1.0);
        words.insert(String::from("a"), 1.0);
        for _ in 0..100 {
            let novel = perturb_token_novel("i", &words, &mut rng);
            assert_ne!(novel, "i");
            assert!(!words.contains_key(&novel));
            words.insert(novel, 0.5);
        }
    }

    #[test]
    fn novel_perturbation_with_crowded_inventory_terminates() {
        let mut rng = SmallRng::seed_from_u64(3);
        // Pre-fill every single-letter token so short candidates collide.
        let mut words: BTreeMap<String, f64> = BTreeMap::new();
        for byte in b'a'..=b'z' {
            words.insert(String::from(char::from(byte)), 1.0);
        }
        let novel = perturb_token_novel("ab", &words, &mut rng);
        assert!(!words.contains_key(&novel));
        assert_ne!(novel, "ab");
    }

    // -----------------------------------------------------------------------
    // 4. Spontaneous rules
    // -----------------------------------------------------------------------

    #[test]
    fn spontaneous_rule_draws_from_pools() {
        let mut rng = SmallRng::seed_from_u64(9);
        let rule = spontaneous_rule(12, &mut rng);
        assert!(RULE_PATTERNS.contains(&rule.pattern.as_str()));
        assert!(RULE_REPLACEMENTS.contains(&rule.replacement.as_str()));
        assert!(rule.frequency >= 0.1 && rule.frequency < 0.8);
        assert_eq!(rule.generation_created, 12);
    }
}
