//! Per-generation statistics aggregation.
//!
//! Statistics are derived from agent state at collection time, never
//! accumulated inside agents, and appended once per generation to the
//! coordinator's history. Reporting collaborators consume the history
//! without re-deriving anything from raw agent state.

use std::collections::BTreeSet;

use lexidrift_agents::LanguageAgent;
use lexidrift_types::GenerationStats;

/// Aggregate one generation's snapshot over the live population.
pub fn collect(generation: u64, agents: &[LanguageAgent]) -> GenerationStats {
    let count = agents.len();
    if count == 0 {
        return GenerationStats {
            generation,
            mean_vocabulary_size: 0.0,
            median_vocabulary_size: 0.0,
            mean_grammar_rules: 0.0,
            mean_language_complexity: 0.0,
            mean_communication_success: 0.0,
            total_distinct_words: 0,
        };
    }

    let mut vocab_sizes: Vec<usize> = agents.iter().map(LanguageAgent::vocabulary_size).collect();
    vocab_sizes.sort_unstable();

    let rule_total: usize = agents.iter().map(LanguageAgent::grammar_rules_count).sum();
    let vocab_total: usize = vocab_sizes.iter().sum();
    let complexity_total: f64 = agents.iter().map(LanguageAgent::language_complexity).sum();
    let success_total: f64 = agents
        .iter()
        .map(LanguageAgent::communication_success_rate)
        .sum();

    let distinct: BTreeSet<&str> = agents
        .iter()
        .flat_map(|agent| agent.vocabulary().words.keys())
        .map(String::as_str)
        .collect();

    GenerationStats {
        generation,
        mean_vocabulary_size: approx(vocab_total) / approx(count),
        median_vocabulary_size: median(&vocab_sizes),
        mean_grammar_rules: approx(rule_total) / approx(count),
        mean_language_complexity: complexity_total / approx(count),
        mean_communication_success: success_total / approx(count),
        total_distinct_words: as_u64(distinct.len()),
    }
}

/// Median of a sorted slice of sizes; the even case averages the two
/// middle values.
fn median(sorted: &[usize]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return 0.0;
    }
    let middle = len / 2;
    if len % 2 == 1 {
        approx(sorted.get(middle).copied().unwrap_or(0))
    } else {
        let low = sorted.get(middle.saturating_sub(1)).copied().unwrap_or(0);
        let high = sorted.get(middle).copied().unwrap_or(0);
        (approx(low) + approx(high)) / 2.0
    }
}

/// A collection size as a float, for ratio computations.
#[allow(clippy::cast_precision_loss)]
fn approx(count: usize) -> f64 {
    count as f64
}

/// A collection size as a persistable counter.
fn as_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}
