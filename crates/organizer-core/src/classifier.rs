//! Keyword-based complexity classifier.
//!
//! A description is lower-cased and scanned for substrings from two keyword
//! lists. High-signal terms (analysis, reports, projects) win over low-signal
//! terms (quick errands). Anything else lands in the medium tier, and wordy
//! medium descriptions are flagged for a one-time clarification.

use serde::{Deserialize, Serialize};

use crate::task::ComplexityTier;

/// Descriptions with more words than this and no keyword match need clarification.
pub const CLARIFICATION_WORD_THRESHOLD: usize = 3;

/// Answer to a clarification prompt that promotes a task to the high tier.
pub const DEEP_ANSWER: &str = "deep";

/// Keyword lists driving classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordConfig {
    #[serde(default = "default_high_signal_terms")]
    pub high_signal_terms: Vec<String>,
    #[serde(default = "default_low_signal_terms")]
    pub low_signal_terms: Vec<String>,
}

fn default_high_signal_terms() -> Vec<String> {
    ["сложн", "трудн", "анализ", "отчёт", "проект", "диплом"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_low_signal_terms() -> Vec<String> {
    ["купить", "позвонить", "убрать", "помыть", "забрать"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            high_signal_terms: default_high_signal_terms(),
            low_signal_terms: default_low_signal_terms(),
        }
    }
}

/// Result of classifying a description.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub tier: ComplexityTier,
    pub needs_clarification: bool,
}

/// Maps free-text descriptions to complexity tiers.
#[derive(Debug, Clone, Default)]
pub struct ComplexityClassifier {
    keywords: KeywordConfig,
}

impl ComplexityClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords(keywords: KeywordConfig) -> Self {
        let lower = |terms: Vec<String>| terms.into_iter().map(|t| t.to_lowercase()).collect();
        Self {
            keywords: KeywordConfig {
                high_signal_terms: lower(keywords.high_signal_terms),
                low_signal_terms: lower(keywords.low_signal_terms),
            },
        }
    }

    /// Classify a description. Matching is case-insensitive substring search.
    pub fn classify(&self, description: &str) -> Classification {
        let tier = self.tier_for(description);
        Classification {
            tier,
            needs_clarification: needs_clarification(description, tier),
        }
    }

    fn tier_for(&self, description: &str) -> ComplexityTier {
        let lower = description.to_lowercase();
        let matches = |terms: &[String]| {
            terms
                .iter()
                .any(|term| !term.is_empty() && lower.contains(term.as_str()))
        };

        if matches(&self.keywords.high_signal_terms) {
            ComplexityTier::High
        } else if matches(&self.keywords.low_signal_terms) {
            ComplexityTier::Low
        } else {
            ComplexityTier::Medium
        }
    }
}

/// Medium-tier descriptions longer than the word threshold are ambiguous.
pub fn needs_clarification(description: &str, tier: ComplexityTier) -> bool {
    tier == ComplexityTier::Medium
        && description.split_whitespace().count() > CLARIFICATION_WORD_THRESHOLD
}

/// Map a clarification answer to a tier.
///
/// Only `"deep"` selects the high tier; every other answer, including
/// unrecognized ones, is treated as "simple".
pub fn resolve_clarification(answer: &str) -> ComplexityTier {
    if answer == DEEP_ANSWER {
        ComplexityTier::High
    } else {
        ComplexityTier::Low
    }
}
