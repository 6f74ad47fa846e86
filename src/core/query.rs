//! Query expander.
//!
//! Builds a ladder of progressively shorter search terms from a cleaned
//! title, so `the dark knight rises` is tried before `dark knight` and `dark`.

use serde::{Deserialize, Serialize};

/// Words dropped before building queries.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "but", "or", "for", "nor", "on", "at", "to", "from", "by", "in",
    "of", "is", "are", "was", "were", "be", "being", "been",
];

/// Ordered search terms, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Expand a cleaned title into a query ladder.
    pub fn expand(title: &str) -> Self {
        let lowered = title.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split_whitespace()
            .filter(|t| !STOP_WORDS.contains(t))
            .collect();

        let terms = (1..=tokens.len())
            .rev()
            .map(|j| tokens[..j].join(" "))
            .collect();

        Self { terms }
    }

    /// Search terms in ladder order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}
