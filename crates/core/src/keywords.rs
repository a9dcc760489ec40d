//! Caption keyword extraction.
//!
//! Lowercase, tokenize, drop stop words and non-alphabetic tokens, then rank
//! the survivors by frequency. Ties keep the order in which terms first
//! appeared in the token stream.

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

use crate::stopwords::StopWords;

/// Maximum number of terms kept per caption.
pub const MAX_KEYWORDS: usize = 10;

/// Word runs with inner hyphens kept together, clitics such as `'s` split
/// off, and every other non-space character as its own token.
const TOKEN_PATTERN: &str = r"\w+(?:-\w+)*|'\w+|[^\w\s]";

/// Ranked keywords for one caption, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new(terms: Vec<String>) -> Self {
        Self(terms)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Reduces caption text to its top-N salient terms.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stop_words: StopWords,
    limit: usize,
    token_pattern: Regex,
}

impl KeywordExtractor {
    /// Extractor returning at most [`MAX_KEYWORDS`] terms.
    pub fn new(stop_words: StopWords) -> Self {
        Self::with_limit(stop_words, MAX_KEYWORDS)
    }

    pub fn with_limit(stop_words: StopWords, limit: usize) -> Self {
        Self {
            stop_words,
            limit,
            token_pattern: Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"),
        }
    }

    /// Extract the ranked keyword set from `text`.
    ///
    /// Pure: the same text always yields the same set in the same order.
    pub fn extract(&self, text: &str) -> KeywordSet {
        let lowered = text.to_lowercase();
        let terms = self
            .token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| is_alphabetic(token) && !self.stop_words.contains(token));

        let ranked = frequency_table(terms);
        KeywordSet(
            ranked
                .into_iter()
                .take(self.limit)
                .map(|(term, _)| term)
                .collect(),
        )
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(StopWords::english())
    }
}

fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// Count `terms` and sort by descending count, ties by first appearance.
pub fn frequency_table<'a, I>(terms: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for term in terms {
        match positions.get(term) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(term, counts.len());
                counts.push((term.to_string(), 1));
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
