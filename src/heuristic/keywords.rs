//! Keyword profiles
//!
//! A profile is a bag of salient terms with occurrence counts. Extraction is
//! deliberately simple: Unicode word segmentation, lowercasing, stop-word
//! removal, and pruning of one-letter words and words seen only once.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "many", "may", "me", "might", "more", "most", "much", "must", "my",
    "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "one", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should", "since",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "thus", "to", "too", "under", "until",
    "up", "upon", "us", "very", "was", "we", "were", "what", "when", "where", "whether", "which",
    "while", "who", "whom", "whose", "why", "will", "with", "within", "without", "would", "you",
    "your", "yours", "yourself", "yourselves",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Weighted set of salient terms of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermProfile {
    weights: HashMap<String, u32>,
}

impl TermProfile {
    /// Builds a profile from raw page text
    ///
    /// # Examples
    ///
    /// ```
    /// use wiki_race::heuristic::TermProfile;
    ///
    /// let profile = TermProfile::from_text("Rust is fast. Rust is safe. Safe code.");
    /// assert_eq!(profile.weight("rust"), 2);
    /// assert_eq!(profile.weight("safe"), 2);
    /// assert_eq!(profile.weight("fast"), 0); // seen once
    /// assert_eq!(profile.weight("is"), 0);   // stop-word
    /// ```
    pub fn from_text(text: &str) -> Self {
        let stopwords = stopwords();
        let mut counts: HashMap<String, u32> = HashMap::new();

        for word in text.unicode_words() {
            if !word.chars().all(char::is_alphanumeric) {
                continue;
            }
            let word = word.to_lowercase();
            if word.chars().count() <= 1 || stopwords.contains(word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }

        counts.retain(|_, count| *count > 1);
        Self { weights: counts }
    }

    /// Weight of `term`, 0 if absent
    pub fn weight(&self, term: &str) -> u32 {
        self.weights.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true if the profile has no terms
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weighted Jaccard overlap: sum of minimum weights over sum of maximum weights
    ///
    /// Always in [0, 1]; 1 for identical profiles, 0 for disjoint or empty ones.
    pub fn overlap(&self, other: &TermProfile) -> f64 {
        let mut min_sum = 0u64;
        let mut max_sum = 0u64;

        for (term, &weight) in &self.weights {
            let theirs = other.weight(term);
            min_sum += u64::from(weight.min(theirs));
            max_sum += u64::from(weight.max(theirs));
        }
        for (term, &weight) in &other.weights {
            if !self.weights.contains_key(term) {
                max_sum += u64::from(weight);
            }
        }

        if max_sum == 0 {
            return 0.0;
        }
        min_sum as f64 / max_sum as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_repeated_terms() {
        let profile = TermProfile::from_text("Graph theory studies graphs. A graph has vertices; graph edges join vertices.");
        assert_eq!(profile.weight("graph"), 3);
        assert_eq!(profile.weight("vertices"), 2);
        assert_eq!(profile.weight("theory"), 0);
    }

    #[test]
    fn test_drops_stopwords_and_short_words() {
        let profile = TermProfile::from_text("the the the x x x of of");
        assert!(profile.is_empty());
    }

    #[test]
    fn test_lowercases() {
        let profile = TermProfile::from_text("Oak OAK oak");
        assert_eq!(profile.weight("oak"), 3);
    }

    #[test]
    fn test_overlap_identical() {
        let profile = TermProfile::from_text("oak oak leaf leaf");
        assert!((profile.overlap(&profile) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlap_disjoint() {
        let a = TermProfile::from_text("oak oak leaf leaf");
        let b = TermProfile::from_text("engine engine piston piston");
        assert_eq!(a.overlap(&b), 0.0);
    }

    #[test]
    fn test_overlap_partial_is_symmetric() {
        let a = TermProfile::from_text("oak oak oak leaf leaf");
        let b = TermProfile::from_text("oak oak root root");
        // min: oak 2 = 2; max: oak 3 + leaf 2 + root 2 = 7
        assert!((a.overlap(&b) - 2.0 / 7.0).abs() < 1e-12);
        assert!((b.overlap(&a) - 2.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlap_with_empty() {
        let a = TermProfile::from_text("oak oak");
        assert_eq!(a.overlap(&TermProfile::default()), 0.0);
        assert_eq!(TermProfile::default().overlap(&TermProfile::default()), 0.0);
    }
}
