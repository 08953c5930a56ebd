//! Filter to keep only venues that fit a course theme.

use crate::traits::Filter;
use anyhow::Result;
use candidates::ScoredCandidate;
use data_loader::Venue;
use std::collections::HashSet;

/// Keeps candidates whose category or tags mention one of the theme's
/// keywords as a whole word.
///
/// ## Algorithm
/// 1. Lowercase the category id, category name, and every tag
/// 2. Split each into words on whitespace, `_` and `-`
/// 3. Keep the venue if any word equals a keyword
///
/// `"art"` matches `art_gallery` and `"Art Books"` but not `party`.
/// An empty keyword list keeps nothing.
pub struct ThemeFilter {
    keywords: Vec<String>,
}

impl ThemeFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Whether a venue matches any keyword
    pub fn matches(&self, venue: &Venue) -> bool {
        let fields = [&venue.category_id, &venue.category_name]
            .into_iter()
            .chain(venue.tags.iter());

        let words: HashSet<String> = fields.flat_map(|field| split_words(field)).collect();
        self.keywords.iter().any(|keyword| words.contains(keyword))
    }
}

fn split_words(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl Filter for ThemeFilter {
    fn name(&self) -> &str {
        "ThemeFilter"
    }

    fn apply(&self, candidates: Vec<ScoredCandidate>) -> Result<Vec<ScoredCandidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| self.matches(&candidate.venue))
            .collect())
    }
}
