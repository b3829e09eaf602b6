//! Keyword matching over post records
//!
//! Keywords are used as case-insensitive regular expressions, unescaped:
//! `a.b` matches "axb". A post matches when every keyword finds a match in
//! its searchee, the concatenation of the fields selected by the search mode.

use regex::{Regex, RegexBuilder};

use super::index::SearchError;
use crate::models::{PostField, PostRecord};

/// Compiled keyword patterns for one search
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    patterns: Vec<Regex>,
}

impl KeywordMatcher {
    /// Compile every keyword; fails on the first invalid pattern
    pub fn new(words: &[String]) -> Result<Self, SearchError> {
        let patterns = words
            .iter()
            .map(|word| RegexBuilder::new(word).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// True when every pattern matches somewhere in `searchee`.
    /// No patterns means everything matches.
    pub fn is_match(&self, searchee: &str) -> bool {
        for pattern in &self.patterns {
            if !pattern.is_match(searchee) {
                return false;
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Concatenate the selected fields of a post, with no separators
pub fn build_searchee(post: &PostRecord, fields: &[PostField]) -> String {
    fields
        .iter()
        .filter_map(|field| post.field(*field))
        .map(|value| value.concat())
        .collect()
}

/// Posts whose searchee matches, in index order
pub fn filter_posts<'a>(
    posts: &'a [PostRecord],
    fields: &[PostField],
    matcher: &KeywordMatcher,
) -> Vec<&'a PostRecord> {
    let matched: Vec<&PostRecord> = posts
        .iter()
        .filter(|post| matcher.is_match(&build_searchee(post, fields)))
        .collect();

    log::info!(
        "[Matcher] {} of {} posts matched {} keyword(s)",
        matched.len(),
        posts.len(),
        matcher.len()
    );
    matched
}
