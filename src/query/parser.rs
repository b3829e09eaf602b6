//! Query-string parsing for the search page
//!
//! The page is reached as `search/?q=...` (or `t`, `a`, `d`). The first
//! recognised parameter decides the search mode; its value becomes the
//! keyword list.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::urlencoding::{self, DecodeError};
use crate::models::PostField;

/// Recognised parameters, in priority order
pub const QUERY_KEYS: [&str; 4] = ["q", "t", "a", "d"];

/// Fields searched when no narrower mode applies
const FULL_TEXT_FIELDS: [PostField; 6] = [
    PostField::Title,
    PostField::Tags,
    PostField::Author,
    PostField::Url,
    PostField::Date,
    PostField::Content,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Malformed encoding in parameter '{key}': {source}")]
    MalformedEncoding {
        key: String,
        #[source]
        source: DecodeError,
    },
}

/// Result of parsing the page's query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Decoded value with separators collapsed to single spaces
    pub query: String,
    /// The parameter that matched, or empty
    pub key: String,
    /// Keywords split from `query`
    pub words: Vec<String>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    pub fn mode(&self) -> SearchMode {
        SearchMode::from_key(&self.key)
    }
}

/// Which post fields a search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    FullText,
    Tags,
    Author,
    Date,
}

impl SearchMode {
    /// Map a query parameter name to its mode; unknown keys search everything
    pub fn from_key(key: &str) -> Self {
        match key {
            "t" => SearchMode::Tags,
            "a" => SearchMode::Author,
            "d" => SearchMode::Date,
            _ => SearchMode::FullText,
        }
    }

    /// Fields concatenated into the searchee, in order
    pub fn target_fields(&self) -> &'static [PostField] {
        match self {
            SearchMode::FullText => &FULL_TEXT_FIELDS,
            SearchMode::Tags => &[PostField::Tags],
            SearchMode::Author => &[PostField::Author],
            SearchMode::Date => &[PostField::Date],
        }
    }
}

fn separator_regex() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"(\u{3000}| |\+)+").expect("valid separator regex"))
}

/// Collapse runs of full-width spaces, spaces and `+` into one space
pub fn normalize_whitespace(value: &str) -> String {
    separator_regex().replace_all(value, " ").into_owned()
}

/// Find the first of `keys` present in `query_string` and split its value into keywords.
///
/// A parameter only counts when its value is non-empty; names are compared
/// ignoring ASCII case. No recognised parameter yields an empty result.
pub fn parse_query(keys: &[&str], query_string: &str) -> Result<ParsedQuery, QueryError> {
    let search = query_string.strip_prefix('?').unwrap_or(query_string);

    for key in keys {
        let Some(raw) = find_param(search, key) else {
            continue;
        };

        let decoded = urlencoding::decode(raw).map_err(|source| QueryError::MalformedEncoding {
            key: key.to_string(),
            source,
        })?;
        let query = normalize_whitespace(&decoded);
        let words = query.split(' ').map(str::to_string).collect();

        log::debug!("[QueryParser] Matched '{}' with query {:?}", key, query);
        return Ok(ParsedQuery {
            query,
            key: key.to_string(),
            words,
        });
    }

    Ok(ParsedQuery::default())
}

/// Raw value of the first `key=value` pair with a non-empty value
fn find_param<'a>(search: &'a str, key: &str) -> Option<&'a str> {
    search
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, value)| name.eq_ignore_ascii_case(key) && !value.is_empty())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_parameters() {
        let parsed = parse_query(&QUERY_KEYS, "").unwrap();
        assert_eq!(parsed, ParsedQuery::default());
        assert!(parsed.is_empty());
        assert!(parsed.words.is_empty());
        assert_eq!(parsed.mode(), SearchMode::FullText);

        let parsed = parse_query(&QUERY_KEYS, "?page=2&sort=date").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_priority_order() {
        let parsed = parse_query(&QUERY_KEYS, "?a=bar&t=foo").unwrap();
        assert_eq!(parsed.key, "t");
        assert_eq!(parsed.words, vec!["foo"]);
        assert_eq!(parsed.mode(), SearchMode::Tags);

        let parsed = parse_query(&QUERY_KEYS, "?d=2024&q=rust").unwrap();
        assert_eq!(parsed.key, "q");
        assert_eq!(parsed.words, vec!["rust"]);
    }

    #[test]
    fn test_whitespace_normalization() {
        let parsed = parse_query(&QUERY_KEYS, "?q=a+++b%E3%80%80c").unwrap();
        assert_eq!(parsed.query, "a b c");
        assert_eq!(parsed.words, vec!["a", "b", "c"]);

        assert_eq!(normalize_whitespace("a+++b\u{3000}c"), "a b c");
        assert_eq!(normalize_whitespace("a \u{3000}+ b"), "a b");
    }

    #[test]
    fn test_edge_separators_give_empty_words() {
        let parsed = parse_query(&QUERY_KEYS, "?q=+rust+").unwrap();
        assert_eq!(parsed.query, " rust ");
        assert_eq!(parsed.words, vec!["", "rust", ""]);
    }

    #[test]
    fn test_empty_value_is_skipped() {
        let parsed = parse_query(&QUERY_KEYS, "?q=&t=food").unwrap();
        assert_eq!(parsed.key, "t");
        assert_eq!(parsed.words, vec!["food"]);

        let parsed = parse_query(&QUERY_KEYS, "?q=&q=second").unwrap();
        assert_eq!(parsed.key, "q");
        assert_eq!(parsed.query, "second");
    }

    #[test]
    fn test_key_is_case_insensitive() {
        let parsed = parse_query(&QUERY_KEYS, "?T=rust").unwrap();
        assert_eq!(parsed.key, "t");
    }

    #[test]
    fn test_without_leading_question_mark() {
        let parsed = parse_query(&QUERY_KEYS, "a=Ada").unwrap();
        assert_eq!(parsed.key, "a");
        assert_eq!(parsed.mode(), SearchMode::Author);
    }

    #[test]
    fn test_percent_decoding() {
        let parsed = parse_query(&QUERY_KEYS, "?q=caf%C3%A9%20au%2Blait").unwrap();
        assert_eq!(parsed.words, vec!["café", "au", "lait"]);
    }

    #[test]
    fn test_malformed_encoding() {
        let err = parse_query(&QUERY_KEYS, "?q=100%").unwrap_err();
        assert!(matches!(err, QueryError::MalformedEncoding { ref key, .. } if key == "q"));
    }

    #[test]
    fn test_mode_fields() {
        assert_eq!(SearchMode::from_key("d").target_fields(), &[PostField::Date]);
        assert_eq!(SearchMode::from_key("t").target_fields(), &[PostField::Tags]);
        assert_eq!(SearchMode::from_key("a").target_fields(), &[PostField::Author]);
        assert_eq!(SearchMode::from_key("q").target_fields(), &FULL_TEXT_FIELDS);
        assert_eq!(SearchMode::from_key("").target_fields(), &FULL_TEXT_FIELDS);
    }
}
