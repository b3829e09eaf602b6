//! One search, start to finish
//!
//! parse query string -> fetch index -> filter -> reveal. The page is only
//! touched after filtering has finished, and a failure anywhere leaves every
//! result hidden.

use serde::Serialize;

use super::index::{IndexSource, SearchError};
use super::matcher::{filter_posts, KeywordMatcher};
use crate::models::PostRecord;
use crate::page::ResultsPage;
use crate::query::{parse_query, ParsedQuery, SearchMode, QUERY_KEYS};

/// Outcome of a search
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: ParsedQuery,
    pub mode: SearchMode,
    /// Matching posts in index order
    pub posts: Vec<PostRecord>,
    /// Ids of the page elements that were revealed
    pub revealed: Vec<String>,
}

/// Runs searches against an index source
pub struct SearchSession<S: IndexSource> {
    source: S,
}

impl<S: IndexSource> SearchSession<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Parse `query_string` and return the matching posts, without touching a page
    pub async fn search(&self, query_string: &str) -> Result<(ParsedQuery, Vec<PostRecord>), SearchError> {
        let query = parse_query(&QUERY_KEYS, query_string)?;
        let posts = self.matching_posts(&query).await?;
        Ok((query, posts))
    }

    /// Fetch the index and filter it for an already parsed query
    pub async fn matching_posts(&self, query: &ParsedQuery) -> Result<Vec<PostRecord>, SearchError> {
        // Patterns compile before the index is fetched
        let matcher = KeywordMatcher::new(&query.words)?;
        let fields = query.mode().target_fields();

        let posts = self.source.fetch_posts().await?;
        Ok(filter_posts(&posts, fields, &matcher)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Full page flow: fill the search box for `q` searches, then reveal matches.
    pub async fn run<P: ResultsPage>(&self, query_string: &str, page: &mut P) -> Result<SearchOutcome, SearchError> {
        let query = parse_query(&QUERY_KEYS, query_string)?;
        let mode = query.mode();

        if query.key == "q" {
            page.fill_search_input(&query.query);
        }

        let posts = self.matching_posts(&query).await?;

        let mut revealed = Vec::new();
        for post in &posts {
            if page.reveal(&post.id) > 0 {
                revealed.push(post.id.clone());
            }
        }

        log::info!(
            "[Search] {:?} search for {:?} against {}: {} matches, {} revealed",
            mode,
            query.words,
            self.source.describe(),
            posts.len(),
            revealed.len()
        );

        Ok(SearchOutcome {
            query,
            mode,
            posts,
            revealed,
        })
    }

    /// Like [`run`](Self::run), but a failure only shows up as no results
    pub async fn run_on_page<P: ResultsPage>(&self, query_string: &str, page: &mut P) -> Vec<String> {
        match self.run(query_string, page).await {
            Ok(outcome) => outcome.revealed,
            Err(e) => {
                log::warn!("[Search] Search failed, showing no results: {}", e);
                Vec::new()
            }
        }
    }
}
