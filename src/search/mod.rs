//! Post search
//!
//! Loads the site's post index, filters it by keyword and reveals the
//! matching entries on the results page.

pub mod index;
pub mod matcher;
pub mod session;

pub use index::{FileIndexSource, HttpIndexSource, IndexSource, SearchError, INDEX_FILE_NAME};
pub use matcher::{build_searchee, filter_posts, KeywordMatcher};
pub use session::{SearchOutcome, SearchSession};
