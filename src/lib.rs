pub mod cli;
pub mod config;
pub mod models;
pub mod page;
pub mod query;
pub mod search;

use clap::Parser;

pub use models::{FieldValue, PostField, PostRecord};
pub use page::{HtmlResultsPage, PageSelectors, ResultsPage};
pub use query::{parse_query, ParsedQuery, SearchMode, QUERY_KEYS};
pub use search::{FileIndexSource, HttpIndexSource, IndexSource, SearchError, SearchOutcome, SearchSession};

/// Entry point of the `postsearch` binary
pub fn run() {
    // Info for our crate, warn for everything else
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("postsearch_lib=info,warn"),
    )
    .format_timestamp_secs()
    .init();

    let cli = cli::Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(cli::execute(cli)) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
