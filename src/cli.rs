//! Command-line interface

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{self, ConfigError, SiteConfig};
use crate::page::{plan_decorations, HtmlResultsPage};
use crate::search::{FileIndexSource, HttpIndexSource, IndexSource, SearchError, SearchSession};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No index to search: pass --index or --base-url, or set a base URL in the config")]
    NoIndex,
}

#[derive(Parser, Debug)]
#[command(name = "postsearch")]
#[command(about = "Search a static site's post index")]
pub struct Cli {
    /// Config file (default: site.json in the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a search, e.g. `postsearch search '?t=rust'`
    Search {
        /// Query string of the search page URL
        query_string: String,
        /// Site root serving search.json
        #[arg(long, conflicts_with = "index")]
        base_url: Option<String>,
        /// Local search.json instead of fetching one
        #[arg(long)]
        index: Option<PathBuf>,
        /// Rendered search page to reveal results in
        #[arg(long)]
        page: Option<PathBuf>,
        /// Index request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Show what the load-time scripts would change on a page
    Decorate {
        /// Rendered HTML page
        html: PathBuf,
        /// Host the page is served from
        #[arg(long)]
        host: String,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

fn read_file(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })
}

/// Run a parsed command line
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let mut site = config::load_site_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            query_string,
            base_url,
            index,
            page,
            timeout,
            json,
        } => {
            if base_url.is_some() {
                site.base_url = base_url;
            }
            if timeout.is_some() {
                site.request_timeout_secs = timeout;
            }
            let page_html = page.as_ref().map(read_file).transpose()?;

            match (index, site.base_url.as_deref()) {
                (Some(path), _) => {
                    let session = SearchSession::new(FileIndexSource::new(path));
                    search(&session, &site, &query_string, page_html.as_deref(), json).await
                }
                (None, Some(base)) => {
                    let source = HttpIndexSource::new(base, site.request_timeout())?;
                    let session = SearchSession::new(source);
                    search(&session, &site, &query_string, page_html.as_deref(), json).await
                }
                (None, None) => Err(CliError::NoIndex),
            }
        }
        Commands::Decorate { html, host, json } => {
            let content = read_file(&html)?;
            let plan = plan_decorations(&content, &host);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                for link in &plan.header_links {
                    println!("header link  {} #{}", link.tag, link.id);
                }
                for href in &plan.external_links {
                    println!("new tab      {}", href);
                }
                for src in &plan.centered_images {
                    println!("center image {}", src);
                }
                if let Some(offset) = plan.sticky_offset {
                    println!("sticky top   {}px", offset);
                }
            }
            Ok(())
        }
        Commands::Config => {
            match config::get_site_config_path() {
                Ok(path) => println!("# {}", path.display()),
                Err(e) => println!("# {}", e),
            }
            println!("{}", serde_json::to_string_pretty(&site)?);
            Ok(())
        }
    }
}

async fn search<S: IndexSource>(
    session: &SearchSession<S>,
    site: &SiteConfig,
    query_string: &str,
    page_html: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    match page_html {
        Some(html) => {
            let mut page = HtmlResultsPage::parse(html, &site.selectors());
            let outcome = session.run(query_string, &mut page).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                for post in &outcome.posts {
                    println!("{}\t{}", post.title_text(), post.url_text());
                }
                println!("revealed: {}", outcome.revealed.join(", "));
                if let Some(input) = page.search_input().filter(|i| i.focused) {
                    println!("search box: {:?}", input.value);
                }
            }
        }
        None => {
            let (_, posts) = session.search(query_string).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else {
                for post in &posts {
                    println!("{}\t{}", post.title_text(), post.url_text());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["postsearch", "search", "?t=rust", "--index", "public/search.json", "--json"]);
        match cli.command {
            Commands::Search { query_string, index, json, base_url, .. } => {
                assert_eq!(query_string, "?t=rust");
                assert_eq!(index, Some(PathBuf::from("public/search.json")));
                assert!(json);
                assert!(base_url.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_index_conflicts_with_base_url() {
        let result = Cli::try_parse_from([
            "postsearch",
            "search",
            "?q=x",
            "--index",
            "a.json",
            "--base-url",
            "https://example.org",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_decorate() {
        let cli = Cli::parse_from(["postsearch", "decorate", "index.html", "--host", "example.org"]);
        assert!(matches!(cli.command, Commands::Decorate { ref host, .. } if host == "example.org"));
    }
}
