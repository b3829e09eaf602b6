//! Search results page
//!
//! The site renders one hidden element per post inside the results
//! container. A search only clears the inline style of the matching
//! entries and fills the search box; nothing is created or removed.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Element ids the search page is built around
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelectors {
    pub results_container: String,
    pub search_input: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            results_container: "search-results".to_string(),
            search_input: "search".to_string(),
        }
    }
}

/// What a search is allowed to do to the page
pub trait ResultsPage {
    /// Unhide every result entry whose id equals `post_id`; returns how many were touched
    fn reveal(&mut self, post_id: &str) -> usize;

    /// Put the query back into the search box and focus it
    fn fill_search_input(&mut self, value: &str);
}

/// One element under the results container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: String,
    /// Inline `style` attribute; empty means visible
    pub style: String,
}

impl ResultEntry {
    pub fn is_visible(&self) -> bool {
        self.style.trim().is_empty()
    }
}

/// The search box
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchInput {
    pub value: String,
    pub focused: bool,
}

/// Results page state read from rendered HTML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HtmlResultsPage {
    entries: Vec<ResultEntry>,
    search_input: Option<SearchInput>,
}

impl HtmlResultsPage {
    /// Read the result entries and search box out of a rendered page.
    ///
    /// A page without the results container yields no entries; reveals on it
    /// are no-ops.
    pub fn parse(html: &str, selectors: &PageSelectors) -> Self {
        let document = Html::parse_document(html);

        let entries = match id_selector(&selectors.results_container)
            .and_then(|sel| document.select(&sel).next())
        {
            Some(container) => match Selector::parse("[id]") {
                Ok(with_id) => container
                    .select(&with_id)
                    .filter_map(|el| {
                        let id = el.value().attr("id")?;
                        Some(ResultEntry {
                            id: id.to_string(),
                            style: el.value().attr("style").unwrap_or("").to_string(),
                        })
                    })
                    .collect(),
                Err(_) => Vec::new(),
            },
            None => {
                log::warn!(
                    "[Page] No element with id {:?}; nothing can be revealed",
                    selectors.results_container
                );
                Vec::new()
            }
        };

        let search_input = id_selector(&selectors.search_input)
            .and_then(|sel| document.select(&sel).next())
            .map(|el| SearchInput {
                value: el.value().attr("value").unwrap_or("").to_string(),
                focused: el.value().attr("autofocus").is_some(),
            });

        log::debug!("[Page] Parsed {} result entries", entries.len());
        Self {
            entries,
            search_input,
        }
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn search_input(&self) -> Option<&SearchInput> {
        self.search_input.as_ref()
    }

    /// Ids of entries currently visible, in page order
    pub fn visible_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_visible())
            .map(|e| e.id.as_str())
            .collect()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id && e.is_visible())
    }
}

impl ResultsPage for HtmlResultsPage {
    fn reveal(&mut self, post_id: &str) -> usize {
        if post_id.is_empty() {
            return 0;
        }

        let mut touched = 0;
        for entry in self.entries.iter_mut().filter(|e| e.id == post_id) {
            entry.style.clear();
            touched += 1;
        }
        touched
    }

    fn fill_search_input(&mut self, value: &str) {
        match self.search_input.as_mut() {
            Some(input) => {
                input.value = value.to_string();
                input.focused = true;
            }
            None => log::debug!("[Page] No search input to fill"),
        }
    }
}

/// Selector matching an element by id, tolerant of ids that are not CSS identifiers
fn id_selector(id: &str) -> Option<Selector> {
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    Selector::parse(&format!("[id=\"{}\"]", escaped)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <input id="search" type="text">
  <ul id="search-results">
    <li id="p1" style="display: none;"><a href="/p1">Rust Guide</a></li>
    <li id="p2" style="display: none;"><a href="/p2">Cooking</a></li>
    <li id="2024-recap" style="display: none;"><a href="/recap">Recap</a></li>
  </ul>
  <div id="p1">Outside the results</div>
</body></html>"#;

    #[test]
    fn test_parse_entries_inside_container_only() {
        let page = HtmlResultsPage::parse(PAGE, &PageSelectors::default());
        let ids: Vec<_> = page.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "2024-recap"]);
        assert!(page.visible_ids().is_empty());
        assert_eq!(page.search_input(), Some(&SearchInput::default()));
    }

    #[test]
    fn test_reveal_clears_style() {
        let mut page = HtmlResultsPage::parse(PAGE, &PageSelectors::default());
        assert_eq!(page.reveal("p1"), 1);
        assert!(page.is_visible("p1"));
        assert!(!page.is_visible("p2"));
        assert_eq!(page.visible_ids(), vec!["p1"]);
    }

    #[test]
    fn test_reveal_id_starting_with_digit() {
        let mut page = HtmlResultsPage::parse(PAGE, &PageSelectors::default());
        assert_eq!(page.reveal("2024-recap"), 1);
        assert!(page.is_visible("2024-recap"));
    }

    #[test]
    fn test_reveal_unknown_or_empty_id() {
        let mut page = HtmlResultsPage::parse(PAGE, &PageSelectors::default());
        assert_eq!(page.reveal("missing"), 0);
        assert_eq!(page.reveal(""), 0);
        assert!(page.visible_ids().is_empty());
    }

    #[test]
    fn test_fill_search_input() {
        let mut page = HtmlResultsPage::parse(PAGE, &PageSelectors::default());
        page.fill_search_input("rust guide");
        let input = page.search_input().unwrap();
        assert_eq!(input.value, "rust guide");
        assert!(input.focused);
    }

    #[test]
    fn test_missing_container() {
        let mut page = HtmlResultsPage::parse("<html><body><p>hi</p></body></html>", &PageSelectors::default());
        assert!(page.entries().is_empty());
        assert!(page.search_input().is_none());
        assert_eq!(page.reveal("p1"), 0);
        page.fill_search_input("ignored");
    }

    #[test]
    fn test_custom_selectors() {
        let html = r#"<div id="hits"><p id="a" style="display:none"></p></div><input id="box" value="old">"#;
        let selectors = PageSelectors {
            results_container: "hits".to_string(),
            search_input: "box".to_string(),
        };
        let page = HtmlResultsPage::parse(html, &selectors);
        assert_eq!(page.entries().len(), 1);
        assert_eq!(page.search_input().unwrap().value, "old");
    }
}
