//! Page decorations applied once at load time
//!
//! Works out which elements of a rendered page get a heading anchor,
//! `target="_blank"`, a centered parent, and the sticky sidebar offset.
//! The plan is descriptive; applying it is up to whatever owns the page.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const ARTICLE_IMAGES: &str = "article img";
const SKIPPED_IMAGE_CLASSES: [&str; 2] = ["emoji", "eye-catch"];
const ASIDE: &str = ".site-aside";

/// Anchor appended to a heading that has an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLink {
    /// Heading tag, e.g. `h2`
    pub tag: String,
    pub id: String,
}

impl HeaderLink {
    /// Markup appended inside the heading
    pub fn anchor_html(&self) -> String {
        format!(
            "<a class=\"header-link\" href=\"#{}\"><i class=\"fa fa-link\"></i></a>",
            escape_attr(&self.id)
        )
    }
}

/// Escape a value for a double-quoted attribute
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Everything the load-time scripts would change on a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationPlan {
    pub header_links: Vec<HeaderLink>,
    /// hrefs that open in a new tab
    pub external_links: Vec<String>,
    /// src of every image whose parent gets `text-align: center;`
    pub centered_images: Vec<String>,
    /// Top spacing for the sticky sidebar, from the aside's `padding-top`
    pub sticky_offset: Option<i64>,
}

/// Build the decoration plan for a page served from `host`
pub fn plan(html: &str, host: &str) -> DecorationPlan {
    let document = Html::parse_document(html);

    let plan = DecorationPlan {
        header_links: header_links(&document),
        external_links: external_links(&document, host),
        centered_images: centered_images(&document),
        sticky_offset: sticky_offset(&document),
    };

    log::info!(
        "[Decorations] {} header links, {} external links, {} centered images",
        plan.header_links.len(),
        plan.external_links.len(),
        plan.centered_images.len()
    );
    plan
}

fn select<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => document.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn header_links(document: &Html) -> Vec<HeaderLink> {
    select(document, HEADINGS)
        .into_iter()
        .filter_map(|el| {
            let id = el.value().attr("id").filter(|id| !id.is_empty())?;
            Some(HeaderLink {
                tag: el.value().name().to_string(),
                id: id.to_string(),
            })
        })
        .collect()
}

/// True when `href` points off-site: it has `//` and does not mention `host`.
///
/// `host` is used as a pattern, so `example.org` also accepts `exampleXorg`.
pub fn is_external(href: &str, host_pattern: &HostPattern) -> bool {
    href.contains("//") && !host_pattern.is_match(href)
}

/// The current host, matched the way the link script matches it
#[derive(Debug, Clone)]
pub enum HostPattern {
    Pattern(Regex),
    Literal(String),
}

impl HostPattern {
    pub fn new(host: &str) -> Self {
        match Regex::new(host) {
            Ok(re) => HostPattern::Pattern(re),
            Err(e) => {
                log::debug!("[Decorations] Host {:?} is not a pattern ({}), matching literally", host, e);
                HostPattern::Literal(host.to_string())
            }
        }
    }

    pub fn is_match(&self, href: &str) -> bool {
        match self {
            HostPattern::Pattern(re) => re.is_match(href),
            HostPattern::Literal(host) => href.contains(host.as_str()),
        }
    }
}

fn external_links(document: &Html, host: &str) -> Vec<String> {
    let host_pattern = HostPattern::new(host);
    select(document, "a[href]")
        .into_iter()
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| is_external(href, &host_pattern))
        .map(str::to_string)
        .collect()
}

fn centered_images(document: &Html) -> Vec<String> {
    select(document, ARTICLE_IMAGES)
        .into_iter()
        .filter(|img| {
            !img
                .value()
                .classes()
                .any(|class| SKIPPED_IMAGE_CLASSES.contains(&class))
        })
        .filter(|img| img.parent().is_some())
        .map(|img| img.value().attr("src").unwrap_or("").to_string())
        .collect()
}

fn sticky_offset(document: &Html) -> Option<i64> {
    let aside = select(document, ASIDE).into_iter().next()?;
    let style = aside.value().attr("style")?;

    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("padding-top"))
        .and_then(|(_, value)| parse_int_prefix(value))
}

/// Leading integer of a CSS length such as `24px`, like `parseInt`
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (sign, digits) = match value.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <aside class="site-aside" style="padding-top: 24px; color: red"><div class="sticky"></div></aside>
  <article>
    <h1 id="intro">Intro</h1>
    <h2>No id</h2>
    <h3 id="">Empty id</h3>
    <p><img src="/a.png"></p>
    <p><img class="emoji" src="/smile.png"></p>
    <p><img class="eye-catch wide" src="/hero.png"></p>
    <a href="https://other.net/x">Elsewhere</a>
    <a href="https://example.org/p1">Same host</a>
    <a href="/p2">Relative</a>
    <a href="//cdn.net/lib.js">Protocol relative</a>
  </article>
  <img src="/outside.png">
  <h4 id="footer">Footer</h4>
</body></html>"#;

    #[test]
    fn test_header_links() {
        let plan = plan(PAGE, "example.org");
        assert_eq!(
            plan.header_links,
            vec![
                HeaderLink { tag: "h1".to_string(), id: "intro".to_string() },
                HeaderLink { tag: "h4".to_string(), id: "footer".to_string() },
            ]
        );
        assert_eq!(
            plan.header_links[0].anchor_html(),
            r##"<a class="header-link" href="#intro"><i class="fa fa-link"></i></a>"##
        );
    }

    #[test]
    fn test_anchor_escapes_heading_id() {
        let plan = plan(r#"<h2 id="a&quot;><script>x</script>">Title</h2>"#, "example.org");
        let link = &plan.header_links[0];
        assert_eq!(link.id, r#"a"><script>x</script>"#);

        let html = link.anchor_html();
        assert_eq!(
            html,
            r##"<a class="header-link" href="#a&quot;&gt;&lt;script&gt;x&lt;/script&gt;"><i class="fa fa-link"></i></a>"##
        );
        assert!(!html.contains("<script>"));

        let link = HeaderLink { tag: "h3".to_string(), id: "q&a".to_string() };
        assert!(link.anchor_html().contains(r##"href="#q&amp;a""##));
    }

    #[test]
    fn test_external_links() {
        let plan = plan(PAGE, "example.org");
        assert_eq!(plan.external_links, vec!["https://other.net/x", "//cdn.net/lib.js"]);
    }

    #[test]
    fn test_host_is_a_pattern() {
        let pattern = HostPattern::new("example.org");
        assert!(!is_external("https://exampleXorg/p", &pattern));

        let pattern = HostPattern::new("local(host");
        assert!(matches!(pattern, HostPattern::Literal(_)));
        assert!(!is_external("http://local(host/x", &pattern));
        assert!(is_external("http://other/x", &pattern));
    }

    #[test]
    fn test_empty_host_keeps_everything_local() {
        let plan = plan(PAGE, "");
        assert!(plan.external_links.is_empty());
    }

    #[test]
    fn test_centered_images() {
        let plan = plan(PAGE, "example.org");
        assert_eq!(plan.centered_images, vec!["/a.png"]);
    }

    #[test]
    fn test_sticky_offset() {
        let plan = plan(PAGE, "example.org");
        assert_eq!(plan.sticky_offset, Some(24));

        let plan = super::plan("<aside class=\"site-aside\"></aside>", "example.org");
        assert_eq!(plan.sticky_offset, None);
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("24px"), Some(24));
        assert_eq!(parse_int_prefix(" 1.5em"), Some(1));
        assert_eq!(parse_int_prefix("-8px"), Some(-8));
        assert_eq!(parse_int_prefix("auto"), None);
        assert_eq!(parse_int_prefix(""), None);
    }
}
