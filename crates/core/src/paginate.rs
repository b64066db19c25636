//! Next-link discovery and the pagination walker.
//!
//! Source sites split long chapters across pages linked by a small "next
//! page" anchor. This module scans a page's markup for that anchor, decides
//! whether the link is a genuine continuation (as opposed to unrelated
//! navigation), and drives fetch → extract → scan in a loop until the
//! chapter has been stitched back together.

use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::extract::{Article, extract_article};
use crate::fetch::{FetchConfig, fetch_page};
use crate::{AuditoError, Result};

/// Simplified-glyph "next page" label.
const NEXT_LABEL_SIMPLIFIED: &str = "下一页";
/// Traditional-glyph "next page" label, treated as the more authoritative of
/// the two when both appear on a page.
const NEXT_LABEL_TRADITIONAL: &str = "下一頁";

/// The candidate next-page hrefs found on one page, one slot per recognized
/// label variant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NextLinks {
    /// Href of the anchor labeled 下一页, if present.
    pub simplified: Option<String>,
    /// Href of the anchor labeled 下一頁, if present.
    pub traditional: Option<String>,
}

impl NextLinks {
    /// The href to follow: the traditional-glyph variant wins when both are
    /// present.
    pub fn preferred(&self) -> Option<&str> {
        self.traditional.as_deref().or(self.simplified.as_deref())
    }
}

/// Scans page markup for anchors carrying one of the known "next page"
/// labels.
///
/// Anchor text is trimmed before comparison and hrefs are trimmed before
/// being returned. When several anchors carry the same label, the last one
/// in document order wins.
pub fn scan_next_links(html: &str) -> NextLinks {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a").expect("static selector");

    let mut links = NextLinks::default();
    for anchor in document.select(&anchors) {
        let label = anchor.text().collect::<String>();
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() {
            continue;
        }
        match label.trim() {
            NEXT_LABEL_SIMPLIFIED => links.simplified = Some(href.to_string()),
            NEXT_LABEL_TRADITIONAL => links.traditional = Some(href.to_string()),
            _ => {}
        }
    }
    links
}

/// Convenience wrapper returning the href that should be followed, if any.
pub fn find_next_link(html: &str) -> Option<String> {
    scan_next_links(html).preferred().map(str::to_string)
}

/// Last path segment of a link, with any query or fragment stripped.
fn last_path_segment(link: &str) -> &str {
    let link = link.split(['?', '#']).next().unwrap_or(link);
    link.rsplit('/').next().unwrap_or(link)
}

/// Filename stem of a path segment: everything before the final `.`.
fn stem(segment: &str) -> &str {
    segment.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(segment)
}

/// Builds the continuation pattern for a chapter whose first page has the
/// given URL.
///
/// Pagination URLs on the supported site family are `<stem>_2.html`,
/// `<stem>_3.html`, … where `<stem>` is the first page's filename stem.
/// Returns `None` when the first page has no usable stem, in which case only
/// the single-character rule applies.
fn continuation_pattern(first_page: &Url) -> Option<Regex> {
    let segment = first_page.path_segments().and_then(|mut s| s.next_back())?;
    let stem = stem(last_path_segment(segment));
    if stem.is_empty() {
        return None;
    }
    Regex::new(&format!("^{}_\\d+$", regex::escape(stem))).ok()
}

/// Decides whether a discovered link looks like a genuine continuation page.
///
/// A link is followed only when its last path segment, stripped of its
/// extension, is a single character or matches `<first-page-stem>_<digits>`.
/// Directory-style links (trailing `/`) never continue; anything else is
/// assumed to be unrelated navigation.
fn is_continuation(link: &str, pattern: Option<&Regex>) -> bool {
    if link.is_empty() || link.ends_with('/') {
        return false;
    }
    let stem = stem(last_path_segment(link));
    if stem.is_empty() {
        return false;
    }
    if stem.chars().count() == 1 {
        return true;
    }
    pattern.is_some_and(|p| p.is_match(stem))
}

/// Fetches a page and all of its continuation pages, returning one stitched
/// article.
///
/// Failure on the first page (fetch error or no extractable article) fails
/// the whole operation. A failure on any continuation page stops pagination
/// and returns what has been assembled so far; that best-effort policy is
/// deliberate. Each next link is resolved against the URL of the page that
/// contained it, and already-visited URLs are never refetched.
pub async fn assemble_article(start_url: &str, config: &FetchConfig) -> Result<Article> {
    let first = fetch_page(start_url, config).await?;
    let mut article = extract_article(&first.html, &first.url)?;

    let pattern = continuation_pattern(&first.url);
    let mut visited: HashSet<String> = HashSet::from([first.url.to_string()]);
    let mut current_url = first.url;
    let mut html = first.html;

    loop {
        let Some(link) = find_next_link(&html) else {
            break;
        };
        if !is_continuation(&link, pattern.as_ref()) {
            debug!(link, "next link does not match the continuation pattern, stopping");
            break;
        }
        let next_url = match current_url.join(&link) {
            Ok(url) => url,
            Err(e) => {
                warn!(link, error = %e, "failed to resolve next link, stopping");
                break;
            }
        };
        if !visited.insert(next_url.to_string()) {
            warn!(%next_url, "pagination cycle detected, stopping");
            break;
        }

        let page = match fetch_page(next_url.as_str(), config).await {
            Ok(page) => page,
            Err(e) => {
                warn!(%next_url, error = %e, "continuation fetch failed, keeping partial article");
                break;
            }
        };
        match extract_article(&page.html, &page.url) {
            Ok(continuation) => article.absorb(continuation),
            Err(AuditoError::NoArticle(reason)) => {
                debug!(%next_url, reason, "continuation page has no article, stopping");
                break;
            }
            Err(e) => {
                warn!(%next_url, error = %e, "continuation extraction failed, stopping");
                break;
            }
        }

        current_url = page.url;
        html = page.html;
    }

    Ok(article)
}
