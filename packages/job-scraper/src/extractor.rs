//! HTML extraction for listing and detail pages.
//!
//! The listing page is read with a structural selector (`table tr td`): every
//! anchor inside a cell is a job, and the cell's text carries the closing date
//! after a `Last Date :` marker. Only when that selector finds no cells at
//! all does the extractor fall back to scanning every anchor on the page for
//! job-like titles.
//!
//! Parsing is synchronous; callers must not hold a parsed document across an
//! `.await`.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::{ScrapeError, ScrapeResult};
use crate::types::{Anchor, Candidate, NOT_SPECIFIED};

const CELL_SELECTOR: &str = "table tr td";
const ANCHOR_SELECTOR: &str = "a";
const LAST_DATE_MARKER: &str = "Last Date :";

/// Fallback candidates need at least this many characters of title.
const MIN_FALLBACK_NAME_CHARS: usize = 10;

/// Href tokens that mark navigation chrome rather than a job.
const NAVIGATION_TOKENS: &[&str] = &["index", "home"];

/// Which strategy produced a listing's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStrategy {
    /// `table tr td` matched this many cells.
    TableCells(usize),
    /// No cells matched; every anchor was considered.
    AnchorScan,
}

/// Candidates pulled from a listing page.
#[derive(Debug, Clone)]
pub struct Listing {
    pub candidates: Vec<Candidate>,
    pub strategy: ListingStrategy,
}

/// Extract candidate jobs from a listing page.
pub fn extract(html: &str) -> ScrapeResult<Vec<Candidate>> {
    extract_listing(html).map(|listing| listing.candidates)
}

/// Extract candidates and report which strategy was used.
pub fn extract_listing(html: &str) -> ScrapeResult<Listing> {
    let document = Html::parse_document(html);
    let cell_selector = selector(CELL_SELECTOR)?;
    let anchor_selector = selector(ANCHOR_SELECTOR)?;

    let cells: Vec<ElementRef<'_>> = document.select(&cell_selector).collect();
    info!(cells = cells.len(), "Matched listing cells with '{}'", CELL_SELECTOR);

    if cells.is_empty() {
        let candidates = scan_anchors(&document, &anchor_selector);
        info!(
            candidates = candidates.len(),
            "No listing cells; used anchor-scan fallback"
        );
        return Ok(Listing {
            candidates,
            strategy: ListingStrategy::AnchorScan,
        });
    }

    let mut candidates = Vec::new();
    for cell in &cells {
        let cell_text: String = cell.text().collect();
        let last_date = last_date_from(&cell_text);

        for link in cell.select(&anchor_selector) {
            let anchor = anchor_from(link);
            if !anchor.is_usable() {
                continue;
            }
            debug!(name = %anchor.text, url = %anchor.href, "Found job");
            candidates.push(Candidate::new(anchor.text, last_date.clone(), anchor.href));
        }
    }

    Ok(Listing {
        candidates,
        strategy: ListingStrategy::TableCells(cells.len()),
    })
}

/// Every anchor on a detail page, in document order.
///
/// Unusable anchors (no href or no text) are kept; classification skips them.
pub fn anchors_in(html: &str) -> ScrapeResult<Vec<Anchor>> {
    let document = Html::parse_document(html);
    let anchor_selector = selector(ANCHOR_SELECTOR)?;
    Ok(document.select(&anchor_selector).map(anchor_from).collect())
}

/// Closing date following the `Last Date :` marker, or [`NOT_SPECIFIED`].
pub fn last_date_from(text: &str) -> String {
    text.split_once(LAST_DATE_MARKER)
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(str::to_string)
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

fn scan_anchors(document: &Html, anchor_selector: &Selector) -> Vec<Candidate> {
    document
        .select(anchor_selector)
        .map(anchor_from)
        .filter(|anchor| anchor.is_usable())
        .filter(|anchor| anchor.text.chars().count() >= MIN_FALLBACK_NAME_CHARS)
        .filter(|anchor| !is_navigation(&anchor.href))
        .map(|anchor| {
            debug!(name = %anchor.text, url = %anchor.href, "Found potential job");
            Candidate::new(anchor.text, NOT_SPECIFIED, anchor.href)
        })
        .collect()
}

fn is_navigation(href: &str) -> bool {
    let href = href.to_lowercase();
    NAVIGATION_TOKENS.iter().any(|token| href.contains(token))
}

fn anchor_from(element: ElementRef<'_>) -> Anchor {
    let href = element.value().attr("href").unwrap_or_default();
    let text: String = element.text().collect();
    Anchor::new(href, text.trim())
}

fn selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::parse(format!("invalid selector {css}: {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_cell_with_last_date() {
        let html = r#"
            <html><body><table><tr>
                <td><a href="/job/1">Example Job</a> Last Date : 31/12/2025 apply now</td>
            </tr></table></body></html>
        "#;

        let listing = extract_listing(html).unwrap();
        assert_eq!(listing.strategy, ListingStrategy::TableCells(1));
        assert_eq!(
            listing.candidates,
            vec![Candidate::new("Example Job", "31/12/2025", "/job/1")]
        );
    }

    #[test]
    fn test_every_anchor_in_cell_is_a_candidate_sharing_the_date() {
        let html = r#"
            <table><tr><td>
                <a href="/a">SSC CGL 2025</a><br>
                <a href="/b">SSC CHSL 2025</a>
                Last Date : 01/02/2026
            </td></tr></table>
        "#;

        let candidates = extract(html).unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.last_date == "01/02/2026"));
        assert_eq!(candidates[0].detail_url, "/a");
        assert_eq!(candidates[1].detail_url, "/b");
    }

    #[test]
    fn test_missing_or_malformed_date_uses_sentinel() {
        let html = r#"
            <table><tr>
                <td><a href="/a">Job A</a></td>
                <td><a href="/b">Job B</a> Last Date :   </td>
                <td><a href="/c">Job C</a> Last Date 05/05/2025</td>
            </tr></table>
        "#;

        let candidates = extract(html).unwrap();
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.last_date == NOT_SPECIFIED));
    }

    #[test]
    fn test_cell_anchors_without_href_or_text_are_skipped() {
        let html = r#"
            <table><tr><td>
                <a>No href here</a>
                <a href="/empty"> </a>
                <a href="/ok">Good Job</a>
            </td></tr></table>
        "#;

        let candidates = extract(html).unwrap();
        assert_eq!(candidates, vec![Candidate::new("Good Job", NOT_SPECIFIED, "/ok")]);
    }

    #[test]
    fn test_fallback_when_no_cells() {
        let html = r#"
            <html><body>
                <a href="/careers/xyz">Field Worker</a>
            </body></html>
        "#;

        let listing = extract_listing(html).unwrap();
        assert_eq!(listing.strategy, ListingStrategy::AnchorScan);
        assert_eq!(
            listing.candidates,
            vec![Candidate::new("Field Worker", NOT_SPECIFIED, "/careers/xyz")]
        );
    }

    #[test]
    fn test_fallback_filters_short_names_and_navigation() {
        let html = r#"
            <body>
                <a href="/index.html">Back to the index page</a>
                <a href="https://example.com/HOME">Home page of the site</a>
                <a href="/jobs/1">Short</a>
                <a href="">Empty href but long text</a>
                <a href="/jobs/2">Junior Engineer Posts</a>
            </body>
        "#;

        let candidates = extract(html).unwrap();
        assert_eq!(
            candidates,
            vec![Candidate::new("Junior Engineer Posts", NOT_SPECIFIED, "/jobs/2")]
        );
    }

    #[test]
    fn test_fallback_does_not_run_when_a_cell_matches() {
        let html = r#"
            <body>
                <table><tr><td>No links in this cell</td></tr></table>
                <a href="/jobs/2">Junior Engineer Posts</a>
            </body>
        "#;

        let listing = extract_listing(html).unwrap();
        assert_eq!(listing.strategy, ListingStrategy::TableCells(1));
        assert!(listing.candidates.is_empty());
    }

    #[test]
    fn test_anchors_in_keeps_document_order() {
        let html = r#"
            <p><a href="/one">One</a> <a>Two</a> <a href="/three"> Three </a></p>
        "#;

        let anchors = anchors_in(html).unwrap();
        assert_eq!(
            anchors,
            vec![
                Anchor::new("/one", "One"),
                Anchor::new("", "Two"),
                Anchor::new("/three", "Three"),
            ]
        );
    }

    #[test]
    fn test_href_is_kept_verbatim() {
        let html = r#"<a href=" /apply/1 ">Apply Online</a><a href="  ">Blank</a>"#;

        let anchors = anchors_in(html).unwrap();
        assert_eq!(anchors[0].href, " /apply/1 ");
        assert!(anchors[0].is_usable());
        assert!(!anchors[1].is_usable());
        assert_eq!(crate::classifier::classify(&anchors), " /apply/1 ");
    }

    #[test]
    fn test_last_date_from() {
        assert_eq!(last_date_from("x Last Date : 10/10/2025 y"), "10/10/2025");
        assert_eq!(last_date_from("Last Date :31/02/2025"), "31/02/2025");
        assert_eq!(last_date_from("no marker"), NOT_SPECIFIED);
    }
}
