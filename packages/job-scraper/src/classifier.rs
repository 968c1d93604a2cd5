//! Apply-link classification.
//!
//! Detail pages on listing sites phrase their application links
//! inconsistently ("Apply Online", "Click Here", "Official Website", links to
//! notification PDFs...). Rather than taking the first plausible match, every
//! anchor is sorted into a priority bucket and the best non-empty bucket wins:
//!
//! ```text
//! apply_online > portal > website > pdf > click_here
//! ```
//!
//! If every bucket is empty, a second pass returns the first anchor whose
//! text mentions an application-related keyword.

use crate::types::Anchor;

/// Href fragments that identify an application portal.
const PORTAL_MARKERS: &[&str] = &["portal", "apply", "ibps"];

/// Keywords for the second pass, in priority order.
const FALLBACK_KEYWORDS: &[&str] = &[
    "registration",
    "application",
    "apply",
    "form",
    "recruitment",
    "vacancy",
];

/// Reliability class of an anchor, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkClass {
    ApplyOnline,
    Portal,
    Website,
    Pdf,
    ClickHere,
}

impl LinkClass {
    pub const PRIORITY: [LinkClass; 5] = [
        LinkClass::ApplyOnline,
        LinkClass::Portal,
        LinkClass::Website,
        LinkClass::Pdf,
        LinkClass::ClickHere,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Assign an anchor to at most one bucket.
///
/// The tests run in a fixed order so an anchor matching several rules lands
/// in exactly one: explicit apply text, then "click here" (split on whether
/// the href is a PDF), then portal hrefs, then official-website text.
pub fn bucket_for(anchor: &Anchor) -> Option<LinkClass> {
    if !anchor.is_usable() {
        return None;
    }

    let text = anchor.text.to_lowercase();
    let href = anchor.href.to_lowercase();

    if text.contains("apply online") || text.contains("apply now") {
        Some(LinkClass::ApplyOnline)
    } else if text.contains("click here") {
        if href.ends_with(".pdf") {
            Some(LinkClass::Pdf)
        } else {
            Some(LinkClass::ClickHere)
        }
    } else if PORTAL_MARKERS.iter().any(|marker| href.contains(marker)) {
        Some(LinkClass::Portal)
    } else if text.contains("official") && text.contains("website") {
        Some(LinkClass::Website)
    } else {
        None
    }
}

/// Pick the most likely "apply" URL from a page's anchors.
///
/// Returns an href taken verbatim from the input, or an empty string when
/// nothing qualifies.
pub fn classify(anchors: &[Anchor]) -> String {
    let mut buckets: [Option<&Anchor>; 5] = [None; 5];

    for anchor in anchors {
        if let Some(class) = bucket_for(anchor) {
            buckets[class.index()].get_or_insert(anchor);
        }
    }

    if let Some(anchor) = LinkClass::PRIORITY
        .iter()
        .find_map(|class| buckets[class.index()])
    {
        return anchor.href.clone();
    }

    keyword_fallback(anchors)
        .map(|anchor| anchor.href.clone())
        .unwrap_or_default()
}

fn keyword_fallback(anchors: &[Anchor]) -> Option<&Anchor> {
    anchors.iter().filter(|a| a.is_usable()).find(|anchor| {
        let text = anchor.text.to_lowercase();
        FALLBACK_KEYWORDS.iter().any(|keyword| text.contains(keyword))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(href: &str, text: &str) -> Anchor {
        Anchor::new(href, text)
    }

    #[test]
    fn test_apply_online_beats_everything() {
        let anchors = vec![
            a("https://ibps.in/portal", "Register"),
            a("/notice.pdf", "Click Here"),
            a("/apply/1", "Apply Online"),
        ];
        assert_eq!(classify(&anchors), "/apply/1");
    }

    #[test]
    fn test_portal_beats_pdf_click_here() {
        let anchors = vec![
            a("/files/notice.pdf", "Click Here"),
            a("https://recruit.example.gov/portal/login", "Login"),
        ];
        assert_eq!(
            classify(&anchors),
            "https://recruit.example.gov/portal/login"
        );
    }

    #[test]
    fn test_website_beats_pdf_and_click_here() {
        let anchors = vec![
            a("/other", "Click Here"),
            a("/files/n.PDF", "click here"),
            a("https://board.example.gov", "Official Website"),
        ];
        assert_eq!(classify(&anchors), "https://board.example.gov");
    }

    #[test]
    fn test_pdf_beats_plain_click_here() {
        let anchors = vec![a("/somewhere", "Click here"), a("/notice.pdf", "Click here")];
        assert_eq!(classify(&anchors), "/notice.pdf");
    }

    #[test]
    fn test_first_in_document_order_within_bucket() {
        let anchors = vec![
            a("/apply/first", "Apply Now"),
            a("/apply/second", "Apply Online"),
        ];
        assert_eq!(classify(&anchors), "/apply/first");
    }

    #[test]
    fn test_click_here_with_apply_href_stays_in_click_here_bucket() {
        let anchors = vec![
            a("/apply/form", "Click Here"),
            a("https://board.example.gov", "Official Website"),
        ];
        assert_eq!(classify(&anchors), "https://board.example.gov");
    }

    #[test]
    fn test_keyword_fallback_when_no_bucket_matches() {
        let anchors = vec![
            a("/about", "About us"),
            a("/reg", "Candidate Registration"),
            a("/form", "Download Form"),
        ];
        assert_eq!(classify(&anchors), "/reg");
    }

    #[test]
    fn test_unusable_anchors_are_skipped_in_both_passes() {
        let anchors = vec![
            a("", "Apply Online"),
            a("/portal", ""),
            a("", "Registration"),
            a("/contact", "Contact"),
        ];
        assert_eq!(classify(&anchors), "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(classify(&[]), "");
    }

    #[test]
    fn test_result_is_always_an_input_href() {
        let anchors = vec![
            a("/a", "Home"),
            a("/b.pdf", "Click Here"),
            a("https://x.example/ibps", "Result"),
            a("/c", "Vacancy details"),
        ];
        let picked = classify(&anchors);
        assert!(anchors.iter().any(|anchor| anchor.href == picked));
    }

    #[test]
    fn test_bucket_for() {
        assert_eq!(bucket_for(&a("/x", "APPLY NOW")), Some(LinkClass::ApplyOnline));
        assert_eq!(bucket_for(&a("/IBPS/reg", "Go")), Some(LinkClass::Portal));
        assert_eq!(
            bucket_for(&a("/x", "Visit official board website")),
            Some(LinkClass::Website)
        );
        assert_eq!(bucket_for(&a("/x", "News")), None);
    }
}
