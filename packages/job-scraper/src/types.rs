//! Data types shared across the scrape pipeline.

use serde::{Deserialize, Serialize};

/// Closing date used when the listing carries no usable date marker.
pub const NOT_SPECIFIED: &str = "Not specified";

/// A tentative job entry pulled from the listing page, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Visible job title (trimmed, never empty).
    pub name: String,
    /// `DD/MM/YYYY` text or [`NOT_SPECIFIED`]. Never validated here.
    pub last_date: String,
    /// Detail page href exactly as it appears in the listing.
    pub detail_url: String,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        last_date: impl Into<String>,
        detail_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            last_date: last_date.into(),
            detail_url: detail_url.into(),
        }
    }
}

/// A fully enriched job posting, as persisted in the archive.
///
/// The JSON shape is `{name, last_date, link, apply_url}`. `apply_url` is an
/// empty string when no application link could be determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,
    pub last_date: String,
    #[serde(rename = "link")]
    pub detail_link: String,
    #[serde(default)]
    pub apply_url: String,
}

impl JobRecord {
    /// Finish a candidate with the apply URL found for it (possibly empty).
    pub fn from_candidate(candidate: Candidate, apply_url: impl Into<String>) -> Self {
        Self {
            name: candidate.name,
            last_date: candidate.last_date,
            detail_link: candidate.detail_url,
            apply_url: apply_url.into(),
        }
    }

    pub fn has_apply_url(&self) -> bool {
        !self.apply_url.is_empty()
    }
}

/// An `<a>` element reduced to what link classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Attribute value as written, untrimmed.
    pub href: String,
    /// Visible text, trimmed.
    pub text: String,
}

impl Anchor {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }

    /// Anchors without an href or without visible text are ignored everywhere.
    /// A whitespace-only href counts as missing.
    pub fn is_usable(&self) -> bool {
        !self.href.trim().is_empty() && !self.text.is_empty()
    }
}
