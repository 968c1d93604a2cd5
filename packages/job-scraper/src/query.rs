//! Read-side helpers over a snapshot.
//!
//! Consumers that poll the archive file use these to present jobs: newest
//! closing date first, paged, optionally narrowed by a name search or a
//! coarse category. Closing dates are only interpreted here; the scrape layer
//! passes them through untouched.

use std::cmp::Reverse;

use chrono::NaiveDate;

use crate::types::JobRecord;

const DATE_FORMAT: &str = "%d/%m/%Y";

const SSC_KEYWORDS: &[&str] = &["ssc", "staff selection", "cgl", "chsl"];
const STATE_KEYWORDS: &[&str] = &["state", "govt", "government", "psc"];

/// Coarse grouping derived from the job title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCategory {
    Ssc,
    State,
    Private,
}

impl std::str::FromStr for JobCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ssc" => Ok(Self::Ssc),
            "state" => Ok(Self::State),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index
    pub page: usize,
    pub has_more: bool,
}

/// Parse a `DD/MM/YYYY` closing date. The sentinel and impossible calendar
/// dates (e.g. 31/02) yield `None`.
pub fn closing_date(record: &JobRecord) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(record.last_date.trim(), DATE_FORMAT).ok()
}

/// Sort by closing date, latest first.
///
/// Records without a usable date compare as later than any real date and so
/// come first. The sort is stable.
pub fn sort_latest(records: &mut [JobRecord]) {
    records.sort_by_key(|record| Reverse(closing_date(record).unwrap_or(NaiveDate::MAX)));
}

pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let start = page.saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page,
        has_more: items.len() > end,
    }
}

/// Case-insensitive substring match on the job name. A blank query matches
/// nothing.
pub fn search(records: &[JobRecord], query: &str) -> Vec<JobRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

pub fn categorize(name: &str) -> JobCategory {
    let name = name.to_lowercase();
    if SSC_KEYWORDS.iter().any(|k| name.contains(k)) {
        JobCategory::Ssc
    } else if STATE_KEYWORDS.iter().any(|k| name.contains(k)) {
        JobCategory::State
    } else {
        JobCategory::Private
    }
}

pub fn filter_by_category(records: &[JobRecord], category: JobCategory) -> Vec<JobRecord> {
    records
        .iter()
        .filter(|record| categorize(&record.name) == category)
        .cloned()
        .collect()
}

/// Narrow to jobs whose name mentions `state` (e.g. "Bihar"), ignoring case.
/// A blank state keeps every record.
pub fn filter_by_state(records: &[JobRecord], state: &str) -> Vec<JobRecord> {
    let state = state.trim().to_lowercase();
    records
        .iter()
        .filter(|record| state.is_empty() || record.name.to_lowercase().contains(&state))
        .cloned()
        .collect()
}
