//! Page range parsing.
//!
//! A range specification is a comma-separated list of 1-indexed page numbers
//! and inclusive spans, as typed by a user:
//!
//! - `"5"` - a single page
//! - `"1-5"` - pages 1 through 5
//! - `"-3"` - pages 1 through 3
//! - `"8-"` - page 8 through the last page
//! - `"1-3, 5, 9-"` - any combination of the above
//!
//! Parsing never fails. Tokens that do not make sense for the document are
//! dropped, and the result is the set of zero-based page indices that
//! remain, in ascending order.
//!
//! # Examples
//!
//! ```
//! use pdfmaster::range::parse_page_indices;
//!
//! assert_eq!(parse_page_indices("1-3,5", 10), vec![0, 1, 2, 4]);
//! assert_eq!(parse_page_indices("8-", 10), vec![7, 8, 9]);
//! assert!(parse_page_indices("abc", 10).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Resolve a range specification against a page count.
///
/// Returns zero-based page indices, unique and sorted ascending. Each index
/// is guaranteed to be below `total_pages`.
///
/// # Arguments
///
/// * `spec` - Range specification (e.g., "1-3, 5, 9-")
/// * `total_pages` - Number of pages in the document
pub fn parse_page_indices(spec: &str, total_pages: usize) -> Vec<usize> {
    let mut indices = BTreeSet::new();

    for segment in spec.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        if segment.contains('-') {
            let mut bounds = segment.split('-');
            let start = bounds.next().and_then(leading_number).unwrap_or(1);
            let end = bounds
                .next()
                .and_then(leading_number)
                .unwrap_or(total_pages);

            let start = start.max(1);
            let end = end.min(total_pages);

            if start <= end {
                indices.extend((start..=end).map(|page| page - 1));
            }
        } else if let Some(page) = leading_number(segment)
            && (1..=total_pages).contains(&page)
        {
            indices.insert(page - 1);
        }
    }

    indices.into_iter().collect()
}

/// Build the specification that selects every page of a document.
///
/// # Examples
///
/// ```
/// use pdfmaster::range::full_range;
///
/// assert_eq!(full_range(12), "1-12");
/// ```
pub fn full_range(total_pages: usize) -> String {
    format!("1-{total_pages}")
}

/// Read the leading run of decimal digits of a token.
///
/// Surrounding whitespace and a single leading `+` are accepted, trailing
/// garbage is ignored ("3a" reads as 3). Values too large for `usize`
/// saturate, which the callers then clamp or reject.
fn leading_number(token: &str) -> Option<usize> {
    let token = token.trim();
    let token = token.strip_prefix('+').unwrap_or(token);

    let digits_end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    let digits = &token[..digits_end];

    if digits.is_empty() {
        return None;
    }

    Some(digits.parse().unwrap_or(usize::MAX))
}

/// A user-editable page range specification.
///
/// The raw text is kept as typed. It is resolved against a page count every
/// time it is needed and the result is never cached, so edits take effect
/// immediately.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageRange(String);

impl PageRange {
    /// Wrap a raw specification string.
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    /// Range covering every page of a document with `total_pages` pages.
    pub fn all(total_pages: usize) -> Self {
        Self(full_range(total_pages))
    }

    /// The raw specification text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Replace the specification text.
    pub fn set(&mut self, spec: impl Into<String>) {
        self.0 = spec.into();
    }

    /// Resolve into zero-based page indices.
    pub fn resolve(&self, total_pages: usize) -> Vec<usize> {
        parse_page_indices(&self.0, total_pages)
    }

    /// Check whether the range selects no page of the document.
    pub fn is_empty_for(&self, total_pages: usize) -> bool {
        self.resolve(total_pages).is_empty()
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageRange {
    fn from(spec: &str) -> Self {
        Self::new(spec)
    }
}

impl From<String> for PageRange {
    fn from(spec: String) -> Self {
        Self(spec)
    }
}
