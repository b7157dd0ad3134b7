//! Loaded source documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::range::PageRange;

/// Stable identifier of a loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One PDF file pending a merge or split.
///
/// The byte buffer and page count are fixed at load time. Only the range
/// is meant to change afterwards.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    id: DocumentId,
    name: String,
    bytes: Arc<[u8]>,
    page_count: usize,
    /// Pages selected for a merge.
    pub range: PageRange,
}

impl SourceDocument {
    /// Wrap a loaded file. The range defaults to every page.
    pub fn new(name: impl Into<String>, bytes: Arc<[u8]>, page_count: usize) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            bytes,
            page_count,
            range: PageRange::all(page_count),
        }
    }

    /// Identifier assigned at load time.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Display name, usually the file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name without a trailing `.pdf`.
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }

    /// Raw file content.
    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Human-readable file size.
    pub fn size_label(&self) -> String {
        format_file_size(self.size())
    }

    /// Number of pages, as read at load time.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Zero-based indices selected by the current range.
    pub fn selected_pages(&self) -> Vec<usize> {
        self.range.resolve(self.page_count)
    }
}

/// Strip a trailing `.pdf` extension, ignoring case.
///
/// # Examples
///
/// ```
/// use pdfmaster::document::base_name;
///
/// assert_eq!(base_name("Report.PDF"), "Report");
/// assert_eq!(base_name("notes.txt"), "notes.txt");
/// ```
pub fn base_name(name: &str) -> &str {
    let split = name.len().saturating_sub(4);
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(".pdf") => stem,
        _ => name,
    }
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
