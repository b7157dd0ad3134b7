//! Output formatting and display for pdfmaster.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Ingestion reports
//! - Merge and split plans for dry runs
//! - Document summaries, as text or JSON
//!
//! # Examples
//!
//! ```no_run
//! use pdfmaster::output::OutputFormatter;
//! use pdfmaster::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge operation");
//! formatter.success("Merge completed successfully");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use serde::Serialize;

use crate::config::Config;
use crate::document::SourceDocument;
use crate::engine::DeliveryReceipt;
use crate::io::IngestReport;
use crate::workflow::SplitPart;

/// Create an output formatter from configuration.
pub fn create_formatter(config: &Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// Serializable summary of a loaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Identifier assigned at load time.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Number of pages.
    pub pages: usize,
    /// Size in bytes.
    pub size: u64,
    /// Human-readable size.
    pub size_label: String,
    /// Current range specification.
    pub range: String,
}

impl From<&SourceDocument> for DocumentSummary {
    fn from(doc: &SourceDocument) -> Self {
        Self {
            id: doc.id().to_string(),
            name: doc.name().to_string(),
            pages: doc.page_count(),
            size: doc.size(),
            size_label: doc.size_label(),
            range: doc.range.to_string(),
        }
    }
}

/// One-line description of a document.
pub fn describe_document(doc: &SourceDocument) -> String {
    let pages = match doc.page_count() {
        1 => "1 page".to_string(),
        n => format!("{n} pages"),
    };
    format!("{} ({pages}, {})", doc.name(), doc.size_label())
}

/// Display the outcome of a batch ingestion.
///
/// Every failure is listed as a warning. Documents without pages are
/// flagged since they cannot contribute to any output.
pub fn display_ingest_report(formatter: &OutputFormatter, report: &IngestReport) {
    for failure in &report.failed {
        formatter.warning(&format!(
            "Skipped {}: {}",
            failure.path.display(),
            failure.error
        ));
    }

    for doc in report.loaded.iter().filter(|doc| doc.page_count() == 0) {
        formatter.warning(&format!("{} has no pages", doc.name()));
    }

    formatter.info(&format!(
        "Loaded {} file(s) in {:.2}s: {} pages, {}",
        report.loaded.len(),
        report.total_time.as_secs_f64(),
        report.total_pages(),
        report.format_total_size()
    ));

    if formatter.is_verbose() {
        for doc in &report.loaded {
            formatter.debug(&describe_document(doc));
        }
    }
}

/// Display what a merge would produce.
pub fn display_merge_plan(formatter: &OutputFormatter, documents: &[SourceDocument], output: &str) {
    formatter.section("Merge plan");

    let mut total = 0;
    for (index, doc) in documents.iter().enumerate() {
        let selected = doc.selected_pages().len();
        total += selected;
        formatter.list_item(
            index + 1,
            &format!(
                "{}: pages \"{}\" ({selected} of {})",
                doc.name(),
                doc.range,
                doc.page_count()
            ),
        );
    }

    formatter.info(&format!("  Output would be: {output} ({total} pages)"));
}

/// Display what a split would produce.
pub fn display_split_plan(
    formatter: &OutputFormatter,
    document: &SourceDocument,
    parts: &[SplitPart],
    archive: &str,
) {
    formatter.section(&format!("Split plan for {}", describe_document(document)));

    for (index, part) in parts.iter().enumerate() {
        formatter.list_item(
            index + 1,
            &format!("{} ({} page(s))", part.filename, part.pages.len()),
        );
    }

    if parts.is_empty() {
        formatter.warning("No range selects any page");
    }

    formatter.info(&format!("  Output would be: {archive}"));
}

/// Display where an output was delivered.
pub fn display_receipt(formatter: &OutputFormatter, receipt: &DeliveryReceipt) {
    let location = receipt
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| receipt.filename.clone());

    formatter.success(&format!(
        "Successfully created {location} ({})",
        crate::document::format_file_size(receipt.size)
    ));
}
