//! Merge and split orchestration.
//!
//! A [`Workflow`] ties a [`PdfEngine`], an [`ArchiveEngine`] and a
//! [`Delivery`] together:
//!
//! - **combine** copies the selected pages of every document, in order, into
//!   one new document and delivers it as `merged_document.pdf`
//! - **burst** writes every page of one document into its own file and
//!   delivers them zipped
//! - **split_ranges** writes one file per range entry and delivers them
//!   zipped
//!
//! Every run is all or nothing. If any engine call fails, nothing is
//! delivered and the caller gets a single [`PdfMasterError::MergeFailed`] or
//! [`PdfMasterError::SplitFailed`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfmaster::engine::{LopdfEngine, ZipArchiveEngine};
//! use pdfmaster::io::MemoryDelivery;
//! use pdfmaster::readiness::LinkedEngines;
//! use pdfmaster::workflow::Workflow;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = Workflow::new(LopdfEngine::new(), ZipArchiveEngine::new(), MemoryDelivery::new());
//! workflow.wait_ready(&LinkedEngines).await;
//!
//! let report = workflow
//!     .ingest_all(&[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")], 2)
//!     .await;
//! if let Some(receipt) = workflow.combine(&report.loaded).await? {
//!     println!("{} ({} bytes)", receipt.filename, receipt.size);
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::SplitMode;
use crate::document::SourceDocument;
use crate::engine::{
    ArchiveEngine, Delivery, DeliveryReceipt, EngineError, LoadOptions, PdfEngine,
};
use crate::error::{PdfMasterError, Result};
use crate::io::{IngestReport, PdfReader};
use crate::range::PageRange;
use crate::readiness::{EngineProbe, ReadinessGate, ReadinessStatus};
use crate::workspace::{RangeEntry, SplitPlan};

/// File name of a merged document.
pub const MERGED_FILENAME: &str = "merged_document.pdf";

/// Name of the archive entry holding page `page_number` (1-based).
pub fn burst_entry_name(base: &str, page_number: usize) -> String {
    format!("{base}_page_{page_number}.pdf")
}

/// Name of the archive entry for the range labelled `label`.
pub fn range_entry_name(base: &str, label: &str) -> String {
    format!("{base}_split_{label}.pdf")
}

/// Name of the archive delivered by a split.
pub fn archive_name(base: &str) -> String {
    format!("{base}_split.zip")
}

/// Tunables of a [`Workflow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowOptions {
    /// File name the merged document is delivered under.
    pub merged_filename: String,
    /// Options used whenever a source buffer is parsed.
    pub load: LoadOptions,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            merged_filename: MERGED_FILENAME.to_string(),
            load: LoadOptions::default(),
        }
    }
}

/// One output file of a split, before it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    /// Archive entry name.
    pub filename: String,
    /// Zero-based pages of the source it contains.
    pub pages: Vec<usize>,
}

/// Outputs of a burst, one per page.
pub fn burst_parts(document: &SourceDocument) -> Vec<SplitPart> {
    let base = document.base_name();
    (0..document.page_count())
        .map(|index| SplitPart {
            filename: burst_entry_name(base, index + 1),
            pages: vec![index],
        })
        .collect()
}

/// Outputs of a range split. Entries selecting no page are left out.
pub fn range_parts(document: &SourceDocument, entries: &[RangeEntry]) -> Vec<SplitPart> {
    let base = document.base_name();
    entries
        .iter()
        .filter_map(|entry| {
            let pages = entry.value.resolve(document.page_count());
            if pages.is_empty() {
                log::debug!("Range {} ({}) selects no page", entry.label, entry.value);
                return None;
            }
            Some(SplitPart {
                filename: range_entry_name(base, &entry.label),
                pages,
            })
        })
        .collect()
}

/// Outputs of a split in `mode`.
pub fn split_parts(document: &SourceDocument, mode: &SplitMode) -> Vec<SplitPart> {
    match mode {
        SplitMode::Burst => burst_parts(document),
        SplitMode::Ranges(ranges) => range_parts(document, &numbered_entries(ranges)),
    }
}

fn numbered_entries(ranges: &[PageRange]) -> Vec<RangeEntry> {
    ranges
        .iter()
        .zip(1..)
        .map(|(range, id)| RangeEntry::new(id, range.clone()))
        .collect()
}

/// Marks a workflow busy for as long as it lives.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PdfMasterError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Merge and split orchestrator.
///
/// A workflow runs one merge or split at a time. Starting a second one while
/// the first is in flight fails with [`PdfMasterError::Busy`].
#[derive(Debug)]
pub struct Workflow<E, A, D> {
    pdf: E,
    archive: A,
    delivery: D,
    gate: ReadinessGate,
    options: WorkflowOptions,
    busy: AtomicBool,
}

impl<E, A, D> Workflow<E, A, D>
where
    E: PdfEngine,
    A: ArchiveEngine,
    D: Delivery,
{
    /// Create a workflow whose readiness gate is not settled yet.
    ///
    /// Call [`Workflow::wait_ready`] before merging or splitting.
    pub fn new(pdf: E, archive: A, delivery: D) -> Self {
        Self {
            pdf,
            archive,
            delivery,
            gate: ReadinessGate::default(),
            options: WorkflowOptions::default(),
            busy: AtomicBool::new(false),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: WorkflowOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the readiness gate.
    pub fn with_gate(mut self, gate: ReadinessGate) -> Self {
        self.gate = gate;
        self
    }

    /// Document engine.
    pub fn pdf(&self) -> &E {
        &self.pdf
    }

    /// Delivery collaborator.
    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Current options.
    pub fn options(&self) -> &WorkflowOptions {
        &self.options
    }

    /// Readiness status without waiting.
    pub fn readiness(&self) -> ReadinessStatus {
        self.gate.status()
    }

    /// Settle the readiness gate with `probe`.
    pub async fn wait_ready<P: EngineProbe>(&self, probe: &P) -> ReadinessStatus {
        self.gate.wait(probe).await
    }

    /// Check whether a merge or split is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Reader bound to this workflow's engine and load options.
    pub fn reader(&self) -> PdfReader<'_, E> {
        PdfReader::with_options(&self.pdf, self.options.load)
    }

    /// Ingest an in-memory buffer.
    pub async fn ingest(
        &self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<SourceDocument> {
        self.reader().ingest(name, bytes).await
    }

    /// Ingest files concurrently, isolating failures per file.
    pub async fn ingest_all(&self, paths: &[PathBuf], jobs: usize) -> IngestReport {
        self.reader().ingest_all(paths, jobs).await
    }

    /// Merge the selected pages of `documents`, in order, and deliver the
    /// result.
    ///
    /// Ranges are resolved now, so edits made after loading are honored.
    /// Documents selecting no page are skipped.
    ///
    /// Returns `Ok(None)` without touching any collaborator when
    /// `documents` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engines are not ready
    /// - Another operation is running
    /// - Any engine call fails ([`PdfMasterError::MergeFailed`])
    /// - Delivery fails
    pub async fn combine(&self, documents: &[SourceDocument]) -> Result<Option<DeliveryReceipt>> {
        if documents.is_empty() {
            return Ok(None);
        }
        self.ensure_ready()?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let bytes = self.build_merged(documents).await?;
        let receipt = self
            .delivery
            .deliver(bytes, &self.options.merged_filename)
            .await?;

        log::info!(
            "Merged {} document(s) into {}",
            documents.len(),
            receipt.filename
        );
        Ok(Some(receipt))
    }

    async fn build_merged(&self, documents: &[SourceDocument]) -> Result<Vec<u8>> {
        let mut merged = self.pdf.create().map_err(merge_error)?;
        let mut total_pages = 0;

        for document in documents {
            let indices = document.selected_pages();
            if indices.is_empty() {
                log::debug!(
                    "Skipping {}: range {:?} selects no page",
                    document.name(),
                    document.range.as_str()
                );
                continue;
            }

            let context = |e: EngineError| merge_error(format!("{}: {e}", document.name()));
            let source = self
                .pdf
                .load(Arc::clone(document.bytes()), self.options.load)
                .await
                .map_err(context)?;
            let pages = self
                .pdf
                .copy_pages(&mut merged, &source, &indices)
                .await
                .map_err(context)?;
            for page in pages {
                self.pdf.add_page(&mut merged, page).map_err(context)?;
            }

            log::debug!("Added {} page(s) from {}", indices.len(), document.name());
            total_pages += indices.len();
        }

        if total_pages == 0 {
            log::warn!("No pages selected, the merged document is empty");
        }

        self.pdf.save(merged).await.map_err(merge_error)
    }

    /// Write every page of `document` into its own file and deliver them
    /// as one archive.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No document is given ([`PdfMasterError::NoDocumentLoaded`])
    /// - The engines are not ready
    /// - Another operation is running
    /// - Any engine call fails ([`PdfMasterError::SplitFailed`])
    /// - Delivery fails
    pub async fn burst(&self, document: Option<&SourceDocument>) -> Result<DeliveryReceipt> {
        let document = document.ok_or(PdfMasterError::NoDocumentLoaded)?;
        self.run_split(document, burst_parts(document)).await
    }

    /// Write one file per range entry and deliver them as one archive.
    ///
    /// Entries selecting no page produce no file.
    ///
    /// # Errors
    ///
    /// Same as [`Workflow::burst`].
    pub async fn split_ranges(
        &self,
        document: Option<&SourceDocument>,
        entries: &[RangeEntry],
    ) -> Result<DeliveryReceipt> {
        let document = document.ok_or(PdfMasterError::NoDocumentLoaded)?;
        self.run_split(document, range_parts(document, entries))
            .await
    }

    /// Split the document of a plan by its entries.
    pub async fn split_plan(&self, plan: &SplitPlan) -> Result<DeliveryReceipt> {
        self.split_ranges(plan.document(), plan.entries()).await
    }

    /// Split `document` in `mode`.
    pub async fn split(
        &self,
        document: Option<&SourceDocument>,
        mode: &SplitMode,
    ) -> Result<DeliveryReceipt> {
        let document = document.ok_or(PdfMasterError::NoDocumentLoaded)?;
        self.run_split(document, split_parts(document, mode)).await
    }

    async fn run_split(
        &self,
        document: &SourceDocument,
        parts: Vec<SplitPart>,
    ) -> Result<DeliveryReceipt> {
        self.ensure_ready()?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        if parts.is_empty() {
            log::warn!("{} produces no output files", document.name());
        }

        let part_count = parts.len();
        let bytes = self.build_archive(document, parts).await?;
        let receipt = self
            .delivery
            .deliver(bytes, &archive_name(document.base_name()))
            .await?;

        log::info!(
            "Split {} into {part_count} file(s) in {}",
            document.name(),
            receipt.filename
        );
        Ok(receipt)
    }

    async fn build_archive(
        &self,
        document: &SourceDocument,
        parts: Vec<SplitPart>,
    ) -> Result<Vec<u8>> {
        let source = self
            .pdf
            .load(Arc::clone(document.bytes()), self.options.load)
            .await
            .map_err(split_error)?;
        let mut archive = self.archive.create().map_err(split_error)?;

        for part in parts {
            let context = |e: EngineError| split_error(format!("{}: {e}", part.filename));

            let mut output = self.pdf.create().map_err(context)?;
            let pages = self
                .pdf
                .copy_pages(&mut output, &source, &part.pages)
                .await
                .map_err(context)?;
            for page in pages {
                self.pdf.add_page(&mut output, page).map_err(context)?;
            }
            let bytes = self.pdf.save(output).await.map_err(context)?;

            self.archive
                .add_entry(&mut archive, &part.filename, bytes)
                .await
                .map_err(context)?;
        }

        self.archive.finalize(archive).await.map_err(split_error)
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.gate.status() {
            ReadinessStatus::Ready => Ok(()),
            status => Err(PdfMasterError::not_ready(status)),
        }
    }
}

fn merge_error(reason: impl ToString) -> PdfMasterError {
    PdfMasterError::merge_failed(reason.to_string())
}

fn split_error(reason: impl ToString) -> PdfMasterError {
    PdfMasterError::split_failed(reason.to_string())
}
