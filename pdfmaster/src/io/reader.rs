//! PDF ingestion.
//!
//! This module turns files into [`SourceDocument`]s with support for:
//! - Loading from a path or from an in-memory buffer
//! - Concurrent batch loading with bounded parallelism
//! - Per-file failure isolation
//!
//! A failure only ever affects the file it came from. Batch loading runs
//! every file to completion and reports successes and failures side by
//! side, with successes kept in input order.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmaster::engine::LopdfEngine;
//! use pdfmaster::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let engine = LopdfEngine::new();
//! let reader = PdfReader::new(&engine);
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let report = reader.ingest_all(&paths, 4).await;
//! println!("{} loaded, {} failed", report.loaded.len(), report.failed.len());
//! # }
//! ```

use futures::stream::{self, StreamExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::document::{SourceDocument, format_file_size};
use crate::engine::{LoadOptions, PdfEngine};
use crate::error::{PdfMasterError, Result};

/// A file that could not be ingested.
#[derive(Debug)]
pub struct IngestFailure {
    /// Position of the file in the batch.
    pub index: usize,
    /// Path of the file.
    pub path: PathBuf,
    /// Why it was rejected.
    pub error: PdfMasterError,
}

/// Outcome of a batch ingestion.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Documents that loaded, in input order.
    pub loaded: Vec<SourceDocument>,
    /// Files that failed, in input order.
    pub failed: Vec<IngestFailure>,
    /// Wall time of the whole batch.
    pub total_time: Duration,
}

impl IngestReport {
    /// Check whether every file loaded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total pages across the loaded documents.
    pub fn total_pages(&self) -> usize {
        self.loaded.iter().map(SourceDocument::page_count).sum()
    }

    /// Total size of the loaded documents in bytes.
    pub fn total_size(&self) -> u64 {
        self.loaded.iter().map(SourceDocument::size).sum()
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size())
    }

    /// Batch positions of the loaded documents, parallel to `loaded`.
    pub fn loaded_indices(&self) -> Vec<usize> {
        let total = self.loaded.len() + self.failed.len();
        (0..total)
            .filter(|idx| !self.failed.iter().any(|failure| failure.index == *idx))
            .collect()
    }
}

/// Loads files through a [`PdfEngine`].
#[derive(Debug)]
pub struct PdfReader<'a, E> {
    engine: &'a E,
    options: LoadOptions,
}

impl<'a, E: PdfEngine> PdfReader<'a, E> {
    /// Create a reader that tolerates encrypted documents.
    pub fn new(engine: &'a E) -> Self {
        Self::with_options(engine, LoadOptions::default())
    }

    /// Create a reader with custom load options.
    pub fn with_options(engine: &'a E, options: LoadOptions) -> Self {
        Self { engine, options }
    }

    /// Ingest an in-memory buffer.
    ///
    /// The document is parsed once to read its page count. The handle is
    /// then dropped; workflows parse the buffer again when they need pages.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMasterError::FailedToLoadPdf`] if the engine rejects
    /// the buffer.
    pub async fn ingest(
        &self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<SourceDocument> {
        let name = name.into();
        let bytes = bytes.into();

        let doc = self
            .engine
            .load(Arc::clone(&bytes), self.options)
            .await
            .map_err(|e| PdfMasterError::failed_to_load_pdf(&name, e.to_string()))?;
        let page_count = self.engine.page_count(&doc);

        if page_count == 0 {
            log::warn!("{name} has no pages");
        } else {
            log::debug!("Loaded {name}: {page_count} pages, {} bytes", bytes.len());
        }

        Ok(SourceDocument::new(name, bytes, page_count))
    }

    /// Read a file from disk and ingest it under its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist
    /// - File cannot be read
    /// - File is not a readable PDF
    pub async fn ingest_path(&self, path: &Path) -> Result<SourceDocument> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => PdfMasterError::file_not_found(path.to_path_buf()),
            _ => PdfMasterError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        self.ingest(display_name(path), bytes).await
    }

    /// Ingest many files concurrently.
    ///
    /// At most `jobs` files are loaded at once. Every file is attempted
    /// regardless of earlier failures.
    pub async fn ingest_all(&self, paths: &[PathBuf], jobs: usize) -> IngestReport {
        let start = Instant::now();
        let jobs = jobs.max(1);

        let tasks = paths.iter().enumerate().map(|(idx, path)| async move {
            let result = self.ingest_path(path).await;
            (idx, result)
        });

        let mut indexed_results: Vec<(usize, Result<SourceDocument>)> = stream::iter(tasks)
            .buffer_unordered(jobs)
            .collect()
            .await;

        // Sort by original index to maintain order
        indexed_results.sort_by_key(|(idx, _)| *idx);

        let mut report = IngestReport::default();
        for (idx, result) in indexed_results {
            match result {
                Ok(document) => report.loaded.push(document),
                Err(error) => {
                    log::debug!("Skipping {}: {error}", paths[idx].display());
                    report.failed.push(IngestFailure {
                        index: idx,
                        path: paths[idx].clone(),
                        error,
                    });
                }
            }
        }
        report.total_time = start.elapsed();

        report
    }
}

/// Name shown for a file: its file name, or the whole path if it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
