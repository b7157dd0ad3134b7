//! Engine interfaces.
//!
//! The workflows never touch PDF bytes or archive formats directly. They
//! talk to three collaborators:
//!
//! - a [`PdfEngine`] that loads documents, copies pages and serializes the
//!   result,
//! - an [`ArchiveEngine`] that packages several outputs into one buffer,
//! - a [`Delivery`] that hands a finished buffer to the user.
//!
//! The default implementations are [`LopdfEngine`] and
//! [`ZipArchiveEngine`]. Deliveries live in [`crate::io::writer`].

pub mod archive;
pub mod pdf;

pub use archive::ZipArchiveEngine;
pub use pdf::LopdfEngine;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Errors reported by an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The buffer is not a readable PDF.
    #[error("failed to load document: {0}")]
    Load(String),

    /// The document is encrypted and encryption is not tolerated.
    #[error("document is encrypted")]
    Encrypted,

    /// The document is encrypted with a user password and cannot be read.
    #[error("document is protected by a password")]
    PasswordRequired,

    /// A requested page does not exist in the source document.
    #[error("page index {index} is out of range (document has {total} pages)")]
    PageOutOfRange {
        /// Zero-based index that was requested.
        index: usize,
        /// Number of pages in the source document.
        total: usize,
    },

    /// Page copy or page tree update failed.
    #[error("failed to copy pages: {0}")]
    Copy(String),

    /// Serialization failed.
    #[error("failed to save document: {0}")]
    Save(String),

    /// Archive creation failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Options for loading a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOptions {
    /// Accept encrypted documents so their page count can still be read.
    pub tolerate_encryption: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            tolerate_encryption: true,
        }
    }
}

/// Document collaborator.
pub trait PdfEngine: Send + Sync {
    /// Loaded or newly created document.
    type Document: Send + 'static;

    /// A page copied into a target document but not yet placed in its
    /// page order.
    type Page;

    /// Parse a document from raw bytes.
    fn load(
        &self,
        bytes: Arc<[u8]>,
        options: LoadOptions,
    ) -> impl Future<Output = EngineResult<Self::Document>>;

    /// Number of pages in a document.
    fn page_count(&self, doc: &Self::Document) -> usize;

    /// Create a new document without pages.
    fn create(&self) -> EngineResult<Self::Document>;

    /// Copy pages of `source` into `target`.
    ///
    /// Returns one page per index, in the order of `indices`. The copies
    /// are not visible in `target` until passed to [`PdfEngine::add_page`].
    fn copy_pages(
        &self,
        target: &mut Self::Document,
        source: &Self::Document,
        indices: &[usize],
    ) -> impl Future<Output = EngineResult<Vec<Self::Page>>>;

    /// Append a copied page at the end of `target`.
    fn add_page(&self, target: &mut Self::Document, page: Self::Page) -> EngineResult<()>;

    /// Serialize a document to bytes.
    fn save(&self, doc: Self::Document) -> impl Future<Output = EngineResult<Vec<u8>>>;
}

/// Archive collaborator.
pub trait ArchiveEngine: Send + Sync {
    /// Archive under construction.
    type Archive: Send;

    /// Start an empty archive.
    fn create(&self) -> EngineResult<Self::Archive>;

    /// Add a file to the archive.
    fn add_entry(
        &self,
        archive: &mut Self::Archive,
        name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = EngineResult<()>>;

    /// Close the archive and return its bytes.
    fn finalize(&self, archive: Self::Archive) -> impl Future<Output = EngineResult<Vec<u8>>>;
}

/// Where a delivered file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    /// File name the output was delivered under.
    pub filename: String,
    /// Location on disk, if the delivery wrote one.
    pub path: Option<PathBuf>,
    /// Size of the delivered buffer in bytes.
    pub size: u64,
}

/// Delivery collaborator.
pub trait Delivery: Send + Sync {
    /// Hand a finished buffer to the user under `filename`.
    fn deliver(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> impl Future<Output = crate::Result<DeliveryReceipt>>;
}
