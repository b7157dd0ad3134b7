//! Error types for pdfmaster.
//!
//! This module defines all error types that can occur while loading,
//! merging, splitting, and delivering PDF documents.
//!
//! # Error Categories
//!
//! - **Ingestion Errors**: a single input file could not be read or parsed
//! - **Readiness Errors**: the PDF or archive engine is not available yet
//! - **Processing Errors**: a merge or split failed part way through
//! - **Delivery Errors**: the finished output could not be saved
//! - **Configuration Errors**: invalid arguments or option combinations

use std::io;
use std::path::PathBuf;

use crate::readiness::ReadinessStatus;

/// Result type alias for pdfmaster operations.
pub type Result<T> = std::result::Result<T, PdfMasterError>;

/// Main error type for pdfmaster operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfMasterError {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file exists but could not be read.
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The PDF engine rejected an input file.
    #[error(
        "Failed to parse \"{name}\". The file may be corrupted or encrypted.\n  Reason: {reason}"
    )]
    FailedToLoadPdf {
        /// Display name of the file.
        name: String,
        /// Reason reported by the engine.
        reason: String,
    },

    /// A split was requested before any document was loaded.
    #[error("No document loaded")]
    NoDocumentLoaded,

    /// The PDF or archive engine is not available.
    #[error("PDF engine is not ready (status: {status})")]
    NotReady {
        /// Readiness status observed when the operation was attempted.
        status: ReadinessStatus,
    },

    /// Another merge or split is already running on this workflow.
    #[error("Another operation is already in progress")]
    Busy,

    /// Merge operation failed.
    #[error("An error occurred during the merge process: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Split operation failed.
    #[error("Split failed: {reason}")]
    SplitFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output directory",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Writing a finished output failed.
    #[error("Failed to save output file: {}\n  Reason: {source}", .path.display())]
    FailedToDeliver {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// I/O failure outside of a specific file, such as a background
    /// write task that did not complete.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for PdfMasterError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfMasterError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotReady error.
    pub fn not_ready(status: ReadinessStatus) -> Self {
        Self::NotReady { status }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a SplitFailed error.
    pub fn split_failed(reason: impl Into<String>) -> Self {
        Self::SplitFailed {
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single input file.
    ///
    /// Batch ingestion reports these per file and keeps going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. } | Self::FileNotAccessible { .. } | Self::FailedToLoadPdf { .. }
        )
    }

    /// Check if this error is a precondition failure rather than a
    /// processing failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotReady { .. } | Self::NoDocumentLoaded | Self::Busy
        )
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::NoDocumentLoaded => 1,
            Self::NotReady { .. } => 7,
            Self::Busy => 8,
            Self::MergeFailed { .. } => 6,
            Self::SplitFailed { .. } => 6,
            Self::OutputExists { .. } => 4,
            Self::FailedToDeliver { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
