//! I/O operations for pdfmaster.
//!
//! This module handles everything that touches the filesystem:
//! - Loading PDF files into [`SourceDocument`](crate::document::SourceDocument)s
//! - Concurrent batch loading with per-file failure isolation
//! - Delivering finished outputs to disk or memory
//!
//! # Examples
//!
//! ```no_run
//! use pdfmaster::config::OverwriteMode;
//! use pdfmaster::engine::{Delivery, LopdfEngine};
//! use pdfmaster::io::{FileDelivery, PdfReader};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = LopdfEngine::new();
//! let doc = PdfReader::new(&engine).ingest_path(Path::new("input.pdf")).await?;
//!
//! let delivery = FileDelivery::new("out", OverwriteMode::Force);
//! delivery.deliver(doc.bytes().to_vec(), "copy.pdf").await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{IngestFailure, IngestReport, PdfReader};
pub use writer::{DeliveredFile, FileDelivery, MemoryDelivery};
