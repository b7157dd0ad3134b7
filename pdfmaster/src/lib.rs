//! pdfmaster - Merge PDF files or split one into page ranges, locally.
//!
//! This library provides the building blocks of a PDF merge/split tool:
//!
//! - A forgiving page range parser (`"1-3, 5, 9-"`)
//! - Concurrent loading with per-file failure isolation
//! - Merging selected pages of many documents, in order
//! - Splitting one document per page or per range into a zip archive
//! - Pluggable document, archive and delivery engines
//!
//! # Examples
//!
//! ## Merge
//!
//! ```no_run
//! use pdfmaster::config::OverwriteMode;
//! use pdfmaster::engine::{LopdfEngine, ZipArchiveEngine};
//! use pdfmaster::io::FileDelivery;
//! use pdfmaster::readiness::LinkedEngines;
//! use pdfmaster::workflow::Workflow;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = Workflow::new(
//!     LopdfEngine::new(),
//!     ZipArchiveEngine::new(),
//!     FileDelivery::new("out", OverwriteMode::Force),
//! );
//! workflow.wait_ready(&LinkedEngines).await;
//!
//! let mut report = workflow
//!     .ingest_all(&[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")], 4)
//!     .await;
//! report.loaded[1].range.set("2-");
//!
//! workflow.combine(&report.loaded).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Split
//!
//! ```no_run
//! use pdfmaster::engine::{LopdfEngine, ZipArchiveEngine};
//! use pdfmaster::io::MemoryDelivery;
//! use pdfmaster::readiness::LinkedEngines;
//! use pdfmaster::workflow::Workflow;
//! use pdfmaster::workspace::SplitPlan;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let workflow = Workflow::new(LopdfEngine::new(), ZipArchiveEngine::new(), MemoryDelivery::new());
//! workflow.wait_ready(&LinkedEngines).await;
//!
//! let mut plan = SplitPlan::new();
//! plan.load(workflow.ingest("report.pdf", bytes).await?);
//! plan.set_entry(1, "1-3");
//! plan.add_entry("4-");
//!
//! let receipt = workflow.split_plan(&plan).await?;
//! assert_eq!(receipt.filename, "report_split.zip");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod io;
pub mod output;
pub mod range;
pub mod readiness;
pub mod workflow;
pub mod workspace;

// Re-export commonly used types
pub use config::Config;
pub use document::SourceDocument;
pub use error::{PdfMasterError, Result};
pub use range::{PageRange, parse_page_indices};
pub use workflow::Workflow;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
