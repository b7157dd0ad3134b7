//! Output delivery.
//!
//! This module provides the [`Delivery`] implementations:
//! - [`FileDelivery`] writes into an output directory with atomic writes
//!   (write to temp file, then rename) and overwrite protection
//! - [`MemoryDelivery`] keeps outputs in memory
//!
//! # Examples
//!
//! ```no_run
//! use pdfmaster::config::OverwriteMode;
//! use pdfmaster::engine::Delivery;
//! use pdfmaster::io::writer::FileDelivery;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let delivery = FileDelivery::new("out", OverwriteMode::NoClobber);
//! let receipt = delivery.deliver(bytes, "merged_document.pdf").await?;
//! println!("Saved {} bytes", receipt.size);
//! # Ok(())
//! # }
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::task;

use crate::config::OverwriteMode;
use crate::engine::{Delivery, DeliveryReceipt};
use crate::error::{PdfMasterError, Result};

/// Buffer size for writing (in bytes).
const WRITE_BUFFER_SIZE: usize = 8192;

/// Delivers outputs as files in a directory.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
    overwrite_mode: OverwriteMode,
}

impl FileDelivery {
    /// Create a delivery writing into `dir`.
    ///
    /// [`OverwriteMode::Prompt`] cannot ask from here and behaves like
    /// [`OverwriteMode::NoClobber`]. Callers prompt first and pass
    /// [`OverwriteMode::Force`] once the user agreed.
    pub fn new(dir: impl Into<PathBuf>, overwrite_mode: OverwriteMode) -> Self {
        Self {
            dir: dir.into(),
            overwrite_mode,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where an output named `filename` would be written.
    pub fn target(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Check that an output named `filename` can be delivered.
    ///
    /// Performs pre-flight checks without writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - Output directory is not writable
    /// - The output exists and the overwrite mode forbids replacing it
    pub async fn check(&self, filename: &str) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.dir).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                PdfMasterError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    self.dir.display()
                ))
            } else {
                PdfMasterError::FileNotAccessible {
                    path: self.dir.clone(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(PdfMasterError::invalid_config(format!(
                "Output path is not a directory: {}",
                self.dir.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(PdfMasterError::invalid_config(format!(
                "Output directory is not writable: {}",
                self.dir.display()
            )));
        }

        let target = self.target(filename);
        if self.overwrite_mode != OverwriteMode::Force && exists(&target).await {
            return Err(PdfMasterError::output_exists(target));
        }

        Ok(())
    }
}

impl Delivery for FileDelivery {
    async fn deliver(&self, bytes: Vec<u8>, filename: &str) -> Result<DeliveryReceipt> {
        let target = self.target(filename);

        if self.overwrite_mode != OverwriteMode::Force && exists(&target).await {
            return Err(PdfMasterError::output_exists(target));
        }

        let size = bytes.len() as u64;
        let path = target.clone();
        let replace = self.overwrite_mode == OverwriteMode::Force;
        task::spawn_blocking(move || write_atomic(&path, &bytes, replace))
            .await
            .map_err(io::Error::from)??;

        log::info!("Wrote {} ({size} bytes)", target.display());

        Ok(DeliveryReceipt {
            filename: filename.to_string(),
            path: Some(target),
            size,
        })
    }
}

/// Write to a temp file next to `path`, then move it into place.
///
/// Unless `replace` is set, the temp file is hard linked to `path`, which
/// fails if a file appeared there since the existence check.
fn write_atomic(path: &Path, bytes: &[u8], replace: bool) -> Result<()> {
    let temp_path = temp_path_for(path);

    let file = std::fs::File::create(&temp_path).map_err(|e| delivery_error(&temp_path, e))?;
    let mut writer = std::io::BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    if let Err(e) = writer.write_all(bytes).and_then(|()| writer.flush()) {
        drop(writer);
        let _ = std::fs::remove_file(&temp_path);
        return Err(delivery_error(&temp_path, e));
    }
    drop(writer);

    if replace {
        return std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            delivery_error(path, e)
        });
    }

    let linked = std::fs::hard_link(&temp_path, path);
    let _ = std::fs::remove_file(&temp_path);
    linked.map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => PdfMasterError::output_exists(path.to_path_buf()),
        _ => delivery_error(path, e),
    })
}

fn delivery_error(path: &Path, source: io::Error) -> PdfMasterError {
    PdfMasterError::FailedToDeliver {
        path: path.to_path_buf(),
        source,
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// A file handed to a [`MemoryDelivery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    /// File name the output was delivered under.
    pub filename: String,
    /// Content of the output.
    pub bytes: Vec<u8>,
}

/// Keeps delivered outputs in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    files: Mutex<Vec<DeliveredFile>>,
}

impl MemoryDelivery {
    /// Create an empty delivery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every output delivered so far.
    pub fn files(&self) -> Vec<DeliveredFile> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take every output delivered so far.
    pub fn take(&self) -> Vec<DeliveredFile> {
        std::mem::take(&mut *self.files.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of outputs delivered so far.
    pub fn len(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check whether nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Delivery for MemoryDelivery {
    async fn deliver(&self, bytes: Vec<u8>, filename: &str) -> Result<DeliveryReceipt> {
        let size = bytes.len() as u64;
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DeliveredFile {
                filename: filename.to_string(),
                bytes,
            });

        Ok(DeliveryReceipt {
            filename: filename.to_string(),
            path: None,
            size,
        })
    }
}
