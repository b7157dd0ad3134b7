//! Zip-backed archive engine.

use std::io::{Cursor, Write};
use tokio::task;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::engine::{ArchiveEngine, EngineError, EngineResult};

/// Archive engine writing deflate-compressed zip files in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveEngine;

impl ZipArchiveEngine {
    /// Create a new zip engine.
    pub fn new() -> Self {
        Self
    }

    fn entry_options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }
}

fn archive_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::Archive(err.to_string())
}

impl ArchiveEngine for ZipArchiveEngine {
    type Archive = ZipWriter<Cursor<Vec<u8>>>;

    fn create(&self) -> EngineResult<Self::Archive> {
        Ok(ZipWriter::new(Cursor::new(Vec::new())))
    }

    async fn add_entry(
        &self,
        archive: &mut Self::Archive,
        name: &str,
        bytes: Vec<u8>,
    ) -> EngineResult<()> {
        archive
            .start_file(name, Self::entry_options())
            .map_err(archive_error)?;
        archive.write_all(&bytes).map_err(archive_error)?;
        log::debug!("Added archive entry {name} ({} bytes)", bytes.len());
        Ok(())
    }

    async fn finalize(&self, archive: Self::Archive) -> EngineResult<Vec<u8>> {
        task::spawn_blocking(move || {
            archive
                .finish()
                .map(Cursor::into_inner)
                .map_err(archive_error)
        })
        .await?
    }
}
