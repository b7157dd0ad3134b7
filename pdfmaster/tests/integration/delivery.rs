//! Integration tests for delivery to disk.

use pdfmaster::PdfMasterError;
use pdfmaster::config::OverwriteMode;
use pdfmaster::engine::{LopdfEngine, ZipArchiveEngine};
use pdfmaster::io::FileDelivery;
use pdfmaster::readiness::{LinkedEngines, ReadinessStatus};
use pdfmaster::workflow::{MERGED_FILENAME, Workflow};
use tempfile::TempDir;

use crate::common::{create_pdf, page_markers, zip_entries};

fn file_workflow(
    dir: &TempDir,
    mode: OverwriteMode,
) -> Workflow<LopdfEngine, ZipArchiveEngine, FileDelivery> {
    Workflow::new(
        LopdfEngine::new(),
        ZipArchiveEngine::new(),
        FileDelivery::new(dir.path(), mode),
    )
}

#[tokio::test]
async fn test_merge_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let workflow = file_workflow(&temp_dir, OverwriteMode::NoClobber);
    assert_eq!(workflow.wait_ready(&LinkedEngines).await, ReadinessStatus::Ready);

    let doc = workflow.ingest("a.pdf", create_pdf("A", 2)).await.unwrap();
    let receipt = workflow.combine(&[doc]).await.unwrap().unwrap();

    let path = temp_dir.path().join(MERGED_FILENAME);
    assert_eq!(receipt.path.as_deref(), Some(path.as_path()));
    assert_eq!(page_markers(&std::fs::read(&path).unwrap()), ["A1", "A2"]);
}

#[tokio::test]
async fn test_no_clobber_keeps_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let existing = temp_dir.path().join("a_split.zip");
    std::fs::write(&existing, b"keep me").unwrap();

    let workflow = file_workflow(&temp_dir, OverwriteMode::NoClobber);
    workflow.wait_ready(&LinkedEngines).await;

    let doc = workflow.ingest("a.pdf", create_pdf("A", 2)).await.unwrap();
    let err = workflow.burst(Some(&doc)).await.unwrap_err();

    assert!(matches!(err, PdfMasterError::OutputExists { ref path } if *path == existing));
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_force_replaces_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let existing = temp_dir.path().join("a_split.zip");
    std::fs::write(&existing, b"old").unwrap();

    let workflow = file_workflow(&temp_dir, OverwriteMode::Force);
    workflow.wait_ready(&LinkedEngines).await;

    let doc = workflow.ingest("a.pdf", create_pdf("A", 2)).await.unwrap();
    workflow.burst(Some(&doc)).await.unwrap();

    let entries = zip_entries(&std::fs::read(&existing).unwrap());
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_unsettled_gate_blocks_work() {
    let temp_dir = TempDir::new().unwrap();
    let workflow = file_workflow(&temp_dir, OverwriteMode::Force);

    let doc = workflow.ingest("a.pdf", create_pdf("A", 1)).await.unwrap();
    let err = workflow.combine(&[doc]).await.unwrap_err();

    assert!(matches!(err, PdfMasterError::NotReady { .. }));
    assert!(!temp_dir.path().join(MERGED_FILENAME).exists());
}
