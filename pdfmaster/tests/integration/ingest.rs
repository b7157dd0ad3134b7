//! Integration tests for loading.

use std::path::PathBuf;

use pdfmaster::PdfMasterError;
use pdfmaster::engine::LopdfEngine;
use pdfmaster::workspace::MergeQueue;
use tempfile::TempDir;

use crate::common::{create_encrypted_pdf, create_pdf, page_markers, ready_workflow};

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn test_corrupt_file_does_not_block_others() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_file(&temp_dir, "a.pdf", &create_pdf("A", 2)),
        write_file(&temp_dir, "corrupt.pdf", b"not a pdf at all"),
        write_file(&temp_dir, "b.pdf", &create_pdf("B", 1)),
    ];

    let workflow = ready_workflow(LopdfEngine::new());
    let report = workflow.ingest_all(&paths, 3).await;

    assert_eq!(report.loaded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, paths[1]);
    assert!(matches!(
        report.failed[0].error,
        PdfMasterError::FailedToLoadPdf { ref name, .. } if name == "corrupt.pdf"
    ));

    // The survivors merge as usual
    let mut queue = MergeQueue::new();
    queue.extend(report.loaded);
    workflow.combine(queue.documents()).await.unwrap();

    let files = workflow.delivery().take();
    assert_eq!(page_markers(&files[0].bytes), ["A1", "A2", "B1"]);
}

#[tokio::test]
async fn test_loaded_documents_get_unique_ids_and_full_ranges() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "a.pdf", &create_pdf("A", 7));

    let workflow = ready_workflow(LopdfEngine::new());
    let report = workflow.ingest_all(&[path.clone(), path], 1).await;

    assert!(report.is_complete());
    assert_ne!(report.loaded[0].id(), report.loaded[1].id());
    assert_eq!(report.loaded[0].range.as_str(), "1-7");
    assert_eq!(report.loaded[0].selected_pages(), (0..7).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_zero_page_document_is_accepted() {
    let workflow = ready_workflow(LopdfEngine::new());
    let doc = workflow.ingest("empty.pdf", create_pdf("E", 0)).await.unwrap();

    assert_eq!(doc.page_count(), 0);
    assert!(doc.selected_pages().is_empty());
}

#[tokio::test]
async fn test_encrypted_documents() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_file(&temp_dir, "open.pdf", &create_encrypted_pdf("O", 3, "")),
        write_file(&temp_dir, "locked.pdf", &create_encrypted_pdf("L", 3, "secret")),
    ];

    let workflow = ready_workflow(LopdfEngine::new());
    let report = workflow.ingest_all(&paths, 2).await;

    // An empty user password still gives the real page count
    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.loaded[0].page_count(), 3);
    assert_eq!(report.loaded[0].range.as_str(), "1-3");

    // A real password is a per-file load failure, not an empty document
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert!(matches!(
        report.failed[0].error,
        PdfMasterError::FailedToLoadPdf { ref name, ref reason }
            if name == "locked.pdf" && reason.contains("password")
    ));
}
