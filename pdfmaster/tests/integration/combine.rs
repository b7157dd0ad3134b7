//! Integration tests for merging.

use std::time::Duration;

use pdfmaster::PdfMasterError;
use pdfmaster::engine::LopdfEngine;
use pdfmaster::workflow::MERGED_FILENAME;
use pdfmaster::workspace::MergeQueue;

use crate::common::{FlakyEngine, SlowEngine, create_pdf, document, page_markers, ready_workflow};

#[tokio::test]
async fn test_merge_keeps_document_and_page_order() {
    let workflow = ready_workflow(LopdfEngine::new());
    let docs = vec![
        document(&workflow, "a.pdf", "A", 3).await,
        document(&workflow, "b.pdf", "B", 2).await,
    ];

    let receipt = workflow.combine(&docs).await.unwrap().unwrap();
    assert_eq!(receipt.filename, MERGED_FILENAME);

    let files = workflow.delivery().files();
    assert_eq!(files.len(), 1);
    assert_eq!(receipt.size, files[0].bytes.len() as u64);
    assert_eq!(page_markers(&files[0].bytes), ["A1", "A2", "A3", "B1", "B2"]);
}

#[tokio::test]
async fn test_merge_applies_ranges_at_merge_time() {
    let workflow = ready_workflow(LopdfEngine::new());
    let mut queue = MergeQueue::new();
    queue.push(document(&workflow, "a.pdf", "A", 5).await);
    queue.push(document(&workflow, "b.pdf", "B", 4).await);

    let [a, b] = [queue.documents()[0].id(), queue.documents()[1].id()];
    queue.set_range(a, "4, 1-2, 2");
    queue.set_range(b, "3-");
    queue.move_up(b);

    workflow.combine(queue.documents()).await.unwrap();

    let files = workflow.delivery().take();
    assert_eq!(page_markers(&files[0].bytes), ["B3", "B4", "A1", "A2", "A4"]);
}

#[tokio::test]
async fn test_merge_skips_documents_without_selection() {
    let workflow = ready_workflow(LopdfEngine::new());
    let mut a = document(&workflow, "a.pdf", "A", 2).await;
    let b = document(&workflow, "b.pdf", "B", 2).await;
    a.range.set("9-12");

    workflow.combine(&[a, b]).await.unwrap();

    let files = workflow.delivery().take();
    assert_eq!(page_markers(&files[0].bytes), ["B1", "B2"]);
}

#[tokio::test]
async fn test_merge_same_document_twice() {
    let workflow = ready_workflow(LopdfEngine::new());
    let a = document(&workflow, "a.pdf", "A", 2).await;

    workflow.combine(&[a.clone(), a]).await.unwrap();

    let files = workflow.delivery().take();
    assert_eq!(page_markers(&files[0].bytes), ["A1", "A2", "A1", "A2"]);
}

#[tokio::test]
async fn test_merge_custom_filename() {
    let workflow = ready_workflow(LopdfEngine::new()).with_options(
        pdfmaster::workflow::WorkflowOptions {
            merged_filename: "book.pdf".to_string(),
            ..Default::default()
        },
    );
    let a = document(&workflow, "a.pdf", "A", 1).await;

    let receipt = workflow.combine(&[a]).await.unwrap().unwrap();
    assert_eq!(receipt.filename, "book.pdf");
}

#[tokio::test]
async fn test_merge_empty_set_touches_nothing() {
    let workflow = ready_workflow(FlakyEngine::failing_copy(1));

    let receipt = workflow.combine(&[]).await.unwrap();

    assert!(receipt.is_none());
    assert_eq!(workflow.pdf().copies(), 0);
    assert!(workflow.delivery().is_empty());
}

#[tokio::test]
async fn test_merge_failure_delivers_nothing() {
    let workflow = ready_workflow(FlakyEngine::failing_copy(2));
    let docs = vec![
        document(&workflow, "a.pdf", "A", 2).await,
        document(&workflow, "b.pdf", "B", 2).await,
        document(&workflow, "c.pdf", "C", 2).await,
    ];

    let err = workflow.combine(&docs).await.unwrap_err();

    assert!(matches!(err, PdfMasterError::MergeFailed { ref reason } if reason.contains("b.pdf")));
    assert!(workflow.delivery().is_empty());
    assert_eq!(workflow.pdf().copies(), 2);

    // The workflow is usable again after a failure
    assert!(!workflow.is_busy());
    workflow.combine(&docs).await.unwrap();
    assert_eq!(workflow.delivery().len(), 1);
}

#[tokio::test]
async fn test_overlapping_merge_is_rejected() {
    let workflow = ready_workflow(SlowEngine::new(Duration::from_millis(300)));
    let docs = vec![workflow.ingest("a.pdf", create_pdf("A", 2)).await.unwrap()];

    let (first, second) = tokio::join!(workflow.combine(&docs), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        workflow.combine(&docs).await
    });

    assert!(first.unwrap().is_some());
    assert!(matches!(second, Err(PdfMasterError::Busy)));
    assert_eq!(workflow.delivery().len(), 1);

    // Released once the first run finished
    assert!(workflow.combine(&docs).await.is_ok());
}
