//! Integration tests for splitting.

use pdfmaster::PdfMasterError;
use pdfmaster::config::SplitMode;
use pdfmaster::engine::LopdfEngine;
use pdfmaster::workspace::SplitPlan;

use crate::common::{FlakyEngine, document, page_markers, ready_workflow, zip_entries};

#[tokio::test]
async fn test_burst_one_entry_per_page() {
    let workflow = ready_workflow(LopdfEngine::new());
    let doc = document(&workflow, "Report.PDF", "R", 4).await;

    let receipt = workflow.burst(Some(&doc)).await.unwrap();
    assert_eq!(receipt.filename, "Report_split.zip");

    let files = workflow.delivery().take();
    assert_eq!(files.len(), 1);

    let entries = zip_entries(&files[0].bytes);
    let names: Vec<_> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Report_page_1.pdf",
            "Report_page_2.pdf",
            "Report_page_3.pdf",
            "Report_page_4.pdf",
        ]
    );
    for (number, (_, bytes)) in entries.iter().enumerate() {
        assert_eq!(page_markers(bytes), [format!("R{}", number + 1)]);
    }
}

#[tokio::test]
async fn test_split_plan_by_ranges() {
    let workflow = ready_workflow(LopdfEngine::new());

    let mut plan = SplitPlan::new();
    plan.load(document(&workflow, "book.pdf", "P", 10).await);
    assert!(plan.set_entry(1, "1-3"));
    let second = plan.add_entry("5, 7");
    let third = plan.add_entry("9-");

    workflow.split_plan(&plan).await.unwrap();

    let files = workflow.delivery().take();
    assert_eq!(files[0].filename, "book_split.zip");

    let entries = zip_entries(&files[0].bytes);
    let names: Vec<_> = entries.iter().map(|(name, _)| name.clone()).collect();
    assert_eq!(
        names,
        [
            "book_split_1.pdf".to_string(),
            format!("book_split_{second}.pdf"),
            format!("book_split_{third}.pdf"),
        ]
    );
    assert_eq!(page_markers(&entries[0].1), ["P1", "P2", "P3"]);
    assert_eq!(page_markers(&entries[1].1), ["P5", "P7"]);
    assert_eq!(page_markers(&entries[2].1), ["P9", "P10"]);
}

#[tokio::test]
async fn test_split_mode_skips_empty_ranges() {
    let workflow = ready_workflow(LopdfEngine::new());
    let doc = document(&workflow, "a.pdf", "A", 3).await;

    let mode = SplitMode::Ranges(vec!["2".into(), "40-50".into(), "3".into()]);
    workflow.split(Some(&doc), &mode).await.unwrap();

    let files = workflow.delivery().take();
    let names: Vec<_> = zip_entries(&files[0].bytes)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, ["a_split_1.pdf", "a_split_3.pdf"]);
}

#[tokio::test]
async fn test_split_nothing_selected_delivers_empty_archive() {
    let workflow = ready_workflow(LopdfEngine::new());
    let doc = document(&workflow, "a.pdf", "A", 3).await;

    let mode = SplitMode::Ranges(vec!["abc".into()]);
    workflow.split(Some(&doc), &mode).await.unwrap();

    let files = workflow.delivery().take();
    assert!(zip_entries(&files[0].bytes).is_empty());
}

#[tokio::test]
async fn test_split_without_document() {
    let workflow = ready_workflow(LopdfEngine::new());

    let err = workflow.split_plan(&SplitPlan::new()).await.unwrap_err();

    assert!(matches!(err, PdfMasterError::NoDocumentLoaded));
    assert!(workflow.delivery().is_empty());
}

#[tokio::test]
async fn test_split_failure_delivers_nothing() {
    let workflow = ready_workflow(FlakyEngine::failing_copy(3));
    let doc = document(&workflow, "a.pdf", "A", 5).await;

    let err = workflow.burst(Some(&doc)).await.unwrap_err();

    assert!(matches!(err, PdfMasterError::SplitFailed { ref reason } if reason.contains("a_page_3.pdf")));
    assert!(workflow.delivery().is_empty());
    assert_eq!(workflow.pdf().copies(), 3);
    assert!(!workflow.is_busy());
}
