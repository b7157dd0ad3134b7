//! Shared helpers for the integration tests.
//!
//! PDFs are generated in memory. Every page prints a short marker such as
//! `A2` so tests can check which source page ended up where.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{
    Dictionary, Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions, Stream,
    StringFormat, dictionary,
};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pdfmaster::SourceDocument;
use pdfmaster::engine::{EngineError, EngineResult, LoadOptions, LopdfEngine, PdfEngine, ZipArchiveEngine};
use pdfmaster::io::MemoryDelivery;
use pdfmaster::readiness::ReadinessGate;
use pdfmaster::workflow::Workflow;

/// Workflow used by most tests.
pub type MemoryWorkflow<E = LopdfEngine> = Workflow<E, ZipArchiveEngine, MemoryDelivery>;

/// Build a PDF whose page `n` prints `{label}{n}`.
pub fn create_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Font".to_vec()),
        "Subtype" => Object::Name(b"Type1".to_vec()),
        "BaseFont" => Object::Name(b"Helvetica".to_vec()),
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    });

    let mut kids = Vec::new();
    for number in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 24.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{label}{number}").into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(resources_id),
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => Object::Array(kids),
            "Count" => Object::Integer(pages as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Catalog".to_vec()),
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Same as [`create_pdf`], encrypted with RC4 128 under `user_password`.
pub fn create_encrypted_pdf(label: &str, pages: usize, user_password: &str) -> Vec<u8> {
    let mut doc = Document::load_mem(&create_pdf(label, pages)).unwrap();
    let file_id = Object::String(label.as_bytes().to_vec(), StringFormat::Literal);
    doc.trailer
        .set("ID", Object::Array(vec![file_id.clone(), file_id]));

    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    })
    .unwrap();
    doc.encrypt(&state).unwrap();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Markers of every page of a PDF buffer, in page order.
pub fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let count = doc.get_pages().len() as u32;
    (1..=count)
        .map(|number| doc.extract_text(&[number]).unwrap().trim().to_string())
        .collect()
}

/// Names and contents of every entry of a zip buffer, in archive order.
pub fn zip_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|index| {
            let mut file = archive.by_index(index).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

/// Workflow delivering into memory, ready to run.
pub fn ready_workflow<E: PdfEngine>(engine: E) -> MemoryWorkflow<E> {
    Workflow::new(engine, ZipArchiveEngine::new(), MemoryDelivery::new())
        .with_gate(ReadinessGate::ready())
}

/// Ingest a generated document.
pub async fn document<E: PdfEngine>(
    workflow: &MemoryWorkflow<E>,
    name: &str,
    label: &str,
    pages: usize,
) -> SourceDocument {
    workflow.ingest(name, create_pdf(label, pages)).await.unwrap()
}

/// Engine failing its n-th page copy (1-based).
#[derive(Debug)]
pub struct FlakyEngine {
    inner: LopdfEngine,
    fail_on: usize,
    copies: AtomicUsize,
}

impl FlakyEngine {
    pub fn failing_copy(fail_on: usize) -> Self {
        Self {
            inner: LopdfEngine::new(),
            fail_on,
            copies: AtomicUsize::new(0),
        }
    }

    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }
}

impl PdfEngine for FlakyEngine {
    type Document = Document;
    type Page = ObjectId;

    async fn load(&self, bytes: Arc<[u8]>, options: LoadOptions) -> EngineResult<Document> {
        self.inner.load(bytes, options).await
    }

    fn page_count(&self, doc: &Document) -> usize {
        self.inner.page_count(doc)
    }

    fn create(&self) -> EngineResult<Document> {
        self.inner.create()
    }

    async fn copy_pages(
        &self,
        target: &mut Document,
        source: &Document,
        indices: &[usize],
    ) -> EngineResult<Vec<ObjectId>> {
        let call = self.copies.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(EngineError::Copy("injected failure".to_string()));
        }
        self.inner.copy_pages(target, source, indices).await
    }

    fn add_page(&self, target: &mut Document, page: ObjectId) -> EngineResult<()> {
        self.inner.add_page(target, page)
    }

    async fn save(&self, doc: Document) -> EngineResult<Vec<u8>> {
        self.inner.save(doc).await
    }
}

/// Engine taking a while to save.
#[derive(Debug)]
pub struct SlowEngine {
    inner: LopdfEngine,
    delay: Duration,
}

impl SlowEngine {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: LopdfEngine::new(),
            delay,
        }
    }
}

impl PdfEngine for SlowEngine {
    type Document = Document;
    type Page = ObjectId;

    async fn load(&self, bytes: Arc<[u8]>, options: LoadOptions) -> EngineResult<Document> {
        self.inner.load(bytes, options).await
    }

    fn page_count(&self, doc: &Document) -> usize {
        self.inner.page_count(doc)
    }

    fn create(&self) -> EngineResult<Document> {
        self.inner.create()
    }

    async fn copy_pages(
        &self,
        target: &mut Document,
        source: &Document,
        indices: &[usize],
    ) -> EngineResult<Vec<ObjectId>> {
        self.inner.copy_pages(target, source, indices).await
    }

    fn add_page(&self, target: &mut Document, page: ObjectId) -> EngineResult<()> {
        self.inner.add_page(target, page)
    }

    async fn save(&self, doc: Document) -> EngineResult<Vec<u8>> {
        tokio::time::sleep(self.delay).await;
        self.inner.save(doc).await
    }
}
