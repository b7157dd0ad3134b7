//! lopdf-backed document engine.
//!
//! Pages are copied between documents by importing the page dictionary and
//! everything it references under fresh object ids. References back into
//! the source page tree (the page's `Parent`, links to pages that were not
//! selected) are cut, so a copy never drags the whole source document along.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::task;

use crate::config::CompressionLevel;
use crate::engine::{EngineError, EngineResult, LoadOptions, PdfEngine};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// PDF engine built on `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine {
    compression: CompressionLevel,
}

impl LopdfEngine {
    /// Create an engine with standard compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine applying `compression` when saving.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self { compression }
    }
}

impl PdfEngine for LopdfEngine {
    type Document = Document;
    type Page = ObjectId;

    async fn load(&self, bytes: Arc<[u8]>, options: LoadOptions) -> EngineResult<Document> {
        let doc = task::spawn_blocking(move || Document::load_mem(&bytes))
            .await?
            .map_err(|e| EngineError::Load(e.to_string()))?;

        if doc.is_encrypted() {
            if !options.tolerate_encryption {
                return Err(EngineError::Encrypted);
            }
            // Without the user password lopdf leaves every object unparsed,
            // so the page tree would read as empty.
            if doc.encryption_state.is_none() {
                return Err(EngineError::PasswordRequired);
            }
            log::debug!("Loaded encrypted document with an empty user password");
        }

        Ok(doc)
    }

    fn page_count(&self, doc: &Document) -> usize {
        doc.get_pages().len()
    }

    fn create(&self) -> EngineResult<Document> {
        let mut doc = Document::with_version("1.7");

        let pages_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Pages".to_vec()),
            "Kids" => Object::Array(Vec::new()),
            "Count" => Object::Integer(0),
        });

        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Ok(doc)
    }

    async fn copy_pages(
        &self,
        target: &mut Document,
        source: &Document,
        indices: &[usize],
    ) -> EngineResult<Vec<ObjectId>> {
        let source_pages = source.get_pages();
        let total = source_pages.len();

        let page_ids = indices
            .iter()
            .map(|&index| {
                u32::try_from(index + 1)
                    .ok()
                    .and_then(|number| source_pages.get(&number).copied())
                    .ok_or(EngineError::PageOutOfRange { index, total })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let mut importer = PageImporter::new(source, target, &page_ids);
        page_ids
            .iter()
            .map(|&page_id| importer.import_page(page_id))
            .collect()
    }

    fn add_page(&self, target: &mut Document, page: ObjectId) -> EngineResult<()> {
        let pages_id = target
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| EngineError::Copy(format!("Failed to get pages reference: {e}")))?;

        let pages_dict = target
            .get_dictionary_mut(pages_id)
            .map_err(|e| EngineError::Copy(format!("Failed to get pages object: {e}")))?;

        match pages_dict.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page)),
            _ => return Err(EngineError::Copy("Kids is not an array".into())),
        }

        let count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .unwrap_or(0);
        pages_dict.set("Count", Object::Integer(count + 1));

        let page_dict = target
            .get_dictionary_mut(page)
            .map_err(|e| EngineError::Copy(format!("Failed to get page object: {e}")))?;
        page_dict.set("Parent", Object::Reference(pages_id));

        Ok(())
    }

    async fn save(&self, mut doc: Document) -> EngineResult<Vec<u8>> {
        let compression = self.compression;

        task::spawn_blocking(move || {
            match compression {
                CompressionLevel::None => {}
                CompressionLevel::Standard => doc.compress(),
                CompressionLevel::Maximum => {
                    doc.prune_objects();
                    doc.compress();
                }
            }
            doc.renumber_objects();

            let mut buffer = Vec::new();
            doc.save_to(&mut buffer)
                .map_err(|e| EngineError::Save(e.to_string()))?;
            Ok(buffer)
        })
        .await?
    }
}

/// Copies page objects and their dependencies from one document into
/// another.
struct PageImporter<'a> {
    source: &'a Document,
    target: &'a mut Document,
    /// Source object id to target object id, for everything imported so far.
    imported: BTreeMap<ObjectId, ObjectId>,
    /// Every page of the source, selected or not.
    source_pages: BTreeSet<ObjectId>,
}

impl<'a> PageImporter<'a> {
    fn new(source: &'a Document, target: &'a mut Document, selected: &[ObjectId]) -> Self {
        let source_pages = source.get_pages().into_values().collect();

        // Selected pages get their ids up front so references between them
        // (links, annotations) resolve to the copies.
        let mut imported = BTreeMap::new();
        for &page_id in selected {
            imported
                .entry(page_id)
                .or_insert_with(|| target.new_object_id());
        }

        Self {
            source,
            target,
            imported,
            source_pages,
        }
    }

    fn import_page(&mut self, page_id: ObjectId) -> EngineResult<ObjectId> {
        let source = self.source;
        let mut page = source
            .get_dictionary(page_id)
            .map_err(|e| EngineError::Copy(format!("Failed to get page {page_id:?}: {e}")))?
            .clone();

        for key in INHERITABLE_KEYS {
            if !page.has(key)
                && let Some(value) = inherited_attribute(source, &page, key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }
        page.remove(b"Parent");

        let new_id = match self.imported.get(&page_id) {
            Some(&id) if !self.target.objects.contains_key(&id) => id,
            // Same page requested twice in one call: give the second copy
            // its own object.
            _ => self.target.new_object_id(),
        };

        let page = self.import_dictionary(&page);
        self.target.objects.insert(new_id, Object::Dictionary(page));
        Ok(new_id)
    }

    fn import_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.import_reference(*id),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.import_object(item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(dict)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.import_dictionary(&stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn import_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut imported = Dictionary::new();
        for (key, value) in dict.iter() {
            imported.set(key.clone(), self.import_object(value));
        }
        imported
    }

    fn import_reference(&mut self, id: ObjectId) -> Object {
        if let Some(&new_id) = self.imported.get(&id) {
            return Object::Reference(new_id);
        }

        // Pages that were not selected and page tree nodes stay behind.
        if self.source_pages.contains(&id) {
            return Object::Null;
        }

        let source = self.source;
        let Ok(object) = source.get_object(id) else {
            return Object::Null;
        };
        if is_page_tree_node(object) {
            return Object::Null;
        }

        let new_id = self.target.new_object_id();
        self.imported.insert(id, new_id);
        let copy = self.import_object(object);
        self.target.objects.insert(new_id, copy);

        Object::Reference(new_id)
    }
}

/// Look up an inheritable attribute on the ancestors of a page.
fn inherited_attribute<'a>(doc: &'a Document, page: &Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut visited = BTreeSet::new();

    while let Some(node_id) = parent {
        if !visited.insert(node_id) {
            break;
        }
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => dict
            .get(b"Type")
            .and_then(Object::as_name)
            .is_ok_and(|name| name == b"Pages"),
        _ => false,
    }
}
