//! Working sets for the merge and split modes.
//!
//! A [`MergeQueue`] is an ordered list of documents whose order is the page
//! order of the merged output. A [`SplitPlan`] holds at most one document
//! and the list of ranges to cut it into.

use serde::{Deserialize, Serialize};

use crate::document::{DocumentId, SourceDocument};
use crate::range::{PageRange, full_range};

/// Ordered documents to merge.
#[derive(Debug, Clone, Default)]
pub struct MergeQueue {
    documents: Vec<SourceDocument>,
}

impl MergeQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append documents at the end of the queue.
    pub fn extend(&mut self, documents: impl IntoIterator<Item = SourceDocument>) {
        self.documents.extend(documents);
    }

    /// Append one document at the end of the queue.
    pub fn push(&mut self, document: SourceDocument) {
        self.documents.push(document);
    }

    /// Remove a document. Returns it if it was queued.
    pub fn remove(&mut self, id: DocumentId) -> Option<SourceDocument> {
        let position = self.position(id)?;
        Some(self.documents.remove(position))
    }

    /// Move a document one place towards the front.
    ///
    /// Returns false if the document is unknown or already first.
    pub fn move_up(&mut self, id: DocumentId) -> bool {
        match self.position(id) {
            Some(position) if position > 0 => {
                self.documents.swap(position, position - 1);
                true
            }
            _ => false,
        }
    }

    /// Move a document one place towards the back.
    ///
    /// Returns false if the document is unknown or already last.
    pub fn move_down(&mut self, id: DocumentId) -> bool {
        match self.position(id) {
            Some(position) if position + 1 < self.documents.len() => {
                self.documents.swap(position, position + 1);
                true
            }
            _ => false,
        }
    }

    /// Replace the range of a document. Returns false if it is not queued.
    pub fn set_range(&mut self, id: DocumentId, spec: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(document) => {
                document.range.set(spec);
                true
            }
            None => false,
        }
    }

    /// Look up a document.
    pub fn get(&self, id: DocumentId) -> Option<&SourceDocument> {
        self.documents.iter().find(|doc| doc.id() == id)
    }

    /// Look up a document for editing.
    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut SourceDocument> {
        self.documents.iter_mut().find(|doc| doc.id() == id)
    }

    /// Queued documents in merge order.
    pub fn documents(&self) -> &[SourceDocument] {
        &self.documents
    }

    /// Number of queued documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Remove every document.
    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Total pages the merged output would contain with the current ranges.
    pub fn selected_page_count(&self) -> usize {
        self.documents
            .iter()
            .map(|doc| doc.selected_pages().len())
            .sum()
    }

    fn position(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id() == id)
    }
}

/// One output range of a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEntry {
    /// Identifier, unique within its plan.
    pub id: u32,
    /// Name used in the output file name.
    pub label: String,
    /// Pages of this output.
    pub value: PageRange,
}

impl RangeEntry {
    /// Create an entry labelled by its id.
    pub fn new(id: u32, value: impl Into<PageRange>) -> Self {
        Self {
            id,
            label: id.to_string(),
            value: value.into(),
        }
    }
}

/// A document and the ranges to split it into.
///
/// The plan always holds at least one entry.
#[derive(Debug, Clone)]
pub struct SplitPlan {
    document: Option<SourceDocument>,
    entries: Vec<RangeEntry>,
    next_id: u32,
}

impl Default for SplitPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitPlan {
    /// Create a plan with no document and one empty entry.
    pub fn new() -> Self {
        Self {
            document: None,
            entries: vec![RangeEntry::new(1, "")],
            next_id: 2,
        }
    }

    /// Load a document, resetting the entries to a single range covering
    /// every page.
    pub fn load(&mut self, document: SourceDocument) {
        let all = full_range(document.page_count());
        self.document = Some(document);
        self.entries = vec![RangeEntry::new(1, all)];
        self.next_id = 2;
    }

    /// Drop the document and reset the entries.
    pub fn unload(&mut self) -> Option<SourceDocument> {
        let document = self.document.take();
        *self = Self::new();
        document
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    /// Entries in output order.
    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    /// Append an entry and return its id.
    pub fn add_entry(&mut self, value: impl Into<PageRange>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(RangeEntry::new(id, value));
        id
    }

    /// Remove an entry.
    ///
    /// The last remaining entry is never removed. Returns false if nothing
    /// was removed.
    pub fn remove_entry(&mut self, id: u32) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Replace the range of an entry. Returns false if the id is unknown.
    pub fn set_entry(&mut self, id: u32, spec: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.value.set(spec);
                true
            }
            None => false,
        }
    }

    /// Replace every entry with the given ranges, numbered from 1.
    ///
    /// An empty list leaves a single range covering every page.
    pub fn set_entries<I, S>(&mut self, specs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<PageRange>,
    {
        self.entries = specs
            .into_iter()
            .zip(1..)
            .map(|(spec, id)| RangeEntry::new(id, spec))
            .collect();
        self.next_id = self.entries.len() as u32 + 1;

        if self.entries.is_empty() {
            let pages = self.document.as_ref().map_or(0, SourceDocument::page_count);
            self.entries.push(RangeEntry::new(1, full_range(pages)));
            self.next_id = 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn document(name: &str, pages: usize) -> SourceDocument {
        SourceDocument::new(name, Arc::from(&b"%PDF-1.7"[..]), pages)
    }

    fn names(queue: &MergeQueue) -> Vec<&str> {
        queue.documents().iter().map(SourceDocument::name).collect()
    }

    #[test]
    fn test_queue_reorder() {
        let mut queue = MergeQueue::new();
        let a = document("a.pdf", 1);
        let b = document("b.pdf", 1);
        let c = document("c.pdf", 1);
        let (a_id, c_id) = (a.id(), c.id());
        queue.extend([a, b, c]);

        assert!(queue.move_up(c_id));
        assert_eq!(names(&queue), ["a.pdf", "c.pdf", "b.pdf"]);

        assert!(!queue.move_up(a_id));
        assert!(queue.move_down(a_id));
        assert_eq!(names(&queue), ["c.pdf", "a.pdf", "b.pdf"]);

        assert!(queue.move_down(a_id));
        assert!(!queue.move_down(a_id));
        assert_eq!(names(&queue), ["c.pdf", "b.pdf", "a.pdf"]);
    }

    #[test]
    fn test_queue_remove() {
        let mut queue = MergeQueue::new();
        let a = document("a.pdf", 1);
        let a_id = a.id();
        queue.push(a);
        queue.push(document("b.pdf", 1));

        assert_eq!(queue.remove(a_id).map(|d| d.id()), Some(a_id));
        assert!(queue.remove(a_id).is_none());
        assert_eq!(names(&queue), ["b.pdf"]);
        assert!(!queue.move_up(a_id));
    }

    #[test]
    fn test_queue_set_range() {
        let mut queue = MergeQueue::new();
        let a = document("a.pdf", 5);
        let a_id = a.id();
        queue.push(a);
        queue.push(document("b.pdf", 2));
        assert_eq!(queue.selected_page_count(), 7);

        assert!(queue.set_range(a_id, "2-3"));
        assert_eq!(queue.get(a_id).map(|d| d.range.as_str()), Some("2-3"));
        assert_eq!(queue.selected_page_count(), 4);

        assert!(!queue.set_range(DocumentId::new(), "1"));
    }

    #[test]
    fn test_split_plan_load_resets_entries() {
        let mut plan = SplitPlan::new();
        assert!(plan.document().is_none());
        assert_eq!(plan.entries().len(), 1);

        plan.load(document("a.pdf", 3));
        plan.add_entry("1");
        plan.add_entry("2-");
        assert_eq!(plan.entries().len(), 3);

        plan.load(document("b.pdf", 8));
        assert_eq!(plan.entries(), &[RangeEntry::new(1, "1-8")]);
    }

    #[test]
    fn test_split_plan_never_drops_last_entry() {
        let mut plan = SplitPlan::new();
        plan.load(document("a.pdf", 4));
        let second = plan.add_entry("3-4");

        assert!(plan.remove_entry(1));
        assert!(!plan.remove_entry(second));
        assert_eq!(plan.entries().len(), 1);
        assert_eq!(plan.entries()[0].id, second);
    }

    #[test]
    fn test_split_plan_ids_are_not_reused() {
        let mut plan = SplitPlan::new();
        plan.load(document("a.pdf", 4));
        let second = plan.add_entry("1");
        assert!(plan.remove_entry(second));
        let third = plan.add_entry("2");
        assert_ne!(second, third);
        assert_eq!(plan.entries()[1].label, third.to_string());
    }

    #[test]
    fn test_split_plan_set_entry() {
        let mut plan = SplitPlan::new();
        plan.load(document("a.pdf", 4));
        assert!(plan.set_entry(1, "2"));
        assert_eq!(plan.entries()[0].value.as_str(), "2");
        assert!(!plan.set_entry(42, "1"));
    }

    #[test]
    fn test_split_plan_set_entries() {
        let mut plan = SplitPlan::new();
        plan.load(document("a.pdf", 6));

        plan.set_entries(["1-2", "3-4", "5-"]);
        let labels: Vec<_> = plan.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["1", "2", "3"]);
        assert_eq!(plan.add_entry("6"), 4);

        plan.set_entries(Vec::<String>::new());
        assert_eq!(plan.entries(), &[RangeEntry::new(1, "1-6")]);
    }

    #[test]
    fn test_split_plan_unload() {
        let mut plan = SplitPlan::new();
        plan.load(document("a.pdf", 2));
        plan.add_entry("1");

        let doc = plan.unload();
        assert_eq!(doc.map(|d| d.page_count()), Some(2));
        assert!(plan.document().is_none());
        assert_eq!(plan.entries().len(), 1);
    }
}
