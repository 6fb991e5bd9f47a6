//! In-memory document repository

use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use docvault_client::{Document, DocumentPatch};

/// A document plus its stored payload bytes
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub doc: Document,
    pub payload: Vec<u8>,
}

/// Concurrent in-memory document store with a monotonic ID sequence
pub struct DocumentRepository {
    docs: DashMap<u64, StoredDocument>,
    next_id: AtomicU64,
}

impl DocumentRepository {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store a new document and assign its ID
    pub fn insert(&self, filename: &str, category: &str, payload: Vec<u8>, owner: &str) -> Document {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let doc = Document {
            id,
            filename: filename.to_string(),
            category: category.to_string(),
            image: format!("/api/v1/documents/{}/raw", id),
            owner: owner.to_string(),
            uploaded_at: Utc::now(),
        };

        self.docs.insert(
            id,
            StoredDocument {
                doc: doc.clone(),
                payload,
            },
        );

        doc
    }

    pub fn get(&self, id: u64) -> Option<Document> {
        self.docs.get(&id).map(|entry| entry.doc.clone())
    }

    /// Stored payload bytes for a document
    pub fn payload(&self, id: u64) -> Option<Vec<u8>> {
        self.docs.get(&id).map(|entry| entry.payload.clone())
    }

    /// List documents ordered by ID, optionally restricted to one category
    pub fn list(&self, category: Option<&str>) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .docs
            .iter()
            .filter(|entry| category.map_or(true, |c| entry.doc.category == c))
            .map(|entry| entry.doc.clone())
            .collect();
        docs.sort_by_key(|doc| doc.id);
        docs
    }

    /// Apply a metadata patch, returning the updated document
    pub fn update(&self, id: u64, patch: &DocumentPatch) -> Option<Document> {
        let mut entry = self.docs.get_mut(&id)?;
        if let Some(ref filename) = patch.filename {
            entry.doc.filename = filename.clone();
        }
        if let Some(ref category) = patch.category {
            entry.doc.category = category.clone();
        }
        Some(entry.doc.clone())
    }

    /// Remove a document, returning its last stored form
    pub fn remove(&self, id: u64) -> Option<Document> {
        self.docs.remove(&id).map(|(_, stored)| stored.doc)
    }

    pub fn count(&self) -> usize {
        self.docs.len()
    }
}

impl Default for DocumentRepository {
    fn default() -> Self {
        Self::new()
    }
}
