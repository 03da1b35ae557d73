//! Reader over documents held in memory.

use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;

use super::ResourceReader;
use crate::core::{Document, ObjectId};

/// [`ResourceReader`] serving documents published in-process.
///
/// Used to simulate a cluster offline: once a wave has been "applied" its
/// documents are published here, and later waves read them as live state.
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct BatchReader {
    documents: Arc<DashMap<ObjectId, Document>>,
}

impl BatchReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader serving `documents`.
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let reader = Self::new();
        reader.publish_all(documents);
        reader
    }

    /// Make `document` readable, replacing any previous version.
    pub fn publish(&self, document: Document) {
        self.documents.insert(document.id(), document);
    }

    /// Publish every document in `documents`.
    pub fn publish_all(&self, documents: impl IntoIterator<Item = Document>) {
        for document in documents {
            self.publish(document);
        }
    }

    /// Remove a document.
    pub fn remove(&self, id: &ObjectId) -> Option<Document> {
        self.documents.remove(id).map(|(_, document)| document)
    }

    /// Number of readable documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ResourceReader for BatchReader {
    fn get<'a>(&'a self, id: &'a ObjectId) -> BoxFuture<'a, anyhow::Result<Option<Document>>> {
        let found = self.documents.get(id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }
}
