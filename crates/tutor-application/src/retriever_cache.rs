use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tutor_core::curriculum::{Grade, Subject};
use tutor_core::retrieval::ContextRetriever;

/// Retrievers already opened, keyed by selection.
///
/// A `None` entry records a selection whose collection could not be opened,
/// so it is not retried on every question.
pub struct RetrieverCache {
    entries: Arc<RwLock<HashMap<(Grade, Subject), Option<Arc<dyn ContextRetriever>>>>>,
}

impl RetrieverCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// `Some(entry)` if the selection was seen before.
    pub async fn get(&self, grade: Grade, subject: Subject) -> Option<Option<Arc<dyn ContextRetriever>>> {
        let entries = self.entries.read().await;
        entries.get(&(grade, subject)).cloned()
    }

    pub async fn insert(
        &self,
        grade: Grade,
        subject: Subject,
        retriever: Option<Arc<dyn ContextRetriever>>,
    ) {
        let mut entries = self.entries.write().await;
        entries.insert((grade, subject), retriever);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}

impl Default for RetrieverCache {
    fn default() -> Self {
        Self::new()
    }
}
