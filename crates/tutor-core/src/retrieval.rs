//! Curriculum retrieval seam.
//!
//! Retrieval is best-effort: any failure degrades to an empty context and the
//! tutor answers from general knowledge.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::curriculum::{Grade, Subject};
use crate::error::Result;
use crate::session::SearchStatus;

/// Default number of chunks to retrieve per question.
pub const DEFAULT_TOP_K: usize = 3;

/// A chunk of curriculum text returned by the vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumChunk {
    pub source_text: String,
    /// Path of the document the chunk was split from.
    pub source: String,
}

impl CurriculumChunk {
    pub fn new(source_text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            source: source.into(),
        }
    }
}

/// A searchable per-(grade, subject) curriculum collection.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Collection this retriever searches.
    fn collection_name(&self) -> &str;

    /// Returns up to `k` chunks ranked by similarity to `query`.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<CurriculumChunk>>;
}

/// Opens the retriever for a grade/subject selection.
#[async_trait]
pub trait RetrieverFactory: Send + Sync {
    async fn open(&self, grade: Grade, subject: Subject) -> Result<Arc<dyn ContextRetriever>>;
}

/// Retrieves and formats context for a query.
///
/// Returns an empty string when there is no retriever or the search fails;
/// failures are logged, never propagated.
pub async fn retrieve(handle: Option<&dyn ContextRetriever>, query: &str, k: usize) -> String {
    retrieve_with_status(handle, query, k).await.0
}

/// Same as [`retrieve`], also reporting how the lookup went.
///
/// A missing handle is [`SearchStatus::Unavailable`]. An empty result or a
/// failed search is [`SearchStatus::NotFound`].
pub async fn retrieve_with_status(
    handle: Option<&dyn ContextRetriever>,
    query: &str,
    k: usize,
) -> (String, SearchStatus) {
    let Some(retriever) = handle else {
        debug!("No retriever available, skipping curriculum lookup");
        return (String::new(), SearchStatus::Unavailable);
    };

    match retriever.similarity_search(query, k).await {
        Ok(chunks) => {
            debug!(
                "Retrieved {} chunk(s) from '{}'",
                chunks.len(),
                retriever.collection_name()
            );
            let context = format_context(&chunks);
            let status = if context.is_empty() {
                SearchStatus::NotFound
            } else {
                SearchStatus::Found
            };
            (context, status)
        }
        Err(e) => {
            warn!(
                "Curriculum search failed for '{}': {}",
                retriever.collection_name(),
                e
            );
            (String::new(), SearchStatus::NotFound)
        }
    }
}

/// Tags each chunk with its 1-based source index and joins them with blank
/// lines.
pub fn format_context(chunks: &[CurriculumChunk]) -> String {
    chunks
        .iter()
        .filter(|chunk| !chunk.source_text.trim().is_empty())
        .enumerate()
        .map(|(index, chunk)| {
            format!(
                "[مصدر {}] ({})\n{}",
                index + 1,
                chunk.source,
                chunk.source_text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Retriever for selections without a curriculum collection. Always empty.
#[derive(Debug, Clone, Default)]
pub struct NoOpRetriever;

#[async_trait]
impl ContextRetriever for NoOpRetriever {
    fn collection_name(&self) -> &str {
        "none"
    }

    async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<CurriculumChunk>> {
        Ok(Vec::new())
    }
}
