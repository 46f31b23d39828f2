//! Per-(grade, subject) curriculum knowledge base.
//!
//! Pairs a vector-store collection with an embedding model. Documents are
//! split, embedded and stored on build; questions are embedded and matched
//! against the collection on search.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tutor_core::config::TutorConfig;
use tutor_core::curriculum::{Grade, Subject, collection_name};
use tutor_core::error::Result;
use tutor_core::retrieval::{ContextRetriever, CurriculumChunk, RetrieverFactory};
use tutor_core::splitter::TextSplitter;
use tutor_core::TutorError;
use tutor_infrastructure::corpus::{self, CorpusDocument};

use crate::chroma::{VectorRecord, VectorStore};
use crate::embeddings::Embedder;

/// Snapshot of a knowledge base for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseInfo {
    pub grade: Grade,
    pub subject: Subject,
    pub collection_name: String,
    pub docs_path: PathBuf,
    pub embedding_ready: bool,
    pub db_ready: bool,
    pub current_model: String,
    pub document_count: usize,
}

pub struct KnowledgeBaseManager {
    grade: Grade,
    subject: Subject,
    collection_name: String,
    collection_id: String,
    docs_root: PathBuf,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    splitter: TextSplitter,
}

impl KnowledgeBaseManager {
    /// Opens the collection for the pair, creating it if needed.
    pub async fn open(
        grade: Grade,
        subject: Subject,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        config: &TutorConfig,
    ) -> Result<Self> {
        let name = collection_name(grade, subject);
        let collection_id = store.get_or_create_collection(&name).await?;
        tracing::debug!("Opened collection '{}' ({})", name, collection_id);

        Ok(Self {
            grade,
            subject,
            collection_name: name,
            collection_id,
            docs_root: config.docs_dir.clone(),
            store,
            embedder,
            splitter: TextSplitter::new(config.chunk_size, config.chunk_overlap),
        })
    }

    pub fn docs_path(&self) -> PathBuf {
        corpus::subject_dir(&self.docs_root, self.grade, self.subject)
    }

    /// Embeds and stores `chunks`. Returns the number stored.
    pub async fn add_documents(&self, chunks: &[CurriculumChunk]) -> Result<usize> {
        let chunks: Vec<&CurriculumChunk> = chunks
            .iter()
            .filter(|c| !c.source_text.trim().is_empty())
            .collect();
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.source_text.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(TutorError::retrieval(format!(
                "embedded {} of {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord {
                id: uuid::Uuid::new_v4().to_string(),
                embedding,
                document: chunk.source_text.clone(),
                source: chunk.source.clone(),
            })
            .collect();

        self.store.add(&self.collection_id, &records).await?;
        tracing::info!(
            "Added {} chunk(s) to '{}'",
            records.len(),
            self.collection_name
        );
        Ok(records.len())
    }

    /// Splits each document and stores the pieces.
    pub async fn build_from_texts(&self, documents: &[CorpusDocument]) -> Result<usize> {
        let chunks: Vec<CurriculumChunk> = documents
            .iter()
            .flat_map(|doc| {
                let source = doc.source_label(&self.docs_root);
                self.splitter
                    .split(&doc.text)
                    .into_iter()
                    .map(move |piece| CurriculumChunk::new(piece, source.clone()))
            })
            .collect();
        tracing::info!(
            "Split {} document(s) into {} chunk(s) for '{}'",
            documents.len(),
            chunks.len(),
            self.collection_name
        );
        self.add_documents(&chunks).await
    }

    /// Loads the pair's documents from disk and stores them.
    pub async fn build_from_corpus(&self) -> Result<usize> {
        let documents = corpus::load_subject_documents(&self.docs_root, self.grade, self.subject);
        self.build_from_texts(&documents).await
    }

    pub async fn document_count(&self) -> Result<usize> {
        self.store.count(&self.collection_id).await
    }

    pub async fn info(&self) -> KnowledgeBaseInfo {
        let count = self.document_count().await;
        if let Err(e) = &count {
            tracing::warn!("Could not count '{}': {}", self.collection_name, e);
        }
        KnowledgeBaseInfo {
            grade: self.grade,
            subject: self.subject,
            collection_name: self.collection_name.clone(),
            docs_path: self.docs_path(),
            embedding_ready: true,
            db_ready: count.is_ok(),
            current_model: self.embedder.model_name().to_string(),
            document_count: count.unwrap_or(0),
        }
    }
}

#[async_trait]
impl ContextRetriever for KnowledgeBaseManager {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<CurriculumChunk>> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed_query(query).await?;
        self.store.query(&self.collection_id, &embedding, k).await
    }
}

/// Opens knowledge bases on demand, building empty collections from the
/// document folder on first use.
pub struct KnowledgeBaseFactory {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    config: TutorConfig,
    auto_build: bool,
}

impl KnowledgeBaseFactory {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, config: TutorConfig) -> Self {
        Self {
            store,
            embedder,
            config,
            auto_build: true,
        }
    }

    pub fn with_auto_build(mut self, auto_build: bool) -> Self {
        self.auto_build = auto_build;
        self
    }

    pub async fn open_manager(&self, grade: Grade, subject: Subject) -> Result<KnowledgeBaseManager> {
        let manager = KnowledgeBaseManager::open(
            grade,
            subject,
            self.store.clone(),
            self.embedder.clone(),
            &self.config,
        )
        .await?;

        if self.auto_build && manager.document_count().await? == 0 {
            let added = manager.build_from_corpus().await?;
            if added == 0 {
                tracing::warn!(
                    "No curriculum documents for {} / {} in {}",
                    grade,
                    subject,
                    manager.docs_path().display()
                );
            }
        }
        Ok(manager)
    }
}

#[async_trait]
impl RetrieverFactory for KnowledgeBaseFactory {
    async fn open(&self, grade: Grade, subject: Subject) -> Result<Arc<dyn ContextRetriever>> {
        let manager = self.open_manager(grade, subject).await?;
        Ok(Arc::new(manager))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Letter-frequency embedding; enough to rank Arabic snippets by overlap.
    struct LetterEmbedder;

    fn letters(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; 64];
        for c in text.chars().filter(|c| c.is_alphabetic()) {
            v[(c as usize) % 64] += 1.0;
        }
        v
    }

    #[async_trait]
    impl Embedder for LetterEmbedder {
        fn model_name(&self) -> &str {
            "letters"
        }

        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| letters(t)).collect())
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
            Ok(letters(text))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        collections: Mutex<HashMap<String, Vec<VectorRecord>>>,
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
    }

    #[async_trait]
    impl VectorStore for MemoryStore {
        async fn heartbeat(&self) -> Result<()> {
            Ok(())
        }

        async fn get_or_create_collection(&self, name: &str) -> Result<String> {
            self.collections.lock().await.entry(name.to_string()).or_default();
            Ok(name.to_string())
        }

        async fn add(&self, collection_id: &str, records: &[VectorRecord]) -> Result<()> {
            let mut collections = self.collections.lock().await;
            collections
                .get_mut(collection_id)
                .ok_or_else(|| TutorError::not_found("collection", collection_id))?
                .extend_from_slice(records);
            Ok(())
        }

        async fn query(&self, collection_id: &str, embedding: &[f32], k: usize) -> Result<Vec<CurriculumChunk>> {
            let collections = self.collections.lock().await;
            let mut scored: Vec<(f32, &VectorRecord)> = collections
                .get(collection_id)
                .map(|records| records.iter().map(|r| (cosine(&r.embedding, embedding), r)).collect())
                .unwrap_or_default();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            Ok(scored
                .into_iter()
                .take(k)
                .map(|(_, r)| CurriculumChunk::new(r.document.clone(), r.source.clone()))
                .collect())
        }

        async fn count(&self, collection_id: &str) -> Result<usize> {
            Ok(self.collections.lock().await.get(collection_id).map_or(0, Vec::len))
        }
    }

    fn config(docs: &std::path::Path) -> TutorConfig {
        TutorConfig {
            docs_dir: docs.to_path_buf(),
            chunk_size: 40,
            chunk_overlap: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_build_and_search() {
        let docs = tempfile::TempDir::new().unwrap();
        let manager = KnowledgeBaseManager::open(
            Grade::Grade3,
            Subject::Science,
            Arc::new(MemoryStore::default()),
            Arc::new(LetterEmbedder),
            &config(docs.path()),
        )
        .await
        .unwrap();

        let documents = vec![
            CorpusDocument {
                path: docs.path().join("grade_3/Science/plants.txt"),
                text: "النبات يحتاج إلى الماء والضوء\n\nالجذر يثبت النبات في التربة".to_string(),
            },
            CorpusDocument {
                path: docs.path().join("grade_3/Science/animals.txt"),
                text: "القطة حيوان أليف".to_string(),
            },
        ];
        let added = manager.build_from_texts(&documents).await.unwrap();
        assert_eq!(added, 3);
        assert_eq!(manager.document_count().await.unwrap(), 3);

        let results = manager.similarity_search("القطة حيوان", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_text, "القطة حيوان أليف");
        assert!(results[0].source.ends_with("animals.txt"));

        let info = manager.info().await;
        assert_eq!(info.collection_name, collection_name(Grade::Grade3, Subject::Science));
        assert_eq!(info.document_count, 3);
        assert_eq!(info.current_model, "letters");
        assert!(info.db_ready && info.embedding_ready);
    }

    #[tokio::test]
    async fn test_factory_builds_empty_collection_from_corpus() {
        let docs = tempfile::TempDir::new().unwrap();
        let folder = corpus::subject_dir(docs.path(), Grade::Grade1, Subject::Math);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("addition.txt"), "الجمع هو ضم عددين معاً").unwrap();

        let store = Arc::new(MemoryStore::default());
        let factory = KnowledgeBaseFactory::new(store.clone(), Arc::new(LetterEmbedder), config(docs.path()));

        let first = factory.open_manager(Grade::Grade1, Subject::Math).await.unwrap();
        assert_eq!(first.document_count().await.unwrap(), 1);

        // Reopening an indexed collection does not add duplicates.
        let again = factory.open(Grade::Grade1, Subject::Math).await.unwrap();
        assert_eq!(first.document_count().await.unwrap(), 1);
        assert_eq!(again.collection_name(), first.collection_name());
    }

    #[tokio::test]
    async fn test_blank_chunks_are_skipped() {
        let docs = tempfile::TempDir::new().unwrap();
        let manager = KnowledgeBaseManager::open(
            Grade::Grade2,
            Subject::Arabic,
            Arc::new(MemoryStore::default()),
            Arc::new(LetterEmbedder),
            &config(docs.path()),
        )
        .await
        .unwrap();

        let added = manager
            .add_documents(&[CurriculumChunk::new("  ", "x.txt")])
            .await
            .unwrap();
        assert_eq!(added, 0);
        assert!(manager.similarity_search("", 3).await.unwrap().is_empty());
    }
}
