//! Chroma vector store over its REST API (`/api/v1`).

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tutor_core::TutorError;
use tutor_core::error::Result;
use tutor_core::retrieval::CurriculumChunk;

/// One embedded chunk ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub source: String,
}

/// The subset of vector-store operations the knowledge base needs.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn heartbeat(&self) -> Result<()>;

    /// Returns the id of the named collection, creating it when missing.
    async fn get_or_create_collection(&self, name: &str) -> Result<String>;

    async fn add(&self, collection_id: &str, records: &[VectorRecord]) -> Result<()>;

    async fn query(
        &self,
        collection_id: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<CurriculumChunk>>;

    async fn count(&self, collection_id: &str) -> Result<usize>;
}

#[derive(Clone)]
pub struct ChromaClient {
    client: Client,
    base_url: String,
}

impl ChromaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::retrieval(format!(
                "Chroma {what} failed with {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| TutorError::retrieval(format!("invalid Chroma {what} response: {e}")))
    }

    async fn post(&self, path: &str, body: &Value, what: &str) -> Result<reqwest::Response> {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| TutorError::retrieval(format!("Chroma {what} request failed: {e}")))
    }
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Vec<Vec<Option<Value>>>,
}

impl QueryResponse {
    /// Flattens the first (only) query's results into chunks.
    fn into_chunks(self) -> Vec<CurriculumChunk> {
        let documents = self.documents.into_iter().next().unwrap_or_default();
        let metadatas = self.metadatas.into_iter().next().unwrap_or_default();
        documents
            .into_iter()
            .enumerate()
            .filter_map(|(i, document)| {
                let document = document?;
                let source = metadatas
                    .get(i)
                    .and_then(|m| m.as_ref())
                    .and_then(|m| m.get("source"))
                    .and_then(Value::as_str)
                    .unwrap_or("غير معروف")
                    .to_string();
                Some(CurriculumChunk::new(document, source))
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for ChromaClient {
    async fn heartbeat(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("heartbeat"))
            .send()
            .await
            .map_err(|e| TutorError::retrieval(format!("Chroma is unreachable: {e}")))?;
        let _: Value = Self::read_json(response, "heartbeat").await?;
        Ok(())
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<String> {
        let body = json!({
            "name": name,
            "get_or_create": true,
            "metadata": { "hnsw:space": "cosine" },
        });
        let response = self.post("collections", &body, "collection").await?;
        let collection: CollectionResponse = Self::read_json(response, "collection").await?;
        Ok(collection.id)
    }

    async fn add(&self, collection_id: &str, records: &[VectorRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let body = json!({
            "ids": records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            "embeddings": records.iter().map(|r| &r.embedding).collect::<Vec<_>>(),
            "documents": records.iter().map(|r| r.document.as_str()).collect::<Vec<_>>(),
            "metadatas": records.iter().map(|r| json!({ "source": r.source })).collect::<Vec<_>>(),
        });
        let response = self
            .post(&format!("collections/{collection_id}/add"), &body, "add")
            .await?;
        let _: Value = Self::read_json(response, "add").await?;
        Ok(())
    }

    async fn query(
        &self,
        collection_id: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<CurriculumChunk>> {
        let body = json!({
            "query_embeddings": [embedding],
            "n_results": k,
            "include": ["documents", "metadatas", "distances"],
        });
        let response = self
            .post(&format!("collections/{collection_id}/query"), &body, "query")
            .await?;
        let parsed: QueryResponse = Self::read_json(response, "query").await?;
        Ok(parsed.into_chunks())
    }

    async fn count(&self, collection_id: &str) -> Result<usize> {
        let response = self
            .client
            .get(self.url(&format!("collections/{collection_id}/count")))
            .send()
            .await
            .map_err(|e| TutorError::retrieval(format!("Chroma count request failed: {e}")))?;
        Self::read_json(response, "count").await
    }
}
