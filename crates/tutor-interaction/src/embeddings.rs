//! Vertex AI text embeddings.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tutor_core::TutorError;
use tutor_core::error::Result;

use crate::auth::AccessTokenProvider;
use crate::gemini_api_agent::vertex_base_url;

/// Text embedded to check that a model answers.
pub const PROBE_TEXT: &str = "اختبار النموذج";

/// Instances per `:predict` call for models that accept batches.
const BATCH_SIZE: usize = 5;

#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Embeddings from a Vertex AI publisher model.
pub struct VertexEmbeddings {
    client: Client,
    project_id: String,
    location: String,
    model: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl VertexEmbeddings {
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        model: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            client: Client::new(),
            project_id: project_id.into(),
            location: location.into(),
            model: model.into(),
            tokens,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/projects/{}/locations/{}/publishers/google/models/{}:predict",
            vertex_base_url(&self.location),
            self.project_id,
            self.location,
            self.model
        )
    }

    /// `gemini-embedding-001` only takes one instance per request.
    fn batch_size(&self) -> usize {
        if self.model.starts_with("gemini-embedding") {
            1
        } else {
            BATCH_SIZE
        }
    }

    async fn predict(&self, texts: &[String], task_type: &'static str) -> Result<Vec<Vec<f32>>> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| TutorError::retrieval(e.to_string()))?;

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size()) {
            let body = PredictRequest {
                instances: batch
                    .iter()
                    .map(|content| Instance {
                        content: content.as_str(),
                        task_type,
                    })
                    .collect(),
            };

            let response = self
                .client
                .post(self.url())
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await
                .map_err(|e| TutorError::retrieval(format!("embedding request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(TutorError::retrieval(format!(
                    "embedding model {} returned {}: {}",
                    self.model, status, text
                )));
            }

            let parsed: PredictResponse = response
                .json()
                .await
                .map_err(|e| TutorError::retrieval(format!("invalid embedding response: {e}")))?;
            vectors.extend(parsed.into_vectors(batch.len())?);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for VertexEmbeddings {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.predict(texts, "RETRIEVAL_DOCUMENT").await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.predict(&[text.to_string()], "RETRIEVAL_QUERY")
            .await?
            .pop()
            .ok_or_else(|| TutorError::retrieval("embedding response was empty"))
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
}

#[derive(Serialize)]
struct Instance<'a> {
    content: &'a str,
    task_type: &'static str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    embeddings: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl PredictResponse {
    fn into_vectors(self, expected: usize) -> Result<Vec<Vec<f32>>> {
        if self.predictions.len() != expected {
            return Err(TutorError::retrieval(format!(
                "expected {} embedding(s), got {}",
                expected,
                self.predictions.len()
            )));
        }
        Ok(self
            .predictions
            .into_iter()
            .map(|p| p.embeddings.values)
            .collect())
    }
}

/// Returns the first candidate whose model embeds [`PROBE_TEXT`].
///
/// Candidates are tried in order; failures are logged and skipped.
pub async fn probe_embedding_models<E, F>(models: &[String], make: F) -> Option<E>
where
    E: Embedder,
    F: Fn(&str) -> E,
{
    for model in models {
        let embedder = make(model);
        match embedder.embed_query(PROBE_TEXT).await {
            Ok(vector) if !vector.is_empty() => {
                tracing::info!("Using embedding model {}", model);
                return Some(embedder);
            }
            Ok(_) => tracing::warn!("Embedding model {} returned an empty vector", model),
            Err(e) => tracing::warn!("Embedding model {} unavailable: {}", model, e),
        }
    }
    tracing::warn!("No embedding model answered; curriculum search disabled");
    None
}
