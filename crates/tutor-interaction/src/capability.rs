//! Startup probing of external services.

use std::sync::Arc;

use tutor_core::TutorError;
use tutor_core::capability::Capabilities;
use tutor_core::config::{SecretConfig, TutorConfig};
use tutor_core::error::Result;
use tutor_core::model::LanguageModel;
use tutor_core::retrieval::RetrieverFactory;
use tutor_infrastructure::MaterializedCredentials;

use crate::chroma::{ChromaClient, VectorStore};
use crate::embeddings::{Embedder, VertexEmbeddings, probe_embedding_models};
use crate::gemini_api_agent::{GeminiApiAgent, GeminiEndpoint};
use crate::knowledge_base::KnowledgeBaseFactory;

/// Services that answered at startup, with the flags describing them.
pub struct ProbedServices {
    pub capabilities: Capabilities,
    pub model: Option<Arc<dyn LanguageModel>>,
    pub store: Option<Arc<dyn VectorStore>>,
    pub embedder: Option<Arc<dyn Embedder>>,
    /// Present when both the store and an embedding model are usable.
    pub retrievers: Option<Arc<KnowledgeBaseFactory>>,
    /// Keeps the key file alive for token refreshes.
    _credentials: Option<Arc<MaterializedCredentials>>,
}

impl ProbedServices {
    pub fn retriever_factory(&self) -> Option<Arc<dyn RetrieverFactory>> {
        self.retrievers
            .clone()
            .map(|factory| factory as Arc<dyn RetrieverFactory>)
    }
}

/// Resolves credentials and probes the model, vector store and embeddings.
///
/// Invalid credentials are a configuration error. Unreachable services only
/// clear their capability flag.
pub async fn probe_services(config: &TutorConfig, secrets: &SecretConfig) -> Result<ProbedServices> {
    secrets.validate()?;

    let credentials = match &secrets.credentials {
        Some(blob) if secrets.api_key().is_none() => {
            Some(Arc::new(MaterializedCredentials::materialize(blob)?))
        }
        _ => None,
    };

    let endpoint = GeminiEndpoint::from_secrets(secrets, credentials.clone())
        .map_err(|e| TutorError::config(e.to_string()))?;
    let agent = GeminiApiAgent::new(endpoint.clone(), config.model_name.clone());

    let model: Option<Arc<dyn LanguageModel>> = match agent.check_credentials().await {
        Ok(()) => {
            tracing::info!("Model client ready: {}", config.model_name);
            Some(Arc::new(agent))
        }
        Err(e) => {
            tracing::warn!("Model client unavailable: {}", e);
            None
        }
    };

    let chroma = ChromaClient::new(config.chroma_url.clone());
    let store: Option<Arc<dyn VectorStore>> = match chroma.heartbeat().await {
        Ok(()) => {
            tracing::info!("Vector store reachable at {}", chroma.base_url());
            Some(Arc::new(chroma))
        }
        Err(e) => {
            tracing::warn!("Vector store unavailable: {}", e);
            None
        }
    };

    let embedder: Option<Arc<dyn Embedder>> = match (&endpoint, &store) {
        (
            GeminiEndpoint::Vertex {
                project_id,
                location,
                tokens,
            },
            Some(_),
        ) => probe_embedding_models(&config.embedding_models, |model| {
            VertexEmbeddings::new(project_id.clone(), location.clone(), model, tokens.clone())
        })
        .await
        .map(|e| Arc::new(e) as Arc<dyn Embedder>),
        (GeminiEndpoint::Developer { .. }, Some(_)) => {
            tracing::warn!("Embeddings need Vertex AI credentials; curriculum search disabled");
            None
        }
        (_, None) => None,
    };

    let retrievers = match (&store, &embedder) {
        (Some(store), Some(embedder)) => Some(Arc::new(KnowledgeBaseFactory::new(
            store.clone(),
            embedder.clone(),
            config.clone(),
        ))),
        _ => None,
    };

    let capabilities = Capabilities {
        model_client: model.is_some(),
        retrieval: store.is_some(),
        embedding_model: embedder.as_ref().map(|e| e.model_name().to_string()),
    };
    tracing::info!("Capabilities: {}", capabilities.summary());

    Ok(ProbedServices {
        capabilities,
        model,
        store,
        embedder,
        retrievers,
        _credentials: credentials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> TutorConfig {
        TutorConfig {
            // Discard port; connections are refused immediately.
            chroma_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_project_is_config_error() {
        let result = probe_services(&offline_config(), &SecretConfig::default()).await;
        assert!(result.err().is_some_and(|e| e.is_config()));
    }

    #[tokio::test]
    async fn test_invalid_credentials_are_config_error() {
        let secrets = SecretConfig {
            gcp_project_id: Some("tutor-project".into()),
            credentials: Some(tutor_core::config::CredentialsBlob::Json("{\"type\": \"user\"}".into())),
            ..Default::default()
        };
        let result = probe_services(&offline_config(), &secrets).await;
        assert!(result.err().is_some_and(|e| e.is_config()));
    }

    #[tokio::test]
    async fn test_unreachable_store_only_clears_retrieval() {
        let secrets = SecretConfig {
            gemini_api_key: Some("test-key".into()),
            ..Default::default()
        };
        let services = probe_services(&offline_config(), &secrets).await.unwrap();
        assert!(services.capabilities.model_client);
        assert!(!services.capabilities.retrieval);
        assert!(!services.capabilities.retrieval_ready());
        assert!(services.retriever_factory().is_none());
        assert!(services.model.is_some());
    }
}
