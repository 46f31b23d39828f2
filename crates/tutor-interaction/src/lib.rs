//! Clients for the hosted services the tutor talks to: Gemini for
//! generation, Vertex AI for embeddings and Chroma for vector search.

pub mod auth;
pub mod capability;
pub mod chroma;
pub mod embeddings;
pub mod gemini_api_agent;
pub mod knowledge_base;
pub mod quality_gate;

pub use auth::{AccessTokenProvider, GcloudTokenProvider, StaticToken};
pub use capability::{ProbedServices, probe_services};
pub use chroma::{ChromaClient, VectorRecord, VectorStore};
pub use embeddings::{Embedder, VertexEmbeddings, probe_embedding_models};
pub use gemini_api_agent::{GeminiApiAgent, GeminiEndpoint};
pub use knowledge_base::{KnowledgeBaseFactory, KnowledgeBaseInfo, KnowledgeBaseManager};
pub use quality_gate::{GateRequest, QualityGatedClient, corrective_suffix};
