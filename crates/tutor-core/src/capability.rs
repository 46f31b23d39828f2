//! Startup capability flags.

use serde::{Deserialize, Serialize};

/// External services found usable at startup.
///
/// Computed once by probing and passed to constructors; consumers branch on
/// these fields instead of retrying unavailable services per question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// A model endpoint is configured and credentials resolved.
    pub model_client: bool,
    /// The vector store answered its heartbeat.
    pub retrieval: bool,
    /// First embedding model that answered a probe, if any.
    pub embedding_model: Option<String>,
}

impl Capabilities {
    /// Curriculum lookup needs both a vector store and an embedding model.
    pub fn retrieval_ready(&self) -> bool {
        self.retrieval && self.embedding_model.is_some()
    }

    /// One-line summary for logs and the `check` command.
    pub fn summary(&self) -> String {
        let flag = |ok: bool| if ok { "ok" } else { "unavailable" };
        format!(
            "model: {}, vector store: {}, embeddings: {}",
            flag(self.model_client),
            flag(self.retrieval),
            self.embedding_model.as_deref().unwrap_or("unavailable")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_needs_store_and_embeddings() {
        let mut caps = Capabilities {
            model_client: true,
            retrieval: true,
            embedding_model: None,
        };
        assert!(!caps.retrieval_ready());
        caps.embedding_model = Some("text-embedding-005".into());
        assert!(caps.retrieval_ready());
        assert_eq!(
            caps.summary(),
            "model: ok, vector store: ok, embeddings: text-embedding-005"
        );
    }
}
