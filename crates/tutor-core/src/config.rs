//! Runtime configuration and secrets.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TutorError};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";

/// Embedding models tried in order until one answers a probe.
pub const DEFAULT_EMBEDDING_MODELS: &[&str] = &[
    "gemini-embedding-001",
    "text-embedding-005",
    "text-embedding-004",
    "textembedding-gecko@latest",
];

/// Tunables for the tutor pipeline. Every field has a default, so an empty
/// or missing config file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub model_name: String,
    /// Extra attempts after the first model call.
    pub max_retries: u32,
    pub retrieval_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chroma_url: String,
    /// Root of `<grade>/<subject folder>` curriculum documents.
    pub docs_dir: PathBuf,
    pub embedding_models: Vec<String>,
    /// Turns included in the conversation summary.
    pub history_turns: usize,
    /// Optional JSON lesson index replacing the built-in one.
    pub curriculum_index: Option<PathBuf>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            max_retries: 2,
            retrieval_k: 3,
            chunk_size: 1000,
            chunk_overlap: 200,
            chroma_url: DEFAULT_CHROMA_URL.to_string(),
            docs_dir: PathBuf::from("knowledge_base_docs"),
            embedding_models: DEFAULT_EMBEDDING_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            history_turns: 6,
            curriculum_index: None,
        }
    }
}

impl TutorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `TUTOR_*` overrides read through `lookup`.
    ///
    /// Unparseable numeric values are rejected rather than ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("TUTOR_MODEL") {
            self.model_name = model;
        }
        if let Some(value) = lookup("TUTOR_MAX_RETRIES") {
            self.max_retries = parse_number("TUTOR_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("TUTOR_RETRIEVAL_K") {
            self.retrieval_k = parse_number("TUTOR_RETRIEVAL_K", &value)?;
        }
        if let Some(value) = lookup("TUTOR_HISTORY_TURNS") {
            self.history_turns = parse_number("TUTOR_HISTORY_TURNS", &value)?;
        }
        if let Some(url) = lookup("TUTOR_CHROMA_URL") {
            self.chroma_url = url;
        }
        if let Some(dir) = lookup("TUTOR_DOCS_DIR") {
            self.docs_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("TUTOR_CURRICULUM_INDEX") {
            self.curriculum_index = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TutorError::config(format!("{key} must be a number, got '{value}'")))
}

/// Service-account credentials as stored in the secrets file: either a JSON
/// string or an inline TOML table.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialsBlob {
    Json(String),
    Table(Map<String, Value>),
}

impl CredentialsBlob {
    /// Parses the blob into a JSON object.
    pub fn to_json_object(&self) -> Result<Map<String, Value>> {
        match self {
            CredentialsBlob::Table(map) => Ok(map.clone()),
            CredentialsBlob::Json(text) => match serde_json::from_str::<Value>(text)? {
                Value::Object(map) => Ok(map),
                _ => Err(TutorError::config(
                    "GOOGLE_APPLICATION_CREDENTIALS_JSON must be a JSON object",
                )),
            },
        }
    }
}

impl fmt::Debug for CredentialsBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialsBlob(<redacted>)")
    }
}

/// Cloud credentials. Key names match the secrets file layout.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(rename = "GCP_PROJECT_ID", default, skip_serializing_if = "Option::is_none")]
    pub gcp_project_id: Option<String>,
    #[serde(rename = "GCP_LOCATION", default, skip_serializing_if = "Option::is_none")]
    pub gcp_location: Option<String>,
    #[serde(
        rename = "GOOGLE_APPLICATION_CREDENTIALS_JSON",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credentials: Option<CredentialsBlob>,
    /// Developer API key; used instead of Vertex AI when set.
    #[serde(rename = "GEMINI_API_KEY", default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    /// Pre-issued OAuth token for Vertex AI.
    #[serde(rename = "VERTEX_ACCESS_TOKEN", default, skip_serializing_if = "Option::is_none")]
    pub vertex_access_token: Option<String>,
}

impl SecretConfig {
    pub fn project_id(&self) -> Option<&str> {
        non_blank(self.gcp_project_id.as_deref())
    }

    pub fn location(&self) -> &str {
        non_blank(self.gcp_location.as_deref()).unwrap_or(DEFAULT_LOCATION)
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.gemini_api_key.as_deref())
    }

    pub fn access_token(&self) -> Option<&str> {
        non_blank(self.vertex_access_token.as_deref())
    }

    /// Fills unset fields from environment variables of the same name.
    pub fn fill_from_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.project_id().is_none() {
            self.gcp_project_id = lookup("GCP_PROJECT_ID");
        }
        if self.gcp_location.is_none() {
            self.gcp_location = lookup("GCP_LOCATION");
        }
        if self.credentials.is_none() {
            self.credentials =
                lookup("GOOGLE_APPLICATION_CREDENTIALS_JSON").map(CredentialsBlob::Json);
        }
        if self.api_key().is_none() {
            self.gemini_api_key = lookup("GEMINI_API_KEY");
        }
        if self.access_token().is_none() {
            self.vertex_access_token = lookup("VERTEX_ACCESS_TOKEN");
        }
    }

    /// Checks the minimum needed to reach a model: a project id for Vertex
    /// AI, or a Developer API key.
    pub fn validate(&self) -> Result<()> {
        if self.project_id().is_none() && self.api_key().is_none() {
            return Err(TutorError::config(
                "GCP_PROJECT_ID is missing (set it in secrets.toml or the environment)",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretConfig")
            .field("gcp_project_id", &self.gcp_project_id)
            .field("gcp_location", &self.gcp_location)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "vertex_access_token",
                &self.vertex_access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
