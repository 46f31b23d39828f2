//! GeminiApiAgent - REST client for Gemini `generateContent`.
//!
//! Talks to Vertex AI (project + bearer token) or, when a `GEMINI_API_KEY`
//! is configured, to the Developer API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use tutor_core::config::SecretConfig;
use tutor_core::model::{GenerationParams, LanguageModel, ModelError};
use tutor_infrastructure::MaterializedCredentials;

use crate::auth::{AccessTokenProvider, token_provider_for};

const DEVELOPER_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Where requests go and how they authenticate.
#[derive(Clone)]
pub enum GeminiEndpoint {
    Vertex {
        project_id: String,
        location: String,
        tokens: Arc<dyn AccessTokenProvider>,
    },
    Developer {
        api_key: String,
    },
}

impl GeminiEndpoint {
    /// Chooses the Developer API when an API key is configured, Vertex AI
    /// otherwise.
    pub fn from_secrets(
        secrets: &SecretConfig,
        credentials: Option<Arc<MaterializedCredentials>>,
    ) -> Result<Self, ModelError> {
        if let Some(api_key) = secrets.api_key() {
            return Ok(GeminiEndpoint::Developer {
                api_key: api_key.to_string(),
            });
        }

        let project_id = secrets
            .project_id()
            .or_else(|| credentials.as_ref().map(|c| c.project_id()))
            .ok_or_else(|| {
                ModelError::ExecutionFailed("GCP_PROJECT_ID is not configured".to_string())
            })?
            .to_string();

        Ok(GeminiEndpoint::Vertex {
            project_id,
            location: secrets.location().to_string(),
            tokens: token_provider_for(secrets, credentials),
        })
    }

    fn url(&self, model: &str) -> String {
        match self {
            GeminiEndpoint::Vertex {
                project_id,
                location,
                ..
            } => format!(
                "{}/projects/{project_id}/locations/{location}/publishers/google/models/{model}:generateContent",
                vertex_base_url(location)
            ),
            GeminiEndpoint::Developer { .. } => {
                format!("{DEVELOPER_BASE_URL}/{model}:generateContent")
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GeminiEndpoint::Vertex { .. } => "Vertex AI",
            GeminiEndpoint::Developer { .. } => "Gemini API",
        }
    }
}

/// Regional Vertex AI base URL, e.g. `https://us-central1-aiplatform.googleapis.com/v1`.
pub fn vertex_base_url(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com/v1")
}

/// Language model backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    endpoint: GeminiEndpoint,
    model: String,
}

impl GeminiApiAgent {
    pub fn new(endpoint: GeminiEndpoint, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model: model.into(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(&self) -> &GeminiEndpoint {
        &self.endpoint
    }

    /// Confirms credentials resolve to a usable token (Vertex AI) or key.
    pub async fn check_credentials(&self) -> Result<(), ModelError> {
        match &self.endpoint {
            GeminiEndpoint::Vertex { tokens, .. } => tokens.access_token().await.map(|_| ()),
            GeminiEndpoint::Developer { api_key } if api_key.trim().is_empty() => Err(
                ModelError::ExecutionFailed("GEMINI_API_KEY is empty".to_string()),
            ),
            GeminiEndpoint::Developer { .. } => Ok(()),
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, ModelError> {
        let mut request = self.client.post(self.endpoint.url(&self.model)).json(body);
        request = match &self.endpoint {
            GeminiEndpoint::Vertex { tokens, .. } => {
                request.bearer_auth(tokens.access_token().await?)
            }
            GeminiEndpoint::Developer { api_key } => request.header("x-goog-api-key", api_key),
        };

        let label = self.endpoint.label();
        let response = request.send().await.map_err(|err| ModelError::ProcessError {
            status_code: None,
            message: format!("{label} request failed: {err}"),
            is_retryable: err.is_connect() || err.is_timeout(),
            retry_after: None,
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Failed to read {label} error body"));
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ModelError::Other(format!("Failed to parse {label} response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl LanguageModel for GeminiApiAgent {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        if prompt.trim().is_empty() {
            return Err(ModelError::ExecutionFailed("prompt is empty".to_string()));
        }
        let request = GenerateContentRequest::new(prompt, params);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(prompt: &str, params: &GenerationParams) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: params.max_output_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                response_mime_type: params.json_output.then(|| "application/json".to_string()),
            },
        }
    }
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, ModelError> {
    let candidate = response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .ok_or_else(|| {
            ModelError::ExecutionFailed("Gemini returned no response candidates".into())
        })?;

    let finish_reason = candidate.finish_reason.unwrap_or_default();
    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ModelError::ExecutionFailed(if finish_reason.is_empty() {
            "Gemini returned no text in the response candidates".to_string()
        } else {
            format!("Gemini returned no text (finish reason: {finish_reason})")
        }));
    }
    Ok(text)
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> ModelError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ModelError::ProcessError {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // Retry-After HTTP-date parsing is omitted
    None
}
