//! Language-model seam.
//!
//! The pipeline talks to the hosted model through [`LanguageModel`]: one
//! prompt plus generation parameters in, raw text out.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    /// Ask the endpoint for `application/json` output.
    pub json_output: bool,
}

impl GenerationParams {
    /// Parameters for the given zero-based attempt. Retries sample slightly
    /// colder.
    pub fn for_attempt(attempt: u32) -> Self {
        Self {
            temperature: if attempt == 0 { 0.65 } else { 0.5 },
            ..Self::default()
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 8192,
            temperature: 0.65,
            top_p: 0.95,
            top_k: 40,
            json_output: true,
        }
    }
}

/// Failure of a single model call.
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// The endpoint answered with an error or the request never completed.
    #[error("Model request failed: {message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The call could not be made (missing credentials, empty prompt, ...).
    #[error("Model execution failed: {0}")]
    ExecutionFailed(String),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProcessError {
                is_retryable: true,
                ..
            }
        )
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, params: &GenerationParams)
    -> Result<String, ModelError>;
}
