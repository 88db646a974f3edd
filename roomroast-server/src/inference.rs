//! A small client for the Ollama HTTP API.
//!
//! Only the two endpoints the service needs are covered: one-shot
//! `/api/generate` (with or without images) and `/api/tags` for the status probe.

use anyhow::Context;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::InferenceConfig;

#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    /// The server answered, but not with a success status. Carries its body verbatim.
    #[error("{body}")]
    Status { status: StatusCode, body: String },
    /// The server could not be reached, or the call timed out.
    #[error("{0}")]
    Transport(reqwest::Error),
    /// The server answered 2xx with something we could not read.
    #[error("Unexpected reply from inference server: {0}")]
    Decode(reqwest::Error),
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            InferenceError::Decode(e)
        } else {
            InferenceError::Transport(e)
        }
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<&'a str>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

impl<'a> GenerateRequest<'a> {
    /// A non-streaming request with no images and default sampling.
    pub fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            prompt,
            images: vec![],
            stream: false,
            options: None,
        }
    }

    pub fn with_image(mut self, base64_image: &'a str) -> Self {
        self.images.push(base64_image);
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(config: &InferenceConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Building inference HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one non-streaming generation and return the `response` text.
    pub async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, InferenceError> {
        let resp = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(InferenceError::Transport)?;
        let resp = Self::check_status(resp).await?;
        let reply: GenerateResponse = resp.json().await?;
        Ok(reply.response)
    }

    /// Names of the models installed on the inference server.
    pub async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let resp = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(InferenceError::Transport)?;
        let resp = Self::check_status(resp).await?;
        let tags: TagsResponse = resp.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, InferenceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.map_err(InferenceError::Transport)?;
        let body = if body.is_empty() {
            status.to_string()
        } else {
            body
        };
        Err(InferenceError::Status { status, body })
    }
}
