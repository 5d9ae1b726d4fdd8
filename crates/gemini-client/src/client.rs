use async_trait::async_trait;
use protocol::config::ModelConfig;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::{Duration, Instant};

use crate::error::GeminiError;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn ensure_credentials(&self) -> Result<(), GeminiError>;

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError>;
}

pub struct GeminiClient {
    config: ModelConfig,
    api_key: Option<String>,
    http_client: Client,
}

impl GeminiClient {
    pub fn new(config: ModelConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env).ok();
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: ModelConfig, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let http_client = match build_http_client(Duration::from_secs(config.timeout_secs)) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(
                    event = "http_client_fallback",
                    error = %err,
                    "reqwest build failed; using default client"
                );
                Client::new()
            }
        };
        Self {
            config,
            api_key,
            http_client,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> Result<String, GeminiError> {
        if self.config.model.trim().is_empty() {
            return Err(GeminiError::InvalidUrl("model is empty".to_string()));
        }
        join_base_path(
            &self.config.base_url,
            &format!("/v1beta/models/{}:generateContent", self.config.model.trim()),
        )
    }

    fn api_key(&self) -> Result<&str, GeminiError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GeminiError::MissingApiKey {
                env: self.config.api_key_env.clone(),
            })
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    fn ensure_credentials(&self) -> Result<(), GeminiError> {
        self.api_key().map(|_| ())
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let api_key = self.api_key()?;
        let url = self.endpoint()?;
        tracing::debug!(
            event = "model_request",
            url = %url,
            model = %self.config.model,
            contents = request.contents.len(),
            structured = request.generation_config.is_some(),
        );

        let started = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .header("User-Agent", "cyberguard")
            .json(request)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(
                    event = "model_transport_error",
                    is_timeout = err.is_timeout(),
                    is_connect = err.is_connect(),
                    error = %err,
                );
                GeminiError::Transport(err)
            })?;

        let status = response.status();
        let body = response.text().await?;
        tracing::info!(
            event = "model_response",
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            body_len = body.len(),
        );

        if !status.is_success() {
            let preview: String = body.chars().take(1024).collect();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn join_base_path(base: &str, path: &str) -> Result<String, GeminiError> {
    let base = base.trim();
    if base.is_empty() {
        return Err(GeminiError::InvalidUrl("base_url is empty".to_string()));
    }
    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(GeminiError::InvalidUrl(format!(
            "base_url must start with http:// or https://: {base}"
        )));
    }
    let normalized_base = base.trim_end_matches('/');
    let normalized_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    Ok(format!("{normalized_base}{normalized_path}"))
}

fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .redirect(Policy::none())
        .timeout(timeout)
        .build()
}
