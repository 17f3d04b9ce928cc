//! Chat-completion backends.
//!
//! A [`ChatBackend`] sends one system message plus one user turn and returns
//! the reply text.  Three wire formats are supported:
//!
//! | Backend           | Completion endpoint                          | Health check          |
//! |-------------------|----------------------------------------------|-----------------------|
//! | [`OllamaBackend`] | `POST {base}/api/chat`                       | `GET {base}/api/tags` |
//! | [`OpenAiBackend`] | `POST {base}/v1/chat/completions`            | `GET {base}/v1/models`|
//! | [`GeminiBackend`] | `POST {base}/v1beta/models/{m}:generateContent` | `GET {base}/v1beta/models/{m}` |
//!
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{LlmConfig, LlmProvider};
use crate::llm::LlmError;

// ---------------------------------------------------------------------------
// ChatBackend trait
// ---------------------------------------------------------------------------

/// One-shot chat completion.
///
/// Implementors must be `Send + Sync` so they can sit behind
/// `Arc<dyn ChatBackend>`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Send `system` + `user` and return the reply text (trimmed, non-empty).
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Check that the endpoint is reachable and credentials are accepted.
    async fn health_check(&self) -> Result<(), LlmError>;
}

#[async_trait]
impl<B: ChatBackend + ?Sized> ChatBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        (**self).complete(system, user).await
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        (**self).health_check().await
    }
}

/// Pick the backend named by `config.provider`.
///
/// Returns `Ok(None)` for [`LlmProvider::Disabled`].  Gemini without an API
/// key is an error.
pub fn backend_from_config(config: &LlmConfig) -> Result<Option<Box<dyn ChatBackend>>, LlmError> {
    let backend: Box<dyn ChatBackend> = match config.provider {
        LlmProvider::Ollama => Box::new(OllamaBackend::from_config(config)),
        LlmProvider::OpenAiCompatible => Box::new(OpenAiBackend::from_config(config)),
        LlmProvider::Gemini => Box::new(GeminiBackend::from_config(config)?),
        LlmProvider::Disabled => return Ok(None),
    };
    Ok(Some(backend))
}

/// The HTTP client is pre-configured with the per-request timeout.  A default
/// client is used if the builder fails.
fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn non_empty(text: Option<&str>) -> Result<String, LlmError> {
    let text = text.ok_or(LlmError::EmptyResponse)?.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

async fn read_json(response: reqwest::Response) -> Result<Value, LlmError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Request(format!("HTTP {status}: {}", body.trim())));
    }
    response
        .json()
        .await
        .map_err(|e| LlmError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// OllamaBackend
// ---------------------------------------------------------------------------

/// Native Ollama chat API.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaBackend {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            base_url: config.endpoint(),
            model: config.model_name().to_string(),
            temperature: config.temperature,
        }
    }
}

/// Strip an Ollama tag (`"tinyllama:latest"` → `"tinyllama"`).
fn model_stem(name: &str) -> &str {
    name.split(':').next().unwrap_or(name)
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ],
            "stream": false,
            "options": { "temperature": self.temperature }
        });

        let url = format!("{}/api/chat", self.base_url);
        let response = self.client.post(&url).json(&body).send().await?;
        let json = read_json(response).await?;

        non_empty(json["message"]["content"].as_str())
    }

    /// A missing model only warns: Ollama may pull it on first use.
    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await?;
        let json = read_json(response).await?;

        let installed: Vec<&str> = json["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().or_else(|| m["model"].as_str()))
                    .map(model_stem)
                    .collect()
            })
            .unwrap_or_default();

        if installed.contains(&model_stem(&self.model)) {
            log::info!("Ollama reachable, using model '{}'", self.model);
        } else {
            log::warn!(
                "model '{}' not found in Ollama (available: {:?}); pull it with `ollama pull {}`",
                self.model,
                installed,
                self.model
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OpenAiBackend
// ---------------------------------------------------------------------------

/// Any OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The `Authorization: Bearer …` header is attached only when an API key is
/// configured and non-empty, so local servers need no credentials.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            base_url: config.endpoint(),
            api_key: config.api_key().map(str::to_string),
            model: config.model_name().to_string(),
            temperature: config.temperature,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ],
            "stream": false,
            "temperature": self.temperature,
            "max_tokens": 256
        });

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self.authorize(self.client.post(&url).json(&body)).send().await?;
        let json = read_json(response).await?;

        non_empty(json["choices"][0]["message"]["content"].as_str())
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        read_json(response).await?;
        log::info!("OpenAI-compatible endpoint reachable, using model '{}'", self.model);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GeminiBackend
// ---------------------------------------------------------------------------

/// Google Gemini `generateContent`.
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiBackend {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key().ok_or(LlmError::MissingApiKey)?;
        Ok(Self {
            client: http_client(config.timeout_secs),
            base_url: config.endpoint(),
            api_key: api_key.to_string(),
            model: config.model_name().to_string(),
            temperature: config.temperature,
        })
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [
                { "role": "user", "parts": [{ "text": user }] }
            ],
            "generationConfig": { "temperature": self.temperature }
        });

        let url = format!("{}:generateContent", self.model_url());
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let json = read_json(response).await?;

        non_empty(json["candidates"][0]["content"]["parts"][0]["text"].as_str())
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(self.model_url())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        read_json(response).await?;
        log::info!("Gemini reachable, using model '{}'", self.model);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(provider: LlmProvider, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            api_key: api_key.map(|s| s.to_string()),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn picks_backend_from_provider() {
        let ollama = backend_from_config(&make_config(LlmProvider::Ollama, None))
            .unwrap()
            .unwrap();
        assert_eq!(ollama.name(), "ollama");

        let openai = backend_from_config(&make_config(LlmProvider::OpenAiCompatible, Some("")))
            .unwrap()
            .unwrap();
        assert_eq!(openai.name(), "openai-compatible");

        let gemini = backend_from_config(&make_config(LlmProvider::Gemini, Some("key")))
            .unwrap()
            .unwrap();
        assert_eq!(gemini.name(), "gemini");
    }

    #[test]
    fn disabled_provider_has_no_backend() {
        let backend = backend_from_config(&make_config(LlmProvider::Disabled, None)).unwrap();
        assert!(backend.is_none());
    }

    #[test]
    fn gemini_requires_api_key() {
        for key in [None, Some("")] {
            let result = backend_from_config(&make_config(LlmProvider::Gemini, key));
            assert!(matches!(result, Err(LlmError::MissingApiKey)));
        }
    }

    #[test]
    fn openai_key_only_kept_when_non_empty() {
        let backend = OpenAiBackend::from_config(&make_config(LlmProvider::OpenAiCompatible, Some("")));
        assert!(backend.api_key.is_none());

        let backend =
            OpenAiBackend::from_config(&make_config(LlmProvider::OpenAiCompatible, Some("sk-1")));
        assert_eq!(backend.api_key.as_deref(), Some("sk-1"));
    }

    #[test]
    fn gemini_without_model_uses_a_gemini_model() {
        let backend = GeminiBackend::from_config(&make_config(LlmProvider::Gemini, Some("key"))).unwrap();
        assert_eq!(backend.model, "gemini-1.5-flash");
        assert_eq!(
            backend.model_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash"
        );
    }

    #[test]
    fn model_stem_drops_tag() {
        assert_eq!(model_stem("tinyllama:latest"), "tinyllama");
        assert_eq!(model_stem("tinyllama"), "tinyllama");
    }

    #[test]
    fn empty_reply_text_is_an_error() {
        assert!(matches!(non_empty(None), Err(LlmError::EmptyResponse)));
        assert!(matches!(non_empty(Some("  \n")), Err(LlmError::EmptyResponse)));
        assert_eq!(non_empty(Some(" {} ")).unwrap(), "{}");
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_health_check() {
        let config = LlmConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            timeout_secs: 2,
            ..LlmConfig::default()
        };
        let backend = OllamaBackend::from_config(&config);
        assert!(backend.health_check().await.is_err());
    }
}
