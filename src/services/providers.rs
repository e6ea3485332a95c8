// Completion Provider Service
// Optional text-completion collaborator used for insight enrichment

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use thiserror::Error;

use super::config_store::{ConfigStore, ProviderConfig};

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

/// An opaque prompt -> text function.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
}

const ENRICHMENT_SYSTEM_PROMPT: &str =
    "You analyze passages of a reference document for an educational writer. Reply with a single JSON object only.";

/// OpenAI-compatible chat completions client.
pub struct ProviderClient {
    client: Client,
    name: String,
    url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(80))
            .build()
            .unwrap_or_default();
        Self::from_parts(client, config, api_key)
    }

    pub fn with_proxy(config: &ProviderConfig, api_key: &str, proxy_url: &str) -> Result<Self, ProviderError> {
        let proxy = reqwest::Proxy::all(proxy_url)?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(80))
            .proxy(proxy)
            .build()?;
        Ok(Self::from_parts(client, config, api_key))
    }

    fn from_parts(client: Client, config: &ProviderConfig, api_key: &str) -> Self {
        let url = config
            .base_url
            .clone()
            .or_else(|| env::var("SYNTHPOST_API_URL").ok())
            .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());
        Self {
            client,
            name: config.name.clone(),
            url,
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: api_key.to_string(),
            max_tokens: config.max_tokens,
        }
    }

    /// Client for `config`, routed through its proxy when one is set.
    pub fn connect(config: &ProviderConfig, api_key: &str) -> Result<Self, ProviderError> {
        match config.proxy_url.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(proxy_url) => Self::with_proxy(config, api_key, proxy_url),
            None => Ok(Self::new(config, api_key)),
        }
    }

    /// Build a client from config, resolving the key from env or the config file.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = get_api_key(&config.name).ok_or(ProviderError::MissingApiKey)?;
        Self::connect(config, &api_key)
    }

    pub async fn call_chat_api(
        &self,
        system: &str,
        user: &str,
        use_json_format: bool,
    ) -> Result<ChatResult, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.3,
            response_format: use_json_format.then(|| ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = data
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::MissingContent)?;

        tracing::debug!(provider = %self.name, latency_ms, "provider.completed");

        Ok(ChatResult { content, latency_ms })
    }
}

#[async_trait]
impl CompletionProvider for ProviderClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let result = self.call_chat_api(ENRICHMENT_SYSTEM_PROMPT, prompt, true).await?;
        Ok(result.content)
    }
}

/// Canned provider for offline runs and tests.
pub struct MockProvider {
    reply: Option<String>,
    call_count: AtomicU32,
}

impl MockProvider {
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Every call fails with `MissingContent`.
    pub fn failing() -> Self {
        Self {
            reply: None,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(ProviderError::MissingContent)
    }
}

/// Cut the outermost JSON object out of a model reply.
pub fn extract_json(content: &str) -> String {
    let trimmed = content.trim();
    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if end > start {
                return trimmed[start..=end].to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Get API key from environment or config file
pub fn get_api_key(provider: &str) -> Option<String> {
    let mut env_keys = vec!["SYNTHPOST_API_KEY"];
    if provider == "openai" {
        env_keys.push("OPENAI_API_KEY");
    }

    for key in env_keys {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    if let Some(config_dir) = ConfigStore::default_config_dir() {
        let store = ConfigStore::new(config_dir);
        if let Ok(Some(key)) = store.get_api_key(provider) {
            return Some(key);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_config() -> ProviderConfig {
        ProviderConfig {
            name: "openai".to_string(),
            model: None,
            base_url: Some("http://localhost:9/v1/chat/completions".to_string()),
            proxy_url: None,
            max_tokens: 256,
        }
    }

    #[test]
    fn test_provider_client_creation() {
        let client = ProviderClient::new(&provider_config(), "sk-test");
        assert_eq!(client.url, "http://localhost:9/v1/chat/completions");
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(CompletionProvider::name(&client), "openai");
    }

    #[test]
    fn test_connect_uses_configured_proxy() {
        let direct = ProviderClient::connect(&provider_config(), "sk-test").unwrap();
        assert_eq!(direct.url, "http://localhost:9/v1/chat/completions");

        let mut config = provider_config();
        config.proxy_url = Some("http://127.0.0.1:3128".to_string());
        let proxied = ProviderClient::connect(&config, "sk-test").unwrap();
        assert_eq!(proxied.url, "http://localhost:9/v1/chat/completions");
        assert_eq!(proxied.max_tokens, 256);

        config.proxy_url = Some("   ".to_string());
        assert!(ProviderClient::connect(&config, "sk-test").is_ok());
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json("Sure! {\"a\": [1]} hope that helps"), "{\"a\": [1]}");
        assert_eq!(extract_json("  no json here "), "no json here");
        assert_eq!(extract_json("} backwards {"), "} backwards {");
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let ok = MockProvider::with_reply("{}");
        assert_eq!(ok.complete("prompt").await.unwrap(), "{}");
        assert_eq!(ok.call_count(), 1);

        let failing = MockProvider::failing();
        assert!(matches!(failing.complete("prompt").await, Err(ProviderError::MissingContent)));
    }
}
