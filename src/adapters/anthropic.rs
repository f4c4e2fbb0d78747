//! Anthropic Messages API client. One request per call, no retries.
use crate::domain::model::CredentialKind;
use crate::domain::ports::{ConfigProvider, CredentialProvider, LanguageModel};
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const MESSAGES_PATH: &str = "/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct AnthropicClient<K: CredentialProvider> {
    client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    credentials: K,
}

impl<K: CredentialProvider> AnthropicClient<K> {
    pub fn new<C: ConfigProvider>(config: &C, credentials: K) -> Result<Self> {
        let client = Client::builder().timeout(config.model_timeout()).build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}{}",
                config.model_base_url().trim_end_matches('/'),
                MESSAGES_PATH
            ),
            model: config.model_name().to_string(),
            max_tokens: config.max_tokens(),
            credentials,
        })
    }
}

#[async_trait]
impl<K: CredentialProvider> LanguageModel for AnthropicClient<K> {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let kind = CredentialKind::Anthropic;
        let api_key = self
            .credentials
            .credential(kind)
            .ok_or_else(|| LookupError::auth(kind.service_name()))?;

        let request_body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!("Calling {} with model {}", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-dangerous-direct-browser-access", "true")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            return Err(LookupError::UpstreamError {
                service: kind.service_name().to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let reply: MessagesResponse = response.json().await?;
        let text = reply
            .content
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .unwrap_or_default();

        if text.is_empty() {
            tracing::warn!("Model reply had no text content");
        }
        Ok(text)
    }
}
