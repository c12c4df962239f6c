use super::{ChatMessage, LLMConfig, LLMProvider, LLMResponse, LLM};
use crate::error::{ProviderError, ProviderResult};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

fn build_client(config: &LLMConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()?)
}

/// Send a JSON request and decode the JSON reply, mapping every failure
/// to a [`ProviderError`] tagged with `provider`.
async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> ProviderResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::transport(provider, e))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!("{} API error {}: {}", provider, status, text);
        return Err(ProviderError::status(provider, status));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::decode(provider, e.to_string()))
}

/// OpenAI-compatible chat completion shapes, shared by LMStudio and OpenAI
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    total_tokens: u32,
}

impl ChatCompletionResponse {
    fn into_llm_response(self, provider: &'static str) -> ProviderResult<LLMResponse> {
        let tokens_used = self.usage.map(|u| u.total_tokens);
        let content = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::decode(provider, "no choices in response"))?
            .message
            .content;

        Ok(LLMResponse { content, tokens_used })
    }
}

/// LMStudio provider implementation
pub struct LMStudioProvider {
    config: LLMConfig,
    client: Client,
}

impl LMStudioProvider {
    const NAME: &'static str = "lmstudio";

    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LLM for LMStudioProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> ProviderResult<LLMResponse> {
        let endpoint = self
            .config
            .endpoint
            .as_ref()
            .ok_or_else(|| ProviderError::not_configured(Self::NAME, "endpoint missing"))?;

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to LMStudio at {}", endpoint);

        let response: ChatCompletionResponse =
            send_json(Self::NAME, self.client.post(endpoint).json(&request)).await?;
        response.into_llm_response(Self::NAME)
    }

    async fn is_available(&self) -> bool {
        let endpoint = match &self.config.endpoint {
            Some(ep) => ep,
            None => return false,
        };

        let models_endpoint = endpoint.replace("/chat/completions", "/models");

        match self.client.get(&models_endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    config: LLMConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: u32,
}

impl GeminiProvider {
    const NAME: &'static str = "gemini";

    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("Gemini API key required"));
        }

        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    fn to_request(&self, messages: Vec<ChatMessage>) -> GeminiRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in messages {
            if msg.role == "system" {
                system_parts.push(GeminiPart { text: msg.content });
            } else {
                let role = if msg.role == "assistant" { "model" } else { "user" };
                contents.push(GeminiContent {
                    role: Some(role.to_string()),
                    parts: vec![GeminiPart { text: msg.content }],
                });
            }
        }

        GeminiRequest {
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(GeminiContent { role: None, parts: system_parts })
            },
            contents,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        }
    }
}

#[async_trait]
impl LLM for GeminiProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> ProviderResult<LLMResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::not_configured(Self::NAME, "API key missing"))?;

        let request = self.to_request(messages);
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.config.model
        );

        debug!("Sending request to Gemini API");

        let response: GeminiResponse = send_json(
            Self::NAME,
            self.client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&request),
        )
        .await?;

        let tokens_used = response.usage_metadata.map(|u| u.total_token_count);
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ProviderError::decode(Self::NAME, "no candidates in response"))?;

        Ok(LLMResponse { content, tokens_used })
    }

    async fn is_available(&self) -> bool {
        let Some(api_key) = &self.config.api_key else {
            return false;
        };

        match self
            .client
            .get("https://generativelanguage.googleapis.com/v1beta/models")
            .header("x-goog-api-key", api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::Gemini
    }
}

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: LLMConfig,
    client: Client,
}

impl OpenAIProvider {
    const NAME: &'static str = "openai";

    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("OpenAI API key required"));
        }

        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> &str {
        self.config
            .endpoint
            .as_deref()
            .filter(|ep| ep.contains("openai.com"))
            .unwrap_or("https://api.openai.com/v1/chat/completions")
    }
}

#[async_trait]
impl LLM for OpenAIProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> ProviderResult<LLMResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::not_configured(Self::NAME, "API key missing"))?;

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to OpenAI API");

        let response: ChatCompletionResponse = send_json(
            Self::NAME,
            self.client
                .post(self.endpoint())
                .bearer_auth(api_key)
                .json(&request),
        )
        .await?;
        response.into_llm_response(Self::NAME)
    }

    async fn is_available(&self) -> bool {
        let Some(api_key) = &self.config.api_key else {
            return false;
        };

        match self
            .client
            .get("https://api.openai.com/v1/models")
            .bearer_auth(api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}
