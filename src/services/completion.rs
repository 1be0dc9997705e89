use crate::models::{ConversationTurn, Role};
use anyhow::Result;
use reqwest::{header::HeaderMap, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the chat/vision completion service (OpenAI-compatible API).
///
/// Constructed once at startup; an instance without an API key reports
/// itself unconfigured and callers take their fallback path instead.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    model: String,
    configured: bool,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: Role,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl CompletionClient {
    pub fn new(
        api_key: Option<&str>,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert("Authorization", format!("Bearer {}", key).parse()?);
        }
        headers.insert("Content-Type", "application/json".parse()?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            configured: api_key.is_some(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Text completion over an assembled conversation.
    pub async fn chat(
        &self,
        messages: &[ConversationTurn],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|turn| ApiMessage {
                    role: turn.role,
                    content: MessageContent::Text(turn.content.clone()),
                })
                .collect(),
            temperature: Some(temperature),
            max_tokens,
        };

        self.complete(request).await
    }

    /// Vision completion: one user turn carrying the prompt text and the
    /// image as a base64 data URI.
    pub async fn analyze_image(
        &self,
        prompt: &str,
        base64_image: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: Role::User,
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{}", base64_image),
                        },
                    },
                ]),
            }],
            temperature: None,
            max_tokens,
        };

        self.complete(request).await
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Completion request failed: {}", error_text);
        }

        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("Completion response had no choices"))
    }
}
