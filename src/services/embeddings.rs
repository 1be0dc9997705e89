use anyhow::Result;
use reqwest::{header::HeaderMap, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the remote embedding generator (OpenAI embeddings API).
/// Every query embedding is requested at a fixed dimensionality so vectors
/// stay compatible with the index built by the reload CLI.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        dimensions: usize,
        timeout_secs: u64,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {}", api_key).parse()?);
        headers.insert("Content-Type", "application/json".parse()?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Generate one embedding vector per input text.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Embedding request failed: {}", error_text);
        }

        let body: EmbeddingResponse = response.json().await?;
        if body.data.len() != texts.len() {
            anyhow::bail!(
                "Embedding response length mismatch: expected {}, got {}",
                texts.len(),
                body.data.len()
            );
        }

        for data in &body.data {
            if data.embedding.len() != self.dimensions {
                anyhow::bail!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimensions,
                    data.embedding.len()
                );
            }
        }

        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}
