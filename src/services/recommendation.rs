use crate::error::ApiError;
use crate::models::{
    ChatContext, ChatRequest, ChatResponse, RecommendedProduct, RetrievedChunk, SkinAnalysis,
    SkinAnalysisResponse,
};
use crate::services::analysis_parser::parse_analysis;
use crate::services::completion::CompletionClient;
use crate::services::context::ContextAggregator;
use crate::services::fallback::rule_based_reply;
use crate::services::prompt::{build_prompt, SYSTEM_PROMPT, VISION_PROMPT};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::warn;
use uuid::Uuid;

/// Context entries fetched and kept for a chat request.
const CHAT_CONTEXT_K: usize = 5;
/// Per-query hits and total cap for the image-analysis retrieval.
const ANALYSIS_PER_QUERY_K: usize = 3;
const ANALYSIS_MAX_TOTAL: usize = 5;

/// Orchestrates a request end to end: retrieve context, call the completion
/// service, post-process. Every external-call failure has exactly one
/// fallback path and nothing is retried.
#[derive(Clone)]
pub struct RecommendationService {
    aggregator: ContextAggregator,
    completion: CompletionClient,
}

impl RecommendationService {
    pub fn new(aggregator: ContextAggregator, completion: CompletionClient) -> Self {
        Self {
            aggregator,
            completion,
        }
    }

    /// Chat path: RAG context, model reply (or rule-based fallback), product
    /// suggestions extracted from the retrieved context.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ApiError::InvalidInput("Message cannot be empty".to_string()));
        }

        let context = request.context.clone().unwrap_or_default();

        let aggregated = self
            .aggregator
            .aggregate(&[message.to_string()], CHAT_CONTEXT_K, CHAT_CONTEXT_K)
            .await;
        if aggregated.is_degraded() {
            warn!("Serving chat with empty retrieval context");
        }
        let chunks = aggregated.value();

        let response_text = if self.completion.is_configured() {
            let prompt = build_prompt(SYSTEM_PROMPT, &request.history, chunks, message);
            match self.completion.chat(&prompt, 0.7, 800).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Completion failed, falling back to rule-based reply: {}", e);
                    rule_based_reply(message, &context)
                }
            }
        } else {
            rule_based_reply(message, &context)
        };

        Ok(ChatResponse {
            message_id: Uuid::new_v4().to_string(),
            response: response_text,
            suggested_products: extract_product_names(chunks),
            follow_up_questions: follow_up_questions(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Image path: vision analysis, structured parse, retrieval against the
    /// derived queries, product assembly. The vision call has no meaningful
    /// fallback, so its failure surfaces as `CompletionUnavailable`.
    pub async fn analyze_skin(
        &self,
        image_bytes: &[u8],
        additional_info: Option<&str>,
    ) -> Result<SkinAnalysisResponse, ApiError> {
        if !self.completion.is_configured() {
            return Err(ApiError::CompletionUnavailable(
                "OpenAI API is not configured".to_string(),
            ));
        }

        let mut prompt = VISION_PROMPT.to_string();
        if let Some(info) = additional_info {
            prompt.push_str(&format!("\n\n用户补充信息: {}", info));
        }

        let encoded = BASE64.encode(image_bytes);
        let raw_text = self
            .completion
            .analyze_image(&prompt, &encoded, 1000)
            .await
            .map_err(|e| ApiError::CompletionUnavailable(e.to_string()))?;

        let analysis = parse_analysis(&raw_text);

        let queries = build_search_queries(&analysis);
        let aggregated = self
            .aggregator
            .aggregate(&queries, ANALYSIS_PER_QUERY_K, ANALYSIS_MAX_TOTAL)
            .await;
        if aggregated.is_degraded() {
            warn!("Serving skin analysis with partial retrieval context");
        }
        let recommended_products = to_recommended_products(aggregated.value());

        Ok(SkinAnalysisResponse {
            analysis: analysis.raw_text,
            skin_type: analysis.skin_type,
            concerns: analysis.concerns,
            recommendations: analysis.recommendations,
            recommended_products,
        })
    }
}

fn follow_up_questions() -> Vec<String> {
    vec![
        "您想了解这些产品的具体成分吗？".to_string(),
        "需要我推荐其他类型的护肤品吗？".to_string(),
        "您有其他肌肤问题需要咨询吗？".to_string(),
    ]
}

/// Search queries derived from a parsed analysis: a skin-type query, the
/// first two concerns, the first two keywords. Defaults keep the image path
/// useful even when the parse came back empty.
pub fn build_search_queries(analysis: &SkinAnalysis) -> Vec<String> {
    let mut queries = Vec::new();

    if let Some(skin_type) = &analysis.skin_type {
        queries.push(format!("{} skin products", skin_type));
    }
    for concern in analysis.concerns.iter().take(2) {
        queries.push(concern.clone());
    }
    for keyword in analysis.search_keywords.iter().take(2) {
        queries.push(keyword.clone());
    }

    if queries.is_empty() {
        queries = vec![
            "facial moisturizer".to_string(),
            "hydrating serum".to_string(),
        ];
    }

    queries
}

/// Product names surfaced alongside a chat reply: product metadata first,
/// then a short text preview as a last resort. Capped at 3.
pub fn extract_product_names(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut products: Vec<String> = Vec::new();

    for chunk in chunks.iter().take(5) {
        let name = chunk
            .metadata
            .get("product_name")
            .or_else(|| chunk.metadata.get("book"))
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        match name {
            Some(name) => {
                if !products.contains(&name) {
                    products.push(name);
                }
            }
            None => {
                let preview: String = chunk.text.trim().chars().take(50).collect();
                if !preview.is_empty() && !products.contains(&preview) {
                    products.push(preview);
                }
            }
        }
    }

    products.truncate(3);
    products
}

/// Map aggregated chunks onto the recommended-product payload of the image
/// path. Chunks without a product identity are dropped.
pub fn to_recommended_products(chunks: &[RetrievedChunk]) -> Vec<RecommendedProduct> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let name = chunk
                .metadata
                .get("product_name")
                .or_else(|| chunk.metadata.get("book"))
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())?;

            Some(RecommendedProduct {
                name,
                brand: chunk.metadata.get("brand").cloned().unwrap_or_default(),
                category: chunk.metadata.get("category").cloned().unwrap_or_default(),
                description: chunk.text.chars().take(200).collect(),
                amazon_url: chunk
                    .metadata
                    .get("amazon_url")
                    .cloned()
                    .unwrap_or_default(),
                ewg_url: chunk.metadata.get("ewg_url").cloned().unwrap_or_default(),
                relevance: (chunk.relevance() * 1000.0).round() / 1000.0,
            })
        })
        .collect()
}
