use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stored unit of text returned by the vector index, with its metadata and
/// cosine distance (0 = identical, up to 2 = opposite).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub distance: f32,
}

impl RetrievedChunk {
    /// Similarity proxy used for ranking: `1 - cosine_distance`.
    pub fn relevance(&self) -> f32 {
        1.0 - self.distance
    }
}

/// One formatted hit of the `/api/search` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: String,
    pub metadata: HashMap<String, String>,
    pub distance: f32,
    pub image_url: String,
    pub product_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<SearchResult>,
}
