use crate::error::ApiError;
use crate::models::RetrievedChunk;
use crate::services::chroma::ChromaClient;
use crate::services::embeddings::EmbeddingClient;
use std::collections::HashMap;
use tracing::debug;

/// One retrieval round trip: embed the query text, run a nearest-neighbor
/// query against the index, return hits in ascending-distance order.
///
/// Any failure (embedding service, index, or a malformed response) surfaces
/// as `RetrievalUnavailable`; callers degrade to an empty context instead of
/// failing the request.
#[derive(Debug, Clone)]
pub struct RetrievalService {
    embeddings: EmbeddingClient,
    chroma: ChromaClient,
}

impl RetrievalService {
    pub fn new(embeddings: EmbeddingClient, chroma: ChromaClient) -> Self {
        Self { embeddings, chroma }
    }

    pub async fn retrieve(
        &self,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, ApiError> {
        let vectors = self
            .embeddings
            .embed(&[query_text.to_string()])
            .await
            .map_err(|e| ApiError::RetrievalUnavailable(e.to_string()))?;
        let embedding = vectors
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::RetrievalUnavailable("empty embedding response".into()))?;

        let response = self
            .chroma
            .query(embedding, top_k)
            .await
            .map_err(|e| ApiError::RetrievalUnavailable(e.to_string()))?;

        let documents = response
            .documents
            .and_then(|mut d| (!d.is_empty()).then(|| d.remove(0)))
            .ok_or_else(|| ApiError::RetrievalUnavailable("no documents in response".into()))?;
        let metadatas = response
            .metadatas
            .and_then(|mut m| (!m.is_empty()).then(|| m.remove(0)))
            .unwrap_or_default();
        let distances = response
            .distances
            .and_then(|mut d| (!d.is_empty()).then(|| d.remove(0)))
            .unwrap_or_default();

        if !distances.is_empty() && distances.len() != documents.len() {
            return Err(ApiError::RetrievalUnavailable(
                "misaligned query response".into(),
            ));
        }

        let chunks: Vec<RetrievedChunk> = documents
            .into_iter()
            .enumerate()
            .map(|(i, text)| RetrievedChunk {
                text,
                metadata: metadatas
                    .get(i)
                    .and_then(|m| m.as_ref())
                    .map(flatten_metadata)
                    .unwrap_or_default(),
                distance: distances.get(i).copied().unwrap_or(1.0),
            })
            .collect();

        debug!(
            "Retrieved {} chunks for query '{}' (top_k={})",
            chunks.len(),
            query_text,
            top_k
        );

        Ok(chunks)
    }
}

/// The index stores heterogeneous metadata values; the engine only consumes
/// them as strings.
fn flatten_metadata(raw: &HashMap<String, serde_json::Value>) -> HashMap<String, String> {
    raw.iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k.clone(), s.clone())),
            serde_json::Value::Null => None,
            other => Some((k.clone(), other.to_string())),
        })
        .collect()
}
