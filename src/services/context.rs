use crate::error::Degradable;
use crate::models::RetrievedChunk;
use crate::services::retrieval::RetrievalService;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Hard cap on semantic queries per request; extra queries are dropped,
/// earliest-first priority.
pub const MAX_QUERIES: usize = 3;

/// Merges hits from up to [`MAX_QUERIES`] semantic queries into one ordered,
/// deduplicated context list.
#[derive(Clone)]
pub struct ContextAggregator {
    retrieval: Arc<RetrievalService>,
}

impl ContextAggregator {
    pub fn new(retrieval: Arc<RetrievalService>) -> Self {
        Self { retrieval }
    }

    /// Run the per-query retrievals (concurrently; they share no state) and
    /// merge the result sets in caller-supplied query order, so earlier
    /// queries win dedup conflicts even when calls complete out of order.
    ///
    /// A query whose retrieval fails contributes nothing and marks the
    /// aggregate as degraded; the request itself carries on.
    pub async fn aggregate(
        &self,
        query_texts: &[String],
        per_query_k: usize,
        max_total: usize,
    ) -> Degradable<Vec<RetrievedChunk>> {
        let queries = &query_texts[..query_texts.len().min(MAX_QUERIES)];

        let results = join_all(
            queries
                .iter()
                .map(|q| self.retrieval.retrieve(q, per_query_k)),
        )
        .await;

        let mut failures = Vec::new();
        let mut per_query = Vec::with_capacity(results.len());
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(chunks) => per_query.push(chunks),
                Err(e) => {
                    warn!("Retrieval failed for query '{}': {}", query, e);
                    failures.push(e.to_string());
                }
            }
        }

        let merged = merge_chunks(per_query, max_total);

        if failures.is_empty() {
            Degradable::Full(merged)
        } else {
            Degradable::Degraded(merged, failures.join("; "))
        }
    }
}

/// Merge per-query result sets: dedup by product key with first occurrence
/// winning (result sets are visited in query order), then rank the merged set
/// by descending relevance and truncate.
pub fn merge_chunks(per_query: Vec<Vec<RetrievedChunk>>, max_total: usize) -> Vec<RetrievedChunk> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for chunks in per_query {
        for chunk in chunks {
            let key = product_key(&chunk);
            if seen.insert(key) {
                merged.push(chunk);
            }
        }
    }

    merged.sort_by(|a, b| {
        b.relevance()
            .partial_cmp(&a.relevance())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(max_total);
    merged
}

/// Derived identity used to dedup chunks belonging to the same catalog item:
/// first non-empty of `product_name`, `book`, then a normalized text prefix.
/// Heuristic by nature; kept as one pure function so the fallback order can
/// be revised in isolation.
pub fn product_key(chunk: &RetrievedChunk) -> String {
    for field in ["product_name", "book"] {
        if let Some(value) = chunk.metadata.get(field) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    chunk
        .text
        .trim()
        .chars()
        .take(50)
        .collect::<String>()
        .to_lowercase()
}
