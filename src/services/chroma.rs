use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client for a ChromaDB collection. Each call is a self-contained
/// request/response with no client-side session state, so one instance is
/// safely shared across requests.
#[derive(Debug, Clone)]
pub struct ChromaClient {
    client: Client,
    base_url: String,
    collection: String,
}

#[derive(Debug, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    metadata: HashMap<String, serde_json::Value>,
    get_or_create: bool,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest {
    pub query_embeddings: Vec<Vec<f32>>,
    pub n_results: usize,
    pub include: Vec<String>,
}

/// Query response: outer lists have one entry per query embedding, inner
/// lists are aligned by position.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub documents: Option<Vec<Vec<String>>>,
    pub metadatas: Option<Vec<Vec<Option<HashMap<String, serde_json::Value>>>>>,
    pub distances: Option<Vec<Vec<f32>>>,
}

#[derive(Debug, Serialize)]
pub struct AddRequest {
    pub ids: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
    pub metadatas: Vec<HashMap<String, String>>,
}

impl ChromaClient {
    pub fn new(base_url: &str, collection: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Collections are addressed by id in the HTTP API; resolve the
    /// configured name on each call so the client itself stays stateless.
    async fn collection_id(&self) -> Result<String> {
        let response = self
            .client
            .get(format!(
                "{}/api/v1/collections/{}",
                self.base_url, self.collection
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Failed to resolve collection: {}", error_text);
        }

        let collection: Collection = response.json().await?;
        Ok(collection.id)
    }

    /// Nearest-neighbor query for a single embedding, returning documents,
    /// metadatas and distances in the index's native ascending-distance order.
    pub async fn query(&self, embedding: Vec<f32>, n_results: usize) -> Result<QueryResponse> {
        let collection_id = self.collection_id().await?;
        let request = QueryRequest {
            query_embeddings: vec![embedding],
            n_results,
            include: vec![
                "documents".to_string(),
                "metadatas".to_string(),
                "distances".to_string(),
            ],
        };

        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{}/query",
                self.base_url, collection_id
            ))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Chroma query failed: {}", error_text);
        }

        Ok(response.json().await?)
    }

    /// Recreate the collection from scratch with cosine distance. Used by the
    /// reload CLI; the missing-collection error on first run is ignored.
    pub async fn recreate_collection(&self) -> Result<String> {
        let delete = self
            .client
            .delete(format!(
                "{}/api/v1/collections/{}",
                self.base_url, self.collection
            ))
            .send()
            .await?;
        if delete.status().is_success() {
            log::info!("Deleted existing collection {}", self.collection);
        } else {
            log::info!("No existing collection to delete");
        }

        let mut metadata = HashMap::new();
        metadata.insert("hnsw:space".to_string(), serde_json::json!("cosine"));

        let request = CreateCollectionRequest {
            name: &self.collection,
            metadata,
            get_or_create: false,
        };

        let response = self
            .client
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Failed to create collection: {}", error_text);
        }

        let collection: Collection = response.json().await?;
        Ok(collection.id)
    }

    /// Batch upsert. Ids must be unique within the collection; re-adding an
    /// existing id overwrites it.
    pub async fn add(&self, collection_id: &str, request: &AddRequest) -> Result<()> {
        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{}/add",
                self.base_url, collection_id
            ))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Chroma add failed: {}", error_text);
        }

        Ok(())
    }

    pub async fn count(&self, collection_id: &str) -> Result<usize> {
        let response = self
            .client
            .get(format!(
                "{}/api/v1/collections/{}/count",
                self.base_url, collection_id
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Chroma count failed: {}", error_text);
        }

        Ok(response.json().await?)
    }
}
