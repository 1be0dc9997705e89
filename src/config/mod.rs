use std::env;

/// Runtime configuration, loaded once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,

    /// Optional: the service boots without a key and serves rule-based
    /// fallback responses instead of model completions.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,

    pub chromadb_host: String,
    pub chromadb_port: u16,
    pub chroma_collection: String,

    pub retrieval_timeout_secs: u64,
    pub completion_timeout_secs: u64,

    /// Optional path to a product catalog JSON file; the built-in catalog is
    /// used when unset.
    pub products_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            embedding_dimensions: env::var("EMBEDDING_DIMENSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1536),
            chromadb_host: env::var("CHROMADB_HOST").unwrap_or_else(|_| "chromadb".to_string()),
            chromadb_port: env::var("CHROMADB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            chroma_collection: env::var("CHROMA_COLLECTION")
                .unwrap_or_else(|_| "char-split-collection".to_string()),
            retrieval_timeout_secs: env::var("RETRIEVAL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            completion_timeout_secs: env::var("COMPLETION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            products_path: env::var("PRODUCTS_PATH").ok(),
        }
    }

    pub fn chromadb_url(&self) -> String {
        format!("http://{}:{}", self.chromadb_host, self.chromadb_port)
    }
}
