pub mod analysis_parser;
pub mod catalog;
pub mod chroma;
pub mod completion;
pub mod context;
pub mod embeddings;
pub mod fallback;
pub mod prompt;
pub mod recommendation;
pub mod retrieval;

// Re-export public types
pub use catalog::ProductCatalog;
pub use chroma::ChromaClient;
pub use completion::CompletionClient;
pub use context::ContextAggregator;
pub use embeddings::EmbeddingClient;
pub use recommendation::RecommendationService;
pub use retrieval::RetrievalService;
