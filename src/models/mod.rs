pub mod analysis;
pub mod chat;
pub mod product;
pub mod search;

pub use analysis::{RecommendedProduct, SkinAnalysis, SkinAnalysisResponse};
pub use chat::{ChatContext, ChatRequest, ChatResponse, ConversationTurn, Role};
pub use product::{Budget, Ingredients, Product, RecommendationCriteria, ScoredProduct};
pub use search::{RetrievedChunk, SearchResponse, SearchResult};
