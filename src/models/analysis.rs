use serde::{Deserialize, Serialize};

/// Typed view of a model-generated skin analysis. Built by the line parser on
/// a best-effort basis: fields stay empty when the text has no matching
/// section, the parser itself never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinAnalysis {
    pub raw_text: String,
    pub skin_type: Option<String>,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
    pub search_keywords: Vec<String>,
}

/// A product surfaced from the vector index for the image-analysis path.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedProduct {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub amazon_url: String,
    pub ewg_url: String,
    pub relevance: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkinAnalysisResponse {
    pub analysis: String,
    pub skin_type: Option<String>,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
    pub recommended_products: Vec<RecommendedProduct>,
}
