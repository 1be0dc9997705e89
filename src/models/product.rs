use serde::{Deserialize, Serialize};

/// Static catalog entry. Loaded once at startup and treated as immutable for
/// the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub price: f32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub skin_types: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub ingredients: Ingredients,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ingredients {
    #[serde(default)]
    pub active: Vec<String>,
    #[serde(default)]
    pub full_list: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Price band for the budget hard filter. The medium and high bands overlap
/// (30..=50 satisfies both); this mirrors the documented product behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    Medium,
    High,
}

impl Default for Budget {
    fn default() -> Self {
        Budget::Medium
    }
}

impl Budget {
    pub fn allows(&self, price: f32) -> bool {
        match self {
            Budget::Low => price <= 20.0,
            Budget::Medium => (10.0..=50.0).contains(&price),
            Budget::High => price >= 30.0,
        }
    }
}

/// Structured user criteria supplied per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationCriteria {
    #[serde(default)]
    pub analysis_id: Option<String>,
    pub skin_type: String,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub preferences: Vec<String>,
}

/// A catalog product that survived the hard filters, with its weighted match
/// score and a templated explanation. Created fresh per request.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    pub match_score: f32,
    pub why_recommended: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_bands_overlap_between_medium_and_high() {
        assert!(Budget::Medium.allows(40.0));
        assert!(Budget::High.allows(40.0));

        assert!(Budget::Low.allows(7.99));
        assert!(!Budget::High.allows(7.99));
        assert!(!Budget::Medium.allows(9.99));
    }

    #[test]
    fn criteria_defaults_from_minimal_json() {
        let criteria: RecommendationCriteria =
            serde_json::from_str(r#"{"skin_type": "oily"}"#).unwrap();
        assert_eq!(criteria.budget, Budget::Medium);
        assert!(criteria.concerns.is_empty());
        assert!(criteria.preferences.is_empty());
    }

    #[test]
    fn budget_deserializes_lowercase() {
        let budget: Budget = serde_json::from_str(r#""high""#).unwrap();
        assert_eq!(budget, Budget::High);
    }
}
