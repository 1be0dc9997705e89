use crate::models::{Product, RecommendationCriteria, ScoredProduct};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Built-in catalog used when no external file is configured.
const BUILTIN_PRODUCTS: &str = include_str!("../../data/products.json");

/// Read-only product catalog plus the deterministic matcher over it.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn builtin() -> Result<Self> {
        let products: Vec<Product> =
            serde_json::from_str(BUILTIN_PRODUCTS).context("Failed to parse builtin catalog")?;
        Ok(Self { products })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read catalog file {:?}", path.as_ref()))?;
        let products: Vec<Product> =
            serde_json::from_str(&raw).context("Failed to parse catalog file")?;
        info!("Loaded {} products from {:?}", products.len(), path.as_ref());
        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id == product_id)
    }

    /// Apply the hard filters, score the survivors and rank them.
    ///
    /// Ranking is a stable descending sort on the score, so ties keep the
    /// catalog's original order. Truncated to `limit`.
    pub fn filter_and_rank(
        &self,
        criteria: &RecommendationCriteria,
        limit: usize,
    ) -> Vec<ScoredProduct> {
        let mut scored: Vec<ScoredProduct> = self
            .products
            .iter()
            .filter(|p| passes_filters(p, criteria))
            .map(|p| ScoredProduct {
                product: p.clone(),
                match_score: score(p, criteria),
                why_recommended: why_recommended(p, criteria),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        scored
    }
}

/// Hard filters, evaluated in order; failing any of them excludes the product
/// entirely, its score is never computed.
pub fn passes_filters(product: &Product, criteria: &RecommendationCriteria) -> bool {
    if !product.skin_types.contains(&criteria.skin_type) {
        return false;
    }

    // Empty criteria lists pass all products.
    if !criteria.concerns.is_empty()
        && !criteria
            .concerns
            .iter()
            .any(|c| product.concerns.contains(c))
    {
        return false;
    }

    if !criteria.preferences.is_empty()
        && !criteria.preferences.iter().any(|p| product.tags.contains(p))
    {
        return false;
    }

    criteria.budget.allows(product.price)
}

/// Weighted match score in [0,1], weights summing to 1.0:
/// 0.3 skin type + 0.4 concern overlap + 0.2 preference overlap + 0.1 rating.
/// Rounded to 2 decimal places.
pub fn score(product: &Product, criteria: &RecommendationCriteria) -> f32 {
    let mut score = 0.0;

    if product.skin_types.contains(&criteria.skin_type) {
        score += 0.3;
    }

    if !criteria.concerns.is_empty() {
        let matched = criteria
            .concerns
            .iter()
            .filter(|c| product.concerns.contains(c))
            .count();
        score += (matched as f32 / criteria.concerns.len() as f32) * 0.4;
    }

    if !criteria.preferences.is_empty() {
        let matched = criteria
            .preferences
            .iter()
            .filter(|p| product.tags.contains(p))
            .count();
        score += (matched as f32 / criteria.preferences.len() as f32) * 0.2;
    }

    score += (product.rating / 5.0) * 0.1;

    (score * 100.0).round() / 100.0
}

/// Deterministic explanation templating: matched skin type, first active
/// ingredient, first product tag with a known description. Purely
/// explanatory, not part of the score.
pub fn why_recommended(product: &Product, criteria: &RecommendationCriteria) -> String {
    let mut reasons = Vec::new();

    let skin_type_name = match criteria.skin_type.as_str() {
        "oily" => "油性",
        "dry" => "干性",
        "combination" => "混合性",
        "normal" => "中性",
        other => other,
    };
    reasons.push(format!("适合{}肌肤", skin_type_name));

    if let Some(active) = product.ingredients.active.first() {
        reasons.push(format!("含有{}等有效成分", active));
    }

    for tag in &product.tags {
        if let Some(description) = tag_description(tag) {
            reasons.push(description.to_string());
            break;
        }
    }

    format!("{}。", reasons.join("，"))
}

fn tag_description(tag: &str) -> Option<&'static str> {
    match tag {
        "fragrance-free" => Some("无香料配方"),
        "non-comedogenic" => Some("不堵塞毛孔"),
        "dermatologist-tested" => Some("经皮肤科医生测试"),
        "oil-free" => Some("无油配方"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Ingredients};

    fn acne_wash() -> Product {
        Product {
            product_id: "prod_002".to_string(),
            name: "Oil-Free Acne Wash".to_string(),
            brand: "Neutrogena".to_string(),
            category: "cleanser".to_string(),
            subcategory: Some("foam".to_string()),
            price: 7.99,
            currency: "USD".to_string(),
            rating: 4.4,
            review_count: 8920,
            skin_types: vec!["oily".to_string(), "combination".to_string()],
            concerns: vec!["acne".to_string(), "oily_skin".to_string()],
            ingredients: Ingredients {
                active: vec!["salicylic acid".to_string()],
                full_list: "Salicylic Acid, Water, Glycerin...".to_string(),
            },
            tags: vec!["oil-free".to_string(), "non-comedogenic".to_string()],
            description: "控油祛痘洁面乳".to_string(),
            image_url: String::new(),
        }
    }

    fn oily_acne_criteria() -> RecommendationCriteria {
        RecommendationCriteria {
            analysis_id: None,
            skin_type: "oily".to_string(),
            concerns: vec!["acne".to_string()],
            budget: Budget::Low,
            preferences: vec!["oil-free".to_string()],
        }
    }

    #[test]
    fn full_match_scores_ninety_nine() {
        let product = acne_wash();
        let criteria = oily_acne_criteria();

        assert!(passes_filters(&product, &criteria));
        // 0.3 + 0.4*1 + 0.2*1 + 0.1*(4.4/5) = 0.988, rounded to 0.99
        assert_eq!(score(&product, &criteria), 0.99);
    }

    #[test]
    fn scoring_is_deterministic() {
        let product = acne_wash();
        let criteria = oily_acne_criteria();
        assert_eq!(score(&product, &criteria), score(&product, &criteria));
    }

    #[test]
    fn high_budget_excludes_cheap_product() {
        let product = acne_wash();
        let mut criteria = oily_acne_criteria();
        criteria.budget = Budget::High;

        assert!(!passes_filters(&product, &criteria));

        let catalog = ProductCatalog {
            products: vec![product],
        };
        assert!(catalog.filter_and_rank(&criteria, 10).is_empty());
    }

    #[test]
    fn skin_type_mismatch_is_total_rejection() {
        let product = acne_wash();
        let mut criteria = oily_acne_criteria();
        criteria.skin_type = "dry".to_string();
        // Highly favorable in every other dimension, still excluded.
        criteria.budget = Budget::Low;

        let catalog = ProductCatalog {
            products: vec![product],
        };
        assert!(catalog.filter_and_rank(&criteria, 10).is_empty());
    }

    #[test]
    fn empty_concerns_pass_filter_but_contribute_nothing() {
        let product = acne_wash();
        let criteria = RecommendationCriteria {
            analysis_id: None,
            skin_type: "oily".to_string(),
            concerns: vec![],
            budget: Budget::Low,
            preferences: vec![],
        };

        assert!(passes_filters(&product, &criteria));
        // 0.3 + 0 + 0 + 0.088 = 0.388, rounded to 0.39
        assert_eq!(score(&product, &criteria), 0.39);
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let catalog = ProductCatalog::builtin().unwrap();
        let criteria = RecommendationCriteria {
            analysis_id: None,
            skin_type: "combination".to_string(),
            concerns: vec!["hydration".to_string(), "acne".to_string()],
            budget: Budget::Medium,
            preferences: vec!["fragrance-free".to_string()],
        };

        for scored in catalog.filter_and_rank(&criteria, 10) {
            assert!((0.0..=1.0).contains(&scored.match_score));
        }
    }

    #[test]
    fn ranking_is_descending_and_truncated() {
        let catalog = ProductCatalog::builtin().unwrap();
        let criteria = RecommendationCriteria {
            analysis_id: None,
            skin_type: "combination".to_string(),
            concerns: vec![],
            budget: Budget::Medium,
            preferences: vec![],
        };

        let ranked = catalog.filter_and_rank(&criteria, 1);
        assert_eq!(ranked.len(), 1);

        let all = catalog.filter_and_rank(&criteria, 10);
        let scores: Vec<f32> = all.iter().map(|s| s.match_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn explanation_names_skin_type_ingredient_and_tag() {
        let reason = why_recommended(&acne_wash(), &oily_acne_criteria());
        assert!(reason.contains("适合油性肌肤"));
        assert!(reason.contains("salicylic acid"));
        assert!(reason.contains("无油配方"));
        assert!(reason.ends_with('。'));
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = ProductCatalog::builtin().unwrap();
        assert_eq!(catalog.products().len(), 3);
        assert!(catalog.get("prod_002").is_some());
        assert!(catalog.get("missing").is_none());
    }
}
