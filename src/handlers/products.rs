use crate::{
    error::ApiError,
    models::{Product, RecommendationCriteria},
    services::ProductCatalog,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use serde::Deserialize;

const RECOMMENDATION_LIMIT: usize = 10;
const MAX_LIST_LIMIT: usize = 100;

pub fn products_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .service(web::resource("/recommend").route(web::post().to(recommend_products)))
            .service(web::resource("").route(web::get().to(list_products)))
            .service(web::resource("/{product_id}").route(web::get().to(get_product))),
    );
}

/// Rank the catalog against the supplied criteria. `total` counts every
/// product that survived the hard filters, before truncation.
pub async fn recommend_products(
    criteria: Json<RecommendationCriteria>,
    catalog: web::Data<ProductCatalog>,
) -> Result<HttpResponse, ApiError> {
    if criteria.skin_type.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "skin_type cannot be empty".to_string(),
        ));
    }

    let mut ranked = catalog.filter_and_rank(&criteria, usize::MAX);
    let total = ranked.len();
    ranked.truncate(RECOMMENDATION_LIMIT);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total": total,
        "recommendations": ranked,
    })))
}

pub async fn get_product(
    product_id: web::Path<String>,
    catalog: web::Data<ProductCatalog>,
) -> Result<HttpResponse, ApiError> {
    let product = catalog
        .get(&product_id)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(HttpResponse::Ok().json(product))
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f32>,
    pub max_price: Option<f32>,
    pub skin_type: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

fn default_list_limit() -> usize {
    20
}

pub async fn list_products(
    query: web::Query<ProductListQuery>,
    catalog: web::Data<ProductCatalog>,
) -> Result<HttpResponse, ApiError> {
    if query.limit > MAX_LIST_LIMIT {
        return Err(ApiError::InvalidInput(format!(
            "limit cannot exceed {}",
            MAX_LIST_LIMIT
        )));
    }

    let filtered: Vec<&Product> = catalog
        .products()
        .iter()
        .filter(|p| filter_listing(p, &query))
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total": filtered.len(),
        "products": filtered.iter().take(query.limit).collect::<Vec<_>>(),
    })))
}

fn filter_listing(product: &Product, query: &ProductListQuery) -> bool {
    if let Some(category) = &query.category {
        if &product.category != category {
            return false;
        }
    }
    if let Some(brand) = &query.brand {
        if !product.brand.eq_ignore_ascii_case(brand) {
            return false;
        }
    }
    if let Some(min_price) = query.min_price {
        if product.price < min_price {
            return false;
        }
    }
    if let Some(max_price) = query.max_price {
        if product.price > max_price {
            return false;
        }
    }
    if let Some(skin_type) = &query.skin_type {
        if !product.skin_types.contains(skin_type) {
            return false;
        }
    }
    true
}
