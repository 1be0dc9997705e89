use crate::{
    error::ApiError,
    models::{SearchResponse, SearchResult},
    services::RetrievalService,
};
use actix_web::{web, HttpResponse};
use md5::{Digest, Md5};
use serde::Deserialize;

const MAX_TOP_K: usize = 20;

pub fn search_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/search").route(web::get().to(search_products)));
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

/// Semantic product search over the vector index. Unlike the chat path this
/// endpoint has no meaningful empty fallback, so a retrieval failure
/// surfaces as 503.
pub async fn search_products(
    query: web::Query<SearchQuery>,
    retrieval: web::Data<RetrievalService>,
) -> Result<HttpResponse, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::InvalidInput("Query cannot be empty".to_string()));
    }
    if query.top_k > MAX_TOP_K {
        return Err(ApiError::InvalidInput(format!(
            "top_k cannot exceed {}",
            MAX_TOP_K
        )));
    }

    let chunks = retrieval.retrieve(&query.q, query.top_k).await?;

    let results: Vec<SearchResult> = chunks
        .into_iter()
        .map(|chunk| {
            let product_name = chunk
                .metadata
                .get("book")
                .cloned()
                .unwrap_or_else(|| "Unknown Product".to_string());
            SearchResult {
                image_url: placeholder_image_url(&product_name),
                product_name,
                document: chunk.text,
                metadata: chunk.metadata,
                distance: chunk.distance,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: query.q.clone(),
        total: results.len(),
        results,
    }))
}

/// Deterministic placeholder image for a product: initials of the first two
/// words on a background color derived from an md5 of the name, so the same
/// product always renders the same card.
pub fn placeholder_image_url(product_name: &str) -> String {
    if product_name.is_empty() {
        return "https://ui-avatars.com/api/?name=SK&size=200&background=6366f1&color=fff&bold=true"
            .to_string();
    }

    let initials: String = product_name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase();
    let initials = if initials.is_empty() {
        "SK".to_string()
    } else {
        initials
    };

    let digest = format!("{:x}", Md5::digest(product_name.as_bytes()));
    let bg_color = &digest[..6];

    format!(
        "https://ui-avatars.com/api/?name={}&size=200&background={}&color=fff&bold=true",
        urlencoding::encode(&initials),
        bg_color
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_uses_initials_of_first_two_words() {
        let url = placeholder_image_url("Hydrating Facial Cleanser");
        assert!(url.contains("name=HF"));
        assert!(url.contains("size=200"));
    }

    #[test]
    fn placeholder_is_deterministic() {
        assert_eq!(
            placeholder_image_url("Ultra Facial Cream"),
            placeholder_image_url("Ultra Facial Cream")
        );
    }

    #[test]
    fn empty_name_gets_default_avatar() {
        let url = placeholder_image_url("");
        assert!(url.contains("name=SK"));
        assert!(url.contains("background=6366f1"));
    }

    #[test]
    fn background_color_comes_from_md5_prefix() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        let url = placeholder_image_url("abc");
        assert!(url.contains("background=900150"));
    }

    #[test]
    fn unicode_initials_are_percent_encoded() {
        let url = placeholder_image_url("保湿 面霜");
        assert!(url.contains("name=%E4%BF%9D%E9%9D%A2"));
    }
}
