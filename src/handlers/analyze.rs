use crate::{error::ApiError, services::RecommendationService};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

pub fn analyze_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/analyze-skin").route(web::post().to(analyze_skin)));
}

/// Analyze an uploaded skin photo and recommend products. Multipart fields:
/// `image` (required, JPEG/PNG up to 5 MB) and `additional_info` (optional
/// free text forwarded to the vision prompt).
pub async fn analyze_skin(
    mut payload: Multipart,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let mut image: Option<Vec<u8>> = None;
    let mut additional_info: Option<String> = None;

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_string();
        match name.as_str() {
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_default();
                if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
                    return Err(ApiError::InvalidInput(
                        "Invalid file type. Please upload JPEG or PNG images.".to_string(),
                    ));
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = field.try_next().await? {
                    bytes.extend_from_slice(&chunk);
                    if bytes.len() > MAX_IMAGE_BYTES {
                        return Err(ApiError::InvalidInput(
                            "File size too large. Maximum 5MB allowed.".to_string(),
                        ));
                    }
                }
                image = Some(bytes);
            }
            "additional_info" => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.try_next().await? {
                    bytes.extend_from_slice(&chunk);
                }
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                if !text.is_empty() {
                    additional_info = Some(text);
                }
            }
            _ => {
                // Drain unknown fields so the stream stays consumable.
                while field.try_next().await?.is_some() {}
            }
        }
    }

    let image = image.ok_or_else(|| {
        ApiError::InvalidInput("Missing required field: image".to_string())
    })?;
    if image.is_empty() {
        return Err(ApiError::InvalidInput("Uploaded image is empty".to_string()));
    }

    let response = service
        .analyze_skin(&image, additional_info.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(response))
}
