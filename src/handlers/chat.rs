use crate::{error::ApiError, models::ChatRequest, services::RecommendationService};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};

pub fn chat_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat")
            .service(web::resource("").route(web::post().to(chat_message)))
            .service(web::resource("/message").route(web::post().to(chat_message))),
    );
}

/// Chat with the skincare advisor. Collaborator failures never fail the
/// request here: the service degrades to rule-based replies on its own.
pub async fn chat_message(
    request: Json<ChatRequest>,
    service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let response = service.chat(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}
