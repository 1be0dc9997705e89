use actix_web::{web, Scope};

use crate::handlers::{analyze_config, chat_config, health_check, products_config, search_config};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .configure(chat_config)
        .configure(products_config)
        .configure(search_config)
        .configure(analyze_config)
}
