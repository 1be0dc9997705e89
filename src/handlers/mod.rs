mod analyze;
mod chat;
mod health;
mod products;
mod search;

pub use analyze::analyze_config;
pub use chat::chat_config;
pub use health::health_check;
pub use products::products_config;
pub use search::search_config;
