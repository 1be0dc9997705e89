use crate::{
    config::Config,
    error::Result,
    routes::api_routes,
    services::{
        ChromaClient, CompletionClient, ContextAggregator, EmbeddingClient, ProductCatalog,
        RecommendationService, RetrievalService,
    },
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};
use std::net::TcpListener;
use std::sync::Arc;

pub struct Application {
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        // Always bind to 0.0.0.0 for Docker compatibility
        let bind_address = format!("0.0.0.0:{}", self.config.port);
        let listener = TcpListener::bind(&bind_address).map_err(anyhow::Error::from)?;
        info!(
            "Starting server at http://{}:{}",
            self.config.host, self.config.port
        );

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let config = &self.config;

        // Collaborator clients are constructed once and shared; every call
        // through them is a self-contained request/response.
        let api_key = config.openai_api_key.as_deref();
        if api_key.is_none() {
            warn!("OPENAI_API_KEY not set; completions will fall back to rule-based replies");
        }

        let embeddings = EmbeddingClient::new(
            api_key.unwrap_or_default(),
            &config.openai_base_url,
            &config.embedding_model,
            config.embedding_dimensions,
            config.retrieval_timeout_secs,
        )
        .context("Failed to create embedding client")?;

        let chroma = ChromaClient::new(
            &config.chromadb_url(),
            &config.chroma_collection,
            config.retrieval_timeout_secs,
        )
        .context("Failed to create ChromaDB client")?;

        let completion = CompletionClient::new(
            api_key,
            &config.openai_base_url,
            &config.chat_model,
            config.completion_timeout_secs,
        )
        .context("Failed to create completion client")?;

        let catalog = match &config.products_path {
            Some(path) => ProductCatalog::from_file(path)?,
            None => ProductCatalog::builtin()?,
        };

        let retrieval = Arc::new(RetrievalService::new(embeddings, chroma));
        let aggregator = ContextAggregator::new(retrieval.clone());

        let recommendation_service = web::Data::new(RecommendationService::new(
            aggregator,
            completion,
        ));
        let retrieval_service = web::Data::from(retrieval);
        let catalog = web::Data::new(catalog);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(recommendation_service.clone())
                .app_data(retrieval_service.clone())
                .app_data(catalog.clone())
                .service(api_routes())
        })
        .listen(listener)
        .map_err(anyhow::Error::from)?
        .run()
        .await
        .map_err(anyhow::Error::from)?;

        Ok(())
    }
}
