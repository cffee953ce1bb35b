mod budget;
mod config;
mod content;
mod db;
mod errors;
mod export;
mod generation;
mod layout;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::export::{ArtifactArchive, ExportPipeline, ExportSettings, PageGeometry, SvgRenderer};
use crate::generation::GeminiGenerationService;
use crate::llm_client::LlmClient;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;
use crate::storage::{DocumentStore, InMemoryDocumentStore, PgDocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Document store: PostgreSQL when configured, process memory otherwise
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let store = PgDocumentStore::new(create_pool(url).await?);
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            info!("DATABASE_URL not set; documents are kept in memory");
            Arc::new(InMemoryDocumentStore::default())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new()?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    if config.gemini_api_key.is_none() {
        info!("No server-side GEMINI_API_KEY; requests must carry their own key");
    }
    let generator = Arc::new(GeminiGenerationService::new(
        llm,
        config.gemini_api_key.clone(),
    ));

    // Page renderer and export pipeline
    let geometry = PageGeometry::new(config.render_scale);
    info!(
        "Rendering A4 pages at {}x{} px (scale {})",
        geometry.pixel_width(),
        geometry.pixel_height(),
        geometry.scale()
    );
    let exporter = Arc::new(ExportPipeline::new(
        Arc::new(SvgRenderer::new(geometry)),
        ExportSettings {
            product_name: config.product_name.clone(),
            jpeg_quality: config.jpeg_quality,
        },
    ));

    // Initialize S3 / MinIO archive (optional)
    let archive = match &config.s3 {
        Some(s3) => {
            let archive = ArtifactArchive::connect(s3).await;
            info!("Export archive enabled (bucket {})", s3.bucket);
            Some(archive)
        }
        None => None,
    };

    // Build app state
    let state = AppState {
        store,
        generator,
        exporter,
        archive,
        config: config.clone(),
    };

    // Build router
    if config.cors_origins.is_empty() {
        info!("CORS_ALLOWED_ORIGINS not set; accepting any origin");
    }
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
