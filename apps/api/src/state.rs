use std::sync::Arc;

use crate::config::Config;
use crate::export::{ArtifactArchive, ExportPipeline};
use crate::generation::GenerationService;
use crate::storage::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn DocumentStore>,
    pub generator: Arc<dyn GenerationService>,
    pub exporter: Arc<ExportPipeline>,
    /// Present only when the S3 variables are complete.
    pub archive: Option<ArtifactArchive>,
    pub config: Config,
}
