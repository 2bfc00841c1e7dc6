use std::sync::Arc;

use crate::config::Config;
use crate::design::orchestrator::DesignPipeline;
use crate::design::templates::TemplateCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation client and retry policy, shared by every request.
    pub pipeline: Arc<DesignPipeline>,
    /// Curated templates plus the TTL-cached remote source.
    pub catalog: Arc<TemplateCatalog>,
    pub config: Config,
}
