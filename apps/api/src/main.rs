mod config;
mod design;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::design::orchestrator::DesignPipeline;
use crate::design::template_cache::{
    HttpTemplateSource, NoRemoteTemplates, RemoteTemplateSource, SystemClock, TemplateCache,
};
use crate::design::templates::TemplateCatalog;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
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

    info!("Starting Design API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Template catalog: curated set plus optional remote source behind a TTL cache
    let source: Arc<dyn RemoteTemplateSource> = match &config.template_source_url {
        Some(url) => {
            info!("Remote template source: {url}");
            Arc::new(HttpTemplateSource::new(url.clone())?)
        }
        None => {
            info!("No TEMPLATE_SOURCE_URL set; serving curated templates only");
            Arc::new(NoRemoteTemplates)
        }
    };
    let cache = TemplateCache::new(
        source,
        Arc::new(SystemClock),
        chrono::Duration::seconds(config.template_cache_ttl_secs),
    );
    let catalog = TemplateCatalog::new(Arc::new(cache));

    let pipeline = DesignPipeline::new(Arc::new(llm), config.retry_policy())
        .with_deadline(config.pipeline_deadline());
    info!(
        "Design pipeline: {} candidates, {:?}, deadline {:?}",
        config.candidate_count,
        pipeline.policy(),
        config.pipeline_deadline()
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        catalog: Arc::new(catalog),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
