mod config;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::documents::FileTextExtractor;
use crate::screening::pipeline::ScreeningPipeline;
use crate::screening::report::ReportWriter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing provider credentials)
    let config = Config::from_env()?;

    // Initialize structured logging (RUST_LOG, from the environment or .env)
    let filter = EnvFilter::try_new(&config.rust_log)
        .with_context(|| format!("RUST_LOG '{}' is not a valid filter", config.rust_log))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the model client once; every pipeline step shares it
    let llm = LlmClient::new(config.llm.clone()).context("Failed to build LLM client")?;
    info!(
        "LLM client initialized (provider: {}, model: {})",
        llm.provider(),
        llm.model()
    );

    let reports = ReportWriter::new(&config.reports_dir);
    info!("Reports will be written to {}", reports.dir().display());

    let pipeline = ScreeningPipeline::new(
        Arc::new(llm),
        Arc::new(FileTextExtractor),
        reports,
        config.input_limits(),
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
