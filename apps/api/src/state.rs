use std::sync::Arc;

use crate::config::Config;
use crate::screening::pipeline::ScreeningPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup around the configured model client.
    pub pipeline: Arc<ScreeningPipeline>,
    pub config: Config,
}
