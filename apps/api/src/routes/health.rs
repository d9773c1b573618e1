use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness only; does not contact the model provider.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "screener"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = health_handler().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "screener");
    }
}
