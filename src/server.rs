//! HTTP trigger surface for the fetcher.
//!
//! `OPTIONS` on any path answers the CORS preflight; every other method runs
//! one fetch-and-store invocation and reports it as JSON.

use crate::fetcher::{FetchReport, RateFetcher};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

pub struct AppState {
    pub fetcher: RateFetcher,
}

const CORS_HEADERS: [(header::HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
];

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new().fallback(handle).with_state(state)
}

async fn handle(State(state): State<Arc<AppState>>, method: Method) -> Response {
    if method == Method::OPTIONS {
        debug!("CORS preflight");
        return (StatusCode::OK, CORS_HEADERS).into_response();
    }

    let report = FetchReport::from_result(&state.fetcher.run().await);
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, CORS_HEADERS, Json(report)).into_response()
}

/// Serves the trigger on `bind` until `shutdown` resolves.
pub async fn serve<S>(bind: &str, state: Arc<AppState>, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateError;
    use crate::core::SettingsStore;
    use crate::fetcher::test_utils::ScriptedQuotes;
    use crate::store::memory::MemoryCollection;
    use crate::store::settings::KvSettingsStore;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router_with(quotes: ScriptedQuotes) -> (Router, Arc<KvSettingsStore>) {
        let settings = Arc::new(KvSettingsStore::new(Arc::new(MemoryCollection::new())));
        let state = Arc::new(AppState {
            fetcher: RateFetcher::new(Arc::new(quotes), settings.clone()),
        });
        (create_router(state), settings)
    }

    async fn send(router: Router, method: &str) -> (StatusCode, Response) {
        let request = Request::builder()
            .method(method)
            .uri("/fetch-exchange-rate")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        (response.status(), response)
    }

    #[tokio::test]
    async fn test_options_is_cors_preflight_without_fetch() {
        let (router, settings) = router_with(ScriptedQuotes::always(144.9));

        let (status, response) = send(router, "OPTIONS").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
        assert!(settings.exchange_rate().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_runs_fetch() {
        let (router, settings) = router_with(ScriptedQuotes::always(144.9));

        let (status, response) = send(router, "POST").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!((json["rate"].as_f64().unwrap() - 1.0 / 144.9).abs() < 1e-12);
        assert!(json["timestamp"].is_string());

        let stored = settings.exchange_rate().await.unwrap().unwrap();
        assert_eq!(Some(stored.dzd_to_eur_rate), json["rate"].as_f64());
    }

    #[tokio::test]
    async fn test_failure_is_500_with_error_body() {
        let (router, settings) = router_with(ScriptedQuotes::new(vec![Err(
            RateError::UpstreamUnavailable("HTTP error: 503".to_string()),
        )]));

        let (status, response) = send(router, "GET").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Upstream unavailable: HTTP error: 503");
        assert!(json["timestamp"].is_string());
        assert!(json.get("success").is_none());
        assert!(settings.exchange_rate().await.unwrap().is_none());
    }
}
