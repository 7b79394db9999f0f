use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::pipeline::MarketPipeline;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "market-scraper",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Run the pipeline and return its JSON payload; 500 on orchestration failure.
async fn markets(Extension(pipeline): Extension<Arc<MarketPipeline>>) -> impl IntoResponse {
    let response = pipeline.respond().await;
    let status = if response.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}

/// Create the HTTP server with all routes
pub fn create_server(pipeline: Arc<MarketPipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/markets", get(markets))
        .layer(Extension(pipeline))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(pipeline: Arc<MarketPipeline>, port: u16) -> anyhow::Result<()> {
    let app = create_server(pipeline);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "HTTP server listening");
    info!("health check: http://localhost:{port}/health");
    info!("markets:      http://localhost:{port}/api/markets");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::app::ports::HttpClientPort;
    use crate::common::error::Result;
    use crate::config::Config;

    struct StaticPage;

    #[async_trait]
    impl HttpClientPort for StaticPage {
        async fn get(&self, _url: &str) -> Result<String> {
            Ok(
                "<html><body><h2>Junction Night Market</h2><p>Fridays in the Junction.</p></body></html>"
                    .into(),
            )
        }
    }

    fn app(sources: Vec<String>) -> Router {
        let config = Config {
            sources,
            pacing_delay_ms: 0,
            ..Config::default()
        };
        create_server(Arc::new(MarketPipeline::new(config, Arc::new(StaticPage), None)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(vec!["https://example.com/".into()])
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_markets_returns_payload_with_cors() {
        let response = app(vec!["https://example.com/markets".into()])
            .oneshot(
                Request::builder()
                    .uri("/api/markets")
                    .header(header::ORIGIN, "https://dashboard.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 1);
        assert_eq!(body["markets"][0]["name"], "Junction Night Market");
    }

    #[tokio::test]
    async fn test_orchestration_failure_is_500() {
        let response = app(Vec::new())
            .oneshot(Request::builder().uri("/api/markets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["success"], false);
    }
}
