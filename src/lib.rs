pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

pub use api::routes;
pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use logic::{PatchBuilder, PatchEngine, PatchTarget, Proposals};
pub use model::*;
pub use store::{AspectStore, InMemoryAspectStore};

use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the proposal API for `store` on an already bound listener
pub async fn serve<S: AspectStore + 'static>(listener: TcpListener, store: Arc<S>) -> anyhow::Result<()> {
    let app = crate::api::routes::create_router().with_state(store);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> axum::Router {
        crate::api::routes::create_router().with_state(Arc::new(InMemoryAspectStore::new()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_entity_returns_404() {
        let response = app()
            .oneshot(
                Request::get("/entities/urn:li:chart:(looker,x)/aspects/globalTags")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_aspect_name_returns_400() {
        let response = app()
            .oneshot(
                Request::get("/entities/urn:li:chart:(looker,x)/aspects/schemaMetadata")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_patch_returns_400() {
        let body = serde_json::json!({
            "proposalId": "p-1",
            "entityUrn": "urn:li:chart:(looker,x)",
            "entityType": "chart",
            "aspectName": "globalTags",
            "payload": {
                "kind": "patch",
                "value": [{"op": "add", "path": "/tags/urn:li:tag:a", "value": "oops"}]
            },
            "audit": {"time": 0, "actor": "urn:li:corpuser:tester"}
        });
        let response = app()
            .oneshot(
                Request::post("/proposals")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_patch_path_returns_400_error_body() {
        let body = serde_json::json!({
            "proposalId": "p-2",
            "entityUrn": "urn:li:chart:(looker,x)",
            "entityType": "chart",
            "aspectName": "globalTags",
            "payload": {
                "kind": "patch",
                "value": [{"op": "add", "path": "tags", "value": []}]
            },
            "audit": {"time": 0, "actor": "urn:li:corpuser:tester"}
        });
        let response = app()
            .oneshot(
                Request::post("/proposals")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: crate::api::handlers::ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error.kind, "validation");
        assert!(error.error.contains("path must start with '/'"));
    }
}
