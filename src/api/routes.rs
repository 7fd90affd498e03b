use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::store::traits::AspectStore;

pub fn create_router<S: AspectStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Change proposals: full-value upserts and patches
        .route("/proposals", post(handlers::ingest_proposal::<S>))
        // Current merged state of one aspect
        .route(
            "/entities/:urn/aspects/:aspect",
            get(handlers::get_aspect::<S>),
        )
}
