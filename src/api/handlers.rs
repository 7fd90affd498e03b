use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::CatalogError;
use crate::model::{AspectName, ChangeProposal, EntityUrn, IngestReceipt, VersionedAspect};
use crate::store::traits::AspectStore;

pub type AppState<S> = Arc<S>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl ErrorResponse {
    pub fn new(err: &CatalogError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectResponse {
    pub entity_urn: EntityUrn,
    pub aspect_name: AspectName,
    pub aspect: Option<VersionedAspect>,
}

fn error_response(err: CatalogError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        CatalogError::Build(_) | CatalogError::Validation { .. } => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Transport(_) | CatalogError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::new(&err)))
}

pub async fn ingest_proposal<S: AspectStore>(
    State(store): State<AppState<S>>,
    proposal: Result<RequestJson<ChangeProposal>, JsonRejection>,
) -> ApiResult<IngestReceipt> {
    let RequestJson(proposal) = proposal.map_err(|rejection| {
        warn!("undecodable proposal: {}", rejection.body_text());
        error_response(CatalogError::validation(format!(
            "malformed proposal: {}",
            rejection.body_text()
        )))
    })?;
    let proposal_id = proposal.proposal_id.clone();
    match store.ingest_proposal(proposal).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(e) => {
            warn!("proposal {} rejected: {}", proposal_id, e);
            Err(error_response(e))
        }
    }
}

pub async fn get_aspect<S: AspectStore>(
    State(store): State<AppState<S>>,
    Path((urn, aspect)): Path<(String, String)>,
) -> ApiResult<AspectResponse> {
    let urn = EntityUrn::parse(urn).map_err(error_response)?;
    let aspect_name: AspectName = aspect.parse().map_err(error_response)?;

    let aspect = store
        .get_aspect(&urn, aspect_name)
        .await
        .map_err(error_response)?;

    Ok(Json(AspectResponse {
        entity_urn: urn,
        aspect_name,
        aspect,
    }))
}
