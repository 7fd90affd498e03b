use log::debug;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

use crate::api::handlers::{AspectResponse, ErrorResponse};
use crate::config::ClientConfig;
use crate::error::{CatalogError, Result};
use crate::model::{AspectName, ChangeProposal, EntityUrn, IngestReceipt, VersionedAspect};
use crate::store::traits::AspectStore;

/// Remote [`AspectStore`] talking to the HTTP API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CatalogError::Build(format!("invalid base url '{}': {}", config.base_url, e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Build(format!("'{}' cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn into_error(response: reqwest::Response) -> CatalogError {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => Self::from_error_body(status, body),
            Err(_) => Self::from_status(status, format!("server responded with {}", status)),
        }
    }

    /// Rebuild the server-side error from its `kind`, falling back to the status
    fn from_error_body(status: StatusCode, body: ErrorResponse) -> CatalogError {
        match body.kind.as_str() {
            "build" => CatalogError::Build(body.error),
            "validation" => CatalogError::validation(body.error),
            "not_found" => CatalogError::NotFound(body.error),
            "transport" => CatalogError::Transport(body.error),
            _ => Self::from_status(status, body.error),
        }
    }

    fn from_status(status: StatusCode, message: String) -> CatalogError {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                CatalogError::validation(message)
            }
            StatusCode::NOT_FOUND => CatalogError::NotFound(message),
            _ => CatalogError::Transport(message),
        }
    }
}

#[async_trait::async_trait]
impl AspectStore for CatalogClient {
    async fn get_aspect(
        &self,
        urn: &EntityUrn,
        aspect: AspectName,
    ) -> Result<Option<VersionedAspect>> {
        let url = self.url(&["entities", urn.as_str(), "aspects", aspect.as_str()])?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        let body: AspectResponse = response.json().await?;
        Ok(body.aspect)
    }

    async fn ingest_proposal(&self, proposal: ChangeProposal) -> Result<IngestReceipt> {
        debug!(
            "emitting {:?} proposal {} for {} on {}",
            proposal.change_type(),
            proposal.proposal_id,
            proposal.aspect_name,
            proposal.entity_urn
        );
        let url = self.url(&["proposals"])?;
        let response = self.client.post(url).json(&proposal).send().await?;
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        Ok(response.json().await?)
    }
}
