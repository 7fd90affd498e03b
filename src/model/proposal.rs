use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::{generate_id, Aspect, AspectName, AuditStamp, EntityType, EntityUrn, Id, PatchDocument};

/// What a proposal asks the storage engine to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    /// Overwrite the stored aspect with a full value
    Upsert,
    /// Merge a patch document into the stored aspect
    Patch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProposalPayload {
    FullValue(Aspect),
    Patch(PatchDocument),
}

/// Transport envelope for one aspect change.
///
/// Built once and consumed once; the `proposal_id` lets the storage engine
/// recognise a re-delivered proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeProposal {
    pub proposal_id: Id,
    pub entity_urn: EntityUrn,
    pub entity_type: EntityType,
    pub aspect_name: AspectName,
    pub payload: ProposalPayload,
    pub audit: AuditStamp,
}

impl ChangeProposal {
    /// Full-value write of `aspect` for `entity_urn`
    pub fn upsert(entity_urn: EntityUrn, aspect: impl Into<Aspect>) -> Self {
        let aspect = aspect.into();
        Self {
            proposal_id: generate_id(),
            entity_type: entity_urn.entity_type(),
            entity_urn,
            aspect_name: aspect.name(),
            payload: ProposalPayload::FullValue(aspect),
            audit: AuditStamp::system(),
        }
    }

    pub fn patch(
        entity_urn: EntityUrn,
        aspect_name: AspectName,
        document: PatchDocument,
        audit: AuditStamp,
    ) -> Self {
        Self {
            proposal_id: generate_id(),
            entity_type: entity_urn.entity_type(),
            entity_urn,
            aspect_name,
            payload: ProposalPayload::Patch(document),
            audit,
        }
    }

    #[must_use]
    pub fn with_audit(mut self, audit: AuditStamp) -> Self {
        self.audit = audit;
        self
    }

    pub fn change_type(&self) -> ChangeType {
        match self.payload {
            ProposalPayload::FullValue(_) => ChangeType::Upsert,
            ProposalPayload::Patch(_) => ChangeType::Patch,
        }
    }

    /// Envelope-level checks that do not need the stored state
    pub fn validate(&self) -> Result<()> {
        if self.entity_type != self.entity_urn.entity_type() {
            return Err(CatalogError::validation(format!(
                "entity type '{}' does not match urn '{}'",
                self.entity_type, self.entity_urn
            )));
        }
        if !self.entity_type.supports(self.aspect_name) {
            return Err(CatalogError::validation(format!(
                "aspect '{}' is not supported for entity type '{}'",
                self.aspect_name, self.entity_type
            )));
        }
        if let ProposalPayload::FullValue(aspect) = &self.payload {
            if aspect.name() != self.aspect_name {
                return Err(CatalogError::validation(format!(
                    "full value is a '{}' aspect but the proposal names '{}'",
                    aspect.name(),
                    self.aspect_name
                )));
            }
            aspect.validate_keys()?;
        }
        Ok(())
    }
}
