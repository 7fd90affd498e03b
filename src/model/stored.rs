use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Aspect, AspectName, AuditStamp, EntityUrn, Id};

/// The current value of one (entity, aspect) pair as held by the storage engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedAspect {
    pub value: Aspect,
    /// Starts at 1 and grows by one with every successful write
    pub version: u64,
    /// SHA-256 of the aspect's canonical JSON
    pub content_hash: String,
    pub last_modified: AuditStamp,
}

impl VersionedAspect {
    pub fn new(value: Aspect, version: u64, last_modified: AuditStamp) -> Result<Self> {
        let content_hash = Self::calculate_hash(&value)?;
        Ok(Self {
            value,
            version,
            content_hash,
            last_modified,
        })
    }

    /// Struct fields serialize in declaration order and maps are BTreeMaps,
    /// so equal values always hash equally.
    pub fn calculate_hash(value: &Aspect) -> Result<String> {
        use sha2::{Digest, Sha256};

        let canonical = serde_json::to_vec(value)?;
        let mut hasher = Sha256::new();
        hasher.update(format!("aspect:{}\n", value.name()));
        hasher.update(&canonical);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Acknowledgement returned for an ingested proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    pub proposal_id: Id,
    pub entity_urn: EntityUrn,
    pub aspect_name: AspectName,
    pub version: u64,
    pub content_hash: String,
    /// False when the proposal had already been applied and was skipped
    pub applied: bool,
}
