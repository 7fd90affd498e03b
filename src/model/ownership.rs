use serde::{Deserialize, Serialize};

use crate::model::{AuditStamp, KeyedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnershipType {
    TechnicalOwner,
    BusinessOwner,
    DataSteward,
    None,
    Developer,
    #[serde(rename = "DATAOWNER")]
    DataOwner,
    Delegate,
    Producer,
    Consumer,
    Stakeholder,
}

/// Where an ownership claim came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// User or group URN
    pub owner: String,
    #[serde(rename = "type")]
    pub ownership_type: OwnershipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<OwnershipSource>,
}

impl Owner {
    pub fn new(owner: impl Into<String>, ownership_type: OwnershipType) -> Self {
        Self {
            owner: owner.into(),
            ownership_type,
            source: None,
        }
    }
}

impl KeyedEntry for Owner {
    fn entry_key(&self) -> &str {
        &self.owner
    }
}

/// `ownership` aspect
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    #[serde(default)]
    pub owners: Vec<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<AuditStamp>,
}

impl Ownership {
    pub const OWNERS: &'static str = "owners";

    pub fn new(owners: Vec<Owner>) -> Self {
        Self {
            owners,
            last_modified: None,
        }
    }

    pub fn get(&self, owner: &str) -> Option<&Owner> {
        self.owners.iter().find(|o| o.owner == owner)
    }
}
