use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, Result};

const URN_PREFIX: &str = "urn:li:";

/// Kinds of catalog entities that can carry patchable aspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    Dataset,
    Chart,
    Dashboard,
    DataJob,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityType::Dataset => write!(f, "dataset"),
            EntityType::Chart => write!(f, "chart"),
            EntityType::Dashboard => write!(f, "dashboard"),
            EntityType::DataJob => write!(f, "dataJob"),
        }
    }
}

impl std::str::FromStr for EntityType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dataset" => Ok(EntityType::Dataset),
            "chart" => Ok(EntityType::Chart),
            "dashboard" => Ok(EntityType::Dashboard),
            "dataJob" => Ok(EntityType::DataJob),
            _ => Err(CatalogError::Build(format!("Unknown entity type: {}", s))),
        }
    }
}

/// Stable identifier of one catalog entity, e.g. `urn:li:dataset:(urn:li:dataPlatform:hive,db.t,PROD)`.
///
/// Parsing checks the `urn:li:<entityType>:<id>` shape and remembers the entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityUrn {
    raw: String,
    entity_type: EntityType,
}

impl EntityUrn {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let rest = raw
            .strip_prefix(URN_PREFIX)
            .ok_or_else(|| CatalogError::Build(format!("'{}' is not an entity URN", raw)))?;
        let (entity_type, id) = rest
            .split_once(':')
            .ok_or_else(|| CatalogError::Build(format!("'{}' has no entity id", raw)))?;
        if id.trim().is_empty() {
            return Err(CatalogError::Build(format!("'{}' has an empty entity id", raw)));
        }
        let entity_type = entity_type.parse()?;
        Ok(Self { raw, entity_type })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }
}

impl fmt::Display for EntityUrn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for EntityUrn {
    type Error = CatalogError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(raw)
    }
}

impl From<EntityUrn> for String {
    fn from(urn: EntityUrn) -> Self {
        urn.raw
    }
}

fn qualify(kind: &str, name: &str) -> String {
    if name.starts_with(URN_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}:{}", URN_PREFIX, kind, name)
    }
}

pub fn make_tag_urn(tag: &str) -> String {
    qualify("tag", tag)
}

pub fn make_term_urn(term: &str) -> String {
    qualify("glossaryTerm", term)
}

pub fn make_user_urn(username: &str) -> String {
    qualify("corpuser", username)
}

pub fn make_group_urn(group: &str) -> String {
    qualify("corpGroup", group)
}

pub fn make_dataset_urn(platform: &str, name: &str, env: &str) -> String {
    format!(
        "{}dataset:({},{},{})",
        URN_PREFIX,
        qualify("dataPlatform", platform),
        name,
        env
    )
}
