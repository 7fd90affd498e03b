use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, Result};
use crate::model::{
    ChartInfo, DashboardInfo, DataJobInfo, DatasetProperties, EntityType, GlobalTags,
    GlossaryTerms, Ownership,
};

/// Identity of a list member: what makes two tags, terms or owners "the same"
pub trait KeyedEntry {
    fn entry_key(&self) -> &str;
}

/// Reject a list value that holds the same key more than once
pub fn ensure_unique_keys<T: KeyedEntry>(entries: &[T], path: &str) -> Result<()> {
    match entries.iter().map(KeyedEntry::entry_key).duplicates().next() {
        Some(duplicate) => Err(CatalogError::invalid_at(
            path,
            format!("duplicate key '{}' in list value", duplicate),
        )),
        None => Ok(()),
    }
}

/// Names of the aspects this crate knows how to patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AspectName {
    GlobalTags,
    GlossaryTerms,
    Ownership,
    DatasetProperties,
    ChartInfo,
    DashboardInfo,
    DataJobInfo,
}

impl AspectName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectName::GlobalTags => "globalTags",
            AspectName::GlossaryTerms => "glossaryTerms",
            AspectName::Ownership => "ownership",
            AspectName::DatasetProperties => "datasetProperties",
            AspectName::ChartInfo => "chartInfo",
            AspectName::DashboardInfo => "dashboardInfo",
            AspectName::DataJobInfo => "dataJobInfo",
        }
    }
}

impl fmt::Display for AspectName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AspectName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "globalTags" => Ok(AspectName::GlobalTags),
            "glossaryTerms" => Ok(AspectName::GlossaryTerms),
            "ownership" => Ok(AspectName::Ownership),
            "datasetProperties" => Ok(AspectName::DatasetProperties),
            "chartInfo" => Ok(AspectName::ChartInfo),
            "dashboardInfo" => Ok(AspectName::DashboardInfo),
            "dataJobInfo" => Ok(AspectName::DataJobInfo),
            _ => Err(CatalogError::validation(format!("Unknown aspect: {}", s))),
        }
    }
}

impl EntityType {
    /// The aspect holding this entity type's `customProperties` map
    pub fn properties_aspect(&self) -> AspectName {
        match self {
            EntityType::Dataset => AspectName::DatasetProperties,
            EntityType::Chart => AspectName::ChartInfo,
            EntityType::Dashboard => AspectName::DashboardInfo,
            EntityType::DataJob => AspectName::DataJobInfo,
        }
    }

    pub fn supports(&self, aspect: AspectName) -> bool {
        match aspect {
            AspectName::GlobalTags | AspectName::GlossaryTerms | AspectName::Ownership => true,
            other => other == self.properties_aspect(),
        }
    }
}

/// One aspect value; the closed set of shapes the patch engine understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum Aspect {
    GlobalTags(GlobalTags),
    GlossaryTerms(GlossaryTerms),
    Ownership(Ownership),
    DatasetProperties(DatasetProperties),
    ChartInfo(ChartInfo),
    DashboardInfo(DashboardInfo),
    DataJobInfo(DataJobInfo),
}

impl Aspect {
    /// The empty value a patch starts from when nothing is stored yet
    pub fn empty(name: AspectName) -> Self {
        match name {
            AspectName::GlobalTags => Aspect::GlobalTags(GlobalTags::default()),
            AspectName::GlossaryTerms => Aspect::GlossaryTerms(GlossaryTerms::default()),
            AspectName::Ownership => Aspect::Ownership(Ownership::default()),
            AspectName::DatasetProperties => {
                Aspect::DatasetProperties(DatasetProperties::default())
            }
            AspectName::ChartInfo => Aspect::ChartInfo(ChartInfo::default()),
            AspectName::DashboardInfo => Aspect::DashboardInfo(DashboardInfo::default()),
            AspectName::DataJobInfo => Aspect::DataJobInfo(DataJobInfo::default()),
        }
    }

    pub fn name(&self) -> AspectName {
        match self {
            Aspect::GlobalTags(_) => AspectName::GlobalTags,
            Aspect::GlossaryTerms(_) => AspectName::GlossaryTerms,
            Aspect::Ownership(_) => AspectName::Ownership,
            Aspect::DatasetProperties(_) => AspectName::DatasetProperties,
            Aspect::ChartInfo(_) => AspectName::ChartInfo,
            Aspect::DashboardInfo(_) => AspectName::DashboardInfo,
            Aspect::DataJobInfo(_) => AspectName::DataJobInfo,
        }
    }

    pub fn as_global_tags(&self) -> Option<&GlobalTags> {
        match self {
            Aspect::GlobalTags(tags) => Some(tags),
            _ => None,
        }
    }

    pub fn as_glossary_terms(&self) -> Option<&GlossaryTerms> {
        match self {
            Aspect::GlossaryTerms(terms) => Some(terms),
            _ => None,
        }
    }

    pub fn as_ownership(&self) -> Option<&Ownership> {
        match self {
            Aspect::Ownership(ownership) => Some(ownership),
            _ => None,
        }
    }

    /// Check the keyed list fields of a full value; keys must be unique
    pub fn validate_keys(&self) -> Result<()> {
        match self {
            Aspect::GlobalTags(tags) => {
                ensure_unique_keys(&tags.tags, &format!("/{}", GlobalTags::TAGS))
            }
            Aspect::GlossaryTerms(terms) => {
                ensure_unique_keys(&terms.terms, &format!("/{}", GlossaryTerms::TERMS))
            }
            Aspect::Ownership(ownership) => {
                ensure_unique_keys(&ownership.owners, &format!("/{}", Ownership::OWNERS))
            }
            _ => Ok(()),
        }
    }

    /// `customProperties` of whichever properties aspect this is
    pub fn custom_properties(&self) -> Option<&crate::model::CustomProperties> {
        match self {
            Aspect::DatasetProperties(p) => Some(&p.custom_properties),
            Aspect::ChartInfo(p) => Some(&p.custom_properties),
            Aspect::DashboardInfo(p) => Some(&p.custom_properties),
            Aspect::DataJobInfo(p) => Some(&p.custom_properties),
            _ => None,
        }
    }
}

impl From<GlobalTags> for Aspect {
    fn from(value: GlobalTags) -> Self {
        Aspect::GlobalTags(value)
    }
}

impl From<GlossaryTerms> for Aspect {
    fn from(value: GlossaryTerms) -> Self {
        Aspect::GlossaryTerms(value)
    }
}

impl From<Ownership> for Aspect {
    fn from(value: Ownership) -> Self {
        Aspect::Ownership(value)
    }
}

impl From<DatasetProperties> for Aspect {
    fn from(value: DatasetProperties) -> Self {
        Aspect::DatasetProperties(value)
    }
}

impl From<ChartInfo> for Aspect {
    fn from(value: ChartInfo) -> Self {
        Aspect::ChartInfo(value)
    }
}

impl From<DashboardInfo> for Aspect {
    fn from(value: DashboardInfo) -> Self {
        Aspect::DashboardInfo(value)
    }
}

impl From<DataJobInfo> for Aspect {
    fn from(value: DataJobInfo) -> Self {
        Aspect::DataJobInfo(value)
    }
}
