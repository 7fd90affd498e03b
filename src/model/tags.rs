use serde::{Deserialize, Serialize};

use crate::model::KeyedEntry;

/// A tag attached to an entity, optionally with free-text context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssociation {
    /// Tag URN, e.g. `urn:li:tag:pii`
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl TagAssociation {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            context: None,
        }
    }

    pub fn with_context(tag: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            context: Some(context.into()),
        }
    }
}

impl KeyedEntry for TagAssociation {
    fn entry_key(&self) -> &str {
        &self.tag
    }
}

/// `globalTags` aspect
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalTags {
    #[serde(default)]
    pub tags: Vec<TagAssociation>,
}

impl GlobalTags {
    pub const TAGS: &'static str = "tags";

    pub fn new(tags: Vec<TagAssociation>) -> Self {
        Self { tags }
    }

    pub fn get(&self, tag: &str) -> Option<&TagAssociation> {
        self.tags.iter().find(|t| t.tag == tag)
    }
}
