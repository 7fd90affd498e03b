use serde::{Deserialize, Serialize};

use crate::model::{AuditStamp, KeyedEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTermAssociation {
    /// Glossary term URN
    pub urn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl GlossaryTermAssociation {
    pub fn new(urn: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            context: None,
        }
    }

    pub fn with_context(urn: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            context: Some(context.into()),
        }
    }
}

impl KeyedEntry for GlossaryTermAssociation {
    fn entry_key(&self) -> &str {
        &self.urn
    }
}

/// `glossaryTerms` aspect
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerms {
    #[serde(default)]
    pub terms: Vec<GlossaryTermAssociation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_stamp: Option<AuditStamp>,
}

impl GlossaryTerms {
    pub const TERMS: &'static str = "terms";

    pub fn new(terms: Vec<GlossaryTermAssociation>, audit_stamp: AuditStamp) -> Self {
        Self {
            terms,
            audit_stamp: Some(audit_stamp),
        }
    }

    pub fn get(&self, urn: &str) -> Option<&GlossaryTermAssociation> {
        self.terms.iter().find(|t| t.urn == urn)
    }
}
