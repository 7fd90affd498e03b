use serde_json::Value;

use crate::error::{CatalogError, Result};
use crate::model::{
    AspectName, AuditStamp, ChangeProposal, CustomProperties, EntityUrn, GlobalTags,
    GlossaryTermAssociation, GlossaryTerms, Owner, Ownership, PatchAction, PatchDocument,
    PatchOperation, PatchPath, TagAssociation, CUSTOM_PROPERTIES,
};

/// Typed payload held until `build()` encodes it
#[derive(Debug, Clone)]
enum PendingValue {
    Tag(TagAssociation),
    Term(GlossaryTermAssociation),
    Owner(Owner),
    Text(String),
    Map(CustomProperties),
}

impl PendingValue {
    fn to_json(&self) -> Result<Value> {
        Ok(match self {
            PendingValue::Tag(tag) => serde_json::to_value(tag)?,
            PendingValue::Term(term) => serde_json::to_value(term)?,
            PendingValue::Owner(owner) => serde_json::to_value(owner)?,
            PendingValue::Text(text) => Value::String(text.clone()),
            PendingValue::Map(map) => serde_json::to_value(map)?,
        })
    }
}

#[derive(Debug, Clone)]
struct PendingOperation {
    aspect: AspectName,
    op: PatchAction,
    path: PatchPath,
    value: Option<PendingValue>,
}

impl PendingOperation {
    fn encode(self) -> Result<PatchOperation> {
        if self.path.key() == Some("") {
            return Err(CatalogError::Build(format!(
                "empty key in '{}' edit of {}",
                self.op, self.aspect
            )));
        }
        let value = self.value.as_ref().map(PendingValue::to_json).transpose()?;
        Ok(PatchOperation {
            op: self.op,
            path: self.path,
            value,
        })
    }
}

/// Accumulates field-level edits for one entity. Nothing is read or written
/// until the proposals from `build()` are handed to a store, so removing a key
/// that does not exist is only discovered (as a no-op) at apply time.
///
/// Custom-property edits go to the properties aspect of the URN's entity type
/// (`datasetProperties`, `chartInfo`, ...).
///
/// Not meant to be shared between threads; callers synchronize if they must.
#[derive(Debug, Clone)]
pub struct PatchBuilder {
    urn: EntityUrn,
    audit: AuditStamp,
    operations: Vec<PendingOperation>,
}

impl PatchBuilder {
    /// Fails with a build error when `urn` is not a valid entity URN
    pub fn new(urn: impl Into<String>) -> Result<Self> {
        Ok(Self::for_urn(EntityUrn::parse(urn)?))
    }

    pub fn for_urn(urn: EntityUrn) -> Self {
        Self {
            urn,
            audit: AuditStamp::system(),
            operations: Vec::new(),
        }
    }

    pub fn entity_urn(&self) -> &EntityUrn {
        &self.urn
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Audit stamp attached to every proposal this builder emits
    #[must_use]
    pub fn with_audit(mut self, audit: AuditStamp) -> Self {
        self.audit = audit;
        self
    }

    fn push(
        mut self,
        aspect: AspectName,
        op: PatchAction,
        path: PatchPath,
        value: Option<PendingValue>,
    ) -> Self {
        self.operations.push(PendingOperation {
            aspect,
            op,
            path,
            value,
        });
        self
    }

    #[must_use]
    pub fn add_tag(self, tag: TagAssociation) -> Self {
        let path = PatchPath::entry(GlobalTags::TAGS, tag.tag.clone());
        self.push(
            AspectName::GlobalTags,
            PatchAction::Add,
            path,
            Some(PendingValue::Tag(tag)),
        )
    }

    #[must_use]
    pub fn remove_tag(self, tag: impl Into<String>) -> Self {
        let path = PatchPath::entry(GlobalTags::TAGS, tag);
        self.push(AspectName::GlobalTags, PatchAction::Remove, path, None)
    }

    #[must_use]
    pub fn add_term(self, term: GlossaryTermAssociation) -> Self {
        let path = PatchPath::entry(GlossaryTerms::TERMS, term.urn.clone());
        self.push(
            AspectName::GlossaryTerms,
            PatchAction::Add,
            path,
            Some(PendingValue::Term(term)),
        )
    }

    #[must_use]
    pub fn remove_term(self, term: impl Into<String>) -> Self {
        let path = PatchPath::entry(GlossaryTerms::TERMS, term);
        self.push(AspectName::GlossaryTerms, PatchAction::Remove, path, None)
    }

    #[must_use]
    pub fn add_owner(self, owner: Owner) -> Self {
        let path = PatchPath::entry(Ownership::OWNERS, owner.owner.clone());
        self.push(
            AspectName::Ownership,
            PatchAction::Add,
            path,
            Some(PendingValue::Owner(owner)),
        )
    }

    /// Removes the owner whatever its ownership type
    #[must_use]
    pub fn remove_owner(self, owner: impl Into<String>) -> Self {
        let path = PatchPath::entry(Ownership::OWNERS, owner);
        self.push(AspectName::Ownership, PatchAction::Remove, path, None)
    }

    #[must_use]
    pub fn add_custom_property(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let aspect = self.urn.entity_type().properties_aspect();
        let path = PatchPath::entry(CUSTOM_PROPERTIES, key);
        self.push(
            aspect,
            PatchAction::Add,
            path,
            Some(PendingValue::Text(value.into())),
        )
    }

    #[must_use]
    pub fn remove_custom_property(self, key: impl Into<String>) -> Self {
        let aspect = self.urn.entity_type().properties_aspect();
        let path = PatchPath::entry(CUSTOM_PROPERTIES, key);
        self.push(aspect, PatchAction::Remove, path, None)
    }

    /// Replace the whole `customProperties` map; keys not in `properties` are dropped
    #[must_use]
    pub fn set_custom_properties<I, K, V>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let aspect = self.urn.entity_type().properties_aspect();
        let map: CustomProperties = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.push(
            aspect,
            PatchAction::Add,
            PatchPath::field(CUSTOM_PROPERTIES),
            Some(PendingValue::Map(map)),
        )
    }

    /// Encode the accumulated edits as change proposals.
    ///
    /// One proposal per aspect touched, in order of first use; each carries that
    /// aspect's operations in call order. Every edit lands in exactly one proposal.
    /// An edit addressing an empty key is a build error.
    pub fn build(self) -> Result<Proposals> {
        let mut documents: Vec<(AspectName, PatchDocument)> = Vec::new();

        for pending in self.operations {
            let aspect = pending.aspect;
            let operation = pending.encode()?;
            match documents.iter_mut().find(|(name, _)| *name == aspect) {
                Some((_, document)) => document.push(operation),
                None => documents.push((aspect, PatchDocument::new(vec![operation]))),
            }
        }

        let proposals: Vec<ChangeProposal> = documents
            .into_iter()
            .map(|(aspect, document)| {
                ChangeProposal::patch(self.urn.clone(), aspect, document, self.audit.clone())
            })
            .collect();

        Ok(Proposals {
            inner: proposals.into_iter(),
        })
    }
}

/// One-shot sequence of proposals produced by [`PatchBuilder::build`]
#[derive(Debug)]
pub struct Proposals {
    inner: std::vec::IntoIter<ChangeProposal>,
}

impl Iterator for Proposals {
    type Item = ChangeProposal;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Proposals {}
