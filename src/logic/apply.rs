use log::debug;
use serde::de::DeserializeOwned;

use crate::error::{CatalogError, Result};
use crate::model::{
    ensure_unique_keys, Aspect, AspectName, ChartInfo, CustomProperties, DashboardInfo,
    DataJobInfo, DatasetProperties, GlobalTags, GlossaryTerms, KeyedEntry, Ownership,
    PatchAction, PatchDocument, PatchOperation, CUSTOM_PROPERTIES,
};

/// Something a patch operation can be applied to in place
pub trait PatchTarget {
    fn apply_operation(&mut self, op: &PatchOperation) -> Result<()>;
}

fn unknown_field(op: &PatchOperation, aspect: AspectName) -> CatalogError {
    CatalogError::invalid_at(
        op.path.to_string(),
        format!("'{}' has no patchable field '{}'", aspect, op.path.field_name()),
    )
}

/// Apply one operation to a list field whose members are identified by key.
///
/// - add on `/field/key` upserts; an existing entry is overwritten in place and
///   attributes the new entry leaves unset are not inherited.
/// - replace on `/field/key` only overwrites an existing entry.
/// - remove on `/field/key` is a no-op when the key is absent.
/// - add/replace on `/field` substitutes the whole list; remove clears it.
pub fn merge_keyed_list<T>(entries: &mut Vec<T>, op: &PatchOperation) -> Result<()>
where
    T: KeyedEntry + DeserializeOwned,
{
    match (op.path.key(), op.op) {
        (Some(key), PatchAction::Add | PatchAction::Replace) => {
            let entry: T = op.decode_value()?;
            if entry.entry_key() != key {
                return Err(CatalogError::invalid_at(
                    op.path.to_string(),
                    format!("value key '{}' does not match path key", entry.entry_key()),
                ));
            }
            match entries.iter_mut().find(|existing| existing.entry_key() == key) {
                Some(slot) => *slot = entry,
                None if op.op == PatchAction::Add => entries.push(entry),
                None => {}
            }
        }
        (Some(key), PatchAction::Remove) => {
            if let Some(index) = entries.iter().position(|e| e.entry_key() == key) {
                entries.remove(index);
            }
        }
        (None, PatchAction::Add | PatchAction::Replace) => {
            let next: Vec<T> = op.decode_value()?;
            ensure_unique_keys(&next, &op.path.to_string())?;
            *entries = next;
        }
        (None, PatchAction::Remove) => entries.clear(),
    }
    Ok(())
}

/// Apply one operation to a string-to-string map field.
///
/// Same shape rules as [`merge_keyed_list`]; whole-field add/replace discards
/// every key not present in the new mapping.
pub fn merge_string_map(map: &mut CustomProperties, op: &PatchOperation) -> Result<()> {
    match (op.path.key(), op.op) {
        (Some(key), PatchAction::Add) => {
            let value: String = op.decode_value()?;
            map.insert(key.to_string(), value);
        }
        (Some(key), PatchAction::Replace) => {
            let value: String = op.decode_value()?;
            if let Some(slot) = map.get_mut(key) {
                *slot = value;
            }
        }
        (Some(key), PatchAction::Remove) => {
            map.remove(key);
        }
        (None, PatchAction::Add | PatchAction::Replace) => {
            *map = op.decode_value()?;
        }
        (None, PatchAction::Remove) => map.clear(),
    }
    Ok(())
}

impl PatchTarget for GlobalTags {
    fn apply_operation(&mut self, op: &PatchOperation) -> Result<()> {
        match op.path.field_name() {
            GlobalTags::TAGS => merge_keyed_list(&mut self.tags, op),
            _ => Err(unknown_field(op, AspectName::GlobalTags)),
        }
    }
}

impl PatchTarget for GlossaryTerms {
    fn apply_operation(&mut self, op: &PatchOperation) -> Result<()> {
        match op.path.field_name() {
            GlossaryTerms::TERMS => merge_keyed_list(&mut self.terms, op),
            _ => Err(unknown_field(op, AspectName::GlossaryTerms)),
        }
    }
}

impl PatchTarget for Ownership {
    fn apply_operation(&mut self, op: &PatchOperation) -> Result<()> {
        match op.path.field_name() {
            Ownership::OWNERS => merge_keyed_list(&mut self.owners, op),
            _ => Err(unknown_field(op, AspectName::Ownership)),
        }
    }
}

fn patch_custom_properties(
    map: &mut CustomProperties,
    op: &PatchOperation,
    aspect: AspectName,
) -> Result<()> {
    if op.path.field_name() == CUSTOM_PROPERTIES {
        merge_string_map(map, op)
    } else {
        Err(unknown_field(op, aspect))
    }
}

impl PatchTarget for Aspect {
    fn apply_operation(&mut self, op: &PatchOperation) -> Result<()> {
        match self {
            Aspect::GlobalTags(tags) => tags.apply_operation(op),
            Aspect::GlossaryTerms(terms) => terms.apply_operation(op),
            Aspect::Ownership(ownership) => ownership.apply_operation(op),
            Aspect::DatasetProperties(DatasetProperties {
                custom_properties, ..
            }) => patch_custom_properties(custom_properties, op, AspectName::DatasetProperties),
            Aspect::ChartInfo(ChartInfo {
                custom_properties, ..
            }) => patch_custom_properties(custom_properties, op, AspectName::ChartInfo),
            Aspect::DashboardInfo(DashboardInfo {
                custom_properties, ..
            }) => patch_custom_properties(custom_properties, op, AspectName::DashboardInfo),
            Aspect::DataJobInfo(DataJobInfo {
                custom_properties, ..
            }) => patch_custom_properties(custom_properties, op, AspectName::DataJobInfo),
        }
    }
}

/// Computes the merged aspect value for a sequence of patch operations
pub struct PatchEngine;

impl PatchEngine {
    /// Apply `operations` in order to the current value (or the empty aspect).
    ///
    /// Works on a copy: on error the caller's current value is untouched and
    /// nothing should be persisted.
    pub fn apply(
        current: Option<&Aspect>,
        aspect_name: AspectName,
        operations: &[PatchOperation],
    ) -> Result<Aspect> {
        let mut next = match current {
            Some(aspect) if aspect.name() != aspect_name => {
                return Err(CatalogError::validation(format!(
                    "stored aspect is '{}' but the patch targets '{}'",
                    aspect.name(),
                    aspect_name
                )));
            }
            Some(aspect) => aspect.clone(),
            None => Aspect::empty(aspect_name),
        };

        for (index, op) in operations.iter().enumerate() {
            op.path
                .check()
                .and_then(|_| next.apply_operation(op))
                .map_err(|err| err.at_operation(index))?;
        }

        debug!(
            "applied {} patch operation(s) to {} (was {})",
            operations.len(),
            aspect_name,
            if current.is_some() { "present" } else { "absent" }
        );
        Ok(next)
    }

    pub fn apply_document(
        current: Option<&Aspect>,
        aspect_name: AspectName,
        document: &PatchDocument,
    ) -> Result<Aspect> {
        Self::apply(current, aspect_name, &document.operations)
    }

    /// Fold several documents that arrived in order, as if they were one
    pub fn apply_all<'a, I>(
        current: Option<&Aspect>,
        aspect_name: AspectName,
        documents: I,
    ) -> Result<Aspect>
    where
        I: IntoIterator<Item = &'a PatchDocument>,
    {
        let mut value = current.cloned();
        for document in documents {
            value = Some(Self::apply_document(value.as_ref(), aspect_name, document)?);
        }
        Ok(value.unwrap_or_else(|| Aspect::empty(aspect_name)))
    }
}
