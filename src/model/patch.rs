use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CatalogError, Result};

/// Edit kind of a single patch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchAction {
    Add,
    Remove,
    Replace,
}

impl fmt::Display for PatchAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PatchAction::Add => write!(f, "add"),
            PatchAction::Remove => write!(f, "remove"),
            PatchAction::Replace => write!(f, "replace"),
        }
    }
}

/// Locator inside an aspect: either a whole field (`/customProperties`) or one
/// entry of a list/map field addressed by key (`/tags/urn:li:tag:pii`).
/// Segments are escaped as JSON Pointer tokens, so keys may contain `/` and `~`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatchPath {
    field: String,
    key: Option<String>,
}

impl PatchPath {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            key: None,
        }
    }

    pub fn entry(field: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            key: Some(key.into()),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let body = raw
            .strip_prefix('/')
            .ok_or_else(|| CatalogError::invalid_at(raw, "path must start with '/'"))?;
        let mut segments = body.split('/').map(unescape_segment);
        let field = segments.next().unwrap_or_default();
        let key = segments.next();
        if segments.next().is_some() {
            return Err(CatalogError::invalid_at(
                raw,
                "path may address at most one entry below a field",
            ));
        }
        let path = Self { field, key };
        path.check()?;
        Ok(path)
    }

    /// A path must name a field, and an entry path a non-empty key
    pub fn check(&self) -> Result<()> {
        if self.field.is_empty() {
            return Err(CatalogError::invalid_at(self.to_string(), "path names no field"));
        }
        if self.key.as_deref() == Some("") {
            return Err(CatalogError::invalid_at(self.to_string(), "path key is empty"));
        }
        Ok(())
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}", escape_segment(&self.field))?;
        if let Some(key) = &self.key {
            write!(f, "/{}", escape_segment(key))?;
        }
        Ok(())
    }
}

impl TryFrom<String> for PatchPath {
    type Error = CatalogError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<PatchPath> for String {
    fn from(path: PatchPath) -> Self {
        path.to_string()
    }
}

/// One declarative edit, encoded like a JSON Patch entry: `{"op", "path", "value"?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchAction,
    pub path: PatchPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl PatchOperation {
    pub fn add(path: PatchPath, value: serde_json::Value) -> Self {
        Self {
            op: PatchAction::Add,
            path,
            value: Some(value),
        }
    }

    pub fn remove(path: PatchPath) -> Self {
        Self {
            op: PatchAction::Remove,
            path,
            value: None,
        }
    }

    pub fn replace(path: PatchPath, value: serde_json::Value) -> Self {
        Self {
            op: PatchAction::Replace,
            path,
            value: Some(value),
        }
    }

    /// Value payload, required for add and replace
    pub fn required_value(&self) -> Result<&serde_json::Value> {
        self.value.as_ref().ok_or_else(|| {
            CatalogError::invalid_at(self.path.to_string(), format!("'{}' needs a value", self.op))
        })
    }

    /// Decode the value payload into the type the addressed field holds
    pub fn decode_value<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let value = self.required_value()?;
        serde_json::from_value(value.clone()).map_err(|e| {
            CatalogError::invalid_at(self.path.to_string(), format!("value type mismatch: {}", e))
        })
    }
}

/// Ordered sequence of patch operations for one aspect.
/// Serializes as a plain JSON array; order is significant and preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument {
    pub operations: Vec<PatchOperation>,
}

impl PatchDocument {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }

    pub fn push(&mut self, operation: PatchOperation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CatalogError::validation(format!("malformed patch document: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_escapes_keys_with_slashes() {
        let path = PatchPath::entry("customProperties", "team/owner~x");
        assert_eq!(path.to_string(), "/customProperties/team~1owner~0x");

        let parsed = PatchPath::parse("/customProperties/team~1owner~0x").unwrap();
        assert_eq!(parsed.field_name(), "customProperties");
        assert_eq!(parsed.key(), Some("team/owner~x"));
    }

    #[test]
    fn test_path_rejects_bad_shapes() {
        assert!(PatchPath::parse("tags").is_err());
        assert!(PatchPath::parse("/").is_err());
        assert!(PatchPath::parse("/owners/urn:li:corpuser:a/DATAOWNER").is_err());
        assert!(PatchPath::parse("/customProperties/").is_err());
    }

    #[test]
    fn test_check_agrees_with_parse() {
        assert!(PatchPath::entry("customProperties", "").check().is_err());
        assert!(PatchPath::field("").check().is_err());
        assert!(PatchPath::entry("tags", "urn:li:tag:a").check().is_ok());
    }

    #[test]
    fn test_document_wire_format_keeps_order() {
        let doc = PatchDocument::new(vec![
            PatchOperation::add(
                PatchPath::entry("customProperties", "x"),
                json!("1"),
            ),
            PatchOperation::remove(PatchPath::entry("customProperties", "x")),
            PatchOperation::replace(PatchPath::field("customProperties"), json!({"z": "9"})),
        ]);

        let wire = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            wire,
            json!([
                {"op": "add", "path": "/customProperties/x", "value": "1"},
                {"op": "remove", "path": "/customProperties/x"},
                {"op": "replace", "path": "/customProperties", "value": {"z": "9"}}
            ])
        );

        let back = PatchDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_from_json_reports_validation_error() {
        let err = PatchDocument::from_json(r#"[{"op": "move", "path": "/tags"}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));

        let err = PatchDocument::from_json(r#"[{"op": "add", "path": "tags"}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));
    }

    #[test]
    fn test_decode_value_type_mismatch() {
        let op = PatchOperation::add(PatchPath::entry("customProperties", "x"), json!(5));
        let err = op.decode_value::<String>().unwrap_err();
        assert!(err.to_string().contains("value type mismatch"));

        let op = PatchOperation::remove(PatchPath::entry("customProperties", "x"));
        assert!(op.required_value().is_err());
    }
}
