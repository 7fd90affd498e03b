use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failures surfaced by builders, the patch engine and the storage seam.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Builder misuse, e.g. a missing or malformed entity URN
    #[error("build error: {0}")]
    Build(String),

    /// A proposal or patch document does not fit the aspect schema.
    /// Nothing from the proposal has been persisted.
    #[error("{}", describe_validation(.operation, .path, .reason))]
    Validation {
        operation: Option<usize>,
        path: Option<String>,
        reason: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_validation(operation: &Option<usize>, path: &Option<String>, reason: &str) -> String {
    match (operation, path) {
        (Some(index), Some(path)) => {
            format!("validation error in operation {index} at {path}: {reason}")
        }
        (Some(index), None) => format!("validation error in operation {index}: {reason}"),
        (None, Some(path)) => format!("validation error at {path}: {reason}"),
        (None, None) => format!("validation error: {reason}"),
    }
}

impl CatalogError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            operation: None,
            path: None,
            reason: reason.into(),
        }
    }

    pub fn invalid_at(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            operation: None,
            path: Some(path.into()),
            reason: reason.into(),
        }
    }

    /// Attach the position of the failing operation within its patch document.
    /// Non-validation errors pass through untouched.
    #[must_use]
    pub fn at_operation(self, index: usize) -> Self {
        match self {
            Self::Validation { path, reason, .. } => Self::Validation {
                operation: Some(index),
                path,
                reason,
            },
            other => other,
        }
    }

    /// Short machine-readable label used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Build(_) => "build",
            Self::Validation { .. } => "validation",
            Self::NotFound(_) => "not_found",
            Self::Transport(_) => "transport",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
