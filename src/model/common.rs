use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::make_user_urn;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Who changed something and when (epoch milliseconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub time: i64,
    pub actor: String,
}

impl AuditStamp {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            time: chrono::Utc::now().timestamp_millis(),
            actor: actor.into(),
        }
    }

    /// Stamp for changes made by the service itself
    pub fn system() -> Self {
        Self::new(make_user_urn("system"))
    }
}

impl Default for AuditStamp {
    fn default() -> Self {
        Self::system()
    }
}
