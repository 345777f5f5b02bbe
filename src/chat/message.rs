use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schemas::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub processing_time: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            processing_time: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        sources: Vec<Source>,
        processing_time: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            sources,
            processing_time,
            created_at: Utc::now(),
        }
    }
}
