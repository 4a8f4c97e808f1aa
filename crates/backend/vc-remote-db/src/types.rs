use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// One fragment of a prompt framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSection {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: String,
    /// Explicit position; when absent, insertion order is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// Resolve section ordering: an explicit `order` wins, sections without one
/// keep their insertion position. Stable for ties.
pub fn normalize_sections(sections: Vec<PromptSection>) -> Vec<PromptSection> {
    let mut indexed: Vec<(usize, PromptSection)> = sections.into_iter().enumerate().collect();
    indexed.sort_by_key(|(i, s)| s.order.unwrap_or(*i as i32));
    indexed.into_iter().map(|(_, s)| s).collect()
}

/// A named, reusable prompt template composed of ordered sections.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromptFramework {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sections: Json<Vec<PromptSection>>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A configured agent instance. `prompt_framework_id` is a mandatory foreign
/// key; integrity is enforced by the database, not the application layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AgentConfig {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub context: String,
    pub prompt_framework_id: Uuid,
    pub profile: Option<String>,
    pub tools: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Generic key/value configuration record; keys are unique, POST upserts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConfigurationEntry {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Backoffice visibility record for a statically linked tool.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ToolRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
