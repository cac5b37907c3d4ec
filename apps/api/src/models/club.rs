use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Club an admin manages. Events and admins reference it by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Trims a club name for storage and lookup. Returns `None` when nothing is left.
pub fn normalize_club_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
