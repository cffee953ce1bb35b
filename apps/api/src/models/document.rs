use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: String,
    pub title: String,
    pub content: Value,
    pub created_at: DateTime<Utc>,
}
