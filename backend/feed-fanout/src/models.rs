use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published post as stored in the durable `newspost` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsPost {
    pub post_id: i64,
    pub username: String,
    pub posted_at: DateTime<Utc>,
    pub content: String,
}

/// Durable account record, reduced to the fields the feed engine touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
    pub role: String,
}
