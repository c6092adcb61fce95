use async_trait::async_trait;
use sqlx::PgPool;

use super::{PostStore, RelationshipStore, UserStore};
use crate::error::FeedResult;
use crate::models::{NewsPost, User};

/// `newspost`-table implementation of [`PostStore`].
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create_post(&self, username: &str, content: &str) -> FeedResult<NewsPost> {
        let post = sqlx::query_as::<_, NewsPost>(
            r#"
            INSERT INTO newspost (username, posted_at, content)
            VALUES ($1, NOW(), $2)
            RETURNING post_id, username, posted_at, content
            "#,
        )
        .bind(username)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn get_post(&self, post_id: i64) -> FeedResult<Option<NewsPost>> {
        let post = sqlx::query_as::<_, NewsPost>(
            r#"
            SELECT post_id, username, posted_at, content
            FROM newspost
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }
}

/// `users`-table implementation of [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_user(&self, username: &str) -> FeedResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT username, email, role
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

/// `follows`-table implementation of [`RelationshipStore`].
#[derive(Clone)]
pub struct PgRelationshipStore {
    pool: PgPool,
}

impl PgRelationshipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipStore for PgRelationshipStore {
    async fn followers_of(&self, username: &str) -> FeedResult<Vec<String>> {
        let rows = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT follower_username
            FROM follows
            WHERE followee_username = $1
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(follower,)| follower).collect())
    }
}
