use super::traits::UserRepository;
use crate::domain::{User, UserPatch};
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserRepositoryImpl {
    pool: PgPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_by_id_or_email(&self, identifier: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, provider, roles, created_at, updated_at FROM users WHERE id::text = $1 OR email = $1"
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn upsert_by_email(&self, email: &str, patch: &UserPatch) -> AppResult<User> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, provider, roles, created_at, updated_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, ARRAY['user']::role[]), $6, $6)
            ON CONFLICT (email) DO UPDATE SET
                password_hash = COALESCE(EXCLUDED.password_hash, users.password_hash),
                provider = COALESCE(EXCLUDED.provider, users.provider),
                roles = COALESCE($5, users.roles),
                updated_at = EXCLUDED.updated_at
            RETURNING id, email, password_hash, provider, roles, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&patch.password_hash)
        .bind(patch.provider)
        .bind(patch.roles.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, provider, roles, created_at, updated_at FROM users ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
