//! Login sessions.
//!
//! A session is an opaque random token stored server-side with an expiry;
//! the cookie carries only the token. Logout and password reset delete rows,
//! so revocation is immediate.

use crate::error::{OpxError, OpxResult};
use api_shared::models::User;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

const TOKEN_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct SessionsRepository {
    pool: PgPool,
}

impl SessionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a session for the user and returns the token.
    pub async fn create(&self, user_id: Uuid, ttl: Duration) -> OpxResult<String> {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| OpxError::InvalidInput("session TTL out of range".into()))?;

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&token)
            .bind(user_id)
            .bind(Utc::now() + ttl)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Resolves a token to its (active, unexpired) user.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for unknown, expired, or deactivated-user tokens.
    pub async fn resolve(&self, token: &str) -> OpxResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.name, u.email, u.role, u.crm, u.active, u.created_at
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token = $1 AND s.expires_at > now() AND u.active",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OpxError::Unauthorized)
    }

    /// Deletes one session (logout). Unknown tokens are a no-op.
    pub async fn delete(&self, token: &str) -> OpxResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes expired sessions, returning how many were purged.
    pub async fn purge_expired(&self) -> OpxResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
