//! User accounts and credentials.
//!
//! Passwords are stored as bcrypt hashes; the hash column never leaves this
//! module. Password reset is token-based: a one-time token with a short TTL
//! is persisted in `password_resets` and consumed on use.

use crate::error::{OpxError, OpxResult};
use api_shared::models::User;
use chrono::{Duration, Utc};
use opx_types::{Crm, EmailAddress, NonEmptyText};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

const USER_COLUMNS: &str = "id, name, email, role, crm, active, created_at";

/// Access roles, in decreasing privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Doctor,
    /// Clinic staff: read-only on orders, full patient registration.
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Assistant => "assistant",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        Some(match value {
            "admin" => Role::Admin,
            "doctor" => Role::Doctor,
            "assistant" => Role::Assistant,
            _ => return None,
        })
    }
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UsersRepository {
    pool: PgPool,
}

impl UsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a user with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a short password or a doctor without CRM,
    /// `Conflict` when the email is already registered.
    pub async fn create(
        &self,
        name: &NonEmptyText,
        email: &EmailAddress,
        password: &str,
        role: Role,
        crm: Option<&Crm>,
    ) -> OpxResult<User> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(OpxError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if role == Role::Doctor && crm.is_none() {
            return Err(OpxError::InvalidInput(
                "doctors must have a CRM registration".into(),
            ));
        }

        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, role, crm)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(name.as_str())
            .bind(email.as_str())
            .bind(&hash)
            .bind(role.as_str())
            .bind(crm.map(|c| c.as_str()))
            .fetch_one(&self.pool)
            .await
            .map_err(OpxError::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    OpxError::Conflict(format!("email {email} is already registered"))
                } else {
                    e
                }
            })?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> OpxResult<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("user"))
    }

    pub async fn find_by_email(&self, email: &EmailAddress) -> OpxResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list(&self) -> OpxResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY name");
        Ok(sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Updates profile fields and the active flag; the email is immutable.
    pub async fn update(
        &self,
        id: Uuid,
        name: &NonEmptyText,
        role: Role,
        crm: Option<&Crm>,
        active: bool,
    ) -> OpxResult<User> {
        if role == Role::Doctor && crm.is_none() {
            return Err(OpxError::InvalidInput(
                "doctors must have a CRM registration".into(),
            ));
        }
        let query = format!(
            "UPDATE users SET name = $2, role = $3, crm = $4, active = $5, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name.as_str())
            .bind(role.as_str())
            .bind(crm.map(|c| c.as_str()))
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("user"))
    }

    /// Checks email/password against the stored hash.
    ///
    /// Deactivated accounts fail the same way as wrong passwords, so the
    /// response does not reveal which of the two it was.
    pub async fn verify_credentials(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> OpxResult<User> {
        let row = sqlx::query_as::<_, (Uuid, String, bool)>(
            "SELECT id, password_hash, active FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, hash, active)) = row else {
            // Burn a comparison anyway to keep timing flat for unknown emails.
            let _ = bcrypt::verify(password, "$2b$12$C6UzMDM.H6dfI/f/IKcEeO7ZUbmeYkOQteu6v1InT0/PcfO1l1Bqa");
            return Err(OpxError::Unauthorized);
        };

        if !bcrypt::verify(password, &hash)? || !active {
            return Err(OpxError::Unauthorized);
        }
        self.get(id).await
    }

    /// Issues a password-reset token for the account, valid for `ttl_minutes`.
    pub async fn create_reset_token(
        &self,
        email: &EmailAddress,
        ttl_minutes: i64,
    ) -> OpxResult<String> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(OpxError::NotFound("user"))?;

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        sqlx::query(
            "INSERT INTO password_resets (token, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(&token)
        .bind(user.id)
        .bind(Utc::now() + Duration::minutes(ttl_minutes))
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Consumes a reset token and replaces the account password.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the token is unknown, expired or already used,
    /// or when the new password is too short.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> OpxResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(OpxError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, (Uuid,)>(
            "UPDATE password_resets SET used_at = now()
             WHERE token = $1 AND used_at IS NULL AND expires_at > now()
             RETURNING user_id",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id,)) = row else {
            return Err(OpxError::InvalidInput(
                "reset token is invalid or expired".into(),
            ));
        };

        let hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(&hash)
            .execute(&mut *tx)
            .await?;

        // Any live sessions die with the old password.
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips() {
        for role in [Role::Admin, Role::Doctor, Role::Assistant] {
            assert_eq!(Role::from_str_opt(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str_opt("root"), None);
    }
}
