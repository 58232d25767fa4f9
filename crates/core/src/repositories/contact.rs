//! Contact-form messages from the public site.

use crate::error::{OpxError, OpxResult};
use crate::repositories::helpers::clamp_page;
use api_shared::models::ContactMessage;
use api_shared::requests::ContactReq;
use sqlx::PgPool;
use uuid::Uuid;

const CONTACT_COLUMNS: &str =
    "id, name, email, phone, subject, message, responded_at, created_at";

#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: &ContactReq) -> OpxResult<ContactMessage> {
        let query = format!(
            "INSERT INTO contact_messages (id, name, email, phone, subject, message)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CONTACT_COLUMNS}"
        );
        let message = sqlx::query_as::<_, ContactMessage>(&query)
            .bind(Uuid::new_v4())
            .bind(req.name.as_str())
            .bind(req.email.as_str())
            .bind(req.phone.as_deref())
            .bind(req.subject.as_deref())
            .bind(req.message.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(message)
    }

    /// Lists messages, unanswered first.
    pub async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> OpxResult<Vec<ContactMessage>> {
        let (limit, offset) = clamp_page(limit, offset);
        let query = format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_messages
             ORDER BY (responded_at IS NULL) DESC, created_at DESC
             LIMIT $1 OFFSET $2"
        );
        Ok(sqlx::query_as::<_, ContactMessage>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn mark_responded(&self, id: Uuid) -> OpxResult<()> {
        let result = sqlx::query(
            "UPDATE contact_messages SET responded_at = now()
             WHERE id = $1 AND responded_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("contact message"));
        }
        Ok(())
    }
}
