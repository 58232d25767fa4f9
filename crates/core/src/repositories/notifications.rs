//! Per-user notifications.
//!
//! Order status changes fan one of these out to the order's doctor; the SPA
//! polls the unread count for its badge.

use crate::error::{OpxError, OpxResult};
use crate::repositories::helpers::clamp_page;
use api_shared::models::Notification;
use sqlx::PgPool;
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, body, order_id, read_at, created_at";

#[derive(Debug, Clone)]
pub struct NotificationsRepository {
    pool: PgPool,
}

impl NotificationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        title: &str,
        body: &str,
        order_id: Option<Uuid>,
    ) -> OpxResult<Notification> {
        let query = format!(
            "INSERT INTO notifications (id, user_id, title, body, order_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(title)
            .bind(body)
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(notification)
    }

    /// Lists the user's notifications, unread first, newest within each group.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<Notification>> {
        let (limit, offset) = clamp_page(limit, offset);
        let query = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1
             ORDER BY (read_at IS NULL) DESC, created_at DESC
             LIMIT $2 OFFSET $3"
        );
        Ok(sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> OpxResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT count(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Marks one notification read. Scoped to the owner, so one user cannot
    /// clear another's badge.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> OpxResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = now()
             WHERE id = $1 AND user_id = $2 AND read_at IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(OpxError::NotFound("notification"));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> OpxResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = now() WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
