//! Appeals against denied orders.
//!
//! Opening an appeal moves the order to `UnderAppeal`; the decision moves it
//! back to `Authorized` or `Denied`. Both steps run in one transaction so an
//! appeal row never exists without its matching order status.

use crate::error::{OpxError, OpxResult};
use crate::order_flow::OrderStatus;
use crate::repositories::orders::status_of;
use api_shared::models::{Appeal, MedicalOrder};
use opx_types::NonEmptyText;
use sqlx::PgPool;
use uuid::Uuid;

const APPEAL_COLUMNS: &str = "id, order_id, opened_by, justification, status, decided_by, \
     decision_notes, created_at, decided_at";

#[derive(Debug, Clone)]
pub struct AppealsRepository {
    pool: PgPool,
}

impl AppealsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens an appeal on a denied order.
    pub async fn create(
        &self,
        order_id: Uuid,
        opened_by: Uuid,
        justification: &NonEmptyText,
    ) -> OpxResult<Appeal> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, MedicalOrder>(
            "SELECT id, doctor_id, patient_id, hospital_id, clinical_indication, cid_code_ids, \
             procedure_id, secondary_procedure_ids, opme_item_ids, opme_item_quantities, \
             supplier_ids, additional_notes, status, current_step, submitted_at, decided_at, \
             created_at, updated_at
             FROM medical_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OpxError::NotFound("order"))?;

        let status = status_of(&order)?;
        if !status.can_transition(OrderStatus::UnderAppeal) {
            return Err(OpxError::InvalidState(format!(
                "cannot appeal an order in status {status}"
            )));
        }

        sqlx::query("UPDATE medical_orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(order_id)
            .bind(OrderStatus::UnderAppeal.as_db_str())
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO appeals (id, order_id, opened_by, justification, status)
             VALUES ($1, $2, $3, $4, 'open')
             RETURNING {APPEAL_COLUMNS}"
        );
        let appeal = sqlx::query_as::<_, Appeal>(&query)
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(opened_by)
            .bind(justification.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(appeal)
    }

    pub async fn list_for_order(&self, order_id: Uuid) -> OpxResult<Vec<Appeal>> {
        let query = format!(
            "SELECT {APPEAL_COLUMNS} FROM appeals WHERE order_id = $1 ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, Appeal>(&query)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Records the insurer's answer to an open appeal and moves the order
    /// to `Authorized` (approved) or back to `Denied` (rejected).
    ///
    /// The order is locked and its status re-checked inside the
    /// transaction: an order cancelled while its appeal was open stays
    /// cancelled, and the verdict is rejected as `InvalidState`.
    pub async fn decide(
        &self,
        appeal_id: Uuid,
        decided_by: Uuid,
        approve: bool,
        notes: Option<&str>,
    ) -> OpxResult<Appeal> {
        let mut tx = self.pool.begin().await?;

        let order_id: Uuid = sqlx::query_scalar(
            "SELECT order_id FROM appeals WHERE id = $1 AND status = 'open' FOR UPDATE",
        )
        .bind(appeal_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OpxError::NotFound("open appeal"))?;

        let order = sqlx::query_as::<_, MedicalOrder>(
            "SELECT id, doctor_id, patient_id, hospital_id, clinical_indication, cid_code_ids, \
             procedure_id, secondary_procedure_ids, opme_item_ids, opme_item_quantities, \
             supplier_ids, additional_notes, status, current_step, submitted_at, decided_at, \
             created_at, updated_at
             FROM medical_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OpxError::NotFound("order"))?;

        let order_status = if approve {
            OrderStatus::Authorized
        } else {
            OrderStatus::Denied
        };
        let status = status_of(&order)?;
        if !status.can_transition(order_status) {
            return Err(OpxError::InvalidState(format!(
                "cannot decide an appeal on an order in status {status}"
            )));
        }

        let query = format!(
            "UPDATE appeals SET status = $2, decided_by = $3, decision_notes = $4, \
             decided_at = now()
             WHERE id = $1
             RETURNING {APPEAL_COLUMNS}"
        );
        let appeal = sqlx::query_as::<_, Appeal>(&query)
            .bind(appeal_id)
            .bind(if approve { "approved" } else { "rejected" })
            .bind(decided_by)
            .bind(notes)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE medical_orders SET status = $2, decided_at = now(), updated_at = now()
             WHERE id = $1",
        )
        .bind(order_id)
        .bind(order_status.as_db_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(appeal)
    }
}
