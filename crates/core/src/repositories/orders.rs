//! Surgical orders: draft persistence, lifecycle transitions, attachments.
//!
//! The wizard edits a single mutable row. Every save overwrites the draft
//! columns (last-write-wins, by design), while the status column only moves
//! along the transitions [`OrderStatus::can_transition`] allows.

use crate::error::{OpxError, OpxResult};
use crate::order_flow::{OrderDraft, OrderStatus, WizardStep};
use crate::repositories::helpers::clamp_page;
use api_shared::models::{MedicalOrder, OrderAttachment, OrderSummary};
use api_shared::requests::UpdateOrderReq;
use opx_files::StoredFile;
use sqlx::PgPool;
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, doctor_id, patient_id, hospital_id, clinical_indication, \
     cid_code_ids, procedure_id, secondary_procedure_ids, opme_item_ids, opme_item_quantities, \
     supplier_ids, additional_notes, status, current_step, submitted_at, decided_at, \
     created_at, updated_at";

const ATTACHMENT_COLUMNS: &str =
    "id, order_id, kind, file_name, relative_path, media_type, size_bytes, uploaded_by, created_at";

/// Builds the wizard view of a stored order row.
pub fn draft_of(order: &MedicalOrder) -> OrderDraft {
    OrderDraft {
        patient_id: order.patient_id,
        hospital_id: order.hospital_id,
        clinical_indication: order.clinical_indication.clone(),
        cid_code_ids: order.cid_code_ids.clone(),
        procedure_id: order.procedure_id,
        secondary_procedure_ids: order.secondary_procedure_ids.clone(),
        opme_item_ids: order.opme_item_ids.clone(),
        opme_item_quantities: order.opme_item_quantities.clone(),
        supplier_ids: order.supplier_ids.clone(),
        additional_notes: order.additional_notes.clone(),
    }
}

/// Parses the status column, which only this crate writes.
pub fn status_of(order: &MedicalOrder) -> OpxResult<OrderStatus> {
    OrderStatus::from_db_str(&order.status)
        .ok_or_else(|| OpxError::InvalidState(format!("unknown status {}", order.status)))
}

#[derive(Debug, Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a new draft for the doctor, optionally pre-selecting a patient.
    pub async fn create(
        &self,
        doctor_id: Uuid,
        patient_id: Option<Uuid>,
    ) -> OpxResult<MedicalOrder> {
        // With a patient already chosen the wizard lands on step 2.
        let step = if patient_id.is_some() {
            WizardStep::Hospital
        } else {
            WizardStep::Patient
        };
        let query = format!(
            "INSERT INTO medical_orders (id, doctor_id, patient_id, status, current_step)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, MedicalOrder>(&query)
            .bind(Uuid::new_v4())
            .bind(doctor_id)
            .bind(patient_id)
            .bind(OrderStatus::InProgress.as_db_str())
            .bind(step.number())
            .fetch_one(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn get(&self, id: Uuid) -> OpxResult<MedicalOrder> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM medical_orders WHERE id = $1");
        sqlx::query_as::<_, MedicalOrder>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OpxError::NotFound("order"))
    }

    /// Finds the order to resume: the doctor's most recently touched
    /// editable order, optionally narrowed to one patient.
    ///
    /// Plain last-write-wins lookup; if two browser tabs race, the later
    /// save simply wins.
    pub async fn find_in_progress(
        &self,
        doctor_id: Uuid,
        patient_id: Option<Uuid>,
    ) -> OpxResult<Option<MedicalOrder>> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {ORDER_COLUMNS} FROM medical_orders WHERE doctor_id = "
        ));
        builder.push_bind(doctor_id);
        builder.push(" AND status IN (");
        let mut statuses = builder.separated(", ");
        statuses.push_bind(OrderStatus::InProgress.as_db_str());
        statuses.push_bind(OrderStatus::AwaitingSubmission.as_db_str());
        builder.push(")");
        if let Some(patient_id) = patient_id {
            builder.push(" AND patient_id = ").push_bind(patient_id);
        }
        builder.push(" ORDER BY updated_at DESC LIMIT 1");

        Ok(builder
            .build_query_as::<MedicalOrder>()
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Persists a wizard save, overwriting all draft columns.
    ///
    /// The status toggles between `InProgress` and `AwaitingSubmission`
    /// depending on whether the accumulated draft passes all five steps.
    ///
    /// # Errors
    ///
    /// `InvalidState` when the order is no longer editable,
    /// `InvalidInput` for an unknown step number.
    pub async fn update_draft(&self, id: Uuid, req: &UpdateOrderReq) -> OpxResult<MedicalOrder> {
        let step = WizardStep::from_number(req.current_step)
            .ok_or_else(|| OpxError::InvalidInput(format!("unknown step {}", req.current_step)))?;

        let draft = OrderDraft {
            patient_id: req.patient_id,
            hospital_id: req.hospital_id,
            clinical_indication: req.clinical_indication.clone(),
            cid_code_ids: req.cid_code_ids.clone(),
            procedure_id: req.procedure_id,
            secondary_procedure_ids: req.secondary_procedure_ids.clone(),
            opme_item_ids: req.opme_item_ids.clone(),
            opme_item_quantities: req.opme_item_quantities.clone(),
            supplier_ids: req.supplier_ids.clone(),
            additional_notes: req.additional_notes.clone(),
        };
        let status = if draft.is_complete() {
            OrderStatus::AwaitingSubmission
        } else {
            OrderStatus::InProgress
        };

        let query = format!(
            "UPDATE medical_orders SET patient_id = $2, hospital_id = $3, \
             clinical_indication = $4, cid_code_ids = $5, procedure_id = $6, \
             secondary_procedure_ids = $7, opme_item_ids = $8, opme_item_quantities = $9, \
             supplier_ids = $10, additional_notes = $11, status = $12, current_step = $13, \
             updated_at = now()
             WHERE id = $1 AND status IN ($14, $15)
             RETURNING {ORDER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, MedicalOrder>(&query)
            .bind(id)
            .bind(draft.patient_id)
            .bind(draft.hospital_id)
            .bind(&draft.clinical_indication)
            .bind(&draft.cid_code_ids)
            .bind(draft.procedure_id)
            .bind(&draft.secondary_procedure_ids)
            .bind(&draft.opme_item_ids)
            .bind(&draft.opme_item_quantities)
            .bind(&draft.supplier_ids)
            .bind(&draft.additional_notes)
            .bind(status.as_db_str())
            .bind(step.number())
            .bind(OrderStatus::InProgress.as_db_str())
            .bind(OrderStatus::AwaitingSubmission.as_db_str())
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(order) => Ok(order),
            None => {
                // Distinguish a missing order from a sealed one.
                let current = self.get(id).await?;
                Err(OpxError::InvalidState(format!(
                    "order can no longer be edited (status {})",
                    current.status
                )))
            }
        }
    }

    /// Submits a complete order to the insurer.
    pub async fn submit(&self, id: Uuid) -> OpxResult<MedicalOrder> {
        let order = self.get(id).await?;
        let draft = draft_of(&order);
        let missing = draft.validate_through(WizardStep::Review);
        if !missing.is_empty() {
            return Err(OpxError::InvalidInput(format!(
                "order is incomplete, missing: {}",
                missing.join(", ")
            )));
        }
        let status = status_of(&order)?;
        if !status.can_transition(OrderStatus::Submitted) {
            return Err(OpxError::InvalidState(format!(
                "cannot submit an order in status {status}"
            )));
        }

        let query = format!(
            "UPDATE medical_orders SET status = $2, submitted_at = now(), updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, MedicalOrder>(&query)
            .bind(id)
            .bind(OrderStatus::Submitted.as_db_str())
            .bind(status.as_db_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OpxError::InvalidState("order changed while submitting".into()))
    }

    /// Moves the order to `to` if the lifecycle allows it.
    ///
    /// Stamps `decided_at` when the insurer's answer arrives.
    pub async fn update_status(&self, id: Uuid, to: OrderStatus) -> OpxResult<MedicalOrder> {
        let order = self.get(id).await?;
        let from = status_of(&order)?;
        if !from.can_transition(to) {
            return Err(OpxError::InvalidState(format!(
                "cannot move order from {from} to {to}"
            )));
        }

        let decided = matches!(to, OrderStatus::Authorized | OrderStatus::Denied);
        let query = format!(
            "UPDATE medical_orders SET status = $2, \
             decided_at = CASE WHEN $4 THEN now() ELSE decided_at END, updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, MedicalOrder>(&query)
            .bind(id)
            .bind(to.as_db_str())
            .bind(from.as_db_str())
            .bind(decided)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| OpxError::InvalidState("order changed while updating status".into()))
    }

    /// Lists orders for the listing screen, joined with the names it shows.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        doctor_id: Option<Uuid>,
        patient_id: Option<Uuid>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> OpxResult<Vec<OrderSummary>> {
        let (limit, offset) = clamp_page(limit, offset);
        let mut builder = sqlx::QueryBuilder::new(
            "SELECT o.id, o.doctor_id, u.name AS doctor_name, p.full_name AS patient_name, \
             h.name AS hospital_name, pr.name AS procedure_name, o.status, o.current_step, \
             o.created_at, o.updated_at
             FROM medical_orders o
             JOIN users u ON u.id = o.doctor_id
             LEFT JOIN patients p ON p.id = o.patient_id
             LEFT JOIN hospitals h ON h.id = o.hospital_id
             LEFT JOIN procedures pr ON pr.id = o.procedure_id
             WHERE true",
        );
        if let Some(status) = status {
            builder.push(" AND o.status = ").push_bind(status.as_db_str());
        }
        if let Some(doctor_id) = doctor_id {
            builder.push(" AND o.doctor_id = ").push_bind(doctor_id);
        }
        if let Some(patient_id) = patient_id {
            builder.push(" AND o.patient_id = ").push_bind(patient_id);
        }
        builder
            .push(" ORDER BY o.updated_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        Ok(builder
            .build_query_as::<OrderSummary>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Records an attachment moved into the order's upload directory.
    pub async fn add_attachment(
        &self,
        order_id: Uuid,
        file: &StoredFile,
        uploaded_by: Uuid,
    ) -> OpxResult<OrderAttachment> {
        let query = format!(
            "INSERT INTO order_attachments (id, order_id, kind, file_name, relative_path, \
             media_type, size_bytes, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ATTACHMENT_COLUMNS}"
        );
        let attachment = sqlx::query_as::<_, OrderAttachment>(&query)
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(&file.kind)
            .bind(&file.file_name)
            .bind(&file.relative_path)
            .bind(&file.media_type)
            .bind(file.size_bytes as i64)
            .bind(uploaded_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(attachment)
    }

    pub async fn list_attachments(&self, order_id: Uuid) -> OpxResult<Vec<OrderAttachment>> {
        let query = format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM order_attachments \
             WHERE order_id = $1 ORDER BY created_at"
        );
        Ok(sqlx::query_as::<_, OrderAttachment>(&query)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
