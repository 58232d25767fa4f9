//! Row-shaped wire models.
//!
//! Field names follow the database columns (snake_case) so `FromRow` maps
//! them directly; serde renames to camelCase for the SPA.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A system user: administrator, doctor or assistant.
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    /// CRM registration for doctors, absent for other roles.
    pub crm: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub insurer: Option<String>,
    pub insurance_plan: Option<String>,
    pub insurance_card_number: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub cnpj: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// CBHPM-coded surgical procedure.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: Uuid,
    pub cbhpm_code: String,
    pub name: String,
    /// CBHPM surgical porte classification, when known.
    pub porte: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// CID-10 catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CidEntry {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub company_name: String,
    pub trade_name: Option<String>,
    pub cnpj: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// OPME catalog item (orthopedic implants/materials/special equipment).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpmeItem {
    pub id: Uuid,
    pub technical_name: String,
    pub commercial_name: Option<String>,
    /// ANVISA registration number, stored as reference metadata only.
    pub anvisa_registration: Option<String>,
    pub manufacturer: Option<String>,
    pub default_supplier_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full surgical order row, draft fields included.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalOrder {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
    pub clinical_indication: Option<String>,
    pub cid_code_ids: Vec<Uuid>,
    pub procedure_id: Option<Uuid>,
    pub secondary_procedure_ids: Vec<Uuid>,
    pub opme_item_ids: Vec<Uuid>,
    pub opme_item_quantities: Vec<i32>,
    pub supplier_ids: Vec<Uuid>,
    pub additional_notes: Option<String>,
    pub status: String,
    /// 1-based wizard step the doctor last saved.
    pub current_step: i16,
    pub submitted_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order list row with the names a listing screen shows, joined in SQL.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub patient_name: Option<String>,
    pub hospital_name: Option<String>,
    pub procedure_name: Option<String>,
    pub status: String,
    pub current_step: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File attached to an order (exam image, medical report or generated PDF).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderAttachment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub kind: String,
    pub file_name: String,
    pub relative_path: String,
    pub media_type: Option<String>,
    pub size_bytes: i64,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appeal {
    pub id: Uuid,
    pub order_id: Uuid,
    pub opened_by: Uuid,
    pub justification: String,
    pub status: String,
    pub decided_by: Option<Uuid>,
    pub decision_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub order_id: Option<Uuid>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One bar/slice of a dashboard chart: a label and its count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountRow {
    pub label: String,
    pub count: i64,
}
