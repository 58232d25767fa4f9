//! Request bodies, query parameter types and small response envelopes.
//!
//! Bodies use the validated newtypes from `opx-types` wherever the field has
//! a canonical shape (CPF, CNPJ, CRM, CID-10, CBHPM, ANVISA, email), so a
//! malformed value is rejected during deserialization with a 400 rather than
//! reaching a repository.

use chrono::NaiveDate;
use opx_types::{
    AnvisaRegistration, CbhpmCode, CidCode, Cnpj, Cpf, Crm, EmailAddress, NonEmptyText,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginReq {
    #[schema(value_type = String)]
    pub email: EmailAddress,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordReq {
    #[schema(value_type = String)]
    pub email: EmailAddress,
}

/// Password reset token envelope.
///
/// There is no mail delivery in this system; the token is returned to the
/// caller (and logged) so an administrator can relay it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRes {
    pub reset_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordReq {
    pub reset_token: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[schema(value_type = String)]
    pub name: NonEmptyText,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    pub password: String,
    /// One of `admin`, `doctor`, `assistant`.
    pub role: String,
    #[schema(value_type = Option<String>)]
    pub crm: Option<Crm>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    #[schema(value_type = String)]
    pub name: NonEmptyText,
    pub role: String,
    #[schema(value_type = Option<String>)]
    pub crm: Option<Crm>,
    pub active: bool,
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientReq {
    #[schema(value_type = String)]
    pub full_name: NonEmptyText,
    #[schema(value_type = String)]
    pub cpf: Cpf,
    pub birth_date: NaiveDate,
    pub gender: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>)]
    pub email: Option<EmailAddress>,
    pub insurer: Option<String>,
    pub insurance_plan: Option<String>,
    pub insurance_card_number: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Hospitals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalReq {
    #[schema(value_type = String)]
    pub name: NonEmptyText,
    #[schema(value_type = String)]
    pub cnpj: Cnpj,
    pub address: Option<String>,
    #[schema(value_type = String)]
    pub city: NonEmptyText,
    /// Two-letter UF code, e.g. `SP`.
    #[schema(value_type = String)]
    pub state: NonEmptyText,
    pub phone: Option<String>,
}

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureReq {
    #[schema(value_type = String)]
    pub cbhpm_code: CbhpmCode,
    #[schema(value_type = String)]
    pub name: NonEmptyText,
    pub porte: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CidReq {
    #[schema(value_type = String)]
    pub code: CidCode,
    #[schema(value_type = String)]
    pub description: NonEmptyText,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpmeItemReq {
    #[schema(value_type = String)]
    pub technical_name: NonEmptyText,
    pub commercial_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub anvisa_registration: Option<AnvisaRegistration>,
    pub manufacturer: Option<String>,
    pub default_supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierReq {
    #[schema(value_type = String)]
    pub company_name: NonEmptyText,
    pub trade_name: Option<String>,
    #[schema(value_type = String)]
    pub cnpj: Cnpj,
    #[schema(value_type = Option<String>)]
    pub email: Option<EmailAddress>,
    pub phone: Option<String>,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderReq {
    /// Pre-selects the patient, skipping ahead in step 1.
    pub patient_id: Option<Uuid>,
}

/// Wizard save-as-you-go payload: the full accumulated form state.
///
/// Every save overwrites the draft columns (last-write-wins, matching the
/// single mutable row the wizard edits).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderReq {
    pub patient_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
    pub clinical_indication: Option<String>,
    #[serde(default)]
    pub cid_code_ids: Vec<Uuid>,
    pub procedure_id: Option<Uuid>,
    #[serde(default)]
    pub secondary_procedure_ids: Vec<Uuid>,
    #[serde(default)]
    pub opme_item_ids: Vec<Uuid>,
    #[serde(default)]
    pub opme_item_quantities: Vec<i32>,
    #[serde(default)]
    pub supplier_ids: Vec<Uuid>,
    pub additional_notes: Option<String>,
    /// 1-based wizard step the client is on after this save.
    pub current_step: i16,
    /// Staged upload tokens to attach to the order with this save.
    #[serde(default)]
    pub staged_uploads: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusReq {
    /// Target status in wire form, e.g. `authorized`.
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppealReq {
    #[schema(value_type = String)]
    pub justification: NonEmptyText,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppealDecisionReq {
    pub approve: bool,
    pub notes: Option<String>,
}

/// Step validation failures returned by wizard saves and submit attempts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepValidationRes {
    pub valid: bool,
    pub missing_fields: Vec<String>,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Result of a file upload.
///
/// When no order id accompanied the upload the file stays staged and `token`
/// must be passed back in a later wizard save to attach it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRes {
    pub token: Option<String>,
    pub attachment_id: Option<Uuid>,
    pub file_name: String,
    pub media_type: Option<String>,
    pub size_bytes: u64,
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactReq {
    #[schema(value_type = String)]
    pub name: NonEmptyText,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub subject: Option<String>,
    #[schema(value_type = String)]
    pub message: NonEmptyText,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Common list query: optional text search plus pagination.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InProgressQuery {
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ValidationQuery {
    /// Wizard step (1-5) to validate through; defaults to the order's
    /// current step.
    pub step: Option<i16>,
}

/// Upload target: with an order id the file is attached immediately,
/// without one it stays staged and the response carries a token.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    pub order_id: Option<Uuid>,
}

/// Date-range / doctor filter shared by every report endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountRes {
    pub unread: i64,
}

/// Generic JSON message body for errors and confirmations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}
