//! Patient registry endpoints.
//!
//! Patients are shared working data for the whole clinic, so every
//! authenticated role may manage them.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::Patient;
use api_shared::requests::{ListQuery, MessageRes, PatientReq};
use opx_core::repositories::PatientsRepository;

#[utoipa::path(
    get,
    path = "/api/patients",
    params(ListQuery),
    responses(
        (status = 200, description = "Active patients, optionally filtered", body = [Patient])
    )
)]
/// Lists active patients; `search` matches name or CPF.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    _auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = PatientsRepository::new(state.pool.clone())
        .list(q.search.as_deref(), q.limit, q.offset)
        .await?;
    Ok(Json(patients))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = PatientReq,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 409, description = "CPF already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    _auth: AuthSession,
    Json(req): Json<PatientReq>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = PatientsRepository::new(state.pool.clone())
        .create(&req)
        .await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient", body = Patient),
        (status = 404, description = "Unknown patient")
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = PatientsRepository::new(state.pool.clone()).get(id).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient id")),
    request_body = PatientReq,
    responses(
        (status = 200, description = "Updated patient", body = Patient),
        (status = 404, description = "Unknown patient"),
        (status = 409, description = "CPF already registered to another patient")
    )
)]
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<PatientReq>,
) -> Result<Json<Patient>, ApiError> {
    let patient = PatientsRepository::new(state.pool.clone())
        .update(id, &req)
        .await?;
    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient deactivated", body = MessageRes),
        (status = 404, description = "Unknown patient")
    )
)]
/// Soft delete: the patient stops appearing in lists, existing orders keep
/// their reference.
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    PatientsRepository::new(state.pool.clone())
        .deactivate(id)
        .await?;
    Ok(Json(MessageRes {
        message: "patient deactivated".into(),
    }))
}
