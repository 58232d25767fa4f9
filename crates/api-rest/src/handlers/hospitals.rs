//! Hospital registry endpoints. Reads are open to every role, writes are
//! admin only.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::Hospital;
use api_shared::requests::{HospitalReq, ListQuery, MessageRes};
use opx_core::repositories::HospitalsRepository;

#[utoipa::path(
    get,
    path = "/api/hospitals",
    params(ListQuery),
    responses(
        (status = 200, description = "Active hospitals", body = [Hospital])
    )
)]
#[axum::debug_handler]
pub async fn list_hospitals(
    State(state): State<AppState>,
    _auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Hospital>>, ApiError> {
    let hospitals = HospitalsRepository::new(state.pool.clone())
        .list(q.search.as_deref(), q.limit, q.offset)
        .await?;
    Ok(Json(hospitals))
}

#[utoipa::path(
    post,
    path = "/api/hospitals",
    request_body = HospitalReq,
    responses(
        (status = 201, description = "Hospital created", body = Hospital),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "CNPJ already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_hospital(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<HospitalReq>,
) -> Result<(StatusCode, Json<Hospital>), ApiError> {
    auth.require_admin()?;
    let hospital = HospitalsRepository::new(state.pool.clone())
        .create(&req)
        .await?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

#[utoipa::path(
    get,
    path = "/api/hospitals/{id}",
    params(("id" = Uuid, Path, description = "Hospital id")),
    responses(
        (status = 200, description = "The hospital", body = Hospital),
        (status = 404, description = "Unknown hospital")
    )
)]
#[axum::debug_handler]
pub async fn get_hospital(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<Hospital>, ApiError> {
    let hospital = HospitalsRepository::new(state.pool.clone()).get(id).await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    put,
    path = "/api/hospitals/{id}",
    params(("id" = Uuid, Path, description = "Hospital id")),
    request_body = HospitalReq,
    responses(
        (status = 200, description = "Updated hospital", body = Hospital),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown hospital")
    )
)]
#[axum::debug_handler]
pub async fn update_hospital(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<HospitalReq>,
) -> Result<Json<Hospital>, ApiError> {
    auth.require_admin()?;
    let hospital = HospitalsRepository::new(state.pool.clone())
        .update(id, &req)
        .await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    delete,
    path = "/api/hospitals/{id}",
    params(("id" = Uuid, Path, description = "Hospital id")),
    responses(
        (status = 200, description = "Hospital deactivated", body = MessageRes),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown hospital")
    )
)]
#[axum::debug_handler]
pub async fn delete_hospital(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    auth.require_admin()?;
    HospitalsRepository::new(state.pool.clone())
        .deactivate(id)
        .await?;
    Ok(Json(MessageRes {
        message: "hospital deactivated".into(),
    }))
}
