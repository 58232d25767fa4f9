//! OPME supplier registry endpoints. Reads are open, writes are admin only.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::Supplier;
use api_shared::requests::{ListQuery, MessageRes, SupplierReq};
use opx_core::repositories::SuppliersRepository;

#[utoipa::path(
    get,
    path = "/api/suppliers",
    params(ListQuery),
    responses(
        (status = 200, description = "Active suppliers", body = [Supplier])
    )
)]
#[axum::debug_handler]
pub async fn list_suppliers(
    State(state): State<AppState>,
    _auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    let suppliers = SuppliersRepository::new(state.pool.clone())
        .list(q.search.as_deref(), q.limit, q.offset)
        .await?;
    Ok(Json(suppliers))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = SupplierReq,
    responses(
        (status = 201, description = "Supplier created", body = Supplier),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "CNPJ already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_supplier(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<SupplierReq>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    auth.require_admin()?;
    let supplier = SuppliersRepository::new(state.pool.clone())
        .create(&req)
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "The supplier", body = Supplier),
        (status = 404, description = "Unknown supplier")
    )
)]
#[axum::debug_handler]
pub async fn get_supplier(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = SuppliersRepository::new(state.pool.clone()).get(id).await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = SupplierReq,
    responses(
        (status = 200, description = "Updated supplier", body = Supplier),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown supplier")
    )
)]
#[axum::debug_handler]
pub async fn update_supplier(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<SupplierReq>,
) -> Result<Json<Supplier>, ApiError> {
    auth.require_admin()?;
    let supplier = SuppliersRepository::new(state.pool.clone())
        .update(id, &req)
        .await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier deactivated", body = MessageRes),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown supplier")
    )
)]
#[axum::debug_handler]
pub async fn delete_supplier(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    auth.require_admin()?;
    SuppliersRepository::new(state.pool.clone())
        .deactivate(id)
        .await?;
    Ok(Json(MessageRes {
        message: "supplier deactivated".into(),
    }))
}
