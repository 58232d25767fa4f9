//! Reference catalogs: CBHPM procedures, CID-10 codes and OPME items.
//!
//! Reads are open to every role; catalog maintenance is admin only.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::{CidEntry, OpmeItem, Procedure};
use api_shared::requests::{CidReq, ListQuery, MessageRes, OpmeItemReq, ProcedureReq};
use opx_core::repositories::CatalogRepository;

// --- CBHPM procedures ---

#[utoipa::path(
    get,
    path = "/api/procedures",
    params(ListQuery),
    responses(
        (status = 200, description = "Active procedures; search matches CBHPM code or name", body = [Procedure])
    )
)]
#[axum::debug_handler]
pub async fn list_procedures(
    State(state): State<AppState>,
    _auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Procedure>>, ApiError> {
    let rows = CatalogRepository::new(state.pool.clone())
        .list_procedures(q.search.as_deref(), q.limit, q.offset)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/procedures",
    request_body = ProcedureReq,
    responses(
        (status = 201, description = "Procedure created", body = Procedure),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "CBHPM code already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_procedure(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<ProcedureReq>,
) -> Result<(StatusCode, Json<Procedure>), ApiError> {
    auth.require_admin()?;
    let row = CatalogRepository::new(state.pool.clone())
        .create_procedure(&req)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(
    get,
    path = "/api/procedures/{id}",
    params(("id" = Uuid, Path, description = "Procedure id")),
    responses(
        (status = 200, description = "The procedure", body = Procedure),
        (status = 404, description = "Unknown procedure")
    )
)]
#[axum::debug_handler]
pub async fn get_procedure(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<Procedure>, ApiError> {
    let row = CatalogRepository::new(state.pool.clone())
        .get_procedure(id)
        .await?;
    Ok(Json(row))
}

#[utoipa::path(
    put,
    path = "/api/procedures/{id}",
    params(("id" = Uuid, Path, description = "Procedure id")),
    request_body = ProcedureReq,
    responses(
        (status = 200, description = "Updated procedure", body = Procedure),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown procedure")
    )
)]
#[axum::debug_handler]
pub async fn update_procedure(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<ProcedureReq>,
) -> Result<Json<Procedure>, ApiError> {
    auth.require_admin()?;
    let row = CatalogRepository::new(state.pool.clone())
        .update_procedure(id, &req)
        .await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/procedures/{id}",
    params(("id" = Uuid, Path, description = "Procedure id")),
    responses(
        (status = 200, description = "Procedure deactivated", body = MessageRes),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown procedure")
    )
)]
#[axum::debug_handler]
pub async fn delete_procedure(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    auth.require_admin()?;
    CatalogRepository::new(state.pool.clone())
        .deactivate_procedure(id)
        .await?;
    Ok(Json(MessageRes {
        message: "procedure deactivated".into(),
    }))
}

// --- CID-10 codes ---

#[utoipa::path(
    get,
    path = "/api/cid-codes",
    params(ListQuery),
    responses(
        (status = 200, description = "CID-10 entries; search matches code or description", body = [CidEntry])
    )
)]
#[axum::debug_handler]
pub async fn list_cid_codes(
    State(state): State<AppState>,
    _auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<CidEntry>>, ApiError> {
    let rows = CatalogRepository::new(state.pool.clone())
        .list_cids(q.search.as_deref(), q.limit, q.offset)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/cid-codes",
    request_body = CidReq,
    responses(
        (status = 201, description = "CID entry created", body = CidEntry),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "Code already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_cid_code(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<CidReq>,
) -> Result<(StatusCode, Json<CidEntry>), ApiError> {
    auth.require_admin()?;
    let row = CatalogRepository::new(state.pool.clone())
        .create_cid(&req)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(
    get,
    path = "/api/cid-codes/{id}",
    params(("id" = Uuid, Path, description = "CID entry id")),
    responses(
        (status = 200, description = "The CID entry", body = CidEntry),
        (status = 404, description = "Unknown CID entry")
    )
)]
#[axum::debug_handler]
pub async fn get_cid_code(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<CidEntry>, ApiError> {
    let row = CatalogRepository::new(state.pool.clone()).get_cid(id).await?;
    Ok(Json(row))
}

#[utoipa::path(
    put,
    path = "/api/cid-codes/{id}",
    params(("id" = Uuid, Path, description = "CID entry id")),
    request_body = CidReq,
    responses(
        (status = 200, description = "Updated CID entry", body = CidEntry),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown CID entry")
    )
)]
#[axum::debug_handler]
pub async fn update_cid_code(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<CidReq>,
) -> Result<Json<CidEntry>, ApiError> {
    auth.require_admin()?;
    let row = CatalogRepository::new(state.pool.clone())
        .update_cid(id, &req)
        .await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/cid-codes/{id}",
    params(("id" = Uuid, Path, description = "CID entry id")),
    responses(
        (status = 200, description = "CID entry deleted", body = MessageRes),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown CID entry")
    )
)]
#[axum::debug_handler]
pub async fn delete_cid_code(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    auth.require_admin()?;
    CatalogRepository::new(state.pool.clone())
        .delete_cid(id)
        .await?;
    Ok(Json(MessageRes {
        message: "CID entry deleted".into(),
    }))
}

// --- OPME items ---

#[utoipa::path(
    get,
    path = "/api/opme-items",
    params(ListQuery),
    responses(
        (status = 200, description = "Active OPME items; search matches names or ANVISA registration", body = [OpmeItem])
    )
)]
#[axum::debug_handler]
pub async fn list_opme_items(
    State(state): State<AppState>,
    _auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<OpmeItem>>, ApiError> {
    let rows = CatalogRepository::new(state.pool.clone())
        .list_opme_items(q.search.as_deref(), q.limit, q.offset)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/opme-items",
    request_body = OpmeItemReq,
    responses(
        (status = 201, description = "OPME item created", body = OpmeItem),
        (status = 403, description = "Not an administrator")
    )
)]
#[axum::debug_handler]
pub async fn create_opme_item(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<OpmeItemReq>,
) -> Result<(StatusCode, Json<OpmeItem>), ApiError> {
    auth.require_admin()?;
    let row = CatalogRepository::new(state.pool.clone())
        .create_opme_item(&req)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(
    get,
    path = "/api/opme-items/{id}",
    params(("id" = Uuid, Path, description = "OPME item id")),
    responses(
        (status = 200, description = "The OPME item", body = OpmeItem),
        (status = 404, description = "Unknown OPME item")
    )
)]
#[axum::debug_handler]
pub async fn get_opme_item(
    State(state): State<AppState>,
    _auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<OpmeItem>, ApiError> {
    let row = CatalogRepository::new(state.pool.clone())
        .get_opme_item(id)
        .await?;
    Ok(Json(row))
}

#[utoipa::path(
    put,
    path = "/api/opme-items/{id}",
    params(("id" = Uuid, Path, description = "OPME item id")),
    request_body = OpmeItemReq,
    responses(
        (status = 200, description = "Updated OPME item", body = OpmeItem),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown OPME item")
    )
)]
#[axum::debug_handler]
pub async fn update_opme_item(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<OpmeItemReq>,
) -> Result<Json<OpmeItem>, ApiError> {
    auth.require_admin()?;
    let row = CatalogRepository::new(state.pool.clone())
        .update_opme_item(id, &req)
        .await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/opme-items/{id}",
    params(("id" = Uuid, Path, description = "OPME item id")),
    responses(
        (status = 200, description = "OPME item deactivated", body = MessageRes),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown OPME item")
    )
)]
#[axum::debug_handler]
pub async fn delete_opme_item(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    auth.require_admin()?;
    CatalogRepository::new(state.pool.clone())
        .deactivate_opme_item(id)
        .await?;
    Ok(Json(MessageRes {
        message: "OPME item deactivated".into(),
    }))
}
