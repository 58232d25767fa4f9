//! Public contact-form messages. Creation is the one unauthenticated
//! endpoint under `/api`; triage is admin only.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::ContactMessage;
use api_shared::requests::{ContactReq, ListQuery, MessageRes};
use opx_core::repositories::ContactRepository;

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactReq,
    responses(
        (status = 201, description = "Message received", body = ContactMessage)
    )
)]
#[axum::debug_handler]
pub async fn create_contact_message(
    State(state): State<AppState>,
    Json(req): Json<ContactReq>,
) -> Result<(StatusCode, Json<ContactMessage>), ApiError> {
    let message = ContactRepository::new(state.pool.clone()).create(&req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/api/contact",
    params(ListQuery),
    responses(
        (status = 200, description = "Messages, unanswered first", body = [ContactMessage]),
        (status = 403, description = "Not an administrator")
    )
)]
#[axum::debug_handler]
pub async fn list_contact_messages(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    auth.require_admin()?;
    let rows = ContactRepository::new(state.pool.clone())
        .list(q.limit, q.offset)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/contact/{id}/responded",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 200, description = "Marked responded", body = MessageRes),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown message")
    )
)]
#[axum::debug_handler]
pub async fn mark_contact_responded(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    auth.require_admin()?;
    ContactRepository::new(state.pool.clone())
        .mark_responded(id)
        .await?;
    Ok(Json(MessageRes {
        message: "message marked responded".into(),
    }))
}
