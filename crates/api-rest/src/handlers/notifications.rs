//! Per-user notifications (order lifecycle fan-out lives in the order
//! handlers; these endpoints only read and acknowledge).

use axum::extract::{Path as AxumPath, Query, State};
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::Notification;
use api_shared::requests::{ListQuery, MessageRes, UnreadCountRes};
use opx_core::repositories::NotificationsRepository;

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(ListQuery),
    responses(
        (status = 200, description = "The caller's notifications, unread first", body = [Notification])
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let rows = NotificationsRepository::new(state.pool.clone())
        .list_for_user(auth.user.id, q.limit, q.offset)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread notification count for the badge", body = UnreadCountRes)
    )
)]
#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<UnreadCountRes>, ApiError> {
    let unread = NotificationsRepository::new(state.pool.clone())
        .unread_count(auth.user.id)
        .await?;
    Ok(Json(UnreadCountRes { unread }))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read", body = MessageRes),
        (status = 404, description = "Not the caller's notification")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MessageRes>, ApiError> {
    NotificationsRepository::new(state.pool.clone())
        .mark_read(id, auth.user.id)
        .await?;
    Ok(Json(MessageRes {
        message: "notification read".into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All of the caller's notifications marked read", body = MessageRes)
    )
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<MessageRes>, ApiError> {
    let marked = NotificationsRepository::new(state.pool.clone())
        .mark_all_read(auth.user.id)
        .await?;
    Ok(Json(MessageRes {
        message: format!("{marked} notifications read"),
    }))
}
