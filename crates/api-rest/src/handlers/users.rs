//! User administration (admin only).

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::User;
use api_shared::requests::{CreateUserReq, UpdateUserReq};
use opx_core::repositories::users::Role;
use opx_core::repositories::UsersRepository;

fn parse_role(value: &str) -> Result<Role, ApiError> {
    Role::from_str_opt(value).ok_or_else(|| ApiError::BadRequest(format!("unknown role: {value}")))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Not an administrator")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<Vec<User>>, ApiError> {
    auth.require_admin()?;
    let users = UsersRepository::new(state.pool.clone()).list().await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid role, short password, or doctor without CRM"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<CreateUserReq>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    auth.require_admin()?;
    let role = parse_role(&req.role)?;
    let user = UsersRepository::new(state.pool.clone())
        .create(&req.name, &req.email, &req.password, role, req.crm.as_ref())
        .await?;
    tracing::info!(user = %user.id, role = %req.role, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "Unknown user")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;
    let user = UsersRepository::new(state.pool.clone()).get(id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid role or doctor without CRM"),
        (status = 404, description = "Unknown user")
    )
)]
/// Updates name, role, CRM and active flag. Deactivating a user invalidates
/// their logins without deleting history.
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<UpdateUserReq>,
) -> Result<Json<User>, ApiError> {
    auth.require_admin()?;
    let role = parse_role(&req.role)?;
    let user = UsersRepository::new(state.pool.clone())
        .update(id, &req.name, role, req.crm.as_ref(), req.active)
        .await?;
    Ok(Json(user))
}
