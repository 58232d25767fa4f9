//! Login, logout and password-reset endpoints.

use axum::extract::State;
use axum::response::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{AuthSession, SESSION_COOKIE};
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::User;
use api_shared::requests::{
    ForgotPasswordReq, ForgotPasswordRes, LoginReq, MessageRes, ResetPasswordReq,
};
use opx_core::repositories::{SessionsRepository, UsersRepository};

/// How long a password-reset token stays valid.
const RESET_TOKEN_TTL_MINUTES: i64 =
    (opx_core::config::DEFAULT_RESET_TOKEN_TTL.as_secs() / 60) as i64;

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = User),
        (status = 401, description = "Invalid credentials")
    )
)]
/// Verifies credentials and opens a session.
///
/// The session token is set as an HttpOnly cookie; the body carries the
/// authenticated user so the client can render the logged-in state.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginReq>,
) -> Result<(CookieJar, Json<User>), ApiError> {
    let users = UsersRepository::new(state.pool.clone());
    let user = users.verify_credentials(&req.email, &req.password).await?;

    let sessions = SessionsRepository::new(state.pool.clone());
    let token = sessions.create(user.id, state.cfg.session_ttl()).await?;

    tracing::info!(user = %user.id, "login");
    Ok((jar.add(session_cookie(token)), Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = MessageRes),
        (status = 401, description = "Not authenticated")
    )
)]
/// Deletes the caller's session row and clears the cookie.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthSession,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageRes>), ApiError> {
    SessionsRepository::new(state.pool.clone())
        .delete(&auth.token)
        .await?;
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    Ok((
        jar,
        Json(MessageRes {
            message: "logged out".into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn me(auth: AuthSession) -> Json<User> {
    Json(auth.user)
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordReq,
    responses(
        (status = 200, description = "Reset token issued", body = ForgotPasswordRes),
        (status = 404, description = "No account for that email")
    )
)]
/// Issues a password-reset token for the account.
///
/// There is no outbound mail integration; the token is returned in the
/// response for the operator to hand over out of band.
#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordReq>,
) -> Result<Json<ForgotPasswordRes>, ApiError> {
    let token = UsersRepository::new(state.pool.clone())
        .create_reset_token(&req.email, RESET_TOKEN_TTL_MINUTES)
        .await?;
    tracing::info!(email = %req.email, "password reset token issued");
    Ok(Json(ForgotPasswordRes { reset_token: token }))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordReq,
    responses(
        (status = 200, description = "Password updated, all sessions revoked", body = MessageRes),
        (status = 400, description = "Token invalid or expired")
    )
)]
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordReq>,
) -> Result<Json<MessageRes>, ApiError> {
    UsersRepository::new(state.pool.clone())
        .reset_password(&req.reset_token, &req.new_password)
        .await?;
    Ok(Json(MessageRes {
        message: "password updated".into(),
    }))
}
