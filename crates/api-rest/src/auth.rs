//! Session-cookie authentication.
//!
//! Login stores an opaque token server-side and sets it in the
//! [`SESSION_COOKIE`] cookie (HttpOnly). The [`AuthSession`] extractor
//! resolves that cookie on every protected route; handlers then apply role
//! rules through the helpers here.

use crate::error::ApiError;
use crate::AppState;
use api_shared::models::User;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use opx_core::repositories::users::Role;
use opx_core::repositories::SessionsRepository;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "opx_session";

/// The authenticated caller, extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub role: Role,
    /// Raw token, kept so logout can delete the session row.
    pub token: String,
}

impl AuthSession {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }

    /// Admin-only gate.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("administrator access required".into()))
        }
    }

    /// Gate for order mutations: the owning doctor, or an admin.
    pub fn require_order_access(&self, order_doctor_id: Uuid) -> Result<(), ApiError> {
        if self.is_admin() || self.user.id == order_doctor_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "only the ordering doctor can modify this order".into(),
            ))
        }
    }

    /// Doctors only see their own data on list/report endpoints; admins and
    /// assistants may pass a doctor filter through.
    pub fn scope_doctor(&self, requested: Option<Uuid>) -> Result<Option<Uuid>, ApiError> {
        if self.is_doctor() {
            match requested {
                Some(id) if id != self.user.id => Err(ApiError::Forbidden(
                    "doctors can only view their own orders".into(),
                )),
                _ => Ok(Some(self.user.id)),
            }
        } else {
            Ok(requested)
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .ok_or(ApiError::Unauthorized)?;

        let sessions = SessionsRepository::new(state.pool.clone());
        let user = sessions.resolve(&token).await?;
        let role = Role::from_str_opt(&user.role).ok_or_else(|| {
            ApiError::Internal(format!("user {} has unknown role {}", user.id, user.role))
        })?;

        Ok(AuthSession { user, role, token })
    }
}
