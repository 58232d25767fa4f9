use axum::extract::State;
use axum::response::Json;

use crate::AppState;
use api_shared::HealthRes;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint.
///
/// Used by monitoring and load balancers; does not touch the database.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes::alive())
}
