//! Dashboard report endpoints. Every report shares the same filter
//! (`from`/`to` on order creation, optional `doctorId`) and returns
//! chart-ready label/count rows. Doctors are always scoped to themselves.

use axum::extract::{Query, State};
use axum::response::Json;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::CountRow;
use api_shared::requests::ReportQuery;
use opx_core::repositories::reports::ReportFilter;
use opx_core::repositories::ReportsRepository;

fn filter_for(auth: &AuthSession, q: ReportQuery) -> Result<ReportFilter, ApiError> {
    Ok(ReportFilter {
        from: q.from,
        to: q.to,
        doctor_id: auth.scope_doctor(q.doctor_id)?,
    })
}

#[utoipa::path(
    get,
    path = "/api/reports/orders-by-status",
    params(ReportQuery),
    responses(
        (status = 200, description = "Order counts per status", body = [CountRow])
    )
)]
#[axum::debug_handler]
pub async fn orders_by_status(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<ReportQuery>,
) -> Result<Json<Vec<CountRow>>, ApiError> {
    let filter = filter_for(&auth, q)?;
    let rows = ReportsRepository::new(state.pool.clone())
        .orders_by_status(filter)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/reports/orders-by-hospital",
    params(ReportQuery),
    responses(
        (status = 200, description = "Order counts per hospital", body = [CountRow])
    )
)]
#[axum::debug_handler]
pub async fn orders_by_hospital(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<ReportQuery>,
) -> Result<Json<Vec<CountRow>>, ApiError> {
    let filter = filter_for(&auth, q)?;
    let rows = ReportsRepository::new(state.pool.clone())
        .orders_by_hospital(filter)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/reports/orders-per-month",
    params(ReportQuery),
    responses(
        (status = 200, description = "Order counts per month, oldest first", body = [CountRow])
    )
)]
/// Without an explicit range the report covers the last twelve months.
#[axum::debug_handler]
pub async fn orders_per_month(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<ReportQuery>,
) -> Result<Json<Vec<CountRow>>, ApiError> {
    let filter = filter_for(&auth, q)?;
    let rows = ReportsRepository::new(state.pool.clone())
        .orders_per_month(filter)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/reports/top-procedures",
    params(ReportQuery),
    responses(
        (status = 200, description = "Ten most ordered procedures", body = [CountRow])
    )
)]
#[axum::debug_handler]
pub async fn top_procedures(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<ReportQuery>,
) -> Result<Json<Vec<CountRow>>, ApiError> {
    let filter = filter_for(&auth, q)?;
    let rows = ReportsRepository::new(state.pool.clone())
        .top_procedures(filter)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/reports/top-opme-items",
    params(ReportQuery),
    responses(
        (status = 200, description = "Ten most requested OPME items", body = [CountRow])
    )
)]
#[axum::debug_handler]
pub async fn top_opme_items(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<ReportQuery>,
) -> Result<Json<Vec<CountRow>>, ApiError> {
    let filter = filter_for(&auth, q)?;
    let rows = ReportsRepository::new(state.pool.clone())
        .top_opme_items(filter)
        .await?;
    Ok(Json(rows))
}
