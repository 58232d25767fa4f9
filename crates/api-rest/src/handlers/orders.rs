//! Medical order endpoints: the wizard, the lifecycle, attachments and
//! appeals.
//!
//! Role rules in one place: doctors create and edit their own orders, admins
//! decide (status changes, appeal decisions) on any order, assistants read.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::models::{Appeal, MedicalOrder, OrderAttachment, OrderSummary};
use api_shared::requests::{
    AppealDecisionReq, CreateAppealReq, CreateOrderReq, InProgressQuery, OrderListQuery,
    StepValidationRes, UpdateOrderReq, UpdateOrderStatusReq, ValidationQuery,
};
use opx_core::repositories::{AppealsRepository, NotificationsRepository, OrdersRepository};
use opx_core::{OrderStatus, WizardStep};

fn parse_status(value: &str) -> Result<OrderStatus, ApiError> {
    OrderStatus::from_db_str(value)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown order status: {value}")))
}

/// Read access: admins and assistants see every order, doctors only their
/// own.
fn check_read(auth: &AuthSession, order: &MedicalOrder) -> Result<(), ApiError> {
    if auth.is_doctor() && order.doctor_id != auth.user.id {
        return Err(ApiError::Forbidden(
            "doctors can only view their own orders".into(),
        ));
    }
    Ok(())
}

/// Tells the order's doctor about a lifecycle change, unless the doctor is
/// the one acting. Notification failures are logged, not surfaced; the
/// status change itself already committed.
async fn notify_doctor(state: &AppState, actor: Uuid, order: &MedicalOrder, body: String) {
    if order.doctor_id == actor {
        return;
    }
    let result = NotificationsRepository::new(state.pool.clone())
        .create(order.doctor_id, "Order update", &body, Some(order.id))
        .await;
    if let Err(err) = result {
        tracing::warn!(order = %order.id, "notification fan-out failed: {err}");
    }
}

#[utoipa::path(
    get,
    path = "/api/medical-orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Order summaries, newest first", body = [OrderSummary]),
        (status = 400, description = "Unknown status filter")
    )
)]
/// Lists orders with joined patient/hospital/procedure names. Doctors are
/// always scoped to their own orders.
#[axum::debug_handler]
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let status = q.status.as_deref().map(parse_status).transpose()?;
    let doctor_id = auth.scope_doctor(q.doctor_id)?;
    let rows = OrdersRepository::new(state.pool.clone())
        .list(status, doctor_id, q.patient_id, q.limit, q.offset)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/medical-orders",
    request_body = CreateOrderReq,
    responses(
        (status = 201, description = "Draft order created", body = MedicalOrder),
        (status = 403, description = "Only doctors create orders")
    )
)]
/// Opens a new draft. With a patient preselected the wizard starts on the
/// hospital step.
#[axum::debug_handler]
pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<CreateOrderReq>,
) -> Result<(StatusCode, Json<MedicalOrder>), ApiError> {
    if !auth.is_doctor() {
        return Err(ApiError::Forbidden("only doctors create orders".into()));
    }
    let order = OrdersRepository::new(state.pool.clone())
        .create(auth.user.id, req.patient_id)
        .await?;
    tracing::info!(order = %order.id, doctor = %auth.user.id, "order draft created");
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/medical-orders/in-progress",
    params(InProgressQuery),
    responses(
        (status = 200, description = "The caller's latest editable draft", body = MedicalOrder),
        (status = 404, description = "Nothing to resume")
    )
)]
/// Resume lookup ("pedido em andamento"): the caller's most recently touched
/// editable draft, optionally narrowed to one patient.
#[axum::debug_handler]
pub async fn in_progress_order(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<InProgressQuery>,
) -> Result<Json<MedicalOrder>, ApiError> {
    if !auth.is_doctor() {
        return Err(ApiError::Forbidden(
            "only doctors have in-progress orders".into(),
        ));
    }
    let order = OrdersRepository::new(state.pool.clone())
        .find_in_progress(auth.user.id, q.patient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("no order in progress".into()))?;
    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/api/medical-orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The full order", body = MedicalOrder),
        (status = 403, description = "Another doctor's order"),
        (status = 404, description = "Unknown order")
    )
)]
#[axum::debug_handler]
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MedicalOrder>, ApiError> {
    let order = OrdersRepository::new(state.pool.clone()).get(id).await?;
    check_read(&auth, &order)?;
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/api/medical-orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderReq,
    responses(
        (status = 200, description = "Draft saved; staged uploads attached", body = MedicalOrder),
        (status = 403, description = "Another doctor's order"),
        (status = 404, description = "Unknown order or consumed upload token"),
        (status = 409, description = "Order no longer editable")
    )
)]
/// Wizard save-as-you-go. Saves the whole draft (last write wins), then
/// attaches any staged upload tokens the client collected since the last
/// save.
#[axum::debug_handler]
pub async fn update_order(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<UpdateOrderReq>,
) -> Result<Json<MedicalOrder>, ApiError> {
    let repo = OrdersRepository::new(state.pool.clone());
    let current = repo.get(id).await?;
    auth.require_order_access(current.doctor_id)?;

    let order = repo.update_draft(id, &req).await?;

    for token in &req.staged_uploads {
        let staged = state.uploads.staged(token).map_err(opx_core::OpxError::from)?;
        let stored = state
            .uploads
            .attach_to_order(id, &staged)
            .map_err(opx_core::OpxError::from)?;
        repo.add_attachment(id, &stored, auth.user.id).await?;
    }

    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/api/medical-orders/{id}/validation",
    params(("id" = Uuid, Path, description = "Order id"), ValidationQuery),
    responses(
        (status = 200, description = "Presence-check result through the requested step", body = StepValidationRes),
        (status = 400, description = "Step out of range"),
        (status = 404, description = "Unknown order")
    )
)]
/// Dry-run wizard validation: which fields are still missing through the
/// given step. Submitting requires all five steps clean.
#[axum::debug_handler]
pub async fn validate_order(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Query(q): Query<ValidationQuery>,
) -> Result<Json<StepValidationRes>, ApiError> {
    let order = OrdersRepository::new(state.pool.clone()).get(id).await?;
    check_read(&auth, &order)?;

    let step_number = q.step.unwrap_or(order.current_step);
    let step = WizardStep::from_number(step_number)
        .ok_or_else(|| ApiError::BadRequest(format!("no wizard step {step_number}")))?;

    let draft = opx_core::repositories::orders::draft_of(&order);
    let missing: Vec<String> = draft
        .validate_through(step)
        .into_iter()
        .map(str::to_owned)
        .collect();
    Ok(Json(StepValidationRes {
        valid: missing.is_empty(),
        missing_fields: missing,
    }))
}

#[utoipa::path(
    post,
    path = "/api/medical-orders/{id}/submit",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order submitted", body = MedicalOrder),
        (status = 400, description = "Draft incomplete"),
        (status = 403, description = "Another doctor's order"),
        (status = 409, description = "Order not in a submittable state")
    )
)]
/// Final wizard step: full validation across all five steps, then the
/// transition to Submitted.
#[axum::debug_handler]
pub async fn submit_order(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MedicalOrder>, ApiError> {
    let repo = OrdersRepository::new(state.pool.clone());
    let current = repo.get(id).await?;
    auth.require_order_access(current.doctor_id)?;
    let order = repo.submit(id).await?;
    tracing::info!(order = %order.id, "order submitted");
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/api/medical-orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusReq,
    responses(
        (status = 200, description = "Status changed; doctor notified", body = MedicalOrder),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
/// Admin lifecycle decision (authorize, deny, complete). The owning doctor
/// gets a notification.
#[axum::debug_handler]
pub async fn update_order_status(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<UpdateOrderStatusReq>,
) -> Result<Json<MedicalOrder>, ApiError> {
    auth.require_admin()?;
    let to = parse_status(&req.status)?;
    let order = OrdersRepository::new(state.pool.clone())
        .update_status(id, to)
        .await?;
    notify_doctor(
        &state,
        auth.user.id,
        &order,
        format!("Order {} is now {}", order.id, to.as_db_str()),
    )
    .await;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/medical-orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = MedicalOrder),
        (status = 403, description = "Another doctor's order"),
        (status = 409, description = "Order already in a terminal state")
    )
)]
#[axum::debug_handler]
pub async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<MedicalOrder>, ApiError> {
    let repo = OrdersRepository::new(state.pool.clone());
    let current = repo.get(id).await?;
    auth.require_order_access(current.doctor_id)?;
    let order = repo.update_status(id, OrderStatus::Cancelled).await?;
    notify_doctor(
        &state,
        auth.user.id,
        &order,
        format!("Order {} was cancelled", order.id),
    )
    .await;
    Ok(Json(order))
}

#[utoipa::path(
    get,
    path = "/api/medical-orders/{id}/attachments",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Attachment metadata for the order", body = [OrderAttachment]),
        (status = 403, description = "Another doctor's order"),
        (status = 404, description = "Unknown order")
    )
)]
#[axum::debug_handler]
pub async fn list_order_attachments(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<Vec<OrderAttachment>>, ApiError> {
    let repo = OrdersRepository::new(state.pool.clone());
    let order = repo.get(id).await?;
    check_read(&auth, &order)?;
    let rows = repo.list_attachments(id).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/medical-orders/{id}/appeals",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = CreateAppealReq,
    responses(
        (status = 201, description = "Appeal opened; order now under appeal", body = Appeal),
        (status = 403, description = "Another doctor's order"),
        (status = 409, description = "Order is not denied")
    )
)]
#[axum::debug_handler]
pub async fn create_appeal(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<CreateAppealReq>,
) -> Result<(StatusCode, Json<Appeal>), ApiError> {
    let current = OrdersRepository::new(state.pool.clone()).get(id).await?;
    auth.require_order_access(current.doctor_id)?;
    let appeal = AppealsRepository::new(state.pool.clone())
        .create(id, auth.user.id, &req.justification)
        .await?;
    tracing::info!(order = %id, appeal = %appeal.id, "appeal opened");
    Ok((StatusCode::CREATED, Json(appeal)))
}

#[utoipa::path(
    get,
    path = "/api/medical-orders/{id}/appeals",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Appeals for the order, newest first", body = [Appeal]),
        (status = 403, description = "Another doctor's order"),
        (status = 404, description = "Unknown order")
    )
)]
#[axum::debug_handler]
pub async fn list_appeals(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<Vec<Appeal>>, ApiError> {
    let order = OrdersRepository::new(state.pool.clone()).get(id).await?;
    check_read(&auth, &order)?;
    let rows = AppealsRepository::new(state.pool.clone())
        .list_for_order(id)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/appeals/{id}/decision",
    params(("id" = Uuid, Path, description = "Appeal id")),
    request_body = AppealDecisionReq,
    responses(
        (status = 200, description = "Appeal decided; order and doctor updated", body = Appeal),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Unknown or already-decided appeal")
    )
)]
/// Admin verdict on an open appeal: approve moves the order to Authorized,
/// reject back to Denied. Either way the doctor is notified.
#[axum::debug_handler]
pub async fn decide_appeal(
    State(state): State<AppState>,
    auth: AuthSession,
    AxumPath(id): AxumPath<Uuid>,
    Json(req): Json<AppealDecisionReq>,
) -> Result<Json<Appeal>, ApiError> {
    auth.require_admin()?;
    let appeal = AppealsRepository::new(state.pool.clone())
        .decide(id, auth.user.id, req.approve, req.notes.as_deref())
        .await?;
    let order = OrdersRepository::new(state.pool.clone())
        .get(appeal.order_id)
        .await?;
    let verdict = if req.approve { "approved" } else { "rejected" };
    notify_doctor(
        &state,
        auth.user.id,
        &order,
        format!("Appeal on order {} was {verdict}", order.id),
    )
    .await;
    Ok(Json(appeal))
}
