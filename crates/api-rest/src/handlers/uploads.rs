//! Multipart file uploads, one endpoint per kind.
//!
//! With an `orderId` query parameter the file lands under the order right
//! away and an attachment row is written. Without it the file is staged and
//! the returned token travels back in the next wizard save.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::auth::AuthSession;
use crate::error::ApiError;
use crate::AppState;
use api_shared::requests::{UploadQuery, UploadRes};
use opx_core::repositories::OrdersRepository;
use opx_core::OpxError;
use opx_files::UploadKind;

/// Pulls the first file field out of the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(ApiError::BadRequest("no file in request".into()))
}

async fn handle_upload(
    state: AppState,
    auth: AuthSession,
    kind: UploadKind,
    order_id: Option<uuid::Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    // Resolve the target order first so a 403/404 never leaves a staged
    // file behind.
    let repo = OrdersRepository::new(state.pool.clone());
    if let Some(order_id) = order_id {
        let order = repo.get(order_id).await?;
        auth.require_order_access(order.doctor_id)?;
    }

    let (file_name, bytes) = read_file_field(&mut multipart).await?;
    let staged = state
        .uploads
        .stage(kind, &file_name, &bytes)
        .map_err(OpxError::from)?;

    let res = match order_id {
        Some(order_id) => {
            let stored = state
                .uploads
                .attach_to_order(order_id, &staged)
                .map_err(OpxError::from)?;
            let attachment = repo.add_attachment(order_id, &stored, auth.user.id).await?;
            UploadRes {
                token: None,
                attachment_id: Some(attachment.id),
                file_name: stored.file_name,
                media_type: stored.media_type,
                size_bytes: stored.size_bytes,
            }
        }
        None => UploadRes {
            token: Some(staged.token),
            attachment_id: None,
            file_name: staged.file_name,
            media_type: staged.media_type,
            size_bytes: staged.size_bytes,
        },
    };
    Ok((StatusCode::CREATED, Json(res)))
}

#[utoipa::path(
    post,
    path = "/api/uploads/exam-image",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored or staged", body = UploadRes),
        (status = 400, description = "Empty, oversized, or unreadable file")
    )
)]
/// Exam imagery (x-rays, MRI exports) for the procedures step.
#[axum::debug_handler]
pub async fn upload_exam_image(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    handle_upload(state, auth, UploadKind::ExamImage, q.order_id, multipart).await
}

#[utoipa::path(
    post,
    path = "/api/uploads/medical-report",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report stored or staged", body = UploadRes),
        (status = 400, description = "Empty, oversized, or unreadable file")
    )
)]
#[axum::debug_handler]
pub async fn upload_medical_report(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    handle_upload(state, auth, UploadKind::MedicalReport, q.order_id, multipart).await
}

#[utoipa::path(
    post,
    path = "/api/uploads/order-pdf",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "PDF stored or staged", body = UploadRes),
        (status = 400, description = "Empty, oversized, or unreadable file")
    )
)]
/// The client-rendered order PDF; the server only stores it.
#[axum::debug_handler]
pub async fn upload_order_pdf(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(q): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    handle_upload(state, auth, UploadKind::OrderPdf, q.order_id, multipart).await
}
