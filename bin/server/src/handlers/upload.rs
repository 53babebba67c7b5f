use crate::constants::{DEFAULT_SENDER, MAX_SENDER_CHARS};
use crate::handlers::error::{handle_error, handle_server_error};
use crate::state::AppState;
use actix_web::{post, web, HttpResponse, Result as ActixResult};
use common::{file_utils, NotificationPayload, UploadRequest, UploadResponse, ValidationError};
use tracing::{error, info};

/// Store a photo and notify its recipients.
///
/// Delivery outcomes are logged only; once the photo is stored the upload
/// succeeds.
#[post("/send-photo")]
pub async fn send_photo(
    req: web::Json<UploadRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let UploadRequest {
        image,
        recipients,
        from,
    } = req.into_inner();

    info!(
        recipients = recipients.len(),
        "POST /send-photo - Request received"
    );

    let sender = sender_name(from).map_err(|e| handle_error("Invalid sender", e))?;

    let content = file_utils::decode_image_payload(&image)
        .map_err(|e| handle_error("Failed to decode image", e))?;

    let photo_id = state
        .photos
        .save(&content)
        .await
        .map_err(|e| handle_server_error("Failed to save image", e))?;

    info!(
        filename = ?photo_id.as_str(),
        bytes = content.len(),
        "POST /send-photo - Photo stored"
    );

    let payload = NotificationPayload::received_photo(sender, state.photo_url(&photo_id));

    match state.keys.get() {
        Ok(keys) => {
            let report = state
                .dispatcher
                .fan_out(&state.registry, &recipients, &payload, keys)
                .await;
            info!(
                filename = ?photo_id.as_str(),
                delivered = report.delivered,
                failed = report.failed,
                skipped = report.skipped,
                "POST /send-photo - Notifications dispatched"
            );
        }
        Err(e) => {
            error!(error = %e, "POST /send-photo - VAPID keys unavailable, no notifications sent");
        }
    }

    Ok(HttpResponse::Ok().json(UploadResponse {
        message: "Photo uploaded and notifications sent".to_string(),
        filename: photo_id.into_string(),
    }))
}

/// Trimmed `from`, or the default when absent or blank
fn sender_name(from: Option<String>) -> Result<String, ValidationError> {
    let name = from.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Ok(DEFAULT_SENDER.to_string());
    }

    let len = name.chars().count();
    if len > MAX_SENDER_CHARS {
        return Err(ValidationError::SenderTooLong {
            len,
            max: MAX_SENDER_CHARS,
        });
    }
    Ok(name.to_string())
}
