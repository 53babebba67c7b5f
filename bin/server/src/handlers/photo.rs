use crate::handlers::error::{handle_error, handle_not_found, handle_server_error};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Result as ActixResult};
use storage::StoreError;
use tracing::info;

/// Serve a stored photo
#[get("/photo/{filename}")]
pub async fn photo(
    filename: web::Path<String>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let filename = filename.into_inner();

    // Debug formatting escapes control characters from the untrusted name
    info!(filename = ?filename, "GET /photo - Request received");

    let content = state
        .photos
        .retrieve(&filename)
        .await
        .map_err(|e| match e {
            StoreError::InvalidId { .. } => handle_error("Invalid filename", e),
            StoreError::NotFound(_) => handle_not_found("Photo lookup failed", &filename, e),
            StoreError::Storage(_) => handle_server_error("Failed to read photo", e),
        })?;

    Ok(HttpResponse::Ok().content_type("image/jpeg").body(content))
}
