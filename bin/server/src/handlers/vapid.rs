use crate::handlers::error::handle_server_error;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Result as ActixResult};

/// Public half of the VAPID key pair, base64url without padding, for
/// `PushManager.subscribe({ applicationServerKey })`
#[get("/vapid-public-key")]
pub async fn vapid_public_key(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let keys = state
        .keys
        .get()
        .map_err(|e| handle_server_error("Failed to load VAPID keys", e))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(keys.public_key_base64url().to_string()))
}
