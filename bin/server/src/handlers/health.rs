use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Result as ActixResult};

/// Health check endpoint
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(common::HealthResponse {
        status: "ok".to_string(),
        subscriptions: state.registry.len(),
    }))
}
