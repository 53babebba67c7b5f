//! HTTP request handlers

pub mod error;
pub mod health;
pub mod photo;
pub mod subscribe;
pub mod upload;
pub mod vapid;

use actix_web::web;

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload::send_photo)
        .service(subscribe::subscribe)
        .service(photo::photo)
        .service(vapid::vapid_public_key)
        .service(health::health);
}

/// JSON extractor settings: body size limit, and malformed bodies answered with 400
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| error::handle_error("Invalid JSON body", err))
}
