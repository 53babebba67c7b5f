use crate::handlers::error::handle_error;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse, Result as ActixResult};
use common::{PushSubscription, SubscribeResponse, SubscriptionRequest};
use tracing::info;

/// Register a browser push subscription
#[post("/subscribe")]
pub async fn subscribe(
    req: web::Json<SubscriptionRequest>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let subscription = PushSubscription::try_from(req.into_inner())
        .map_err(|e| handle_error("Invalid subscription", e))?;

    let host = subscription.endpoint().host_str().unwrap_or_default().to_string();
    let user_id = state.registry.register(subscription);

    info!(
        user_id = %user_id,
        push_service = ?host,
        "POST /subscribe - Subscription registered"
    );

    Ok(HttpResponse::Ok().json(SubscribeResponse { user_id }))
}
