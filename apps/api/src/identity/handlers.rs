use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::identity::sync::{apply_event, IdentityEvent, WebhookEvent};
use crate::state::AppState;

#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /webhooks
///
/// The signature is checked against the raw bytes before the body is parsed.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    state.webhook_verifier.verify(&headers, &body)?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid webhook payload: {e}")))?;
    apply_event(state.store.as_ref(), IdentityEvent::parse(event)?).await?;

    Ok(Json(WebhookResponse {
        success: true,
        message: "Webhook processed.",
    }))
}
