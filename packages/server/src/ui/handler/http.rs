//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use hearth_shared::dto::{Notification, NotificationDraft};

use crate::{usecase::NotificationError, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Send a notification to one user's `/user/queue/notifications`
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NotificationDraft>,
) -> Result<Json<Notification>, StatusCode> {
    state
        .send_notification_usecase
        .send_to_user(draft)
        .await
        .map(Json)
        .map_err(into_status)
}

/// Broadcast a notification to `/topic/notifications`
pub async fn broadcast_notification(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NotificationDraft>,
) -> Result<Json<Notification>, StatusCode> {
    state
        .send_notification_usecase
        .broadcast(draft)
        .await
        .map(Json)
        .map_err(into_status)
}

fn into_status(error: NotificationError) -> StatusCode {
    match error {
        NotificationError::InvalidRecipient(e) => {
            tracing::warn!("Rejected notification: {}", e);
            StatusCode::BAD_REQUEST
        }
        NotificationError::Deliver(e) => {
            tracing::error!("Failed to deliver notification: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
