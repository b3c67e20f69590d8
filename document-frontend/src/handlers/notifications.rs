use crate::models::{Notification, NotificationId};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.workspace.notifications().notifications())
}

/// Dismissing an unknown or already expired notification is not an error.
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<Value> {
    let dismissed = state.workspace.notifications().dismiss(NotificationId(id));
    Json(json!({ "id": id, "dismissed": dismissed }))
}
