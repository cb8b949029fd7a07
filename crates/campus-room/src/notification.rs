//! Notification inbox

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};

use campus_types::meta_adapter::Notification;

use crate::prelude::*;

/// Stores a notification; failures are logged, the triggering action stands
pub async fn notify(app: &App, user_id: UserId, message: &str, link_url: Option<&str>) {
	if let Err(e) = app.meta_adapter.create_notification(user_id, message, link_url).await {
		error!(user = %user_id, "Cannot store notification: {}", e);
	}
}

/// GET /api/notifications
pub async fn list_notifications(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Notification>>>)> {
	let notifications = app.meta_adapter.list_notifications(auth.user_id).await?;

	let response = ApiResponse::new(notifications).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/notifications/{notification_id}/read
pub async fn post_notification_read(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(notification_id): Path<i64>,
) -> ClResult<StatusCode> {
	app.meta_adapter.mark_notification_read(auth.user_id, notification_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

// vim: ts=4
