//! Scheduled events and their invitations

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::Deserialize;
use std::collections::HashSet;

use campus_core::roles;
use campus_types::auth_adapter::AuthCtx;
use campus_types::meta_adapter::{
	EventData, EventInvitation, EventType, InvitationStatus, ScheduledEvent,
};

use crate::notification::notify;
use crate::prelude::*;

#[derive(Debug, Deserialize)]
pub struct EventRequest {
	pub room_id: i64,
	pub title: String,
	pub start_time: Timestamp,
	pub end_time: Timestamp,
	pub event_type: EventType,
	#[serde(default)]
	pub invited_user_ids: Vec<UserId>,
}

pub fn event_link(event_id: i64) -> String {
	format!("/calendar?event_id={}", event_id)
}

pub fn event_invitation_message(event_title: &str, room_name: &str) -> String {
	format!("Has sido invitado al evento '{}' en la sala '{}'.", event_title, room_name)
}

pub fn invitation_answer_message(username: &str, status: InvitationStatus, event_title: &str) -> String {
	let verb = if status == InvitationStatus::Accepted { "aceptado" } else { "rechazado" };
	format!("{} ha {} tu invitación al evento '{}'.", username, verb, event_title)
}

/// Drops duplicates and the creator, keeping the request order
pub fn normalize_invitees(ids: &[UserId], creator_id: UserId) -> Vec<UserId> {
	let mut seen = HashSet::new();
	ids.iter().copied().filter(|id| *id != creator_id && seen.insert(*id)).collect()
}

fn validate(req: &EventRequest) -> ClResult<&str> {
	let title = req.title.trim();
	if title.is_empty() {
		return Err(Error::ValidationError("Title is required".into()));
	}
	if req.end_time <= req.start_time {
		return Err(Error::ValidationError("End time must be after start time".into()));
	}
	Ok(title)
}

/// The event room must belong to the calling instructor
async fn check_room_owner(app: &App, auth: &AuthCtx, room_id: i64) -> ClResult<Box<str>> {
	roles::require_instructor(auth)?;
	let room = app.meta_adapter.read_room(room_id).await?;
	if room.instructor_id != auth.user_id {
		return Err(Error::PermissionDenied);
	}
	Ok(room.name)
}

async fn read_own_event(app: &App, auth: &AuthCtx, event_id: i64) -> ClResult<ScheduledEvent> {
	let event = app.meta_adapter.read_event(event_id).await?;
	if event.creator_id != auth.user_id {
		return Err(Error::PermissionDenied);
	}
	Ok(event)
}

async fn notify_invitees(app: &App, invitees: &[UserId], event_id: i64, title: &str, room_name: &str) {
	let message = event_invitation_message(title, room_name);
	let link = event_link(event_id);
	for user_id in invitees {
		notify(app, *user_id, &message, Some(&link)).await;
	}
}

/// POST /api/scheduled-events
pub async fn post_event(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<EventRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<ScheduledEvent>>)> {
	let title = validate(&req)?;
	let room_name = check_room_owner(&app, &auth, req.room_id).await?;
	let invitees = normalize_invitees(&req.invited_user_ids, auth.user_id);

	let event = app
		.meta_adapter
		.create_event(
			auth.user_id,
			&EventData {
				room_id: req.room_id,
				title,
				start_time: req.start_time,
				end_time: req.end_time,
				event_type: req.event_type,
				invited_user_ids: &invitees,
			},
		)
		.await?;
	info!(event_id = event.id, room_id = req.room_id, invitees = invitees.len(), "Event scheduled");
	notify_invitees(&app, &invitees, event.id, title, &room_name).await;

	let response = ApiResponse::new(event).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/scheduled-events/user-events
pub async fn list_user_events(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<ScheduledEvent>>>)> {
	let events = app.meta_adapter.list_user_events(auth.user_id).await?;

	let response = ApiResponse::new(events).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/scheduled-events/{event_id}
pub async fn put_event(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(event_id): Path<i64>,
	Json(req): Json<EventRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<ScheduledEvent>>)> {
	read_own_event(&app, &auth, event_id).await?;
	let title = validate(&req)?;
	let room_name = check_room_owner(&app, &auth, req.room_id).await?;
	let invitees = normalize_invitees(&req.invited_user_ids, auth.user_id);

	let added = app
		.meta_adapter
		.update_event(
			event_id,
			&EventData {
				room_id: req.room_id,
				title,
				start_time: req.start_time,
				end_time: req.end_time,
				event_type: req.event_type,
				invited_user_ids: &invitees,
			},
		)
		.await?;
	notify_invitees(&app, &added, event_id, title, &room_name).await;
	let event = app.meta_adapter.read_event(event_id).await?;

	let response = ApiResponse::new(event).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/scheduled-events/{event_id}
pub async fn delete_event(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(event_id): Path<i64>,
) -> ClResult<StatusCode> {
	read_own_event(&app, &auth, event_id).await?;
	app.meta_adapter.delete_event(event_id).await?;
	info!(event_id, "Event deleted");
	Ok(StatusCode::NO_CONTENT)
}

/// GET /api/event-invitations/pending
pub async fn list_pending_invitations(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<EventInvitation>>>)> {
	let invitations = app.meta_adapter.list_pending_invitations(auth.user_id).await?;

	let response = ApiResponse::new(invitations).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

async fn answer_invitation(
	app: &App,
	auth: &AuthCtx,
	invitation_id: i64,
	status: InvitationStatus,
) -> ClResult<EventInvitation> {
	let invitation = app.meta_adapter.read_invitation(invitation_id).await?;
	if invitation.user_id != auth.user_id {
		return Err(Error::NotFound);
	}
	if invitation.status != InvitationStatus::Pending {
		return Err(Error::ValidationError("Invitation already answered".into()));
	}

	let invitation = app.meta_adapter.update_invitation_status(invitation_id, status).await?;
	let event = app.meta_adapter.read_event(invitation.event_id).await?;
	let message = invitation_answer_message(&auth.username, status, &event.title);
	notify(app, event.creator_id, &message, Some(&event_link(event.id))).await;

	Ok(invitation)
}

/// POST /api/event-invitations/{invitation_id}/accept
pub async fn post_accept_invitation(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(invitation_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<EventInvitation>>)> {
	let invitation =
		answer_invitation(&app, &auth, invitation_id, InvitationStatus::Accepted).await?;

	let response = ApiResponse::new(invitation).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/event-invitations/{invitation_id}/reject
pub async fn post_reject_invitation(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(invitation_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<EventInvitation>>)> {
	let invitation =
		answer_invitation(&app, &auth, invitation_id, InvitationStatus::Rejected).await?;

	let response = ApiResponse::new(invitation).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(start: &str, end: &str) -> EventRequest {
		serde_json::from_value(serde_json::json!({
			"room_id": 1,
			"title": "Repaso",
			"start_time": start,
			"end_time": end,
			"event_type": "video_call",
			"invited_user_ids": [4, 5],
		}))
		.unwrap()
	}

	#[test]
	fn test_validate_time_range() {
		assert!(validate(&request("2025-05-01T10:00:00Z", "2025-05-01T11:00:00Z")).is_ok());
		assert!(validate(&request("2025-05-01T10:00", "2025-05-01T10:00")).is_err());
		assert!(validate(&request("2025-05-01T11:00:00Z", "2025-05-01T10:00:00Z")).is_err());
	}

	#[test]
	fn test_unknown_event_type_is_rejected() {
		let res: Result<EventRequest, _> = serde_json::from_value(serde_json::json!({
			"room_id": 1,
			"title": "x",
			"start_time": 0,
			"end_time": 60,
			"event_type": "webinar",
		}));
		assert!(res.is_err());
	}

	#[test]
	fn test_normalize_invitees() {
		let ids = [UserId(4), UserId(1), UserId(5), UserId(4)];
		assert_eq!(normalize_invitees(&ids, UserId(1)), vec![UserId(4), UserId(5)]);
	}

	#[test]
	fn test_messages() {
		assert_eq!(
			event_invitation_message("Repaso", "Grupo A"),
			"Has sido invitado al evento 'Repaso' en la sala 'Grupo A'."
		);
		assert_eq!(
			invitation_answer_message("ana", InvitationStatus::Rejected, "Repaso"),
			"ana ha rechazado tu invitación al evento 'Repaso'."
		);
		assert_eq!(event_link(9), "/calendar?event_id=9");
	}
}

// vim: ts=4
