//! Room endpoints

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use campus_core::roles;
use campus_types::auth_adapter::AuthCtx;
use campus_types::meta_adapter::{
	CreateRoomData, ListCoursesOptions, ListRoomsOptions, Room, UpdateRoomData,
};
use campus_types::utils::random_join_code;

use crate::notification::notify;
use crate::prelude::*;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
	pub name: String,
	pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoomRequest {
	#[serde(default)]
	pub name: Patch<String>,
	#[serde(default)]
	pub description: Patch<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomCourse {
	pub id: i64,
	pub title: Box<str>,
}

#[derive(Debug, Serialize)]
pub struct RoomMember {
	pub id: UserId,
	pub username: Box<str>,
	pub display_name: String,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct RoomDetail {
	#[serde(flatten)]
	pub room: Room,
	pub courses: Vec<RoomCourse>,
	pub members: Vec<RoomMember>,
}

pub fn room_invitation_message(room_name: &str) -> String {
	format!("Has sido invitado a la sala: '{}'", room_name)
}

pub fn room_link(room_id: i64) -> String {
	format!("/rooms/{}", room_id)
}

/// Owner or member
pub fn can_view_room(auth: &AuthCtx, room: &Room) -> bool {
	room.instructor_id == auth.user_id || room.member_ids.contains(&auth.user_id)
}

/// Loads a room owned by the caller; other rooms do not exist for them
async fn read_owned_room(app: &App, auth: &AuthCtx, room_id: i64) -> ClResult<Room> {
	let room = app.meta_adapter.read_room(room_id).await?;
	if room.instructor_id != auth.user_id {
		return Err(Error::NotFound);
	}
	Ok(room)
}

fn update_data(req: UpdateRoomRequest) -> ClResult<UpdateRoomData> {
	let name = match req.name {
		Patch::Value(name) if !name.trim().is_empty() => Patch::Value(name.trim().into()),
		Patch::Undefined => Patch::Undefined,
		_ => return Err(Error::ValidationError("Name cannot be empty".into())),
	};
	let description = match req.description {
		Patch::Value(d) if d.trim().is_empty() => Patch::Null,
		Patch::Value(d) => Patch::Value(d.trim().into()),
		Patch::Null => Patch::Null,
		Patch::Undefined => Patch::Undefined,
	};
	Ok(UpdateRoomData { name, description })
}

async fn room_detail(app: &App, room: Room) -> ClResult<RoomDetail> {
	let courses = app
		.meta_adapter
		.list_courses(&ListCoursesOptions { ids: Some(&room.course_ids), ..Default::default() })
		.await?
		.into_iter()
		.map(|c| RoomCourse { id: c.id, title: c.title })
		.collect();
	let members = app
		.meta_adapter
		.list_profiles(&room.member_ids)
		.await?
		.into_iter()
		.map(|p| RoomMember { id: p.user_id, display_name: p.display_name(), username: p.username })
		.collect();
	Ok(RoomDetail { room, courses, members })
}

/// POST /api/rooms
pub async fn post_room(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<CreateRoomRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<Room>>)> {
	roles::require_instructor(&auth)?;
	let name = req.name.trim();
	if name.is_empty() {
		return Err(Error::ValidationError("Name is required".into()));
	}

	let join_code = random_join_code();
	let room = app
		.meta_adapter
		.create_room(&CreateRoomData {
			name,
			description: req.description.as_deref().map(str::trim).filter(|d| !d.is_empty()),
			instructor_id: auth.user_id,
			join_code: &join_code,
		})
		.await?;
	info!(room_id = room.id, instructor = %auth.user_id, "Room created");

	let response = ApiResponse::new(room).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/rooms
pub async fn list_rooms(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Room>>>)> {
	let opts = if auth.is_instructor() {
		ListRoomsOptions { instructor_id: Some(auth.user_id), ..Default::default() }
	} else {
		ListRoomsOptions { member_id: Some(auth.user_id), ..Default::default() }
	};
	let rooms = app.meta_adapter.list_rooms(&opts).await?;

	let response = ApiResponse::new(rooms).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/rooms/{room_id}
pub async fn get_room(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(room_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<RoomDetail>>)> {
	let room = app.meta_adapter.read_room(room_id).await?;
	if !can_view_room(&auth, &room) {
		return Err(Error::PermissionDenied);
	}
	let detail = room_detail(&app, room).await?;

	let response = ApiResponse::new(detail).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/rooms/{room_id}
pub async fn put_room(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(room_id): Path<i64>,
	Json(req): Json<UpdateRoomRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<Room>>)> {
	read_owned_room(&app, &auth, room_id).await?;
	let room = app.meta_adapter.update_room(room_id, &update_data(req)?).await?;

	let response = ApiResponse::new(room).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/rooms/{room_id}
pub async fn delete_room(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(room_id): Path<i64>,
) -> ClResult<StatusCode> {
	read_owned_room(&app, &auth, room_id).await?;
	app.meta_adapter.delete_room(room_id).await?;
	info!(room_id, "Room deleted");
	Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rooms/{room_id}/courses/{course_id}
pub async fn post_room_course(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path((room_id, course_id)): Path<(i64, i64)>,
) -> ClResult<(StatusCode, Json<ApiResponse<Room>>)> {
	read_owned_room(&app, &auth, room_id).await?;
	app.meta_adapter.read_course(course_id).await?;

	if !app.meta_adapter.add_room_course(room_id, course_id).await? {
		debug!(room_id, course_id, "Course already in room");
	}
	let room = app.meta_adapter.read_room(room_id).await?;

	let response = ApiResponse::new(room).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/rooms/{room_id}/courses/{course_id}
pub async fn delete_room_course(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((room_id, course_id)): Path<(i64, i64)>,
) -> ClResult<StatusCode> {
	read_owned_room(&app, &auth, room_id).await?;
	app.meta_adapter.remove_room_course(room_id, course_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rooms/{room_id}/members/{user_id}
pub async fn post_room_member(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path((room_id, user_id)): Path<(i64, i64)>,
) -> ClResult<(StatusCode, Json<ApiResponse<Room>>)> {
	let room = read_owned_room(&app, &auth, room_id).await?;
	let user_id = UserId(user_id);
	app.auth_adapter.read_user(user_id).await?;

	if app.meta_adapter.add_room_member(room_id, user_id).await? {
		info!(room_id, user = %user_id, "Member added to room");
		notify(&app, user_id, &room_invitation_message(&room.name), Some(&room_link(room_id))).await;
	}
	let room = app.meta_adapter.read_room(room_id).await?;

	let response = ApiResponse::new(room).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/rooms/{room_id}/members/{user_id}
pub async fn delete_room_member(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((room_id, user_id)): Path<(i64, i64)>,
) -> ClResult<StatusCode> {
	read_owned_room(&app, &auth, room_id).await?;
	app.meta_adapter.remove_room_member(room_id, UserId(user_id)).await?;
	Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
	use super::*;
	use campus_types::auth_adapter::{ROLE_INSTRUCTOR, ROLE_STUDENT};

	fn room() -> Room {
		Room {
			id: 3,
			name: "Grupo A".into(),
			description: None,
			instructor_id: UserId(1),
			join_code: "0A1B2C3D".into(),
			created_at: Timestamp(0),
			course_ids: vec![],
			member_ids: vec![UserId(5)],
		}
	}

	fn auth(user_id: i64, role: &str) -> AuthCtx {
		AuthCtx { user_id: UserId(user_id), username: "u".into(), role: role.into() }
	}

	#[test]
	fn test_can_view_room() {
		assert!(can_view_room(&auth(1, ROLE_INSTRUCTOR), &room()));
		assert!(can_view_room(&auth(5, ROLE_STUDENT), &room()));
		assert!(!can_view_room(&auth(6, ROLE_STUDENT), &room()));
		assert!(!can_view_room(&auth(2, ROLE_INSTRUCTOR), &room()));
	}

	#[test]
	fn test_update_data() {
		let req: UpdateRoomRequest =
			serde_json::from_str(r#"{"name": " Grupo B ", "description": ""}"#).unwrap();
		let data = update_data(req).unwrap();
		assert_eq!(data.name, Patch::Value("Grupo B".into()));
		assert_eq!(data.description, Patch::Null);

		let req: UpdateRoomRequest = serde_json::from_str(r#"{"name": null}"#).unwrap();
		assert!(update_data(req).is_err());
		let req: UpdateRoomRequest = serde_json::from_str("{}").unwrap();
		assert!(update_data(req).unwrap().name.is_undefined());
	}

	#[test]
	fn test_room_notification() {
		assert_eq!(room_invitation_message("Grupo A"), "Has sido invitado a la sala: 'Grupo A'");
		assert_eq!(room_link(3), "/rooms/3");
	}
}

// vim: ts=4
