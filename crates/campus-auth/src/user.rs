//! User management endpoints

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use campus_core::roles;
use campus_types::auth_adapter::{
	CreateUserData, ListUsersOptions, ROLE_STUDENT, UpdateUserData, User,
};
use campus_types::meta_adapter::{Course, ListCoursesOptions, Profile, UpdateProfileData};

use crate::handler::{default_plan, find_user, validate_credentials};
use crate::prelude::*;

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct UserDetail {
	#[serde(flatten)]
	pub user: User,
	pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
	pub username: String,
	pub email: String,
	pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
	pub role: Option<String>,
	pub q: Option<String>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
	#[serde(default)]
	pub email: Patch<String>,
	#[serde(default)]
	pub role_id: Patch<i64>,
	#[serde(default)]
	pub is_active: Patch<bool>,
	#[serde(default)]
	pub first_name: Patch<String>,
	#[serde(default)]
	pub last_name: Patch<String>,
	#[serde(default)]
	pub bio: Patch<String>,
}

/// Trims text patches; a blank value clears the field
fn text_patch(patch: Patch<String>) -> Patch<Box<str>> {
	match patch {
		Patch::Undefined => Patch::Undefined,
		Patch::Null => Patch::Null,
		Patch::Value(s) if s.trim().is_empty() => Patch::Null,
		Patch::Value(s) => Patch::Value(s.trim().into()),
	}
}

/// Splits an update request into the account and the profile part
fn split_update(req: UpdateUserRequest) -> ClResult<(UpdateUserData, UpdateProfileData)> {
	let email = match text_patch(req.email) {
		Patch::Null => return Err(Error::ValidationError("Email cannot be empty".into())),
		Patch::Value(email) => Patch::Value(email.to_lowercase().into()),
		Patch::Undefined => Patch::Undefined,
	};
	if matches!(req.role_id, Patch::Null) || matches!(req.is_active, Patch::Null) {
		return Err(Error::ValidationError("Role and status cannot be null".into()));
	}

	let user = UpdateUserData { email, role_id: req.role_id, is_active: req.is_active };
	let profile = UpdateProfileData {
		first_name: text_patch(req.first_name),
		last_name: text_patch(req.last_name),
		bio: text_patch(req.bio),
	};
	Ok((user, profile))
}

async fn read_user_detail(app: &App, user_id: UserId) -> ClResult<UserDetail> {
	let user = app.auth_adapter.read_user(user_id).await?;
	let profile = match app.meta_adapter.read_profile(user_id).await {
		Ok(profile) => Some(profile),
		Err(Error::NotFound) => None,
		Err(e) => return Err(e),
	};
	Ok(UserDetail { user, profile })
}

/// POST /api/users
///
/// Creates an active student account without email verification.
pub async fn post_user(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<CreateUserRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<UserDetail>>)> {
	let username = req.username.trim();
	let email = req.email.trim().to_lowercase();
	validate_credentials(username, &email, &req.password)?;

	if find_user(app.auth_adapter.read_user_by_username(username)).await?.is_some() {
		return Err(Error::ValidationError("Username already registered".into()));
	}
	if find_user(app.auth_adapter.read_user_by_email(&email)).await?.is_some() {
		return Err(Error::ValidationError("Email already registered".into()));
	}

	let user_id = app
		.auth_adapter
		.create_user(CreateUserData {
			username,
			email: &email,
			password: &req.password,
			role: ROLE_STUDENT,
			is_active: true,
			verification_token: None,
		})
		.await?;
	app.meta_adapter.create_profile(user_id, username).await?;
	app.meta_adapter.create_subscription(user_id, default_plan(ROLE_STUDENT)).await?;
	info!(user = %user_id, "User created");

	let detail = read_user_detail(&app, user_id).await?;
	let response = ApiResponse::new(detail).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/users/me
pub async fn get_me(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<UserDetail>>)> {
	let detail = read_user_detail(&app, auth.user_id).await?;

	let response = ApiResponse::new(detail).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/users/me/courses
pub async fn get_my_taught_courses(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Course>>>)> {
	roles::require_instructor(&auth)?;
	let courses = app
		.meta_adapter
		.list_courses(&ListCoursesOptions { instructor_id: Some(auth.user_id), ..Default::default() })
		.await?;

	let response = ApiResponse::new(courses).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/users
pub async fn list_users(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Query(query): Query<ListUsersQuery>,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<User>>>)> {
	roles::require_instructor(&auth)?;
	let opts = ListUsersOptions {
		role: query.role.as_deref(),
		q: query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()),
		limit: query.limit,
		offset: query.offset,
	};
	let users = app.auth_adapter.list_users(&opts).await?;

	let response = ApiResponse::new(users).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/users/{user_id}
pub async fn get_user(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(user_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<UserDetail>>)> {
	roles::require_instructor(&auth)?;
	let detail = read_user_detail(&app, UserId(user_id)).await?;

	let response = ApiResponse::new(detail).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// PUT /api/users/{user_id}
///
/// Role changes are reserved to admins.
pub async fn put_user(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(user_id): Path<i64>,
	Json(req): Json<UpdateUserRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<UserDetail>>)> {
	roles::require_instructor(&auth)?;
	let user_id = UserId(user_id);
	let (user_data, profile_data) = split_update(req)?;

	if let Patch::Value(role_id) = user_data.role_id {
		roles::require_admin(&auth)?;
		app.auth_adapter
			.read_role(role_id)
			.await
			.map_err(|_| Error::ValidationError("Unknown role".into()))?;
	}
	if let Patch::Value(email) = &user_data.email {
		if let Some(other) = find_user(app.auth_adapter.read_user_by_email(email)).await? {
			if other.id != user_id {
				return Err(Error::ValidationError("Email already registered".into()));
			}
		}
	}

	let user = app.auth_adapter.update_user(user_id, &user_data).await?;
	app.meta_adapter.create_profile(user_id, &user.username).await?;
	app.meta_adapter.update_profile(user_id, &profile_data).await?;
	info!(user = %user_id, by = %auth.user_id, "User updated");

	let detail = read_user_detail(&app, user_id).await?;
	let response = ApiResponse::new(detail).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/users/{user_id}
pub async fn delete_user(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(user_id): Path<i64>,
) -> ClResult<StatusCode> {
	roles::require_instructor(&auth)?;
	let user_id = UserId(user_id);
	app.auth_adapter.read_user(user_id).await?;

	app.meta_adapter.delete_user_data(user_id).await?;
	app.auth_adapter.delete_user(user_id).await?;
	warn!(user = %user_id, by = %auth.user_id, "User deleted");

	Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn update(json: &str) -> UpdateUserRequest {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn test_split_update_profile_fields() {
		let (user, profile) =
			split_update(update(r#"{"first_name": " Ana ", "bio": "", "email": "Ana@Example.com"}"#))
				.unwrap();
		assert_eq!(user.email, Patch::Value("ana@example.com".into()));
		assert!(user.role_id.is_undefined());
		assert_eq!(profile.first_name, Patch::Value("Ana".into()));
		assert_eq!(profile.bio, Patch::Null);
		assert!(profile.last_name.is_undefined());
	}

	#[test]
	fn test_split_update_rejects_nulls() {
		assert!(split_update(update(r#"{"email": null}"#)).is_err());
		assert!(split_update(update(r#"{"role_id": null}"#)).is_err());
		assert!(split_update(update(r#"{"is_active": null}"#)).is_err());
		assert!(split_update(update(r#"{"last_name": null}"#)).is_ok());
	}
}

// vim: ts=4
