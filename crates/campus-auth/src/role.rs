//! Role listing

use axum::{Json, extract::State, http::StatusCode};

use campus_core::roles;
use campus_types::auth_adapter::Role;

use crate::prelude::*;

/// GET /api/roles
pub async fn list_roles(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Role>>>)> {
	roles::require_instructor(&auth)?;
	let roles = app.auth_adapter.list_roles().await?;

	let response = ApiResponse::new(roles).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
