//! Enrollment endpoints

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};

use campus_types::meta_adapter::Enrollment;

use crate::prelude::*;
use crate::service::{self, EnrolledCourse};

/// POST /api/courses/{course_id}/enroll
pub async fn post_enroll(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<Enrollment>>)> {
	// NotFound before the duplicate check
	app.meta_adapter.read_course(course_id).await?;
	let enrollment = app.meta_adapter.create_enrollment(auth.user_id, course_id).await?;
	info!(user = %auth.user_id, course_id, "Enrolled");

	let response = ApiResponse::new(enrollment).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/my-courses
pub async fn get_my_courses(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<EnrolledCourse>>>)> {
	let courses = service::enrolled_courses(&app, auth.user_id).await?;

	let response = ApiResponse::new(courses).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
