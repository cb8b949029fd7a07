//! Course endpoints

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use campus_ai::AiService;
use campus_core::roles;
use campus_types::meta_adapter::{
	Course, CourseLevel, CourseStatus, CreateCourseData, ListCoursesOptions, Module,
	ProgressStatus, UpdateCourseData, Visibility,
};

use crate::domain;
use crate::prelude::*;
use crate::service::{self, CourseView};

#[derive(Debug, Serialize)]
pub struct ModuleWithStatus {
	#[serde(flatten)]
	pub module: Module,
	pub status: ProgressStatus,
	pub is_locked: bool,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
	#[serde(flatten)]
	pub course: CourseView,
	pub is_enrolled: bool,
	pub modules: Vec<ModuleWithStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
	pub title: String,
	pub description: Option<String>,
	pub category_id: Option<i64>,
	#[serde(default)]
	pub level: CourseLevel,
	#[serde(default = "default_is_free")]
	pub is_free: bool,
	#[serde(default)]
	pub price: f64,
}

fn default_is_free() -> bool {
	true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourseRequest {
	#[serde(default)]
	pub title: Patch<Box<str>>,
	#[serde(default)]
	pub description: Patch<Box<str>>,
	#[serde(default)]
	pub category_id: Patch<i64>,
	#[serde(default)]
	pub level: Patch<CourseLevel>,
	#[serde(default)]
	pub status: Patch<CourseStatus>,
	#[serde(default)]
	pub visibility: Patch<Visibility>,
	#[serde(default)]
	pub is_free: Patch<bool>,
	#[serde(default)]
	pub price: Patch<f64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
	pub message: &'static str,
}

/// Course owned by the user, `NotFound` for everybody else
async fn read_owned_course(app: &App, user_id: UserId, course_id: i64) -> ClResult<Course> {
	let course = app.meta_adapter.read_course(course_id).await?;
	if course.instructor_id == user_id { Ok(course) } else { Err(Error::NotFound) }
}

/// GET /api/courses
pub async fn list_courses(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<CourseView>>>)> {
	let user_id = auth.as_ref().map(|a| a.user_id);
	let courses = app.meta_adapter.list_courses(&ListCoursesOptions::default()).await?;

	let mut views = Vec::with_capacity(courses.len());
	for course in courses {
		views.push(service::course_view(&app, user_id, course).await?);
	}

	let total = views.len() as u32;
	let response = ApiResponse::with_pagination(views, 0, total, total)
		.with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/courses/{course_id}
pub async fn get_course(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<CourseDetail>>)> {
	let course = app.meta_adapter.read_course(course_id).await?;
	let modules = app.meta_adapter.list_modules(course_id).await?;

	let (progress, is_enrolled) = match &auth {
		Some(auth) => (
			app.meta_adapter.list_progress(auth.user_id, course_id).await?,
			service::is_enrolled(&app, auth.user_id, course_id).await?,
		),
		None => (Default::default(), false),
	};
	let bypass = roles::bypasses_module_lock(auth.as_ref(), &course);

	let module_ids: Vec<i64> = modules.iter().map(|m| m.id).collect();
	let locks = domain::module_locks(&module_ids, &progress, bypass);
	let modules = modules
		.into_iter()
		.zip(locks)
		.map(|(module, lock)| ModuleWithStatus { module, status: lock.status, is_locked: lock.is_locked })
		.collect();

	let course = service::course_view(&app, auth.as_ref().map(|a| a.user_id), course).await?;
	let response = ApiResponse::new(CourseDetail { course, is_enrolled, modules })
		.with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/courses/{course_id}/summary
pub async fn get_course_summary(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<String>>)> {
	let course = app.meta_adapter.read_course(course_id).await?;
	let ai = app.ext::<AiService>()?;
	let summary =
		ai.course_summary(&course.title, course.description.as_deref().unwrap_or_default()).await;

	let response = ApiResponse::new(summary).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/courses
pub async fn post_course(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<CreateCourseRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<Course>>)> {
	roles::require_instructor(&auth)?;
	let title = req.title.trim();
	if title.is_empty() {
		return Err(Error::ValidationError("Title is required".into()));
	}
	if req.price < 0.0 {
		return Err(Error::ValidationError("Price cannot be negative".into()));
	}

	let course = app
		.meta_adapter
		.create_course(&CreateCourseData {
			title,
			description: req.description.as_deref(),
			instructor_id: auth.user_id,
			creator_id: None,
			category_id: req.category_id,
			level: req.level,
			status: CourseStatus::Published,
			visibility: Visibility::Public,
			price: req.price,
			is_free: req.is_free,
		})
		.await?;
	info!(course_id = course.id, instructor = %auth.user_id, "Course created");

	let response = ApiResponse::new(course).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/courses/{course_id}
pub async fn put_course(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
	Json(req): Json<UpdateCourseRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<Course>>)> {
	roles::require_instructor(&auth)?;
	read_owned_course(&app, auth.user_id, course_id).await?;
	if matches!(req.title, Patch::Null) || req.title.value().is_some_and(|t| t.trim().is_empty()) {
		return Err(Error::ValidationError("Title is required".into()));
	}

	let data = UpdateCourseData {
		title: req.title,
		description: req.description,
		category_id: req.category_id,
		level: req.level,
		status: req.status,
		visibility: req.visibility,
		// a free course has no price
		price: if req.is_free == Patch::Value(true) { Patch::Value(0.0) } else { req.price },
		is_free: req.is_free,
	};
	let course = app.meta_adapter.update_course(course_id, &data).await?;

	let response = ApiResponse::new(course).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// DELETE /api/courses/{course_id}
pub async fn delete_course(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(course_id): Path<i64>,
) -> ClResult<StatusCode> {
	roles::require_instructor(&auth)?;
	read_owned_course(&app, auth.user_id, course_id).await?;
	app.meta_adapter.delete_course(course_id).await?;
	info!(course_id, "Course deleted");
	Ok(StatusCode::NO_CONTENT)
}

/// POST /api/courses/{course_id}/generate-curriculum
pub async fn post_generate_curriculum(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Module>>>)> {
	roles::require_instructor(&auth)?;
	let course = read_owned_course(&app, auth.user_id, course_id).await?;
	let ai = app.ext::<AiService>()?;

	let modules = service::generate_curriculum(&app, ai, &course).await?;

	let response = ApiResponse::new(modules).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/courses/modules/{module_id}/complete
pub async fn post_complete_module(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<MessageResponse>>)> {
	let module = app.meta_adapter.read_module(module_id).await?;
	if !service::is_enrolled(&app, auth.user_id, module.course_id).await? {
		return Err(Error::PermissionDenied);
	}
	app.meta_adapter.mark_module_completed(auth.user_id, module_id).await?;

	let response = ApiResponse::new(MessageResponse { message: "Module marked as completed." })
		.with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
