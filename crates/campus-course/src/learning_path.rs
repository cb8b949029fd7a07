//! Learning paths: ordered course sequences with per-user status

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::{HashMap, HashSet};

use campus_ai::AiService;
use campus_core::roles;
use campus_types::meta_adapter::{
	CourseLevel, CourseStatus, LearningPath, ListCoursesOptions,
};

use crate::prelude::*;

pub const SUGGESTION_DESCRIPTION: &str = "Sugerencia de la IA.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCourseStatus {
	/// Draft course, not open yet
	EnDesarrollo,
	/// Enrolled with every module completed
	Terminado,
	Cursando,
	NoInscrito,
	/// AI suggested course that does not exist
	Missing,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct PathCourseView {
	/// Negative for suggested courses
	pub id: i64,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	pub level: CourseLevel,
	pub instructor_id: Option<UserId>,
	pub step: i32,
	pub user_status: PathCourseStatus,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct LearningPathDetail {
	pub id: i64,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	pub courses: Vec<PathCourseView>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePathRequest {
	pub title: String,
	pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddPathCourseRequest {
	pub course_id: i64,
	pub step: i32,
}

pub fn path_course_status(
	course_status: CourseStatus,
	is_enrolled: bool,
	completed_modules: u32,
	total_modules: u32,
) -> PathCourseStatus {
	if course_status == CourseStatus::Draft {
		PathCourseStatus::EnDesarrollo
	} else if !is_enrolled {
		PathCourseStatus::NoInscrito
	} else if total_modules > 0 && completed_modules == total_modules {
		PathCourseStatus::Terminado
	} else {
		PathCourseStatus::Cursando
	}
}

/// Appends suggested titles after the last step with ids -1, -2, ...
pub fn append_suggestions(courses: &mut Vec<PathCourseView>, titles: Vec<String>) {
	let next_step = courses.last().map_or(1, |c| c.step + 1);
	for (idx, title) in titles.into_iter().enumerate() {
		let idx = idx as i32;
		courses.push(PathCourseView {
			id: -i64::from(idx + 1),
			title: title.into(),
			description: Some(SUGGESTION_DESCRIPTION.into()),
			level: CourseLevel::Basico,
			instructor_id: None,
			step: next_step + idx,
			user_status: PathCourseStatus::Missing,
		});
	}
}

/// GET /api/learning-paths
pub async fn list_learning_paths(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<LearningPath>>>)> {
	let paths = app.meta_adapter.list_learning_paths().await?;

	let response = ApiResponse::new(paths).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/learning-paths/{path_id}
pub async fn get_learning_path(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(path_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<LearningPathDetail>>)> {
	let path = app.meta_adapter.read_learning_path(path_id).await?;
	let enrolled: HashSet<i64> = app
		.meta_adapter
		.list_user_enrollments(auth.user_id)
		.await?
		.into_iter()
		.map(|e| e.course_id)
		.collect();

	let course_ids: Vec<i64> = path.courses.iter().map(|c| c.course_id).collect();
	let mut courses: HashMap<i64, _> = app
		.meta_adapter
		.list_courses(&ListCoursesOptions { ids: Some(&course_ids), ..Default::default() })
		.await?
		.into_iter()
		.map(|c| (c.id, c))
		.collect();

	let mut views = Vec::with_capacity(path.courses.len());
	for entry in &path.courses {
		let Some(course) = courses.remove(&entry.course_id) else { continue };
		let is_enrolled = enrolled.contains(&course.id);
		let (completed, total) = if is_enrolled {
			(
				app.meta_adapter.count_completed_modules(auth.user_id, course.id).await?,
				app.meta_adapter.list_modules(course.id).await?.len() as u32,
			)
		} else {
			(0, 0)
		};
		views.push(PathCourseView {
			id: course.id,
			title: course.title,
			description: course.description,
			level: course.level,
			instructor_id: Some(course.instructor_id),
			step: entry.step,
			user_status: path_course_status(course.status, is_enrolled, completed, total),
		});
	}

	let ai = app.ext::<AiService>()?;
	let existing: Vec<&str> = views.iter().map(|c| c.title.as_ref()).collect();
	let suggested = ai.suggest_missing_courses(&path.title, &existing).await;
	append_suggestions(&mut views, suggested);

	let detail = LearningPathDetail {
		id: path.id,
		title: path.title,
		description: path.description,
		courses: views,
	};
	let response = ApiResponse::new(detail).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/learning-paths
pub async fn post_learning_path(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<CreatePathRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<LearningPath>>)> {
	roles::require_instructor(&auth)?;
	let title = req.title.trim();
	if title.is_empty() {
		return Err(Error::ValidationError("Title is required".into()));
	}

	let path = app.meta_adapter.create_learning_path(title, req.description.as_deref()).await?;

	let response = ApiResponse::new(path).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/learning-paths/{path_id}/courses
pub async fn post_learning_path_course(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(path_id): Path<i64>,
	Json(req): Json<AddPathCourseRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<LearningPath>>)> {
	roles::require_instructor(&auth)?;
	app.meta_adapter.read_learning_path(path_id).await?;
	app.meta_adapter.read_course(req.course_id).await?;

	app.meta_adapter.add_course_to_path(path_id, req.course_id, req.step).await?;
	let path = app.meta_adapter.read_learning_path(path_id).await?;

	let response = ApiResponse::new(path).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/learning-paths/{path_id}
pub async fn delete_learning_path(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(path_id): Path<i64>,
) -> ClResult<StatusCode> {
	roles::require_instructor(&auth)?;
	app.meta_adapter.delete_learning_path(path_id).await?;
	Ok(StatusCode::NO_CONTENT)
}


// vim: ts=4
