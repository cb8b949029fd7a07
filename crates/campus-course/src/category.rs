//! Category endpoints

use axum::{
	Json,
	extract::State,
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use campus_core::roles;
use campus_types::meta_adapter::{
	Category, Course, CourseLevel, CourseStatus, ListCoursesOptions,
};

use crate::prelude::*;

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct CategoryCourse {
	pub id: i64,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	pub level: CourseLevel,
	pub status: CourseStatus,
}

impl From<Course> for CategoryCourse {
	fn from(course: Course) -> Self {
		Self {
			id: course.id,
			title: course.title,
			description: course.description,
			level: course.level,
			status: course.status,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct CategoryWithCourses {
	#[serde(flatten)]
	pub category: Category,
	pub courses: Vec<CategoryCourse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
	pub name: String,
	pub description: Option<String>,
}

/// Groups courses under their category, keeping both orders
fn group_courses(categories: Vec<Category>, courses: Vec<Course>) -> Vec<CategoryWithCourses> {
	let mut res: Vec<CategoryWithCourses> = categories
		.into_iter()
		.map(|category| CategoryWithCourses { category, courses: Vec::new() })
		.collect();
	for course in courses {
		let Some(category_id) = course.category_id else { continue };
		if let Some(entry) = res.iter_mut().find(|c| c.category.id == category_id) {
			entry.courses.push(course.into());
		}
	}
	res
}

/// GET /api/categories
pub async fn list_categories(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<Category>>>)> {
	let categories = app.meta_adapter.list_categories().await?;

	let response = ApiResponse::new(categories).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/categories/with-courses
///
/// Only published courses are listed.
pub async fn list_categories_with_courses(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<CategoryWithCourses>>>)> {
	let categories = app.meta_adapter.list_categories().await?;
	let courses = app
		.meta_adapter
		.list_courses(&ListCoursesOptions {
			status: Some(CourseStatus::Published),
			..Default::default()
		})
		.await?;

	let response = ApiResponse::new(group_courses(categories, courses))
		.with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/categories
pub async fn post_category(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<CreateCategoryRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<Category>>)> {
	roles::require_admin(&auth)?;
	let name = req.name.trim();
	if name.is_empty() {
		return Err(Error::ValidationError("Name is required".into()));
	}

	let category = app.meta_adapter.create_category(name, req.description.as_deref()).await?;

	let response = ApiResponse::new(category).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use campus_types::meta_adapter::Visibility;

	fn course(id: i64, category_id: Option<i64>) -> Course {
		Course {
			id,
			title: format!("Course {}", id).into(),
			description: None,
			instructor_id: UserId(1),
			creator_id: None,
			category_id,
			level: CourseLevel::Basico,
			status: CourseStatus::Published,
			visibility: Visibility::Public,
			price: 0.0,
			is_free: true,
			created_at: Timestamp(0),
		}
	}

	#[test]
	fn test_group_courses() {
		let categories = vec![
			Category { id: 1, name: "Backend".into(), description: None },
			Category { id: 2, name: "Data".into(), description: None },
		];
		let grouped =
			group_courses(categories, vec![course(10, Some(2)), course(11, None), course(12, Some(2))]);
		assert_eq!(grouped.len(), 2);
		assert!(grouped[0].courses.is_empty());
		let ids: Vec<i64> = grouped[1].courses.iter().map(|c| c.id).collect();
		assert_eq!(ids, vec![10, 12]);
	}
}

// vim: ts=4
