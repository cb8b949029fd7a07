//! Admin statistics

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::collections::HashMap;

use campus_core::roles;
use campus_types::meta_adapter::{Course, Enrollment, ListCoursesOptions};

use crate::prelude::*;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
	pub total_users: u32,
	pub total_courses: u32,
	pub total_enrollments: u32,
	pub total_categories: u32,
}

#[derive(Debug, Serialize)]
pub struct EnrolledStudent {
	pub id: UserId,
	pub username: Box<str>,
}

#[derive(Debug, Serialize)]
pub struct CourseEnrollments {
	pub id: i64,
	pub title: Box<str>,
	pub enrollment_count: usize,
	pub enrolled_students: Vec<EnrolledStudent>,
}

/// Enrollment list per course; students without a profile are listed as "?"
fn course_enrollments(
	course: Course,
	enrollments: &[Enrollment],
	usernames: &HashMap<UserId, Box<str>>,
) -> CourseEnrollments {
	let enrolled_students: Vec<EnrolledStudent> = enrollments
		.iter()
		.map(|e| EnrolledStudent {
			id: e.user_id,
			username: usernames.get(&e.user_id).cloned().unwrap_or_else(|| "?".into()),
		})
		.collect();
	CourseEnrollments {
		id: course.id,
		title: course.title,
		enrollment_count: enrolled_students.len(),
		enrolled_students,
	}
}

/// GET /api/admin/dashboard-stats
pub async fn get_dashboard_stats(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<DashboardStats>>)> {
	roles::require_admin(&auth)?;
	let stats = DashboardStats {
		total_users: app.auth_adapter.count_users().await?,
		total_courses: app.meta_adapter.count_courses().await?,
		total_enrollments: app.meta_adapter.count_enrollments().await?,
		total_categories: app.meta_adapter.count_categories().await?,
	};

	let response = ApiResponse::new(stats).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/admin/enrollments
pub async fn get_enrollments(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<CourseEnrollments>>>)> {
	roles::require_admin(&auth)?;
	let courses = app.meta_adapter.list_courses(&ListCoursesOptions::default()).await?;

	let mut per_course = Vec::with_capacity(courses.len());
	let mut user_ids = Vec::new();
	for course in courses {
		let enrollments = app.meta_adapter.list_course_enrollments(course.id).await?;
		user_ids.extend(enrollments.iter().map(|e| e.user_id));
		per_course.push((course, enrollments));
	}
	user_ids.sort_unstable();
	user_ids.dedup();
	let usernames: HashMap<UserId, Box<str>> = app
		.meta_adapter
		.list_profiles(&user_ids)
		.await?
		.into_iter()
		.map(|p| (p.user_id, p.username))
		.collect();

	let res = per_course
		.into_iter()
		.map(|(course, enrollments)| course_enrollments(course, &enrollments, &usernames))
		.collect();

	let response = ApiResponse::new(res).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use campus_types::meta_adapter::{CourseLevel, CourseStatus, Visibility};

	#[test]
	fn test_course_enrollments() {
		let course = Course {
			id: 2,
			title: "SQL".into(),
			description: None,
			instructor_id: UserId(1),
			creator_id: None,
			category_id: None,
			level: CourseLevel::Basico,
			status: CourseStatus::Published,
			visibility: Visibility::Public,
			price: 0.0,
			is_free: true,
			created_at: Timestamp(0),
		};
		let enrollments = vec![
			Enrollment { user_id: UserId(5), course_id: 2, enrolled_at: Timestamp(0) },
			Enrollment { user_id: UserId(6), course_id: 2, enrolled_at: Timestamp(0) },
		];
		let usernames = HashMap::from([(UserId(5), Box::<str>::from("ana"))]);

		let res = course_enrollments(course, &enrollments, &usernames);
		assert_eq!(res.enrollment_count, 2);
		assert_eq!(res.enrolled_students[0].username.as_ref(), "ana");
		assert_eq!(res.enrolled_students[1].username.as_ref(), "?");
	}
}

// vim: ts=4
