//! Student and instructor dashboards, progress alerts

use axum::{
	Json,
	extract::State,
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use campus_ai::AiService;
use campus_core::roles;
use campus_course::service::{self, CourseView, EnrolledCourse};
use campus_types::meta_adapter::{
	Course, CourseStatus, ListCoursesOptions, ListRoomsOptions, Notification, Room,
};

use crate::prelude::*;

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
	pub enrolled_courses: Vec<EnrolledCourse>,
	pub recommended_courses: Vec<CourseView>,
}

#[derive(Debug, Serialize)]
pub struct RoomSummary {
	pub id: i64,
	pub name: Box<str>,
	pub join_code: Box<str>,
	pub member_count: usize,
	pub course_count: usize,
}

impl From<Room> for RoomSummary {
	fn from(room: Room) -> Self {
		Self {
			id: room.id,
			member_count: room.member_ids.len(),
			course_count: room.course_ids.len(),
			name: room.name,
			join_code: room.join_code,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct StudentProgress {
	pub user_id: UserId,
	pub username: Box<str>,
	pub display_name: String,
	pub course_id: i64,
	pub course_title: Box<str>,
	pub completion_percentage: u32,
	pub earned_stars: u32,
	pub total_stars: u32,
}

#[derive(Debug, Serialize)]
pub struct InstructorDashboard {
	pub rooms: Vec<RoomSummary>,
	pub student_progress: Vec<StudentProgress>,
	pub my_enrolled_courses: Vec<EnrolledCourse>,
}

#[derive(Debug, Deserialize)]
pub struct StudentAlertRequest {
	pub user_id: UserId,
	pub course_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentAlert {
	pub completion_percentage: u32,
	pub notification: Notification,
}

/// Maps recommended titles back to courses, dropping unknown and repeated titles
pub fn match_recommendations(titles: &[String], candidates: Vec<Course>) -> Vec<Course> {
	let mut by_title: HashMap<String, Course> =
		candidates.into_iter().map(|c| (c.title.to_lowercase(), c)).collect();
	titles.iter().filter_map(|title| by_title.remove(&title.trim().to_lowercase())).collect()
}

pub fn course_link(course_id: i64) -> String {
	format!("/courses/{}", course_id)
}

async fn recommendations(
	app: &App,
	user_id: UserId,
	enrolled: &[EnrolledCourse],
) -> ClResult<Vec<CourseView>> {
	let enrolled_ids: HashSet<i64> = enrolled.iter().map(|c| c.course.course.id).collect();
	let candidates: Vec<Course> = app
		.meta_adapter
		.list_courses(&ListCoursesOptions {
			status: Some(CourseStatus::Published),
			..Default::default()
		})
		.await?
		.into_iter()
		.filter(|c| !enrolled_ids.contains(&c.id))
		.collect();
	if candidates.is_empty() {
		return Ok(Vec::new());
	}

	let ai = app.ext::<AiService>()?;
	let enrolled_titles: Vec<&str> = enrolled.iter().map(|c| c.course.course.title.as_ref()).collect();
	let available: Vec<&str> = candidates.iter().map(|c| c.title.as_ref()).collect();
	let titles = ai.recommend_courses(&enrolled_titles, &available).await;

	let mut res = Vec::new();
	for course in match_recommendations(&titles, candidates) {
		res.push(service::course_view(app, Some(user_id), course).await?);
	}
	Ok(res)
}

/// Progress of every student enrolled in the instructor's courses
async fn student_progress(app: &App, instructor_id: UserId) -> ClResult<Vec<StudentProgress>> {
	let courses = app
		.meta_adapter
		.list_courses(&ListCoursesOptions { instructor_id: Some(instructor_id), ..Default::default() })
		.await?;

	let mut rows = Vec::new();
	for course in &courses {
		for enrollment in app.meta_adapter.list_course_enrollments(course.id).await? {
			rows.push((enrollment.user_id, course));
		}
	}
	let mut user_ids: Vec<UserId> = rows.iter().map(|(user_id, _)| *user_id).collect();
	user_ids.sort_unstable();
	user_ids.dedup();
	let profiles: HashMap<UserId, _> = app
		.meta_adapter
		.list_profiles(&user_ids)
		.await?
		.into_iter()
		.map(|p| (p.user_id, p))
		.collect();

	let mut res = Vec::with_capacity(rows.len());
	for (user_id, course) in rows {
		let Some(profile) = profiles.get(&user_id) else {
			debug!(user = %user_id, "Enrolled user without profile");
			continue;
		};
		let completion_percentage = service::completion_percentage(app, user_id, course.id).await?;
		let (total_stars, earned_stars) = service::course_stars(app, Some(user_id), course).await?;
		res.push(StudentProgress {
			user_id,
			username: profile.username.clone(),
			display_name: profile.display_name(),
			course_id: course.id,
			course_title: course.title.clone(),
			completion_percentage,
			earned_stars,
			total_stars,
		});
	}
	Ok(res)
}

/// GET /api/dashboard/student
pub async fn get_student_dashboard(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<StudentDashboard>>)> {
	let enrolled_courses = service::enrolled_courses(&app, auth.user_id).await?;
	let recommended_courses = recommendations(&app, auth.user_id, &enrolled_courses).await?;

	let dashboard = StudentDashboard { enrolled_courses, recommended_courses };
	let response = ApiResponse::new(dashboard).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/dashboard/instructor
pub async fn get_instructor_dashboard(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<InstructorDashboard>>)> {
	roles::require_instructor(&auth)?;
	let rooms = app
		.meta_adapter
		.list_rooms(&ListRoomsOptions { instructor_id: Some(auth.user_id), ..Default::default() })
		.await?
		.into_iter()
		.map(RoomSummary::from)
		.collect();

	let dashboard = InstructorDashboard {
		rooms,
		student_progress: student_progress(&app, auth.user_id).await?,
		my_enrolled_courses: service::enrolled_courses(&app, auth.user_id).await?,
	};
	let response = ApiResponse::new(dashboard).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/dashboard/instructor/student-progress
pub async fn get_student_progress(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<StudentProgress>>>)> {
	roles::require_instructor(&auth)?;
	let progress = student_progress(&app, auth.user_id).await?;

	let response = ApiResponse::new(progress).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/dashboard/instructor/student-alert
pub async fn post_student_alert(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<StudentAlertRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<StudentAlert>>)> {
	roles::require_instructor(&auth)?;
	let course = app.meta_adapter.read_course(req.course_id).await?;
	if course.instructor_id != auth.user_id {
		return Err(Error::NotFound);
	}
	if !service::is_enrolled(&app, req.user_id, course.id).await? {
		return Err(Error::ValidationError("The student is not enrolled in this course".into()));
	}

	let student_name = match app.meta_adapter.read_profile(req.user_id).await {
		Ok(profile) => profile.display_name(),
		Err(Error::NotFound) => app.auth_adapter.read_user(req.user_id).await?.username.to_string(),
		Err(e) => return Err(e),
	};
	let completion_percentage = service::completion_percentage(&app, req.user_id, course.id).await?;

	let ai = app.ext::<AiService>()?;
	let message = ai.student_alert(&student_name, &course.title, completion_percentage).await;
	let notification = app
		.meta_adapter
		.create_notification(req.user_id, &message, Some(&course_link(course.id)))
		.await?;
	info!(student = %req.user_id, course_id = course.id, completion_percentage, "Student alert sent");

	let alert = StudentAlert { completion_percentage, notification };
	let response = ApiResponse::new(alert).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use campus_types::meta_adapter::{CourseLevel, Visibility};

	fn course(id: i64, title: &str) -> Course {
		Course {
			id,
			title: title.into(),
			description: None,
			instructor_id: UserId(1),
			creator_id: None,
			category_id: None,
			level: CourseLevel::Intermedio,
			status: CourseStatus::Published,
			visibility: Visibility::Public,
			price: 0.0,
			is_free: true,
			created_at: Timestamp(0),
		}
	}

	#[test]
	fn test_match_recommendations() {
		let candidates = vec![course(1, "Docker"), course(2, "Kubernetes"), course(3, "Go")];
		let titles = vec!["kubernetes".to_string(), "Rust".into(), " Docker ".into(), "Docker".into()];
		let ids: Vec<i64> = match_recommendations(&titles, candidates).iter().map(|c| c.id).collect();
		assert_eq!(ids, vec![2, 1]);
	}

	#[test]
	fn test_room_summary() {
		let room = Room {
			id: 7,
			name: "Grupo B".into(),
			description: None,
			instructor_id: UserId(1),
			join_code: "DEADBEEF".into(),
			created_at: Timestamp(0),
			course_ids: vec![1, 2],
			member_ids: vec![UserId(3)],
		};
		let summary = RoomSummary::from(room);
		assert_eq!((summary.member_count, summary.course_count), (1, 2));
	}
}

// vim: ts=4
