//! Course flows shared by the handlers and the dashboards

use serde::Serialize;

use campus_ai::AiService;
use campus_types::meta_adapter::{Course, ListCoursesOptions, Module};
use campus_types::utils::percentage;

use crate::domain;
use crate::prelude::*;

/// Course with the stars of the requesting user
#[derive(Clone, Debug, Serialize)]
pub struct CourseView {
	#[serde(flatten)]
	pub course: Course,
	pub total_stars: u32,
	pub earned_stars: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnrolledCourse {
	#[serde(flatten)]
	pub course: CourseView,
	pub completion_percentage: u32,
}

pub async fn is_enrolled(app: &App, user_id: UserId, course_id: i64) -> ClResult<bool> {
	Ok(app.meta_adapter.read_enrollment(user_id, course_id).await?.is_some())
}

/// `(total_stars, earned_stars)` of `user_id` in `course`; anonymous users earn nothing
pub async fn course_stars(app: &App, user_id: Option<UserId>, course: &Course) -> ClResult<(u32, u32)> {
	let Some(user_id) = user_id else {
		return Ok(domain::stars(course.level, false, None));
	};
	if !is_enrolled(app, user_id, course.id).await? {
		return Ok(domain::stars(course.level, false, None));
	}
	let avg_score = app.meta_adapter.average_quiz_score(user_id, course.id).await?;
	Ok(domain::stars(course.level, true, avg_score))
}

pub async fn course_view(app: &App, user_id: Option<UserId>, course: Course) -> ClResult<CourseView> {
	let (total_stars, earned_stars) = course_stars(app, user_id, &course).await?;
	Ok(CourseView { course, total_stars, earned_stars })
}

/// Completed modules of the course in percent, 0 for a course without modules
pub async fn completion_percentage(app: &App, user_id: UserId, course_id: i64) -> ClResult<u32> {
	let total = app.meta_adapter.list_modules(course_id).await?.len() as u32;
	let completed = app.meta_adapter.count_completed_modules(user_id, course_id).await?;
	Ok(percentage(completed, total))
}

/// Courses the user is enrolled in, with progress and stars
pub async fn enrolled_courses(app: &App, user_id: UserId) -> ClResult<Vec<EnrolledCourse>> {
	let course_ids: Vec<i64> = app
		.meta_adapter
		.list_user_enrollments(user_id)
		.await?
		.iter()
		.map(|e| e.course_id)
		.collect();
	let courses = app
		.meta_adapter
		.list_courses(&ListCoursesOptions { ids: Some(&course_ids), ..Default::default() })
		.await?;

	let mut res = Vec::with_capacity(courses.len());
	for course in courses {
		let completion_percentage = completion_percentage(app, user_id, course.id).await?;
		let course = course_view(app, Some(user_id), course).await?;
		res.push(EnrolledCourse { course, completion_percentage });
	}
	Ok(res)
}

/// Stores AI generated quiz questions for a module, returns how many were stored
async fn generate_quiz(app: &App, ai: &AiService, module: &Module) -> ClResult<u32> {
	let description = module.description.as_deref().unwrap_or_default();
	let questions = ai.generate_quiz(&module.title, description).await;
	if questions.is_empty() {
		warn!("No quiz generated for module {} ({})", module.id, module.title);
		return Ok(0);
	}
	app.meta_adapter.create_questions(module.id, &questions).await
}

/// Generates the module outline of a course and a quiz for every new module.
///
/// Modules that were stored stay stored when a later quiz fails.
pub async fn generate_curriculum(app: &App, ai: &AiService, course: &Course) -> ClResult<Vec<Module>> {
	info!("Generating curriculum for course {} ({})", course.id, course.title);
	let outline =
		ai.generate_curriculum(&course.title, course.description.as_deref().unwrap_or_default()).await;
	if outline.is_empty() {
		warn!("AI returned no modules for course {}", course.id);
		return Ok(Vec::new());
	}

	let modules = app.meta_adapter.create_modules(course.id, &outline).await.map_err(|e| {
		error!("Cannot store curriculum of course {}: {}", course.id, e);
		Error::Internal("Could not generate the curriculum".into())
	})?;

	for module in &modules {
		match generate_quiz(app, ai, module).await {
			Ok(count) => debug!("Quiz for module {}: {} questions", module.id, count),
			Err(e) => warn!("Cannot store quiz of module {}: {}", module.id, e),
		}
	}
	Ok(modules)
}

/// Generates the lesson of a module, plus its quiz when it has none yet
pub async fn generate_module_content(app: &App, ai: &AiService, module: &Module) -> ClResult<Module> {
	let content = ai
		.generate_module_content(&module.title, module.description.as_deref().unwrap_or_default())
		.await;
	let updated = app.meta_adapter.update_module_content(module.id, &content).await?;

	if app.meta_adapter.list_questions(module.id).await?.is_empty() {
		generate_quiz(app, ai, module).await?;
	}
	Ok(updated)
}

// vim: ts=4
