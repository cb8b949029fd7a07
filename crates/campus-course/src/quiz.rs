//! Quiz endpoints: reading questions, submitting answers, attempt status

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;

use campus_ai::AiService;
use campus_core::roles;
use campus_types::meta_adapter::Question;

use crate::domain::{self, AnswerResult};
use crate::prelude::*;
use crate::service;

#[derive(Debug, Serialize)]
pub struct QuizOption {
	pub id: i64,
	pub option_text: Box<str>,
}

#[derive(Debug, Serialize)]
pub struct QuizQuestion {
	pub id: i64,
	pub question_text: Box<str>,
	pub options: Vec<QuizOption>,
}

impl From<Question> for QuizQuestion {
	fn from(q: Question) -> Self {
		Self {
			id: q.id,
			question_text: q.question_text,
			options: q
				.options
				.into_iter()
				.map(|o| QuizOption { id: o.id, option_text: o.option_text })
				.collect(),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct Quiz {
	pub module_id: i64,
	pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct QuizSubmission {
	/// question id → chosen option id
	#[serde(default)]
	pub answers: HashMap<i64, i64>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct QuizResult {
	pub score: u32,
	pub passed: bool,
	pub total_questions: u32,
	pub correct_count: u32,
	pub incorrect_count: u32,
	pub detailed_results: Vec<AnswerResult>,
	pub motivational_phrase: String,
	pub course_total_stars: u32,
	pub course_earned_stars: u32,
	/// Absent when attempts are unlimited
	pub attempts_remaining: Option<u32>,
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct QuizStatus {
	pub can_attempt: bool,
	pub attempts_made: u32,
	pub max_attempts: Option<u32>,
}

/// GET /api/quizzes/module/{module_id}
pub async fn get_quiz(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<Quiz>>)> {
	let questions = app.meta_adapter.list_questions(module_id).await?;
	if questions.is_empty() {
		return Err(Error::NotFound);
	}

	let quiz = Quiz { module_id, questions: questions.into_iter().map(QuizQuestion::from).collect() };
	let response = ApiResponse::new(quiz).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/quizzes/module/{module_id}/submit
pub async fn post_submit_quiz(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
	Json(submission): Json<QuizSubmission>,
) -> ClResult<(StatusCode, Json<ApiResponse<QuizResult>>)> {
	let module = app.meta_adapter.read_module(module_id).await?;
	let course = app.meta_adapter.read_course(module.course_id).await?;
	let is_enrolled = service::is_enrolled(&app, auth.user_id, course.id).await?;
	if !roles::can_view_module(&auth, &course, is_enrolled) {
		return Err(Error::PermissionDenied);
	}

	let policy = app.settings.quiz;
	let attempts_made = app.meta_adapter.count_quiz_attempts(auth.user_id, module_id).await?;
	if policy.max_attempts.is_some_and(|max| attempts_made >= max) {
		info!(user = %auth.user_id, module_id, "Quiz attempt limit reached");
		return Err(Error::PermissionDenied);
	}

	let questions = app.meta_adapter.list_questions(module_id).await?;
	let correct = domain::correct_options(&questions);
	let result = domain::score_quiz(&submission.answers, &correct, policy.pass_threshold);

	app.meta_adapter
		.create_quiz_attempt(auth.user_id, module_id, result.score, result.passed)
		.await?;
	if result.passed {
		app.meta_adapter.mark_module_completed(auth.user_id, module_id).await?;
	}
	info!(
		user = %auth.user_id,
		module_id,
		score = result.score,
		passed = result.passed,
		"Quiz submitted"
	);

	let ai = app.ext::<AiService>()?;
	let motivational_phrase = ai.motivational_phrase(result.score, result.passed).await;
	let (course_total_stars, course_earned_stars) =
		service::course_stars(&app, Some(auth.user_id), &course).await?;

	let quiz_result = QuizResult {
		score: result.score,
		passed: result.passed,
		total_questions: result.total_questions,
		correct_count: result.correct_count,
		incorrect_count: result.incorrect_count(),
		detailed_results: result.details,
		motivational_phrase,
		course_total_stars,
		course_earned_stars,
		attempts_remaining: policy.max_attempts.map(|max| max.saturating_sub(attempts_made + 1)),
	};
	let response = ApiResponse::new(quiz_result).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/quizzes/module/{module_id}/status
pub async fn get_quiz_status(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<QuizStatus>>)> {
	let max_attempts = app.settings.quiz.max_attempts;
	let attempts_made = app.meta_adapter.count_quiz_attempts(auth.user_id, module_id).await?;

	let status = QuizStatus {
		can_attempt: max_attempts.is_none_or(|max| attempts_made < max),
		attempts_made,
		max_attempts,
	};
	let response = ApiResponse::new(status).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

// vim: ts=4
