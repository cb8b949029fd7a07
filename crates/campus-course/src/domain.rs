//! Course progress calculations
//!
//! Everything here is pure: the handlers load the rows, these functions
//! decide stars, quiz results and which modules are locked.

use serde::Serialize;
use std::collections::HashMap;

use campus_types::meta_adapter::{CourseLevel, ProgressStatus, Question};
use campus_types::utils::percentage;

// Stars //
//*******//
pub fn total_stars(level: CourseLevel) -> u32 {
	match level {
		CourseLevel::Basico => 3,
		CourseLevel::Intermedio => 5,
		CourseLevel::Avanzado => 7,
	}
}

/// Stars earned from the user's average quiz score in the course
pub fn earned_stars(total: u32, is_enrolled: bool, avg_score: Option<f64>) -> u32 {
	let Some(avg) = avg_score.filter(|_| is_enrolled) else {
		return 0;
	};
	let total_f = f64::from(total);
	if avg < 50.0 {
		0
	} else if avg < 75.0 {
		(total_f * 0.33).round_ties_even() as u32
	} else if avg < 95.0 {
		(total_f * 0.66).round_ties_even() as u32
	} else {
		total
	}
}

/// `(total_stars, earned_stars)`
pub fn stars(level: CourseLevel, is_enrolled: bool, avg_score: Option<f64>) -> (u32, u32) {
	let total = total_stars(level);
	(total, earned_stars(total, is_enrolled, avg_score))
}

// Quiz scoring //
//**************//
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerResult {
	pub question_id: i64,
	pub user_option_id: Option<i64>,
	pub correct_option_id: i64,
	pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizScore {
	/// 0..=100
	pub score: u32,
	pub passed: bool,
	pub correct_count: u32,
	pub total_questions: u32,
	pub details: Vec<AnswerResult>,
}

impl QuizScore {
	pub fn incorrect_count(&self) -> u32 {
		self.total_questions - self.correct_count
	}
}

/// `(question_id, option_id)` of the first correct option of every question.
/// Questions without a correct option cannot be graded and are left out.
pub fn correct_options(questions: &[Question]) -> Vec<(i64, i64)> {
	questions
		.iter()
		.filter_map(|q| q.options.iter().find(|o| o.is_correct).map(|o| (q.id, o.id)))
		.collect()
}

/// Grades `answers` (question id → chosen option id) against the correct options.
///
/// Unanswered questions count as wrong, answers to unknown questions are
/// ignored.
pub fn score_quiz(
	answers: &HashMap<i64, i64>,
	correct: &[(i64, i64)],
	pass_threshold: u32,
) -> QuizScore {
	let details: Vec<AnswerResult> = correct
		.iter()
		.map(|&(question_id, correct_option_id)| {
			let user_option_id = answers.get(&question_id).copied();
			AnswerResult {
				question_id,
				user_option_id,
				correct_option_id,
				is_correct: user_option_id == Some(correct_option_id),
			}
		})
		.collect();

	let total_questions = details.len() as u32;
	let correct_count = details.iter().filter(|d| d.is_correct).count() as u32;
	let score = percentage(correct_count, total_questions);

	QuizScore { score, passed: score >= pass_threshold, correct_count, total_questions, details }
}

// Module unlocking //
//******************//
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleLock {
	pub status: ProgressStatus,
	pub is_locked: bool,
}

/// Lock state of each module, `module_ids` sorted by `order_index`.
///
/// The first module is open, every other one opens once its predecessor is
/// completed. With `bypass` nothing is locked.
pub fn module_locks(
	module_ids: &[i64],
	progress: &HashMap<i64, ProgressStatus>,
	bypass: bool,
) -> Vec<ModuleLock> {
	let mut previous_completed = true;
	module_ids
		.iter()
		.map(|module_id| {
			let status = progress.get(module_id).copied().unwrap_or_default();
			let is_locked = !bypass && !previous_completed;
			previous_completed = status == ProgressStatus::Completed;
			ModuleLock { status, is_locked }
		})
		.collect()
}


// vim: ts=4
