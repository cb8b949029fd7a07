//! Quiz questions, options and attempts

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

/// Stores questions with their options; returns the number of questions
pub(crate) async fn create_questions(
	db: &SqlitePool,
	module_id: i64,
	questions: &[NewQuestion],
) -> ClResult<u32> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	for question in questions {
		let question_id: i64 = sqlx::query_scalar(
			"INSERT INTO questions (module_id, question_text) VALUES (?1, ?2) RETURNING id",
		)
		.bind(module_id)
		.bind(&question.question_text)
		.fetch_one(&mut *tx)
		.await
		.map_err(map_write_err)?;

		for option in &question.options {
			sqlx::query(
				"INSERT INTO options (question_id, option_text, is_correct) VALUES (?1, ?2, ?3)",
			)
			.bind(question_id)
			.bind(&option.option_text)
			.bind(option.is_correct)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
		}
	}

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(questions.len() as u32)
}

/// Questions of a module with their options, both in insertion order
pub(crate) async fn list_questions(db: &SqlitePool, module_id: i64) -> ClResult<Vec<Question>> {
	let res = sqlx::query(
		"SELECT q.id, q.question_text, o.id AS option_id, o.option_text, o.is_correct
		FROM questions q LEFT JOIN options o ON o.question_id=q.id
		WHERE q.module_id=?1 ORDER BY q.id, o.id",
	)
	.bind(module_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	let mut questions: Vec<Question> = Vec::new();
	for row in &res {
		let read = || -> Result<_, sqlx::Error> {
			let id: i64 = row.try_get("id")?;
			let question_text: Box<str> = row.try_get("question_text")?;
			let option = match row.try_get::<Option<i64>, _>("option_id")? {
				Some(option_id) => Some(QuestionOption {
					id: option_id,
					option_text: row.try_get("option_text")?,
					is_correct: row.try_get("is_correct")?,
				}),
				None => None,
			};
			Ok((id, question_text, option))
		};
		let (id, question_text, option) = read().inspect_err(inspect).or(Err(Error::DbError))?;

		if let Some(question) = questions.last_mut().filter(|q| q.id == id) {
			question.options.extend(option);
		} else {
			questions.push(Question {
				id,
				module_id,
				question_text,
				options: option.into_iter().collect(),
			});
		}
	}

	Ok(questions)
}

pub(crate) async fn create_attempt(
	db: &SqlitePool,
	user_id: UserId,
	module_id: i64,
	score: u32,
	passed: bool,
) -> ClResult<QuizAttempt> {
	let row = sqlx::query(
		"INSERT INTO quiz_attempts (user_id, module_id, score, passed) VALUES (?1, ?2, ?3, ?4)
		RETURNING id, submitted_at",
	)
	.bind(user_id.0)
	.bind(module_id)
	.bind(i64::from(score))
	.bind(passed)
	.fetch_one(db)
	.await
	.map_err(map_write_err)?;

	Ok(QuizAttempt {
		id: row.try_get("id").inspect_err(inspect).or(Err(Error::DbError))?,
		user_id,
		module_id,
		score,
		passed,
		submitted_at: Timestamp(
			row.try_get("submitted_at").inspect_err(inspect).or(Err(Error::DbError))?,
		),
	})
}

pub(crate) async fn count_attempts(db: &SqlitePool, user_id: UserId, module_id: i64) -> ClResult<u32> {
	let count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM quiz_attempts WHERE user_id=?1 AND module_id=?2")
			.bind(user_id.0)
			.bind(module_id)
			.fetch_one(db)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
	Ok(count as u32)
}

pub(crate) async fn average_score(
	db: &SqlitePool,
	user_id: UserId,
	course_id: i64,
) -> ClResult<Option<f64>> {
	sqlx::query_scalar(
		"SELECT avg(a.score) FROM quiz_attempts a JOIN modules m ON m.id=a.module_id
		WHERE a.user_id=?1 AND m.course_id=?2",
	)
	.bind(user_id.0)
	.bind(course_id)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))
}

// vim: ts=4
