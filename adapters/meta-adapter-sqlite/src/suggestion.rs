//! Course topic suggestions and their votes

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

const SUGGESTION_COLUMNS: &str =
	"SELECT id, topic, votes, status, created_at FROM course_suggestions";

fn row_to_suggestion(row: &SqliteRow) -> Result<CourseSuggestion, sqlx::Error> {
	Ok(CourseSuggestion {
		id: row.try_get("id")?,
		topic: row.try_get("topic")?,
		votes: row.try_get::<i64, _>("votes")? as u32,
		status: SuggestionStatus::from_str_lossy(row.try_get("status")?),
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<CourseSuggestion>> {
	let res = sqlx::query(&format!("{} ORDER BY votes DESC, id", SUGGESTION_COLUMNS))
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_suggestion))
}

/// Case-insensitive substring search on the topic
pub(crate) async fn search(db: &SqlitePool, query: &str) -> ClResult<Vec<CourseSuggestion>> {
	let pattern = format!("%{}%", query.to_lowercase());
	let res = sqlx::query(&format!(
		"{} WHERE lower(topic) LIKE ?1 ORDER BY votes DESC, id",
		SUGGESTION_COLUMNS
	))
	.bind(pattern)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_suggestion))
}

pub(crate) async fn create(db: &SqlitePool, topic: &str) -> ClResult<CourseSuggestion> {
	let res = sqlx::query(
		"INSERT INTO course_suggestions (topic) VALUES (?1)
		RETURNING id, topic, votes, status, created_at",
	)
	.bind(topic)
	.fetch_one(db)
	.await;
	map_res(res, row_to_suggestion)
}

pub(crate) async fn add_vote(db: &SqlitePool, suggestion_id: i64) -> ClResult<CourseSuggestion> {
	let res = sqlx::query(
		"UPDATE course_suggestions SET votes=votes+1 WHERE id=?1
		RETURNING id, topic, votes, status, created_at",
	)
	.bind(suggestion_id)
	.fetch_one(db)
	.await;
	map_res(res, row_to_suggestion)
}

pub(crate) async fn update_status(
	db: &SqlitePool,
	suggestion_id: i64,
	status: SuggestionStatus,
) -> ClResult<CourseSuggestion> {
	let res = sqlx::query(
		"UPDATE course_suggestions SET status=?2 WHERE id=?1
		RETURNING id, topic, votes, status, created_at",
	)
	.bind(suggestion_id)
	.bind(status.as_str())
	.fetch_one(db)
	.await;
	map_res(res, row_to_suggestion)
}

// vim: ts=4
