//! Learning paths: ordered sequences of courses

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

fn row_to_path(row: &SqliteRow) -> Result<LearningPath, sqlx::Error> {
	Ok(LearningPath {
		id: row.try_get("id")?,
		title: row.try_get("title")?,
		description: row.try_get("description")?,
		courses: Vec::new(),
	})
}

async fn list_path_courses(db: &SqlitePool, path_id: i64) -> ClResult<Vec<PathCourse>> {
	let res = sqlx::query(
		"SELECT course_id, step FROM learning_path_courses WHERE path_id=?1 ORDER BY step, course_id",
	)
	.bind(path_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(|row| {
		Ok(PathCourse { course_id: row.try_get("course_id")?, step: row.try_get("step")? })
	}))
}

pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<LearningPath>> {
	let res = sqlx::query("SELECT id, title, description FROM learning_paths ORDER BY id")
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	let mut paths = collect_res(res.iter().map(row_to_path))?;
	for path in &mut paths {
		path.courses = list_path_courses(db, path.id).await?;
	}
	Ok(paths)
}

pub(crate) async fn read(db: &SqlitePool, path_id: i64) -> ClResult<LearningPath> {
	let res = sqlx::query("SELECT id, title, description FROM learning_paths WHERE id=?1")
		.bind(path_id)
		.fetch_one(db)
		.await;
	let mut path = map_res(res, row_to_path)?;
	path.courses = list_path_courses(db, path_id).await?;
	Ok(path)
}

pub(crate) async fn create(
	db: &SqlitePool,
	title: &str,
	description: Option<&str>,
) -> ClResult<LearningPath> {
	let res = sqlx::query(
		"INSERT INTO learning_paths (title, description) VALUES (?1, ?2)
		RETURNING id, title, description",
	)
	.bind(title)
	.bind(description)
	.fetch_one(db)
	.await;
	map_res(res, row_to_path)
}

/// Adds a course at `step`, or moves it there when already on the path
pub(crate) async fn add_course(db: &SqlitePool, path_id: i64, course_id: i64, step: i32) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO learning_path_courses (path_id, course_id, step) VALUES (?1, ?2, ?3)
		ON CONFLICT (path_id, course_id) DO UPDATE SET step=excluded.step",
	)
	.bind(path_id)
	.bind(course_id)
	.bind(step)
	.execute(db)
	.await
	.map_err(map_write_err)?;
	Ok(())
}

pub(crate) async fn delete(db: &SqlitePool, path_id: i64) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM learning_paths WHERE id=?1")
		.bind(path_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	expect_affected(res)
}

// vim: ts=4
