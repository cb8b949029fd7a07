//! Enrollments and per-module progress

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::collections::HashMap;

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

fn row_to_enrollment(row: &SqliteRow) -> Result<Enrollment, sqlx::Error> {
	Ok(Enrollment {
		user_id: UserId(row.try_get("user_id")?),
		course_id: row.try_get("course_id")?,
		enrolled_at: Timestamp(row.try_get("enrolled_at")?),
	})
}

pub(crate) async fn read(
	db: &SqlitePool,
	user_id: UserId,
	course_id: i64,
) -> ClResult<Option<Enrollment>> {
	let res = sqlx::query(
		"SELECT user_id, course_id, enrolled_at FROM enrollments WHERE user_id=?1 AND course_id=?2",
	)
	.bind(user_id.0)
	.bind(course_id)
	.fetch_one(db)
	.await;

	match map_res(res, row_to_enrollment) {
		Ok(enrollment) => Ok(Some(enrollment)),
		Err(Error::NotFound) => Ok(None),
		Err(err) => Err(err),
	}
}

/// Fails with ValidationError when the user is already enrolled
pub(crate) async fn create(db: &SqlitePool, user_id: UserId, course_id: i64) -> ClResult<Enrollment> {
	let res = sqlx::query(
		"INSERT INTO enrollments (user_id, course_id) VALUES (?1, ?2)
		RETURNING user_id, course_id, enrolled_at",
	)
	.bind(user_id.0)
	.bind(course_id)
	.fetch_one(db)
	.await;

	match res {
		Ok(row) => row_to_enrollment(&row).inspect_err(inspect).or(Err(Error::DbError)),
		Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
			Err(Error::ValidationError("Already enrolled in this course".into()))
		}
		Err(err) => Err(map_write_err(err)),
	}
}

pub(crate) async fn list_by_user(db: &SqlitePool, user_id: UserId) -> ClResult<Vec<Enrollment>> {
	let res = sqlx::query(
		"SELECT user_id, course_id, enrolled_at FROM enrollments WHERE user_id=?1
		ORDER BY enrolled_at, course_id",
	)
	.bind(user_id.0)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_enrollment))
}

pub(crate) async fn list_by_course(db: &SqlitePool, course_id: i64) -> ClResult<Vec<Enrollment>> {
	let res = sqlx::query(
		"SELECT user_id, course_id, enrolled_at FROM enrollments WHERE course_id=?1
		ORDER BY enrolled_at, user_id",
	)
	.bind(course_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_enrollment))
}

pub(crate) async fn count(db: &SqlitePool) -> ClResult<u32> {
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM enrollments")
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(count as u32)
}

// Progress //
//**********//
pub(crate) async fn list_progress(
	db: &SqlitePool,
	user_id: UserId,
	course_id: i64,
) -> ClResult<HashMap<i64, ProgressStatus>> {
	let res = sqlx::query(
		"SELECT p.module_id, p.status FROM progress p
		JOIN modules m ON m.id=p.module_id
		WHERE p.user_id=?1 AND m.course_id=?2",
	)
	.bind(user_id.0)
	.bind(course_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	let rows = collect_res(res.iter().map(|row| {
		Ok((row.try_get::<i64, _>("module_id")?, row.try_get::<String, _>("status")?))
	}))?;
	Ok(rows
		.into_iter()
		.map(|(module_id, status)| (module_id, ProgressStatus::from_str_lossy(&status)))
		.collect())
}

pub(crate) async fn mark_completed(db: &SqlitePool, user_id: UserId, module_id: i64) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO progress (user_id, module_id, status) VALUES (?1, ?2, 'completed')
		ON CONFLICT (user_id, module_id) DO UPDATE SET status='completed', updated_at=unixepoch()
		WHERE status<>'completed'",
	)
	.bind(user_id.0)
	.bind(module_id)
	.execute(db)
	.await
	.map_err(map_write_err)?;
	Ok(())
}

pub(crate) async fn count_completed(
	db: &SqlitePool,
	user_id: UserId,
	course_id: i64,
) -> ClResult<u32> {
	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM progress p JOIN modules m ON m.id=p.module_id
		WHERE p.user_id=?1 AND m.course_id=?2 AND p.status='completed'",
	)
	.bind(user_id.0)
	.bind(course_id)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	Ok(count as u32)
}

// vim: ts=4
