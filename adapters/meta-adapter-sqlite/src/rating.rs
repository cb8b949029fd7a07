//! Up/down votes on courses and modules

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

fn target_ids(target: RatingTarget) -> (Option<i64>, Option<i64>) {
	match target {
		RatingTarget::Course(course_id) => (Some(course_id), None),
		RatingTarget::Module(module_id) => (None, Some(module_id)),
	}
}

fn target_filter(target: RatingTarget) -> (&'static str, i64) {
	match target {
		RatingTarget::Course(course_id) => ("course_id", course_id),
		RatingTarget::Module(module_id) => ("module_id", module_id),
	}
}

fn row_to_rating(row: &SqliteRow) -> Result<Rating, sqlx::Error> {
	Ok(Rating {
		id: row.try_get("id")?,
		user_id: UserId(row.try_get("user_id")?),
		course_id: row.try_get("course_id")?,
		module_id: row.try_get("module_id")?,
		is_upvote: row.try_get("is_upvote")?,
	})
}

pub(crate) async fn upsert(
	db: &SqlitePool,
	user_id: UserId,
	target: RatingTarget,
	is_upvote: bool,
) -> ClResult<Rating> {
	let (column, target_id) = target_filter(target);
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	let updated = sqlx::query(&format!(
		"UPDATE ratings SET is_upvote=?3 WHERE user_id=?1 AND {}=?2
		RETURNING id, user_id, course_id, module_id, is_upvote",
		column
	))
	.bind(user_id.0)
	.bind(target_id)
	.bind(is_upvote)
	.fetch_optional(&mut *tx)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	let row = match updated {
		Some(row) => row,
		None => {
			let (course_id, module_id) = target_ids(target);
			sqlx::query(
				"INSERT INTO ratings (user_id, course_id, module_id, is_upvote) VALUES (?1, ?2, ?3, ?4)
				RETURNING id, user_id, course_id, module_id, is_upvote",
			)
			.bind(user_id.0)
			.bind(course_id)
			.bind(module_id)
			.bind(is_upvote)
			.fetch_one(&mut *tx)
			.await
			.map_err(map_write_err)?
		}
	};

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	row_to_rating(&row).inspect_err(inspect).or(Err(Error::DbError))
}

pub(crate) async fn counts(db: &SqlitePool, target: Option<RatingTarget>) -> ClResult<RatingCounts> {
	let mut query = sqlx::QueryBuilder::new(
		"SELECT coalesce(sum(is_upvote=1), 0) AS upvotes, coalesce(sum(is_upvote=0), 0) AS downvotes
		FROM ratings",
	);
	if let Some(target) = target {
		let (column, target_id) = target_filter(target);
		query.push(" WHERE ").push(column).push("=").push_bind(target_id);
	}

	let res = query.build().fetch_one(db).await;
	map_res(res, |row| {
		Ok(RatingCounts {
			upvotes: row.try_get::<i64, _>("upvotes")? as u32,
			downvotes: row.try_get::<i64, _>("downvotes")? as u32,
			user_rating: None,
		})
	})
}

pub(crate) async fn read_user_rating(
	db: &SqlitePool,
	user_id: UserId,
	target: RatingTarget,
) -> ClResult<Option<bool>> {
	let (column, target_id) = target_filter(target);
	sqlx::query_scalar(&format!(
		"SELECT is_upvote FROM ratings WHERE user_id=?1 AND {}=?2",
		column
	))
	.bind(user_id.0)
	.bind(target_id)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))
}

// vim: ts=4
