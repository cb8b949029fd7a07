//! Course categories

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::Category, prelude::*};

fn row_to_category(row: &SqliteRow) -> Result<Category, sqlx::Error> {
	Ok(Category {
		id: row.try_get("id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
	})
}

pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<Category>> {
	let res = sqlx::query("SELECT id, name, description FROM categories ORDER BY name")
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_category))
}

pub(crate) async fn read(db: &SqlitePool, category_id: i64) -> ClResult<Category> {
	let res = sqlx::query("SELECT id, name, description FROM categories WHERE id=?1")
		.bind(category_id)
		.fetch_one(db)
		.await;
	map_res(res, row_to_category)
}

pub(crate) async fn create(
	db: &SqlitePool,
	name: &str,
	description: Option<&str>,
) -> ClResult<Category> {
	let res = sqlx::query(
		"INSERT INTO categories (name, description) VALUES (?1, ?2)
		RETURNING id, name, description",
	)
	.bind(name)
	.bind(description)
	.fetch_one(db)
	.await;

	match res {
		Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
			Err(Error::ValidationError("Category already exists".into()))
		}
		res => map_res(res, row_to_category),
	}
}

pub(crate) async fn count(db: &SqlitePool) -> ClResult<u32> {
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM categories")
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(count as u32)
}

// vim: ts=4
