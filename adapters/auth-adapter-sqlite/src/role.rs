//! Roles

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{auth_adapter::Role, prelude::*};

fn row_to_role(row: &SqliteRow) -> Result<Role, sqlx::Error> {
	Ok(Role { id: row.try_get("id")?, name: row.try_get("name")? })
}

pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<Role>> {
	let res = sqlx::query("SELECT id, name FROM roles ORDER BY id")
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_role))
}

pub(crate) async fn read(db: &SqlitePool, role_id: i64) -> ClResult<Role> {
	let res = sqlx::query("SELECT id, name FROM roles WHERE id=?1")
		.bind(role_id)
		.fetch_one(db)
		.await;
	map_res(res, row_to_role)
}

// vim: ts=4
