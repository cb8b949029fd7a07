//! Utility functions for database operations

use sqlx::sqlite::SqliteRow;

use campus_types::prelude::*;

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a query result to a value using a closure
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> ClResult<T>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(ref row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

/// Collect result iterator into a vector
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> ClResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

/// Map a write error, turning UNIQUE violations into a validation error
pub(crate) fn map_write_err(err: sqlx::Error, conflict: &str) -> Error {
	match err {
		sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
			Error::ValidationError(conflict.into())
		}
		err => {
			inspect(&err);
			Error::DbError
		}
	}
}

// vim: ts=4
