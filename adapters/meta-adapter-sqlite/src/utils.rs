//! Shared utilities for the SQLite adapter
//!
//! Helper functions, macros and error mapping used by the entity modules.

use campus_types::prelude::*;
use sqlx::sqlite::SqliteRow;

/// Applies a `Patch` field to an UPDATE query.
/// Returns true if the field was added (for tracking has_updates)
macro_rules! push_patch {
	// For bindable values (strings, numbers, bools)
	($query:expr, $has_updates:expr, $field:literal, $patch:expr) => {{
		match $patch {
			Patch::Undefined => $has_updates,
			Patch::Null => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=NULL"));
				true
			}
			Patch::Value(v) => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=")).push_bind(v);
				true
			}
		}
	}};
	// For fields that need conversion (enums, boxed strings)
	($query:expr, $has_updates:expr, $field:literal, $patch:expr, |$v:ident| $convert:expr) => {{
		match $patch {
			Patch::Undefined => $has_updates,
			Patch::Null => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=NULL"));
				true
			}
			Patch::Value($v) => {
				if $has_updates {
					$query.push(", ");
				}
				$query.push(concat!($field, "=")).push_bind($convert);
				true
			}
		}
	}};
}

pub(crate) use push_patch;

/// Build an IN clause with parameterized values
pub(crate) fn push_in<'a>(query: &mut sqlx::QueryBuilder<'a, sqlx::Sqlite>, values: &[i64]) {
	query.push("(");
	let mut sep = query.separated(", ");
	for value in values {
		sep.push_bind(*value);
	}
	query.push(")");
}

/// Parse a comma-separated id list (as produced by `group_concat`)
pub(crate) fn parse_id_list(s: Option<&str>) -> Vec<i64> {
	s.map(|s| s.split(',').filter_map(|id| id.trim().parse().ok()).collect())
		.unwrap_or_default()
}

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a single-row query result, translating SQL errors to ClResult
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

/// Collect an iterator of query results, translating errors
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> ClResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

/// Map a write error: foreign key violations mean the referenced row is missing
pub(crate) fn map_write_err(err: sqlx::Error) -> Error {
	match err {
		sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => Error::NotFound,
		sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
			Error::ValidationError("Duplicate entry".into())
		}
		err => {
			inspect(&err);
			Error::DbError
		}
	}
}

/// Fails with NotFound when an UPDATE/DELETE touched no row
pub(crate) fn expect_affected(res: sqlx::sqlite::SqliteQueryResult) -> ClResult<()> {
	if res.rows_affected() == 0 { Err(Error::NotFound) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_id_list() {
		assert_eq!(parse_id_list(Some("3, 1,2")), vec![3, 1, 2]);
		assert!(parse_id_list(None).is_empty());
		assert!(parse_id_list(Some("")).is_empty());
	}
}

// vim: ts=4
