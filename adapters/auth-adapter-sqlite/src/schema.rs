//! Database schema initialization

use sqlx::{Sqlite, SqlitePool, Transaction};

use campus_types::auth_adapter::{ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT};

// Current schema version - update this when adding new migrations
const CURRENT_DB_VERSION: i64 = 1;

/// Get the current database version from vars table
async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM vars WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

/// Initialize the database schema
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
		key text NOT NULL,
		value text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	// Roles
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS roles (
			id integer NOT NULL,
			name text NOT NULL,
			PRIMARY KEY(id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_roles_name ON roles (name)")
		.execute(&mut *tx)
		.await?;
	for (id, name) in [(1, ROLE_STUDENT), (2, ROLE_INSTRUCTOR), (3, ROLE_ADMIN)] {
		sqlx::query("INSERT OR IGNORE INTO roles (id, name) VALUES (?1, ?2)")
			.bind(id)
			.bind(name)
			.execute(&mut *tx)
			.await?;
	}

	// Users
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
			id integer NOT NULL,
			username text NOT NULL,
			email text NOT NULL,
			password text NOT NULL,
			role_id integer NOT NULL REFERENCES roles(id),
			is_active integer NOT NULL DEFAULT 0,
			verification_token text,
			last_login INTEGER,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(id AUTOINCREMENT)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users (username)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (email)")
		.execute(&mut *tx)
		.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_users_vfy ON users (verification_token)
		WHERE verification_token IS NOT NULL",
	)
	.execute(&mut *tx)
	.await?;

	if version < CURRENT_DB_VERSION {
		sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES ('db_version', ?)")
			.bind(CURRENT_DB_VERSION.to_string())
			.execute(&mut *tx)
			.await?;
	}

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
