//! Global variable storage (`vars` table)

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use campus_types::prelude::*;

const JWT_SECRET_VAR: &str = "jwt_secret";

pub(crate) async fn read_var(db: &SqlitePool, key: &str) -> ClResult<Option<Box<str>>> {
	let res = sqlx::query("SELECT value FROM vars WHERE key = ?1")
		.bind(key)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	match res {
		Some(row) => Ok(Some(row.try_get("value").inspect_err(inspect).or(Err(Error::DbError))?)),
		None => Ok(None),
	}
}

pub(crate) async fn update_var(db: &SqlitePool, key: &str, value: &str) -> ClResult<()> {
	sqlx::query(
		"INSERT OR REPLACE INTO vars (key, value, updated_at) VALUES (?1, ?2, unixepoch())",
	)
	.bind(key)
	.bind(value)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	Ok(())
}

/// Get or generate the JWT secret for HS256 signing
pub(crate) async fn ensure_jwt_secret(db: &SqlitePool) -> ClResult<Box<str>> {
	if let Some(secret) = read_var(db, JWT_SECRET_VAR).await? {
		return Ok(secret);
	}

	// 32 random bytes, base64 encoded
	use base64::Engine;
	use rand::Rng;
	let mut secret_bytes = [0u8; 32];
	rand::rng().fill_bytes(&mut secret_bytes);
	let secret = base64::engine::general_purpose::STANDARD.encode(secret_bytes);

	update_var(db, JWT_SECRET_VAR, &secret).await?;

	info!("Generated new JWT secret");
	Ok(secret.into())
}

// vim: ts=4
