//! User accounts

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{auth_adapter::*, prelude::*};

const USER_COLUMNS: &str = "SELECT u.id, u.username, u.email, u.role_id, r.name AS role,
	u.is_active, u.last_login, u.created_at
	FROM users u JOIN roles r ON r.id=u.role_id";

fn row_to_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
	Ok(User {
		id: UserId(row.try_get("id")?),
		username: row.try_get("username")?,
		email: row.try_get("email")?,
		role_id: row.try_get("role_id")?,
		role: row.try_get("role")?,
		is_active: row.try_get("is_active")?,
		last_login: row.try_get::<Option<i64>, _>("last_login")?.map(Timestamp),
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

/// Creates the user row. The password must already be hashed.
pub(crate) async fn create(
	db: &SqlitePool,
	data: &CreateUserData<'_>,
	password_hash: &str,
) -> ClResult<UserId> {
	let role_id: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE name=?1")
		.bind(data.role)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	let Some(role_id) = role_id else {
		return Err(Error::ValidationError(format!("Unknown role: {}", data.role)));
	};

	let id: i64 = sqlx::query_scalar(
		"INSERT INTO users (username, email, password, role_id, is_active, verification_token)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
	)
	.bind(data.username)
	.bind(data.email)
	.bind(password_hash)
	.bind(role_id)
	.bind(data.is_active)
	.bind(data.verification_token)
	.fetch_one(db)
	.await
	.map_err(|err| map_write_err(err, "Username or email already registered"))?;

	Ok(UserId(id))
}

pub(crate) async fn read(db: &SqlitePool, user_id: UserId) -> ClResult<User> {
	let res = sqlx::query(&format!("{} WHERE u.id=?1", USER_COLUMNS))
		.bind(user_id.0)
		.fetch_one(db)
		.await;
	map_res(res, row_to_user)
}

pub(crate) async fn read_by_username(db: &SqlitePool, username: &str) -> ClResult<User> {
	let res = sqlx::query(&format!("{} WHERE u.username=?1", USER_COLUMNS))
		.bind(username)
		.fetch_one(db)
		.await;
	map_res(res, row_to_user)
}

pub(crate) async fn read_by_email(db: &SqlitePool, email: &str) -> ClResult<User> {
	let res = sqlx::query(&format!("{} WHERE u.email=?1", USER_COLUMNS))
		.bind(email)
		.fetch_one(db)
		.await;
	map_res(res, row_to_user)
}

/// Reads the stored password hash of a user
pub(crate) async fn read_password_hash(db: &SqlitePool, user_id: UserId) -> ClResult<Box<str>> {
	let res = sqlx::query("SELECT password FROM users WHERE id=?1")
		.bind(user_id.0)
		.fetch_one(db)
		.await;
	map_res(res, |row| row.try_get("password"))
}

pub(crate) async fn list(db: &SqlitePool, opts: &ListUsersOptions<'_>) -> ClResult<Vec<User>> {
	let mut query = sqlx::QueryBuilder::new(USER_COLUMNS);
	query.push(" WHERE 1=1");

	if let Some(role) = opts.role {
		query.push(" AND r.name=").push_bind(role);
	}
	if let Some(q) = opts.q {
		query
			.push(" AND (u.username LIKE ")
			.push_bind(format!("%{}%", q))
			.push(" OR u.email LIKE ")
			.push_bind(format!("%{}%", q))
			.push(")");
	}

	query.push(" ORDER BY u.id");
	if let Some(limit) = opts.limit {
		query.push(" LIMIT ").push_bind(i64::from(limit));
		if let Some(offset) = opts.offset {
			query.push(" OFFSET ").push_bind(i64::from(offset));
		}
	}

	let res = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	collect_res(res.iter().map(row_to_user))
}

pub(crate) async fn count(db: &SqlitePool) -> ClResult<u32> {
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(count as u32)
}

pub(crate) async fn update(db: &SqlitePool, user_id: UserId, data: &UpdateUserData) -> ClResult<User> {
	if matches!(data.email, Patch::Null)
		|| matches!(data.role_id, Patch::Null)
		|| matches!(data.is_active, Patch::Null)
	{
		return Err(Error::ValidationError("Fields cannot be null".into()));
	}
	if let Patch::Value(role_id) = data.role_id {
		crate::role::read(db, role_id).await.map_err(|err| match err {
			Error::NotFound => Error::ValidationError("Invalid role".into()),
			err => err,
		})?;
	}

	let mut query = sqlx::QueryBuilder::new("UPDATE users SET updated_at=unixepoch()");
	if let Patch::Value(email) = &data.email {
		query.push(", email=").push_bind(email.as_ref());
	}
	if let Patch::Value(role_id) = data.role_id {
		query.push(", role_id=").push_bind(role_id);
	}
	if let Patch::Value(is_active) = data.is_active {
		query.push(", is_active=").push_bind(is_active);
	}
	query.push(" WHERE id=").push_bind(user_id.0);

	let res = query
		.build()
		.execute(db)
		.await
		.map_err(|err| map_write_err(err, "Email already registered"))?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	read(db, user_id).await
}

pub(crate) async fn delete(db: &SqlitePool, user_id: UserId) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM users WHERE id=?1")
		.bind(user_id.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn update_last_login(db: &SqlitePool, user_id: UserId) -> ClResult<()> {
	sqlx::query("UPDATE users SET last_login=unixepoch() WHERE id=?1")
		.bind(user_id.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(())
}

// Email verification //
//********************//
pub(crate) async fn update_verification_token(
	db: &SqlitePool,
	user_id: UserId,
	token: &str,
) -> ClResult<()> {
	let res = sqlx::query(
		"UPDATE users SET verification_token=?2, updated_at=unixepoch() WHERE id=?1",
	)
	.bind(user_id.0)
	.bind(token)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

pub(crate) async fn verify_email(db: &SqlitePool, token: &str) -> ClResult<User> {
	let user_id: Option<i64> = sqlx::query_scalar(
		"UPDATE users SET is_active=1, verification_token=NULL, updated_at=unixepoch()
		WHERE verification_token=?1 RETURNING id",
	)
	.bind(token)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	let Some(user_id) = user_id else {
		return Err(Error::ValidationError("Invalid or expired verification token".into()));
	};
	read(db, UserId(user_id)).await
}

// vim: ts=4
