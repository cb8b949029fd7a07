//! SQLite implementation of the Campus auth adapter
//!
//! Stores users, roles and the JWT signing secret in `auth.db`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod auth;
mod crypto;
mod role;
mod schema;
mod user;
mod utils;
mod variable;

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use sqlx::sqlite::{self, SqlitePool};
use std::{path::Path, sync::Arc};

use campus_types::{auth_adapter::*, prelude::*, worker::WorkerPool};

/// Default access token lifetime (seconds)
const DEFAULT_TOKEN_TTL: i64 = 3600;

pub struct AuthAdapterSqlite {
	db: SqlitePool,
	worker: Arc<WorkerPool>,
	jwt_secret_str: Box<str>,
	jwt_secret: DecodingKey,
	token_ttl: i64,
}

impl std::fmt::Debug for AuthAdapterSqlite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthAdapterSqlite").field("token_ttl", &self.token_ttl).finish()
	}
}

impl AuthAdapterSqlite {
	/// Opens (or creates) `auth.db` in `dir`
	pub async fn new(worker: Arc<WorkerPool>, dir: impl AsRef<Path>) -> ClResult<Self> {
		let dir = dir.as_ref();
		tokio::fs::create_dir_all(dir).await?;
		let db_path = dir.join("auth.db");

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(&db_path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("Cannot open {}: {}", db_path.display(), err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("Auth schema init failed: {:#?}", err))
			.or(Err(Error::DbError))?;

		let jwt_secret_str = variable::ensure_jwt_secret(&db).await?;
		let jwt_secret = DecodingKey::from_secret(jwt_secret_str.as_bytes());

		Ok(Self { db, worker, jwt_secret_str, jwt_secret, token_ttl: DEFAULT_TOKEN_TTL })
	}

	/// Uses a configured signing secret instead of the generated one
	pub fn with_secret(mut self, secret: Option<&str>) -> Self {
		if let Some(secret) = secret.filter(|s| !s.is_empty()) {
			self.jwt_secret = DecodingKey::from_secret(secret.as_bytes());
			self.jwt_secret_str = secret.into();
		}
		self
	}

	/// Sets the access token lifetime in seconds
	pub fn with_token_ttl(mut self, ttl: i64) -> Self {
		self.token_ttl = ttl;
		self
	}
}

#[async_trait]
impl AuthAdapter for AuthAdapterSqlite {
	async fn validate_access_token(&self, token: &str) -> ClResult<AuthCtx> {
		auth::validate_access_token(&self.db, &self.jwt_secret, token).await
	}

	async fn check_user_password(&self, username: &str, password: &str) -> ClResult<AuthLogin> {
		auth::check_user_password(
			&self.db,
			&self.worker,
			&self.jwt_secret_str,
			self.token_ttl,
			username,
			password,
		)
		.await
	}

	// Users //
	//*******//
	async fn create_user(&self, data: CreateUserData<'_>) -> ClResult<UserId> {
		let password_hash = crypto::generate_password_hash(&self.worker, data.password.into()).await?;
		let user_id = user::create(&self.db, &data, &password_hash).await?;
		info!("Created user {} ({}) as {}", data.username, user_id, data.role);
		Ok(user_id)
	}

	async fn read_user(&self, user_id: UserId) -> ClResult<User> {
		user::read(&self.db, user_id).await
	}

	async fn read_user_by_username(&self, username: &str) -> ClResult<User> {
		user::read_by_username(&self.db, username).await
	}

	async fn read_user_by_email(&self, email: &str) -> ClResult<User> {
		user::read_by_email(&self.db, email).await
	}

	async fn list_users(&self, opts: &ListUsersOptions<'_>) -> ClResult<Vec<User>> {
		user::list(&self.db, opts).await
	}

	async fn count_users(&self) -> ClResult<u32> {
		user::count(&self.db).await
	}

	async fn update_user(&self, user_id: UserId, data: &UpdateUserData) -> ClResult<User> {
		user::update(&self.db, user_id, data).await
	}

	async fn delete_user(&self, user_id: UserId) -> ClResult<()> {
		user::delete(&self.db, user_id).await
	}

	// Email verification //
	//********************//
	async fn update_verification_token(&self, user_id: UserId, token: &str) -> ClResult<()> {
		user::update_verification_token(&self.db, user_id, token).await
	}

	async fn verify_email(&self, token: &str) -> ClResult<User> {
		user::verify_email(&self.db, token).await
	}

	// Roles //
	//*******//
	async fn list_roles(&self) -> ClResult<Vec<Role>> {
		role::list(&self.db).await
	}

	async fn read_role(&self, role_id: i64) -> ClResult<Role> {
		role::read(&self.db, role_id).await
	}
}

// vim: ts=4
