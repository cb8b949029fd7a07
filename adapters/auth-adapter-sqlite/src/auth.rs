//! Login and access token validation

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use sqlx::SqlitePool;

use crate::{crypto, user};
use campus_types::{auth_adapter::*, prelude::*, worker::WorkerPool};

/// Validate an access token (JWT) and return the authenticated user context
///
/// The user is reloaded, so deactivation and role changes apply to tokens
/// already issued.
pub(crate) async fn validate_access_token(
	db: &SqlitePool,
	jwt_secret: &DecodingKey,
	token: &str,
) -> ClResult<AuthCtx> {
	let token_data =
		decode::<AccessToken<Box<str>>>(token, jwt_secret, &Validation::new(Algorithm::HS256))
			.map_err(|_| Error::Unauthorized)?;

	let user = match user::read(db, token_data.claims.uid).await {
		Ok(user) => user,
		Err(Error::NotFound) => return Err(Error::Unauthorized),
		Err(err) => return Err(err),
	};
	if !user.is_active {
		debug!("Token of inactive user {} rejected", user.username);
		return Err(Error::Unauthorized);
	}

	Ok(AuthCtx { user_id: user.id, username: user.username, role: user.role })
}

/// Check user password and issue an access token
pub(crate) async fn check_user_password(
	db: &SqlitePool,
	worker: &WorkerPool,
	jwt_secret: &str,
	token_ttl: i64,
	username: &str,
	password: &str,
) -> ClResult<AuthLogin> {
	let user = match user::read_by_username(db, username).await {
		Ok(user) => user,
		Err(Error::NotFound) => {
			debug!("Login attempt for unknown user {}", username);
			return Err(Error::Unauthorized);
		}
		Err(err) => return Err(err),
	};

	let password_hash = user::read_password_hash(db, user.id).await?;
	crypto::check_password(worker, password.into(), password_hash).await?;

	if !user.is_active {
		return Err(Error::ValidationError("Inactive user".into()));
	}

	user::update_last_login(db, user.id).await?;

	let token = crypto::generate_access_token(
		worker,
		AccessToken {
			sub: user.username.clone(),
			uid: user.id,
			r: Some(user.role.clone()),
			exp: Timestamp::from_now(token_ttl),
		},
		jwt_secret.into(),
	)
	.await?;

	info!("User {} logged in", user.username);
	Ok(AuthLogin { user_id: user.id, username: user.username, role: user.role, token })
}

// vim: ts=4
