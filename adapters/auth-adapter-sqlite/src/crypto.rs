//! Password hashing and access token signing
//!
//! bcrypt and JWT signing are CPU bound, they run on the immediate queue of
//! the worker pool.

use jsonwebtoken::{Algorithm, EncodingKey, Header};

use campus_types::{auth_adapter::AccessToken, prelude::*, worker::WorkerPool};

const BCRYPT_COST: u32 = 10;

fn generate_password_hash_sync(password: Box<str>) -> ClResult<Box<str>> {
	let hash = bcrypt::hash(password.as_ref(), BCRYPT_COST)
		.map_err(|e| Error::Internal(format!("bcrypt hash failed: {}", e)))?;

	Ok(hash.into())
}

pub(crate) async fn generate_password_hash(
	worker: &WorkerPool,
	password: Box<str>,
) -> ClResult<Box<str>> {
	worker.try_run_immed(move || generate_password_hash_sync(password)).await
}

fn check_password_sync(password: Box<str>, password_hash: Box<str>) -> ClResult<()> {
	// A malformed stored hash counts as a mismatch
	match bcrypt::verify(password.as_ref(), &password_hash) {
		Ok(true) => Ok(()),
		_ => Err(Error::Unauthorized),
	}
}

pub(crate) async fn check_password(
	worker: &WorkerPool,
	password: Box<str>,
	password_hash: Box<str>,
) -> ClResult<()> {
	worker.try_run_immed(move || check_password_sync(password, password_hash)).await
}

fn generate_access_token_sync(
	access_token: AccessToken<Box<str>>,
	jwt_secret: &str,
) -> ClResult<Box<str>> {
	let token = jsonwebtoken::encode(
		&Header::new(Algorithm::HS256),
		&access_token,
		&EncodingKey::from_secret(jwt_secret.as_bytes()),
	)
	.map_err(|e| Error::Internal(format!("token signing failed: {}", e)))?
	.into();

	Ok(token)
}

pub(crate) async fn generate_access_token(
	worker: &WorkerPool,
	access_token: AccessToken<Box<str>>,
	jwt_secret: Box<str>,
) -> ClResult<Box<str>> {
	worker.try_run_immed(move || generate_access_token_sync(access_token, &jwt_secret)).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_password_hash_roundtrip() {
		let hash = generate_password_hash_sync("secreto123".into()).unwrap();
		assert!(hash.starts_with("$2"));
		assert!(check_password_sync("secreto123".into(), hash.clone()).is_ok());
		assert!(matches!(
			check_password_sync("otra".into(), hash),
			Err(Error::Unauthorized)
		));
	}

	#[test]
	fn test_malformed_hash_is_unauthorized() {
		assert!(matches!(
			check_password_sync("x".into(), "not-a-hash".into()),
			Err(Error::Unauthorized)
		));
	}
}

// vim: ts=4
