//! Adapter that manages users, roles, credentials and access tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::{
	prelude::*,
	types::{serialize_timestamp_iso, serialize_timestamp_iso_opt},
};

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_ADMIN: &str = "admin";

/// Access token claims (HS256 JWT)
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AccessToken<S> {
	/// Username
	pub sub: S,
	pub uid: UserId,
	/// Role name
	pub r: Option<S>,
	pub exp: Timestamp,
}

/// Context struct for an authenticated user
#[derive(Clone, Debug)]
pub struct AuthCtx {
	pub user_id: UserId,
	pub username: Box<str>,
	pub role: Box<str>,
}

impl AuthCtx {
	pub fn is_admin(&self) -> bool {
		self.role.as_ref() == ROLE_ADMIN
	}

	/// Instructors and admins
	pub fn is_instructor(&self) -> bool {
		matches!(self.role.as_ref(), ROLE_INSTRUCTOR | ROLE_ADMIN)
	}
}

#[derive(Debug)]
pub struct AuthLogin {
	pub user_id: UserId,
	pub username: Box<str>,
	pub role: Box<str>,
	pub token: Box<str>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Role {
	pub id: i64,
	pub name: Box<str>,
}

/// User account as stored by the auth adapter (no password hash)
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct User {
	pub id: UserId,
	pub username: Box<str>,
	pub email: Box<str>,
	pub role_id: i64,
	pub role: Box<str>,
	pub is_active: bool,
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub last_login: Option<Timestamp>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

/// Data needed to create a new user
#[derive(Debug)]
pub struct CreateUserData<'a> {
	pub username: &'a str,
	pub email: &'a str,
	pub password: &'a str,
	pub role: &'a str,
	pub is_active: bool,
	pub verification_token: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct UpdateUserData {
	pub email: Patch<Box<str>>,
	pub role_id: Patch<i64>,
	pub is_active: Patch<bool>,
}

#[derive(Debug, Default)]
pub struct ListUsersOptions<'a> {
	pub role: Option<&'a str>,
	pub q: Option<&'a str>,
	pub limit: Option<u32>,
	pub offset: Option<u32>,
}

#[async_trait]
pub trait AuthAdapter: Debug + Send + Sync {
	/// Validates an access token and returns the user context.
	///
	/// The user must still exist and be active.
	async fn validate_access_token(&self, token: &str) -> ClResult<AuthCtx>;

	/// Checks a username/password pair and issues an access token.
	///
	/// Wrong credentials → `Unauthorized`, inactive account → `ValidationError`.
	async fn check_user_password(&self, username: &str, password: &str) -> ClResult<AuthLogin>;

	// Users
	async fn create_user(&self, data: CreateUserData<'_>) -> ClResult<UserId>;
	async fn read_user(&self, user_id: UserId) -> ClResult<User>;
	async fn read_user_by_username(&self, username: &str) -> ClResult<User>;
	async fn read_user_by_email(&self, email: &str) -> ClResult<User>;
	async fn list_users(&self, opts: &ListUsersOptions<'_>) -> ClResult<Vec<User>>;
	async fn count_users(&self) -> ClResult<u32>;
	async fn update_user(&self, user_id: UserId, data: &UpdateUserData) -> ClResult<User>;
	async fn delete_user(&self, user_id: UserId) -> ClResult<()>;

	// Email verification
	/// Replaces the user's pending verification token
	async fn update_verification_token(&self, user_id: UserId, token: &str) -> ClResult<()>;
	/// Activates the user holding `token` and clears it
	async fn verify_email(&self, token: &str) -> ClResult<User>;

	// Roles
	async fn list_roles(&self) -> ClResult<Vec<Role>>;
	async fn read_role(&self, role_id: i64) -> ClResult<Role>;
}

// vim: ts=4
