//! Registration, email verification and token endpoints

use axum::{
	Form, Json,
	extract::{Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use campus_email::EmailModule;
use campus_types::auth_adapter::{CreateUserData, ROLE_INSTRUCTOR, ROLE_STUDENT, User};
use campus_types::utils::random_url_token;

use crate::prelude::*;

/// Reply to every registration attempt, so existing emails are not revealed
pub const REGISTER_MESSAGE: &str =
	"Si el correo es válido, recibirás un enlace para verificar tu cuenta.";
pub const VERIFIED_MESSAGE: &str = "Correo verificado. Ya puedes iniciar sesión.";

pub const PLAN_INSTRUCTOR: &str = "Instructor Básico";
pub const PLAN_STUDENT: &str = "Estudiante Básico";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
	pub username: String,
	pub email: String,
	pub password: String,
	#[serde(default)]
	pub is_instructor: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
	pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
	pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
	pub username: String,
	pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
	pub access_token: Box<str>,
	pub token_type: &'static str,
}

/// Basic shape checks shared by registration and user creation
pub fn validate_credentials(username: &str, email: &str, password: &str) -> ClResult<()> {
	if username.is_empty() {
		return Err(Error::ValidationError("Username is required".into()));
	}
	if username.chars().any(char::is_whitespace) {
		return Err(Error::ValidationError("Username cannot contain spaces".into()));
	}
	match email.split_once('@') {
		Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
		_ => return Err(Error::ValidationError("Invalid email address".into())),
	}
	if password.is_empty() {
		return Err(Error::ValidationError("Password is required".into()));
	}
	Ok(())
}

pub fn default_plan(role: &str) -> &'static str {
	if role == ROLE_INSTRUCTOR { PLAN_INSTRUCTOR } else { PLAN_STUDENT }
}

/// Looks up a user, turning `NotFound` into `None`
pub(crate) async fn find_user<F>(lookup: F) -> ClResult<Option<User>>
where
	F: std::future::Future<Output = ClResult<User>>,
{
	match lookup.await {
		Ok(user) => Ok(Some(user)),
		Err(Error::NotFound) => Ok(None),
		Err(e) => Err(e),
	}
}

async fn resend_verification(app: &App, user: &User) -> ClResult<()> {
	let token = random_url_token();
	app.auth_adapter.update_verification_token(user.id, &token).await?;
	app.ext::<EmailModule>()?.send_verification_email(app, &user.email, &user.username, &token);
	info!(user = %user.id, "Verification email re-sent");
	Ok(())
}

/// POST /api/auth/register
pub async fn post_register(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<RegisterRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<MessageResponse>>)> {
	let username = req.username.trim();
	let email = req.email.trim().to_lowercase();
	validate_credentials(username, &email, &req.password)?;

	if let Some(user) = find_user(app.auth_adapter.read_user_by_email(&email)).await? {
		if !user.is_active {
			resend_verification(&app, &user).await?;
		} else {
			debug!("Registration attempt for an active account");
		}
		let response = ApiResponse::new(MessageResponse { message: REGISTER_MESSAGE })
			.with_req_id(req_id.unwrap_or_default());
		return Ok((StatusCode::CREATED, Json(response)));
	}

	if find_user(app.auth_adapter.read_user_by_username(username)).await?.is_some() {
		return Err(Error::ValidationError("Username already registered".into()));
	}

	let role = if req.is_instructor { ROLE_INSTRUCTOR } else { ROLE_STUDENT };
	let token = random_url_token();
	let user_id = app
		.auth_adapter
		.create_user(CreateUserData {
			username,
			email: &email,
			password: &req.password,
			role,
			is_active: false,
			verification_token: Some(&token),
		})
		.await?;
	app.meta_adapter.create_profile(user_id, username).await?;
	app.meta_adapter.create_subscription(user_id, default_plan(role)).await?;
	info!(user = %user_id, role, "User registered");

	app.ext::<EmailModule>()?.send_verification_email(&app, &email, username, &token);

	let response = ApiResponse::new(MessageResponse { message: REGISTER_MESSAGE })
		.with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/auth/verify-email?token=
pub async fn get_verify_email(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Query(query): Query<VerifyEmailQuery>,
) -> ClResult<(StatusCode, Json<ApiResponse<MessageResponse>>)> {
	if query.token.is_empty() {
		return Err(Error::ValidationError("Invalid or expired verification token".into()));
	}
	let user = app.auth_adapter.verify_email(&query.token).await?;
	info!(user = %user.id, "Email verified");

	let response = ApiResponse::new(MessageResponse { message: VERIFIED_MESSAGE })
		.with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/auth/token
///
/// Form encoded, answered with a bare OAuth2 token body.
pub async fn post_token(
	State(app): State<App>,
	Form(req): Form<TokenRequest>,
) -> ClResult<(StatusCode, Json<TokenResponse>)> {
	let login = app.auth_adapter.check_user_password(req.username.trim(), &req.password).await?;
	info!(user = %login.user_id, role = %login.role, "Login");

	Ok((StatusCode::OK, Json(TokenResponse { access_token: login.token, token_type: "bearer" })))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_validate_credentials() {
		assert!(validate_credentials("ana", "ana@example.com", "secret").is_ok());
		assert!(validate_credentials("", "ana@example.com", "secret").is_err());
		assert!(validate_credentials("ana maria", "ana@example.com", "secret").is_err());
		assert!(validate_credentials("ana", "ana.example.com", "secret").is_err());
		assert!(validate_credentials("ana", "@example.com", "secret").is_err());
		assert!(validate_credentials("ana", "ana@localhost", "secret").is_err());
		assert!(validate_credentials("ana", "ana@example.com", "").is_err());
	}

	#[test]
	fn test_default_plan() {
		assert_eq!(default_plan(ROLE_INSTRUCTOR), PLAN_INSTRUCTOR);
		assert_eq!(default_plan(ROLE_STUDENT), PLAN_STUDENT);
	}

	#[tokio::test]
	async fn test_find_user_maps_not_found() {
		let res = find_user(async { Err::<User, _>(Error::NotFound) }).await;
		assert!(matches!(res, Ok(None)));
		let res = find_user(async { Err::<User, _>(Error::DbError) }).await;
		assert!(matches!(res, Err(Error::DbError)));
	}
}

// vim: ts=4
