//! Login, access token and email verification tests

use campus_auth_adapter_sqlite::AuthAdapterSqlite;
use campus_types::auth_adapter::*;
use campus_types::prelude::*;
use campus_types::worker::WorkerPool;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create a test auth adapter with temporary database
async fn create_test_adapter() -> ClResult<(AuthAdapterSqlite, TempDir)> {
	let tmp_dir = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));
	let adapter = AuthAdapterSqlite::new(worker, tmp_dir.path()).await?;
	Ok((adapter, tmp_dir))
}

async fn create_user(adapter: &AuthAdapterSqlite, username: &str, active: bool) -> UserId {
	adapter
		.create_user(CreateUserData {
			username,
			email: &format!("{}@campus.test", username),
			password: "secreto123",
			role: ROLE_STUDENT,
			is_active: active,
			verification_token: Some(&format!("tok-{}", username)),
		})
		.await
		.expect("Failed to create user")
}

#[tokio::test]
async fn test_login_issues_valid_token() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	let user_id = create_user(&adapter, "ana", true).await;

	let login = adapter.check_user_password("ana", "secreto123").await.expect("login failed");
	assert_eq!(login.user_id, user_id);
	assert_eq!(login.role.as_ref(), ROLE_STUDENT);

	let ctx = adapter.validate_access_token(&login.token).await.expect("token rejected");
	assert_eq!(ctx.user_id, user_id);
	assert_eq!(ctx.username.as_ref(), "ana");
	assert!(!ctx.is_instructor());

	let user = adapter.read_user(user_id).await.unwrap();
	assert!(user.last_login.is_some());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	create_user(&adapter, "ana", true).await;

	assert!(matches!(
		adapter.check_user_password("ana", "wrong").await,
		Err(Error::Unauthorized)
	));
	assert!(matches!(
		adapter.check_user_password("nobody", "secreto123").await,
		Err(Error::Unauthorized)
	));
}

#[tokio::test]
async fn test_inactive_user_cannot_login() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	create_user(&adapter, "ben", false).await;

	// Bad password is reported before the inactive state
	assert!(matches!(adapter.check_user_password("ben", "x").await, Err(Error::Unauthorized)));
	assert!(matches!(
		adapter.check_user_password("ben", "secreto123").await,
		Err(Error::ValidationError(_))
	));
}

#[tokio::test]
async fn test_deactivated_user_token_rejected() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	let user_id = create_user(&adapter, "ana", true).await;
	let login = adapter.check_user_password("ana", "secreto123").await.unwrap();

	adapter
		.update_user(user_id, &UpdateUserData { is_active: Patch::Value(false), ..Default::default() })
		.await
		.unwrap();
	assert!(matches!(
		adapter.validate_access_token(&login.token).await,
		Err(Error::Unauthorized)
	));
}

#[tokio::test]
async fn test_garbage_token_rejected() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	assert!(matches!(
		adapter.validate_access_token("not.a.jwt").await,
		Err(Error::Unauthorized)
	));
}

#[tokio::test]
async fn test_expired_token_rejected() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	let adapter = adapter.with_token_ttl(-3600);
	create_user(&adapter, "ana", true).await;
	let login = adapter.check_user_password("ana", "secreto123").await.unwrap();
	assert!(matches!(
		adapter.validate_access_token(&login.token).await,
		Err(Error::Unauthorized)
	));
}

#[tokio::test]
async fn test_jwt_secret_persists_across_restarts() {
	let tmp_dir = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));

	let adapter1 = AuthAdapterSqlite::new(worker.clone(), tmp_dir.path()).await.unwrap();
	create_user(&adapter1, "ana", true).await;
	let login = adapter1.check_user_password("ana", "secreto123").await.unwrap();
	drop(adapter1);

	let adapter2 = AuthAdapterSqlite::new(worker, tmp_dir.path()).await.unwrap();
	assert!(adapter2.validate_access_token(&login.token).await.is_ok());
}

#[tokio::test]
async fn test_configured_secret_overrides_stored() {
	let tmp_dir = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));

	let adapter1 = AuthAdapterSqlite::new(worker.clone(), tmp_dir.path()).await.unwrap();
	create_user(&adapter1, "ana", true).await;
	let login = adapter1.check_user_password("ana", "secreto123").await.unwrap();

	let adapter2 = AuthAdapterSqlite::new(worker, tmp_dir.path())
		.await
		.unwrap()
		.with_secret(Some("configured-secret"));
	assert!(matches!(
		adapter2.validate_access_token(&login.token).await,
		Err(Error::Unauthorized)
	));
}

#[tokio::test]
async fn test_verify_email_activates_once() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	let user_id = create_user(&adapter, "ben", false).await;

	let user = adapter.verify_email("tok-ben").await.expect("verification failed");
	assert_eq!(user.id, user_id);
	assert!(user.is_active);

	// Token is single use
	assert!(matches!(adapter.verify_email("tok-ben").await, Err(Error::ValidationError(_))));
	assert!(adapter.check_user_password("ben", "secreto123").await.is_ok());
}

#[tokio::test]
async fn test_update_verification_token_replaces_old() {
	let (adapter, _tmp) = create_test_adapter().await.expect("Failed to create adapter");
	let user_id = create_user(&adapter, "ben", false).await;

	adapter.update_verification_token(user_id, "fresh").await.unwrap();
	assert!(adapter.verify_email("tok-ben").await.is_err());
	assert!(adapter.verify_email("fresh").await.is_ok());
}

// vim: ts=4
