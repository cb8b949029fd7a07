//! User and role management tests

use campus_auth_adapter_sqlite::AuthAdapterSqlite;
use campus_types::auth_adapter::*;
use campus_types::prelude::*;
use campus_types::worker::WorkerPool;
use std::sync::Arc;
use tempfile::TempDir;

async fn create_test_adapter() -> ClResult<(AuthAdapterSqlite, TempDir)> {
	let tmp_dir = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));
	let adapter = AuthAdapterSqlite::new(worker, tmp_dir.path()).await?;
	Ok((adapter, tmp_dir))
}

fn user_data<'a>(username: &'a str, email: &'a str, role: &'a str) -> CreateUserData<'a> {
	CreateUserData {
		username,
		email,
		password: "secreto123",
		role,
		is_active: true,
		verification_token: None,
	}
}

#[tokio::test]
async fn test_roles_are_seeded() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let roles = adapter.list_roles().await.unwrap();
	let names: Vec<&str> = roles.iter().map(|r| r.name.as_ref()).collect();
	assert_eq!(names, vec![ROLE_STUDENT, ROLE_INSTRUCTOR, ROLE_ADMIN]);
	assert_eq!(adapter.read_role(2).await.unwrap().name.as_ref(), ROLE_INSTRUCTOR);
	assert!(matches!(adapter.read_role(99).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_duplicate_username_or_email() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	adapter.create_user(user_data("ana", "ana@campus.test", ROLE_STUDENT)).await.unwrap();

	assert!(matches!(
		adapter.create_user(user_data("ana", "other@campus.test", ROLE_STUDENT)).await,
		Err(Error::ValidationError(_))
	));
	assert!(matches!(
		adapter.create_user(user_data("other", "ana@campus.test", ROLE_STUDENT)).await,
		Err(Error::ValidationError(_))
	));
	assert_eq!(adapter.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_role_rejected() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	assert!(matches!(
		adapter.create_user(user_data("ana", "ana@campus.test", "wizard")).await,
		Err(Error::ValidationError(_))
	));
}

#[tokio::test]
async fn test_read_user_lookups() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let id = adapter.create_user(user_data("ana", "ana@campus.test", ROLE_INSTRUCTOR)).await.unwrap();

	assert_eq!(adapter.read_user_by_username("ana").await.unwrap().id, id);
	let user = adapter.read_user_by_email("ana@campus.test").await.unwrap();
	assert_eq!(user.role.as_ref(), ROLE_INSTRUCTOR);
	assert!(matches!(adapter.read_user(UserId(999)).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_list_users_filters() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	adapter.create_user(user_data("ana", "ana@campus.test", ROLE_STUDENT)).await.unwrap();
	adapter.create_user(user_data("ben", "ben@campus.test", ROLE_INSTRUCTOR)).await.unwrap();
	adapter.create_user(user_data("carla", "carla@campus.test", ROLE_STUDENT)).await.unwrap();

	let students = adapter
		.list_users(&ListUsersOptions { role: Some(ROLE_STUDENT), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(students.len(), 2);

	let found =
		adapter.list_users(&ListUsersOptions { q: Some("carl"), ..Default::default() }).await.unwrap();
	assert_eq!(found.len(), 1);
	assert_eq!(found[0].username.as_ref(), "carla");

	let page = adapter
		.list_users(&ListUsersOptions { limit: Some(2), offset: Some(1), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(page.len(), 2);
	assert_eq!(page[0].username.as_ref(), "ben");
}

#[tokio::test]
async fn test_update_user_role_and_email() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let id = adapter.create_user(user_data("ana", "ana@campus.test", ROLE_STUDENT)).await.unwrap();
	adapter.create_user(user_data("ben", "ben@campus.test", ROLE_STUDENT)).await.unwrap();

	let user = adapter
		.update_user(
			id,
			&UpdateUserData {
				email: Patch::Value("ana@uni.test".into()),
				role_id: Patch::Value(2),
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(user.email.as_ref(), "ana@uni.test");
	assert_eq!(user.role.as_ref(), ROLE_INSTRUCTOR);

	let res = adapter
		.update_user(
			id,
			&UpdateUserData { email: Patch::Value("ben@campus.test".into()), ..Default::default() },
		)
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = adapter
		.update_user(id, &UpdateUserData { role_id: Patch::Value(42), ..Default::default() })
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_delete_user() {
	let (adapter, _tmp) = create_test_adapter().await.unwrap();
	let id = adapter.create_user(user_data("ana", "ana@campus.test", ROLE_STUDENT)).await.unwrap();

	adapter.delete_user(id).await.unwrap();
	assert!(matches!(adapter.read_user(id).await, Err(Error::NotFound)));
	assert!(matches!(adapter.delete_user(id).await, Err(Error::NotFound)));
}

// vim: ts=4
