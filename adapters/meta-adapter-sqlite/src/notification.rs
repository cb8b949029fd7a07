//! User notifications

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::Notification, prelude::*};

fn row_to_notification(row: &SqliteRow) -> Result<Notification, sqlx::Error> {
	Ok(Notification {
		id: row.try_get("id")?,
		user_id: UserId(row.try_get("user_id")?),
		message: row.try_get("message")?,
		link_url: row.try_get("link_url")?,
		is_read: row.try_get("is_read")?,
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

pub(crate) async fn create(
	db: &SqlitePool,
	user_id: UserId,
	message: &str,
	link_url: Option<&str>,
) -> ClResult<Notification> {
	let res = sqlx::query(
		"INSERT INTO notifications (user_id, message, link_url) VALUES (?1, ?2, ?3)
		RETURNING id, user_id, message, link_url, is_read, created_at",
	)
	.bind(user_id.0)
	.bind(message)
	.bind(link_url)
	.fetch_one(db)
	.await;
	map_res(res, row_to_notification)
}

pub(crate) async fn list(db: &SqlitePool, user_id: UserId) -> ClResult<Vec<Notification>> {
	let res = sqlx::query(
		"SELECT id, user_id, message, link_url, is_read, created_at FROM notifications
		WHERE user_id=?1 ORDER BY created_at DESC, id DESC",
	)
	.bind(user_id.0)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_notification))
}

pub(crate) async fn mark_read(db: &SqlitePool, user_id: UserId, notification_id: i64) -> ClResult<()> {
	let res = sqlx::query("UPDATE notifications SET is_read=1 WHERE id=?1 AND user_id=?2")
		.bind(notification_id)
		.bind(user_id.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	expect_affected(res)
}

// vim: ts=4
