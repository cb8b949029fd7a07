//! Profiles and subscriptions

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

fn row_to_profile(row: &SqliteRow) -> Result<Profile, sqlx::Error> {
	Ok(Profile {
		user_id: UserId(row.try_get("user_id")?),
		username: row.try_get("username")?,
		first_name: row.try_get("first_name")?,
		last_name: row.try_get("last_name")?,
		bio: row.try_get("bio")?,
	})
}

pub(crate) async fn create(db: &SqlitePool, user_id: UserId, username: &str) -> ClResult<()> {
	sqlx::query("INSERT OR IGNORE INTO profiles (user_id, username) VALUES (?1, ?2)")
		.bind(user_id.0)
		.bind(username)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(())
}

pub(crate) async fn read(db: &SqlitePool, user_id: UserId) -> ClResult<Profile> {
	let res = sqlx::query(
		"SELECT user_id, username, first_name, last_name, bio FROM profiles WHERE user_id=?1",
	)
	.bind(user_id.0)
	.fetch_one(db)
	.await;
	map_res(res, row_to_profile)
}

pub(crate) async fn list(db: &SqlitePool, user_ids: &[UserId]) -> ClResult<Vec<Profile>> {
	if user_ids.is_empty() {
		return Ok(Vec::new());
	}
	let ids: Vec<i64> = user_ids.iter().map(|id| id.0).collect();
	let mut query = sqlx::QueryBuilder::new(
		"SELECT user_id, username, first_name, last_name, bio FROM profiles WHERE user_id IN ",
	);
	push_in(&mut query, &ids);
	query.push(" ORDER BY user_id");

	let res = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_profile))
}

pub(crate) async fn update(
	db: &SqlitePool,
	user_id: UserId,
	data: &UpdateProfileData,
) -> ClResult<()> {
	let mut query = sqlx::QueryBuilder::new("UPDATE profiles SET ");
	let mut has_updates = false;

	has_updates =
		push_patch!(query, has_updates, "first_name", &data.first_name, |v| v.to_string());
	has_updates = push_patch!(query, has_updates, "last_name", &data.last_name, |v| v.to_string());
	has_updates = push_patch!(query, has_updates, "bio", &data.bio, |v| v.to_string());

	if !has_updates {
		return Ok(());
	}

	query.push(" WHERE user_id=").push_bind(user_id.0);
	let res = query.build().execute(db).await.inspect_err(inspect).or(Err(Error::DbError))?;
	expect_affected(res)
}

pub(crate) async fn delete_user_data(db: &SqlitePool, user_id: UserId) -> ClResult<()> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	// Owned content first, the cascades remove modules, events and links
	for stmt in [
		"DELETE FROM courses WHERE instructor_id=?1",
		"DELETE FROM rooms WHERE instructor_id=?1",
		"DELETE FROM scheduled_events WHERE creator_id=?1",
		"DELETE FROM enrollments WHERE user_id=?1",
		"DELETE FROM progress WHERE user_id=?1",
		"DELETE FROM quiz_attempts WHERE user_id=?1",
		"DELETE FROM ratings WHERE user_id=?1",
		"DELETE FROM room_members WHERE user_id=?1",
		"DELETE FROM event_invitations WHERE user_id=?1",
		"DELETE FROM notifications WHERE user_id=?1",
		"DELETE FROM subscriptions WHERE user_id=?1",
		"UPDATE courses SET creator_id=NULL WHERE creator_id=?1",
		"DELETE FROM profiles WHERE user_id=?1",
	] {
		sqlx::query(stmt)
			.bind(user_id.0)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
	}

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(())
}

// Subscriptions //
//***************//
pub(crate) async fn create_subscription(
	db: &SqlitePool,
	user_id: UserId,
	plan_name: &str,
) -> ClResult<()> {
	sqlx::query("INSERT OR REPLACE INTO subscriptions (user_id, plan_name) VALUES (?1, ?2)")
		.bind(user_id.0)
		.bind(plan_name)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(())
}

pub(crate) async fn read_subscription(db: &SqlitePool, user_id: UserId) -> ClResult<Subscription> {
	let res = sqlx::query(
		"SELECT user_id, plan_name, start_date, end_date FROM subscriptions WHERE user_id=?1",
	)
	.bind(user_id.0)
	.fetch_one(db)
	.await;
	map_res(res, |row| {
		Ok(Subscription {
			user_id: UserId(row.try_get("user_id")?),
			plan_name: row.try_get("plan_name")?,
			start_date: Timestamp(row.try_get("start_date")?),
			end_date: row.try_get::<Option<i64>, _>("end_date")?.map(Timestamp),
		})
	})
}

// vim: ts=4
