//! Rooms (cohorts) with their linked courses and members

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

const ROOM_COLUMNS: &str = "SELECT r.id, r.name, r.description, r.instructor_id, r.join_code,
	r.created_at,
	(SELECT group_concat(course_id) FROM room_courses WHERE room_id=r.id) AS course_ids,
	(SELECT group_concat(user_id) FROM room_members WHERE room_id=r.id) AS member_ids
	FROM rooms r";

fn row_to_room(row: &SqliteRow) -> Result<Room, sqlx::Error> {
	Ok(Room {
		id: row.try_get("id")?,
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		instructor_id: UserId(row.try_get("instructor_id")?),
		join_code: row.try_get("join_code")?,
		created_at: Timestamp(row.try_get("created_at")?),
		course_ids: parse_id_list(row.try_get("course_ids")?),
		member_ids: parse_id_list(row.try_get("member_ids")?).into_iter().map(UserId).collect(),
	})
}

pub(crate) async fn create(db: &SqlitePool, data: &CreateRoomData<'_>) -> ClResult<Room> {
	let room_id: i64 = sqlx::query_scalar(
		"INSERT INTO rooms (name, description, instructor_id, join_code) VALUES (?1, ?2, ?3, ?4)
		RETURNING id",
	)
	.bind(data.name)
	.bind(data.description)
	.bind(data.instructor_id.0)
	.bind(data.join_code)
	.fetch_one(db)
	.await
	.map_err(map_write_err)?;

	read(db, room_id).await
}

pub(crate) async fn read(db: &SqlitePool, room_id: i64) -> ClResult<Room> {
	let res = sqlx::query(&format!("{} WHERE r.id=?1", ROOM_COLUMNS))
		.bind(room_id)
		.fetch_one(db)
		.await;
	map_res(res, row_to_room)
}

pub(crate) async fn list(db: &SqlitePool, opts: &ListRoomsOptions) -> ClResult<Vec<Room>> {
	let mut query = sqlx::QueryBuilder::new(ROOM_COLUMNS);
	query.push(" WHERE 1=1");
	if let Some(instructor_id) = opts.instructor_id {
		query.push(" AND r.instructor_id=").push_bind(instructor_id.0);
	}
	if let Some(member_id) = opts.member_id {
		query
			.push(" AND r.id IN (SELECT room_id FROM room_members WHERE user_id=")
			.push_bind(member_id.0)
			.push(")");
	}
	query.push(" ORDER BY r.id");

	let res = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_room))
}

pub(crate) async fn update(db: &SqlitePool, room_id: i64, data: &UpdateRoomData) -> ClResult<Room> {
	let mut query = sqlx::QueryBuilder::new("UPDATE rooms SET ");
	let mut has_updates = false;

	has_updates = push_patch!(query, has_updates, "name", &data.name, |v| v.to_string());
	has_updates =
		push_patch!(query, has_updates, "description", &data.description, |v| v.to_string());

	if has_updates {
		query.push(" WHERE id=").push_bind(room_id);
		let res = query.build().execute(db).await.map_err(map_write_err)?;
		expect_affected(res)?;
	}

	read(db, room_id).await
}

pub(crate) async fn delete(db: &SqlitePool, room_id: i64) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM rooms WHERE id=?1")
		.bind(room_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	expect_affected(res)
}

pub(crate) async fn add_course(db: &SqlitePool, room_id: i64, course_id: i64) -> ClResult<bool> {
	let res = sqlx::query("INSERT OR IGNORE INTO room_courses (room_id, course_id) VALUES (?1, ?2)")
		.bind(room_id)
		.bind(course_id)
		.execute(db)
		.await
		.map_err(map_write_err)?;
	Ok(res.rows_affected() > 0)
}

pub(crate) async fn remove_course(db: &SqlitePool, room_id: i64, course_id: i64) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM room_courses WHERE room_id=?1 AND course_id=?2")
		.bind(room_id)
		.bind(course_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	expect_affected(res)
}

pub(crate) async fn add_member(db: &SqlitePool, room_id: i64, user_id: UserId) -> ClResult<bool> {
	let res = sqlx::query("INSERT OR IGNORE INTO room_members (room_id, user_id) VALUES (?1, ?2)")
		.bind(room_id)
		.bind(user_id.0)
		.execute(db)
		.await
		.map_err(map_write_err)?;
	Ok(res.rows_affected() > 0)
}

pub(crate) async fn remove_member(db: &SqlitePool, room_id: i64, user_id: UserId) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM room_members WHERE room_id=?1 AND user_id=?2")
		.bind(room_id)
		.bind(user_id.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	expect_affected(res)
}

// vim: ts=4
