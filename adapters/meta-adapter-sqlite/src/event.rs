//! Scheduled events and their invitations

use sqlx::{Row, Sqlite, SqlitePool, Transaction, sqlite::SqliteRow};
use std::collections::HashSet;

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

fn row_to_invitation(row: &SqliteRow) -> Result<EventInvitation, sqlx::Error> {
	Ok(EventInvitation {
		id: row.try_get("id")?,
		event_id: row.try_get("event_id")?,
		user_id: UserId(row.try_get("user_id")?),
		status: InvitationStatus::from_str_lossy(row.try_get("status")?),
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

fn row_to_event(row: &SqliteRow) -> Result<ScheduledEvent, sqlx::Error> {
	let event_type: &str = row.try_get("event_type")?;
	let Some(event_type) = EventType::parse(event_type) else {
		return Err(sqlx::Error::Decode(format!("unknown event type: {}", event_type).into()));
	};
	Ok(ScheduledEvent {
		id: row.try_get("id")?,
		room_id: row.try_get("room_id")?,
		creator_id: UserId(row.try_get("creator_id")?),
		title: row.try_get("title")?,
		start_time: Timestamp(row.try_get("start_time")?),
		end_time: Timestamp(row.try_get("end_time")?),
		event_type,
		invitations: Vec::new(),
		invitation_status: None,
	})
}

async fn list_invitations(db: &SqlitePool, event_id: i64) -> ClResult<Vec<EventInvitation>> {
	let res = sqlx::query(
		"SELECT id, event_id, user_id, status, created_at FROM event_invitations
		WHERE event_id=?1 ORDER BY id",
	)
	.bind(event_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_invitation))
}

async fn insert_invitations(
	tx: &mut Transaction<'_, Sqlite>,
	event_id: i64,
	user_ids: &[UserId],
) -> ClResult<()> {
	for user_id in user_ids {
		sqlx::query("INSERT OR IGNORE INTO event_invitations (event_id, user_id) VALUES (?1, ?2)")
			.bind(event_id)
			.bind(user_id.0)
			.execute(&mut **tx)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
	}
	Ok(())
}

pub(crate) async fn create(
	db: &SqlitePool,
	creator_id: UserId,
	data: &EventData<'_>,
) -> ClResult<ScheduledEvent> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	let event_id: i64 = sqlx::query_scalar(
		"INSERT INTO scheduled_events (room_id, creator_id, title, start_time, end_time, event_type)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
	)
	.bind(data.room_id)
	.bind(creator_id.0)
	.bind(data.title)
	.bind(data.start_time.0)
	.bind(data.end_time.0)
	.bind(data.event_type.as_str())
	.fetch_one(&mut *tx)
	.await
	.map_err(map_write_err)?;

	insert_invitations(&mut tx, event_id, data.invited_user_ids).await?;

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	read(db, event_id).await
}

pub(crate) async fn read(db: &SqlitePool, event_id: i64) -> ClResult<ScheduledEvent> {
	let res = sqlx::query(
		"SELECT id, room_id, creator_id, title, start_time, end_time, event_type
		FROM scheduled_events WHERE id=?1",
	)
	.bind(event_id)
	.fetch_one(db)
	.await;
	let mut event = map_res(res, row_to_event)?;
	event.invitations = list_invitations(db, event_id).await?;
	Ok(event)
}

/// Created events and events with a pending or accepted invitation, by start time
pub(crate) async fn list_for_user(db: &SqlitePool, user_id: UserId) -> ClResult<Vec<ScheduledEvent>> {
	let res = sqlx::query(
		"SELECT e.id, e.room_id, e.creator_id, e.title, e.start_time, e.end_time, e.event_type,
			i.status AS invitation_status
		FROM scheduled_events e
		LEFT JOIN event_invitations i ON i.event_id=e.id AND i.user_id=?1
		WHERE e.creator_id=?1 OR i.status IN ('pending', 'accepted')
		ORDER BY e.start_time, e.id",
	)
	.bind(user_id.0)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	let mut events = collect_res(res.iter().map(|row| {
		let mut event = row_to_event(row)?;
		event.invitation_status = row
			.try_get::<Option<&str>, _>("invitation_status")?
			.map(InvitationStatus::from_str_lossy);
		Ok(event)
	}))?;
	for event in &mut events {
		event.invitations = list_invitations(db, event.id).await?;
	}
	Ok(events)
}

/// Updates the event and syncs its invitee set; returns the newly invited users
pub(crate) async fn update(
	db: &SqlitePool,
	event_id: i64,
	data: &EventData<'_>,
) -> ClResult<Vec<UserId>> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	let res = sqlx::query(
		"UPDATE scheduled_events SET room_id=?2, title=?3, start_time=?4, end_time=?5, event_type=?6
		WHERE id=?1",
	)
	.bind(event_id)
	.bind(data.room_id)
	.bind(data.title)
	.bind(data.start_time.0)
	.bind(data.end_time.0)
	.bind(data.event_type.as_str())
	.execute(&mut *tx)
	.await
	.map_err(map_write_err)?;
	expect_affected(res)?;

	let existing: Vec<i64> =
		sqlx::query_scalar("SELECT user_id FROM event_invitations WHERE event_id=?1")
			.bind(event_id)
			.fetch_all(&mut *tx)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
	let existing: HashSet<UserId> = existing.into_iter().map(UserId).collect();
	let wanted: HashSet<UserId> = data.invited_user_ids.iter().copied().collect();

	for removed in existing.difference(&wanted) {
		sqlx::query("DELETE FROM event_invitations WHERE event_id=?1 AND user_id=?2")
			.bind(event_id)
			.bind(removed.0)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
	}

	let mut added: Vec<UserId> = wanted.difference(&existing).copied().collect();
	added.sort();
	insert_invitations(&mut tx, event_id, &added).await?;

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(added)
}

pub(crate) async fn delete(db: &SqlitePool, event_id: i64) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM scheduled_events WHERE id=?1")
		.bind(event_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	expect_affected(res)
}

// Invitations //
//*************//
pub(crate) async fn list_pending_invitations(
	db: &SqlitePool,
	user_id: UserId,
) -> ClResult<Vec<EventInvitation>> {
	let res = sqlx::query(
		"SELECT id, event_id, user_id, status, created_at FROM event_invitations
		WHERE user_id=?1 AND status='pending' ORDER BY created_at DESC, id DESC",
	)
	.bind(user_id.0)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_invitation))
}

pub(crate) async fn read_invitation(db: &SqlitePool, invitation_id: i64) -> ClResult<EventInvitation> {
	let res = sqlx::query(
		"SELECT id, event_id, user_id, status, created_at FROM event_invitations WHERE id=?1",
	)
	.bind(invitation_id)
	.fetch_one(db)
	.await;
	map_res(res, row_to_invitation)
}

pub(crate) async fn update_invitation_status(
	db: &SqlitePool,
	invitation_id: i64,
	status: InvitationStatus,
) -> ClResult<EventInvitation> {
	let res = sqlx::query(
		"UPDATE event_invitations SET status=?2 WHERE id=?1
		RETURNING id, event_id, user_id, status, created_at",
	)
	.bind(invitation_id)
	.bind(status.as_str())
	.fetch_one(db)
	.await;
	map_res(res, row_to_invitation)
}

// vim: ts=4
