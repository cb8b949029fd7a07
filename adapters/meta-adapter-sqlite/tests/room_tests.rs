//! Rooms, scheduled events, invitations and notifications

use campus_meta_adapter_sqlite::MetaAdapterSqlite;
use campus_types::meta_adapter::*;
use campus_types::prelude::*;
use tempfile::TempDir;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	(adapter, temp_dir)
}

async fn create_room(adapter: &MetaAdapterSqlite, instructor: i64, code: &str) -> Room {
	adapter
		.create_room(&CreateRoomData {
			name: "Grupo A",
			description: None,
			instructor_id: UserId(instructor),
			join_code: code,
		})
		.await
		.expect("Failed to create room")
}

fn event_data(room_id: i64, invited: &[UserId]) -> EventData<'_> {
	EventData {
		room_id,
		title: "Clase en vivo",
		start_time: Timestamp(1_700_000_000),
		end_time: Timestamp(1_700_003_600),
		event_type: EventType::VideoCall,
		invited_user_ids: invited,
	}
}

#[tokio::test]
async fn test_room_members_and_courses() {
	let (adapter, _temp) = create_test_adapter().await;
	let room = create_room(&adapter, 1, "AB12CD34").await;
	assert!(room.member_ids.is_empty());

	assert!(adapter.add_room_member(room.id, UserId(7)).await.unwrap());
	assert!(!adapter.add_room_member(room.id, UserId(7)).await.unwrap());
	assert!(adapter.add_room_member(room.id, UserId(8)).await.unwrap());

	let course = adapter
		.create_course(&CreateCourseData {
			title: "Curso",
			description: None,
			instructor_id: UserId(1),
			creator_id: None,
			category_id: None,
			level: CourseLevel::Basico,
			status: CourseStatus::Published,
			visibility: Visibility::Public,
			price: 0.0,
			is_free: true,
		})
		.await
		.unwrap();
	assert!(adapter.add_room_course(room.id, course.id).await.unwrap());
	assert!(matches!(adapter.add_room_course(room.id, 999).await, Err(Error::NotFound)));

	let room = adapter.read_room(room.id).await.unwrap();
	let mut members = room.member_ids.clone();
	members.sort();
	assert_eq!(members, vec![UserId(7), UserId(8)]);
	assert_eq!(room.course_ids, vec![course.id]);

	adapter.remove_room_member(room.id, UserId(7)).await.unwrap();
	assert!(matches!(adapter.remove_room_member(room.id, UserId(7)).await, Err(Error::NotFound)));
	adapter.remove_room_course(room.id, course.id).await.unwrap();
	let room = adapter.read_room(room.id).await.unwrap();
	assert_eq!(room.member_ids, vec![UserId(8)]);
	assert!(room.course_ids.is_empty());
}

#[tokio::test]
async fn test_list_rooms_by_owner_or_member() {
	let (adapter, _temp) = create_test_adapter().await;
	let a = create_room(&adapter, 1, "AAAA0001").await;
	let b = create_room(&adapter, 2, "BBBB0002").await;
	adapter.add_room_member(b.id, UserId(7)).await.unwrap();

	let owned = adapter
		.list_rooms(&ListRoomsOptions { instructor_id: Some(UserId(1)), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(owned.len(), 1);
	assert_eq!(owned[0].id, a.id);

	let joined = adapter
		.list_rooms(&ListRoomsOptions { member_id: Some(UserId(7)), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(joined.len(), 1);
	assert_eq!(joined[0].id, b.id);
}

#[tokio::test]
async fn test_update_and_delete_room() {
	let (adapter, _temp) = create_test_adapter().await;
	let room = create_room(&adapter, 1, "AB12CD34").await;

	let room = adapter
		.update_room(
			room.id,
			&UpdateRoomData {
				name: Patch::Value("Grupo B".into()),
				description: Patch::Value("Tarde".into()),
			},
		)
		.await
		.unwrap();
	assert_eq!(room.name.as_ref(), "Grupo B");
	assert_eq!(room.description.as_deref(), Some("Tarde"));

	adapter.delete_room(room.id).await.unwrap();
	assert!(matches!(adapter.read_room(room.id).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_duplicate_join_code() {
	let (adapter, _temp) = create_test_adapter().await;
	create_room(&adapter, 1, "AB12CD34").await;
	let res = adapter
		.create_room(&CreateRoomData {
			name: "Otro",
			description: None,
			instructor_id: UserId(1),
			join_code: "AB12CD34",
		})
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_event_invitations_sync() {
	let (adapter, _temp) = create_test_adapter().await;
	let room = create_room(&adapter, 1, "AB12CD34").await;

	let invited = [UserId(7), UserId(8)];
	let event = adapter.create_event(UserId(1), &event_data(room.id, &invited)).await.unwrap();
	assert_eq!(event.invitations.len(), 2);
	assert!(event.invitations.iter().all(|i| i.status == InvitationStatus::Pending));

	let invited = [UserId(8), UserId(9)];
	let added = adapter.update_event(event.id, &event_data(room.id, &invited)).await.unwrap();
	assert_eq!(added, vec![UserId(9)]);

	let event = adapter.read_event(event.id).await.unwrap();
	let mut users: Vec<UserId> = event.invitations.iter().map(|i| i.user_id).collect();
	users.sort();
	assert_eq!(users, vec![UserId(8), UserId(9)]);
}

#[tokio::test]
async fn test_user_events_include_created_and_invited() {
	let (adapter, _temp) = create_test_adapter().await;
	let room = create_room(&adapter, 1, "AB12CD34").await;

	let invited = [UserId(7)];
	let event = adapter.create_event(UserId(1), &event_data(room.id, &invited)).await.unwrap();

	let created = adapter.list_user_events(UserId(1)).await.unwrap();
	assert_eq!(created.len(), 1);
	assert!(created[0].invitation_status.is_none());

	let pending = adapter.list_pending_invitations(UserId(7)).await.unwrap();
	assert_eq!(pending.len(), 1);
	let events = adapter.list_user_events(UserId(7)).await.unwrap();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].invitation_status, Some(InvitationStatus::Pending));

	// Rejected invitations drop out of the list
	let invitation =
		adapter.update_invitation_status(pending[0].id, InvitationStatus::Rejected).await.unwrap();
	assert_eq!(invitation.status, InvitationStatus::Rejected);
	assert!(adapter.list_user_events(UserId(7)).await.unwrap().is_empty());
	assert!(adapter.list_pending_invitations(UserId(7)).await.unwrap().is_empty());

	adapter.delete_event(event.id).await.unwrap();
	assert!(matches!(adapter.read_invitation(invitation.id).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_notifications() {
	let (adapter, _temp) = create_test_adapter().await;
	let first = adapter.create_notification(UserId(7), "Hola", None).await.unwrap();
	let second = adapter.create_notification(UserId(7), "Evento", Some("/events")).await.unwrap();

	let list = adapter.list_notifications(UserId(7)).await.unwrap();
	assert_eq!(list.len(), 2);
	assert_eq!(list[0].id, second.id);
	assert!(!list[0].is_read);

	assert!(matches!(adapter.mark_notification_read(UserId(8), first.id).await, Err(Error::NotFound)));
	adapter.mark_notification_read(UserId(7), first.id).await.unwrap();
	let list = adapter.list_notifications(UserId(7)).await.unwrap();
	assert!(list.iter().find(|n| n.id == first.id).unwrap().is_read);
}

// vim: ts=4
