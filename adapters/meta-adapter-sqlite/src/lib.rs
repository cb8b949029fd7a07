//! SQLite implementation of the Campus meta adapter
//!
//! Every learning entity except user accounts lives in `meta.db`. Each entity
//! family has its own module; this file only wires them to the trait.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod category;
mod course;
mod enrollment;
mod event;
mod learning_path;
mod notification;
mod profile;
mod quiz;
mod rating;
mod room;
mod schema;
mod suggestion;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::{collections::HashMap, path::Path};

use campus_types::{meta_adapter::*, prelude::*};

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	/// Opens (or creates) `meta.db` in `dir`
	pub async fn new(dir: impl AsRef<Path>) -> ClResult<Self> {
		let dir = dir.as_ref();
		tokio::fs::create_dir_all(dir).await?;
		let db_path = dir.join("meta.db");

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(&db_path)
			.create_if_missing(true)
			.foreign_keys(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("Cannot open {}: {}", db_path.display(), err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("Meta schema init failed: {:#?}", err))
			.or(Err(Error::DbError))?;

		Ok(Self { db })
	}
}

#[async_trait]
impl MetaAdapter for MetaAdapterSqlite {
	// Profiles & subscriptions //
	//**************************//
	async fn create_profile(&self, user_id: UserId, username: &str) -> ClResult<()> {
		profile::create(&self.db, user_id, username).await
	}

	async fn read_profile(&self, user_id: UserId) -> ClResult<Profile> {
		profile::read(&self.db, user_id).await
	}

	async fn list_profiles(&self, user_ids: &[UserId]) -> ClResult<Vec<Profile>> {
		profile::list(&self.db, user_ids).await
	}

	async fn update_profile(&self, user_id: UserId, data: &UpdateProfileData) -> ClResult<()> {
		profile::update(&self.db, user_id, data).await
	}

	async fn delete_user_data(&self, user_id: UserId) -> ClResult<()> {
		profile::delete_user_data(&self.db, user_id).await
	}

	async fn create_subscription(&self, user_id: UserId, plan_name: &str) -> ClResult<()> {
		profile::create_subscription(&self.db, user_id, plan_name).await
	}

	async fn read_subscription(&self, user_id: UserId) -> ClResult<Subscription> {
		profile::read_subscription(&self.db, user_id).await
	}

	// Categories //
	//************//
	async fn list_categories(&self) -> ClResult<Vec<Category>> {
		category::list(&self.db).await
	}

	async fn read_category(&self, category_id: i64) -> ClResult<Category> {
		category::read(&self.db, category_id).await
	}

	async fn create_category(&self, name: &str, description: Option<&str>) -> ClResult<Category> {
		category::create(&self.db, name, description).await
	}

	async fn count_categories(&self) -> ClResult<u32> {
		category::count(&self.db).await
	}

	// Courses //
	//*********//
	async fn list_courses(&self, opts: &ListCoursesOptions<'_>) -> ClResult<Vec<Course>> {
		course::list(&self.db, opts).await
	}

	async fn read_course(&self, course_id: i64) -> ClResult<Course> {
		course::read(&self.db, course_id).await
	}

	async fn create_course(&self, data: &CreateCourseData<'_>) -> ClResult<Course> {
		course::create(&self.db, data).await
	}

	async fn update_course(&self, course_id: i64, data: &UpdateCourseData) -> ClResult<Course> {
		course::update(&self.db, course_id, data).await
	}

	async fn delete_course(&self, course_id: i64) -> ClResult<()> {
		course::delete(&self.db, course_id).await
	}

	async fn count_courses(&self) -> ClResult<u32> {
		course::count(&self.db).await
	}

	// Modules //
	//*********//
	async fn list_modules(&self, course_id: i64) -> ClResult<Vec<Module>> {
		course::list_modules(&self.db, course_id).await
	}

	async fn read_module(&self, module_id: i64) -> ClResult<Module> {
		course::read_module(&self.db, module_id).await
	}

	async fn create_modules(&self, course_id: i64, modules: &[NewModule]) -> ClResult<Vec<Module>> {
		course::create_modules(&self.db, course_id, modules).await
	}

	async fn update_module_content(&self, module_id: i64, content: &str) -> ClResult<Module> {
		course::update_module_content(&self.db, module_id, content).await
	}

	// Enrollments & progress //
	//************************//
	async fn read_enrollment(
		&self,
		user_id: UserId,
		course_id: i64,
	) -> ClResult<Option<Enrollment>> {
		enrollment::read(&self.db, user_id, course_id).await
	}

	async fn create_enrollment(&self, user_id: UserId, course_id: i64) -> ClResult<Enrollment> {
		enrollment::create(&self.db, user_id, course_id).await
	}

	async fn list_user_enrollments(&self, user_id: UserId) -> ClResult<Vec<Enrollment>> {
		enrollment::list_by_user(&self.db, user_id).await
	}

	async fn list_course_enrollments(&self, course_id: i64) -> ClResult<Vec<Enrollment>> {
		enrollment::list_by_course(&self.db, course_id).await
	}

	async fn count_enrollments(&self) -> ClResult<u32> {
		enrollment::count(&self.db).await
	}

	async fn list_progress(
		&self,
		user_id: UserId,
		course_id: i64,
	) -> ClResult<HashMap<i64, ProgressStatus>> {
		enrollment::list_progress(&self.db, user_id, course_id).await
	}

	async fn mark_module_completed(&self, user_id: UserId, module_id: i64) -> ClResult<()> {
		enrollment::mark_completed(&self.db, user_id, module_id).await
	}

	async fn count_completed_modules(&self, user_id: UserId, course_id: i64) -> ClResult<u32> {
		enrollment::count_completed(&self.db, user_id, course_id).await
	}

	// Quizzes //
	//*********//
	async fn create_questions(&self, module_id: i64, questions: &[NewQuestion]) -> ClResult<u32> {
		quiz::create_questions(&self.db, module_id, questions).await
	}

	async fn list_questions(&self, module_id: i64) -> ClResult<Vec<Question>> {
		quiz::list_questions(&self.db, module_id).await
	}

	async fn create_quiz_attempt(
		&self,
		user_id: UserId,
		module_id: i64,
		score: u32,
		passed: bool,
	) -> ClResult<QuizAttempt> {
		quiz::create_attempt(&self.db, user_id, module_id, score, passed).await
	}

	async fn count_quiz_attempts(&self, user_id: UserId, module_id: i64) -> ClResult<u32> {
		quiz::count_attempts(&self.db, user_id, module_id).await
	}

	async fn average_quiz_score(&self, user_id: UserId, course_id: i64) -> ClResult<Option<f64>> {
		quiz::average_score(&self.db, user_id, course_id).await
	}

	// Ratings //
	//*********//
	async fn upsert_rating(
		&self,
		user_id: UserId,
		target: RatingTarget,
		is_upvote: bool,
	) -> ClResult<Rating> {
		rating::upsert(&self.db, user_id, target, is_upvote).await
	}

	async fn rating_counts(&self, target: Option<RatingTarget>) -> ClResult<RatingCounts> {
		rating::counts(&self.db, target).await
	}

	async fn read_user_rating(
		&self,
		user_id: UserId,
		target: RatingTarget,
	) -> ClResult<Option<bool>> {
		rating::read_user_rating(&self.db, user_id, target).await
	}

	// Rooms //
	//*******//
	async fn create_room(&self, data: &CreateRoomData<'_>) -> ClResult<Room> {
		room::create(&self.db, data).await
	}

	async fn read_room(&self, room_id: i64) -> ClResult<Room> {
		room::read(&self.db, room_id).await
	}

	async fn list_rooms(&self, opts: &ListRoomsOptions) -> ClResult<Vec<Room>> {
		room::list(&self.db, opts).await
	}

	async fn update_room(&self, room_id: i64, data: &UpdateRoomData) -> ClResult<Room> {
		room::update(&self.db, room_id, data).await
	}

	async fn delete_room(&self, room_id: i64) -> ClResult<()> {
		room::delete(&self.db, room_id).await
	}

	async fn add_room_course(&self, room_id: i64, course_id: i64) -> ClResult<bool> {
		room::add_course(&self.db, room_id, course_id).await
	}

	async fn remove_room_course(&self, room_id: i64, course_id: i64) -> ClResult<()> {
		room::remove_course(&self.db, room_id, course_id).await
	}

	async fn add_room_member(&self, room_id: i64, user_id: UserId) -> ClResult<bool> {
		room::add_member(&self.db, room_id, user_id).await
	}

	async fn remove_room_member(&self, room_id: i64, user_id: UserId) -> ClResult<()> {
		room::remove_member(&self.db, room_id, user_id).await
	}

	// Scheduled events & invitations //
	//********************************//
	async fn create_event(
		&self,
		creator_id: UserId,
		data: &EventData<'_>,
	) -> ClResult<ScheduledEvent> {
		event::create(&self.db, creator_id, data).await
	}

	async fn read_event(&self, event_id: i64) -> ClResult<ScheduledEvent> {
		event::read(&self.db, event_id).await
	}

	async fn list_user_events(&self, user_id: UserId) -> ClResult<Vec<ScheduledEvent>> {
		event::list_for_user(&self.db, user_id).await
	}

	async fn update_event(&self, event_id: i64, data: &EventData<'_>) -> ClResult<Vec<UserId>> {
		event::update(&self.db, event_id, data).await
	}

	async fn delete_event(&self, event_id: i64) -> ClResult<()> {
		event::delete(&self.db, event_id).await
	}

	async fn list_pending_invitations(&self, user_id: UserId) -> ClResult<Vec<EventInvitation>> {
		event::list_pending_invitations(&self.db, user_id).await
	}

	async fn read_invitation(&self, invitation_id: i64) -> ClResult<EventInvitation> {
		event::read_invitation(&self.db, invitation_id).await
	}

	async fn update_invitation_status(
		&self,
		invitation_id: i64,
		status: InvitationStatus,
	) -> ClResult<EventInvitation> {
		event::update_invitation_status(&self.db, invitation_id, status).await
	}

	// Notifications //
	//***************//
	async fn create_notification(
		&self,
		user_id: UserId,
		message: &str,
		link_url: Option<&str>,
	) -> ClResult<Notification> {
		notification::create(&self.db, user_id, message, link_url).await
	}

	async fn list_notifications(&self, user_id: UserId) -> ClResult<Vec<Notification>> {
		notification::list(&self.db, user_id).await
	}

	async fn mark_notification_read(&self, user_id: UserId, notification_id: i64) -> ClResult<()> {
		notification::mark_read(&self.db, user_id, notification_id).await
	}

	// Learning paths //
	//****************//
	async fn list_learning_paths(&self) -> ClResult<Vec<LearningPath>> {
		learning_path::list(&self.db).await
	}

	async fn read_learning_path(&self, path_id: i64) -> ClResult<LearningPath> {
		learning_path::read(&self.db, path_id).await
	}

	async fn create_learning_path(
		&self,
		title: &str,
		description: Option<&str>,
	) -> ClResult<LearningPath> {
		learning_path::create(&self.db, title, description).await
	}

	async fn add_course_to_path(&self, path_id: i64, course_id: i64, step: i32) -> ClResult<()> {
		learning_path::add_course(&self.db, path_id, course_id, step).await
	}

	async fn delete_learning_path(&self, path_id: i64) -> ClResult<()> {
		learning_path::delete(&self.db, path_id).await
	}

	// Course suggestions //
	//********************//
	async fn list_suggestions(&self) -> ClResult<Vec<CourseSuggestion>> {
		suggestion::list(&self.db).await
	}

	async fn search_suggestions(&self, query: &str) -> ClResult<Vec<CourseSuggestion>> {
		suggestion::search(&self.db, query).await
	}

	async fn create_suggestion(&self, topic: &str) -> ClResult<CourseSuggestion> {
		suggestion::create(&self.db, topic).await
	}

	async fn add_suggestion_vote(&self, suggestion_id: i64) -> ClResult<CourseSuggestion> {
		suggestion::add_vote(&self.db, suggestion_id).await
	}

	async fn update_suggestion_status(
		&self,
		suggestion_id: i64,
		status: SuggestionStatus,
	) -> ClResult<CourseSuggestion> {
		suggestion::update_status(&self.db, suggestion_id, status).await
	}
}

// vim: ts=4
