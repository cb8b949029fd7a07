//! Adapter that stores the learning data: profiles, courses, modules,
//! quizzes, progress, rooms, events and the rest of the catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::{
	prelude::*,
	types::{serialize_timestamp_iso, serialize_timestamp_iso_opt},
};

// Profiles //
//**********//
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
	pub user_id: UserId,
	pub username: Box<str>,
	pub first_name: Option<Box<str>>,
	pub last_name: Option<Box<str>>,
	pub bio: Option<Box<str>>,
}

impl Profile {
	/// "First Last", falling back to the username
	pub fn display_name(&self) -> String {
		match (&self.first_name, &self.last_name) {
			(Some(first), Some(last)) => format!("{} {}", first, last),
			(Some(first), None) => first.to_string(),
			(None, Some(last)) => last.to_string(),
			(None, None) => self.username.to_string(),
		}
	}
}

#[derive(Debug, Default)]
pub struct UpdateProfileData {
	pub first_name: Patch<Box<str>>,
	pub last_name: Patch<Box<str>>,
	pub bio: Patch<Box<str>>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Subscription {
	pub user_id: UserId,
	pub plan_name: Box<str>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub start_date: Timestamp,
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub end_date: Option<Timestamp>,
}

// Categories //
//************//
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Category {
	pub id: i64,
	pub name: Box<str>,
	pub description: Option<Box<str>>,
}

// Courses //
//*********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
	#[default]
	Basico,
	Intermedio,
	Avanzado,
}

impl CourseLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			CourseLevel::Basico => "basico",
			CourseLevel::Intermedio => "intermedio",
			CourseLevel::Avanzado => "avanzado",
		}
	}

	/// Unknown levels read as `Basico`
	pub fn from_str_lossy(s: &str) -> CourseLevel {
		match s {
			"intermedio" => CourseLevel::Intermedio,
			"avanzado" => CourseLevel::Avanzado,
			_ => CourseLevel::Basico,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
	#[default]
	Published,
	Draft,
}

impl CourseStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			CourseStatus::Published => "published",
			CourseStatus::Draft => "draft",
		}
	}

	pub fn from_str_lossy(s: &str) -> CourseStatus {
		if s == "draft" { CourseStatus::Draft } else { CourseStatus::Published }
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
	#[default]
	Public,
	Private,
}

impl Visibility {
	pub fn as_str(self) -> &'static str {
		match self {
			Visibility::Public => "public",
			Visibility::Private => "private",
		}
	}

	pub fn from_str_lossy(s: &str) -> Visibility {
		if s == "private" { Visibility::Private } else { Visibility::Public }
	}
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Course {
	pub id: i64,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	pub instructor_id: UserId,
	pub creator_id: Option<UserId>,
	pub category_id: Option<i64>,
	pub level: CourseLevel,
	pub status: CourseStatus,
	pub visibility: Visibility,
	pub price: f64,
	pub is_free: bool,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

impl Course {
	/// The instructor or the user who created the course
	pub fn is_owned_by(&self, user_id: UserId) -> bool {
		self.instructor_id == user_id || self.creator_id == Some(user_id)
	}
}

#[derive(Debug)]
pub struct CreateCourseData<'a> {
	pub title: &'a str,
	pub description: Option<&'a str>,
	pub instructor_id: UserId,
	pub creator_id: Option<UserId>,
	pub category_id: Option<i64>,
	pub level: CourseLevel,
	pub status: CourseStatus,
	pub visibility: Visibility,
	pub price: f64,
	pub is_free: bool,
}

#[derive(Debug, Default)]
pub struct UpdateCourseData {
	pub title: Patch<Box<str>>,
	pub description: Patch<Box<str>>,
	pub category_id: Patch<i64>,
	pub level: Patch<CourseLevel>,
	pub status: Patch<CourseStatus>,
	pub visibility: Patch<Visibility>,
	pub price: Patch<f64>,
	pub is_free: Patch<bool>,
}

#[derive(Debug, Default)]
pub struct ListCoursesOptions<'a> {
	pub instructor_id: Option<UserId>,
	pub status: Option<CourseStatus>,
	pub category_id: Option<i64>,
	pub ids: Option<&'a [i64]>,
}

// Modules //
//*********//
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Module {
	pub id: i64,
	pub course_id: i64,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	pub order_index: i32,
	pub content_data: Option<Box<str>>,
}

/// Module outline as produced by curriculum generation
#[derive(Clone, Debug, Deserialize)]
pub struct NewModule {
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub order_index: i32,
}

// Enrollment & progress //
//***********************//
#[derive(Clone, Debug, Serialize)]
pub struct Enrollment {
	pub user_id: UserId,
	pub course_id: i64,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub enrolled_at: Timestamp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
	#[default]
	NotStarted,
	InProgress,
	Completed,
}

impl ProgressStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			ProgressStatus::NotStarted => "not_started",
			ProgressStatus::InProgress => "in_progress",
			ProgressStatus::Completed => "completed",
		}
	}

	pub fn from_str_lossy(s: &str) -> ProgressStatus {
		match s {
			"in_progress" => ProgressStatus::InProgress,
			"completed" => ProgressStatus::Completed,
			_ => ProgressStatus::NotStarted,
		}
	}
}

// Quizzes //
//*********//
#[derive(Clone, Debug, Serialize)]
pub struct QuestionOption {
	pub id: i64,
	pub option_text: Box<str>,
	pub is_correct: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Question {
	pub id: i64,
	pub module_id: i64,
	pub question_text: Box<str>,
	pub options: Vec<QuestionOption>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewOption {
	pub option_text: String,
	#[serde(default)]
	pub is_correct: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewQuestion {
	pub question_text: String,
	#[serde(default)]
	pub options: Vec<NewOption>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuizAttempt {
	pub id: i64,
	pub user_id: UserId,
	pub module_id: i64,
	pub score: u32,
	pub passed: bool,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub submitted_at: Timestamp,
}

// Ratings //
//*********//
/// What a rating is attached to. A rating has exactly one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatingTarget {
	Course(i64),
	Module(i64),
}

impl RatingTarget {
	pub fn from_ids(course_id: Option<i64>, module_id: Option<i64>) -> ClResult<Self> {
		match (course_id, module_id) {
			(Some(course_id), None) => Ok(RatingTarget::Course(course_id)),
			(None, Some(module_id)) => Ok(RatingTarget::Module(module_id)),
			(Some(_), Some(_)) => Err(Error::ValidationError(
				"Cannot rate both a course and a module simultaneously".into(),
			)),
			(None, None) => Err(Error::ValidationError(
				"Must provide either a course_id or a module_id".into(),
			)),
		}
	}
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Rating {
	pub id: i64,
	pub user_id: UserId,
	pub course_id: Option<i64>,
	pub module_id: Option<i64>,
	pub is_upvote: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RatingCounts {
	pub upvotes: u32,
	pub downvotes: u32,
	pub user_rating: Option<bool>,
}

// Rooms //
//*******//
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Room {
	pub id: i64,
	pub name: Box<str>,
	pub description: Option<Box<str>>,
	pub instructor_id: UserId,
	pub join_code: Box<str>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
	pub course_ids: Vec<i64>,
	pub member_ids: Vec<UserId>,
}

#[derive(Debug)]
pub struct CreateRoomData<'a> {
	pub name: &'a str,
	pub description: Option<&'a str>,
	pub instructor_id: UserId,
	pub join_code: &'a str,
}

#[derive(Debug, Default)]
pub struct UpdateRoomData {
	pub name: Patch<Box<str>>,
	pub description: Patch<Box<str>>,
}

#[derive(Debug, Default)]
pub struct ListRoomsOptions {
	pub instructor_id: Option<UserId>,
	pub member_id: Option<UserId>,
}

// Scheduled events //
//******************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
	VideoCall,
	Lecture,
	Meeting,
}

impl EventType {
	pub fn as_str(self) -> &'static str {
		match self {
			EventType::VideoCall => "video_call",
			EventType::Lecture => "lecture",
			EventType::Meeting => "meeting",
		}
	}

	pub fn parse(s: &str) -> Option<EventType> {
		match s {
			"video_call" => Some(EventType::VideoCall),
			"lecture" => Some(EventType::Lecture),
			"meeting" => Some(EventType::Meeting),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
	Pending,
	Accepted,
	Rejected,
}

impl InvitationStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			InvitationStatus::Pending => "pending",
			InvitationStatus::Accepted => "accepted",
			InvitationStatus::Rejected => "rejected",
		}
	}

	pub fn from_str_lossy(s: &str) -> InvitationStatus {
		match s {
			"accepted" => InvitationStatus::Accepted,
			"rejected" => InvitationStatus::Rejected,
			_ => InvitationStatus::Pending,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct EventInvitation {
	pub id: i64,
	pub event_id: i64,
	pub user_id: UserId,
	pub status: InvitationStatus,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct ScheduledEvent {
	pub id: i64,
	pub room_id: i64,
	pub creator_id: UserId,
	pub title: Box<str>,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub start_time: Timestamp,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub end_time: Timestamp,
	pub event_type: EventType,
	pub invitations: Vec<EventInvitation>,
	/// Status of the requesting user's invitation, when listing for an invitee
	pub invitation_status: Option<InvitationStatus>,
}

#[derive(Debug)]
pub struct EventData<'a> {
	pub room_id: i64,
	pub title: &'a str,
	pub start_time: Timestamp,
	pub end_time: Timestamp,
	pub event_type: EventType,
	pub invited_user_ids: &'a [UserId],
}

// Notifications //
//***************//
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct Notification {
	pub id: i64,
	pub user_id: UserId,
	pub message: Box<str>,
	pub link_url: Option<Box<str>>,
	pub is_read: bool,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

// Learning paths //
//****************//
#[derive(Clone, Debug, Serialize)]
pub struct PathCourse {
	pub course_id: i64,
	pub step: i32,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
pub struct LearningPath {
	pub id: i64,
	pub title: Box<str>,
	pub description: Option<Box<str>>,
	/// Sorted by step
	pub courses: Vec<PathCourse>,
}

// Course suggestions //
//********************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
	Open,
	CourseCreated,
}

impl SuggestionStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			SuggestionStatus::Open => "open",
			SuggestionStatus::CourseCreated => "course_created",
		}
	}

	pub fn from_str_lossy(s: &str) -> SuggestionStatus {
		if s == "course_created" { SuggestionStatus::CourseCreated } else { SuggestionStatus::Open }
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct CourseSuggestion {
	pub id: i64,
	pub topic: Box<str>,
	pub votes: u32,
	pub status: SuggestionStatus,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	// Profiles & subscriptions
	//**************************
	async fn create_profile(&self, user_id: UserId, username: &str) -> ClResult<()>;
	async fn read_profile(&self, user_id: UserId) -> ClResult<Profile>;
	async fn list_profiles(&self, user_ids: &[UserId]) -> ClResult<Vec<Profile>>;
	async fn update_profile(&self, user_id: UserId, data: &UpdateProfileData) -> ClResult<()>;
	/// Removes the profile and every row owned by the user
	async fn delete_user_data(&self, user_id: UserId) -> ClResult<()>;
	async fn create_subscription(&self, user_id: UserId, plan_name: &str) -> ClResult<()>;
	async fn read_subscription(&self, user_id: UserId) -> ClResult<Subscription>;

	// Categories
	//************
	async fn list_categories(&self) -> ClResult<Vec<Category>>;
	async fn read_category(&self, category_id: i64) -> ClResult<Category>;
	async fn create_category(&self, name: &str, description: Option<&str>) -> ClResult<Category>;
	async fn count_categories(&self) -> ClResult<u32>;

	// Courses
	//*********
	async fn list_courses(&self, opts: &ListCoursesOptions<'_>) -> ClResult<Vec<Course>>;
	async fn read_course(&self, course_id: i64) -> ClResult<Course>;
	async fn create_course(&self, data: &CreateCourseData<'_>) -> ClResult<Course>;
	async fn update_course(&self, course_id: i64, data: &UpdateCourseData) -> ClResult<Course>;
	/// Deletes the course with its modules, questions and dependent rows
	async fn delete_course(&self, course_id: i64) -> ClResult<()>;
	async fn count_courses(&self) -> ClResult<u32>;

	// Modules
	//*********
	/// Modules of a course ordered by `order_index`
	async fn list_modules(&self, course_id: i64) -> ClResult<Vec<Module>>;
	async fn read_module(&self, module_id: i64) -> ClResult<Module>;
	async fn create_modules(&self, course_id: i64, modules: &[NewModule]) -> ClResult<Vec<Module>>;
	async fn update_module_content(&self, module_id: i64, content: &str) -> ClResult<Module>;

	// Enrollments & progress
	//************************
	async fn read_enrollment(&self, user_id: UserId, course_id: i64)
	-> ClResult<Option<Enrollment>>;
	async fn create_enrollment(&self, user_id: UserId, course_id: i64) -> ClResult<Enrollment>;
	async fn list_user_enrollments(&self, user_id: UserId) -> ClResult<Vec<Enrollment>>;
	async fn list_course_enrollments(&self, course_id: i64) -> ClResult<Vec<Enrollment>>;
	async fn count_enrollments(&self) -> ClResult<u32>;
	/// Progress status per module id for one user within one course
	async fn list_progress(
		&self,
		user_id: UserId,
		course_id: i64,
	) -> ClResult<HashMap<i64, ProgressStatus>>;
	/// Idempotent: an already completed module stays completed
	async fn mark_module_completed(&self, user_id: UserId, module_id: i64) -> ClResult<()>;
	async fn count_completed_modules(&self, user_id: UserId, course_id: i64) -> ClResult<u32>;

	// Quizzes
	//*********
	async fn create_questions(&self, module_id: i64, questions: &[NewQuestion]) -> ClResult<u32>;
	async fn list_questions(&self, module_id: i64) -> ClResult<Vec<Question>>;
	async fn create_quiz_attempt(
		&self,
		user_id: UserId,
		module_id: i64,
		score: u32,
		passed: bool,
	) -> ClResult<QuizAttempt>;
	async fn count_quiz_attempts(&self, user_id: UserId, module_id: i64) -> ClResult<u32>;
	/// Mean attempt score of the user over all modules of the course
	async fn average_quiz_score(&self, user_id: UserId, course_id: i64) -> ClResult<Option<f64>>;

	// Ratings
	//*********
	async fn upsert_rating(
		&self,
		user_id: UserId,
		target: RatingTarget,
		is_upvote: bool,
	) -> ClResult<Rating>;
	/// Up/down vote counts for a target, or over all ratings when `None`
	async fn rating_counts(&self, target: Option<RatingTarget>) -> ClResult<RatingCounts>;
	async fn read_user_rating(&self, user_id: UserId, target: RatingTarget)
	-> ClResult<Option<bool>>;

	// Rooms
	//*******
	async fn create_room(&self, data: &CreateRoomData<'_>) -> ClResult<Room>;
	async fn read_room(&self, room_id: i64) -> ClResult<Room>;
	async fn list_rooms(&self, opts: &ListRoomsOptions) -> ClResult<Vec<Room>>;
	async fn update_room(&self, room_id: i64, data: &UpdateRoomData) -> ClResult<Room>;
	async fn delete_room(&self, room_id: i64) -> ClResult<()>;
	/// Returns false when the course was already linked
	async fn add_room_course(&self, room_id: i64, course_id: i64) -> ClResult<bool>;
	async fn remove_room_course(&self, room_id: i64, course_id: i64) -> ClResult<()>;
	/// Returns false when the user was already a member
	async fn add_room_member(&self, room_id: i64, user_id: UserId) -> ClResult<bool>;
	async fn remove_room_member(&self, room_id: i64, user_id: UserId) -> ClResult<()>;

	// Scheduled events & invitations
	//********************************
	async fn create_event(&self, creator_id: UserId, data: &EventData<'_>)
	-> ClResult<ScheduledEvent>;
	async fn read_event(&self, event_id: i64) -> ClResult<ScheduledEvent>;
	/// Events created by the user plus events they are invited to (pending or accepted)
	async fn list_user_events(&self, user_id: UserId) -> ClResult<Vec<ScheduledEvent>>;
	/// Replaces the event fields and syncs invitations; returns the newly invited users
	async fn update_event(&self, event_id: i64, data: &EventData<'_>) -> ClResult<Vec<UserId>>;
	async fn delete_event(&self, event_id: i64) -> ClResult<()>;
	async fn list_pending_invitations(&self, user_id: UserId) -> ClResult<Vec<EventInvitation>>;
	async fn read_invitation(&self, invitation_id: i64) -> ClResult<EventInvitation>;
	async fn update_invitation_status(
		&self,
		invitation_id: i64,
		status: InvitationStatus,
	) -> ClResult<EventInvitation>;

	// Notifications
	//***************
	async fn create_notification(
		&self,
		user_id: UserId,
		message: &str,
		link_url: Option<&str>,
	) -> ClResult<Notification>;
	/// Newest first
	async fn list_notifications(&self, user_id: UserId) -> ClResult<Vec<Notification>>;
	/// `NotFound` unless the notification belongs to the user
	async fn mark_notification_read(&self, user_id: UserId, notification_id: i64) -> ClResult<()>;

	// Learning paths
	//****************
	async fn list_learning_paths(&self) -> ClResult<Vec<LearningPath>>;
	async fn read_learning_path(&self, path_id: i64) -> ClResult<LearningPath>;
	async fn create_learning_path(
		&self,
		title: &str,
		description: Option<&str>,
	) -> ClResult<LearningPath>;
	async fn add_course_to_path(&self, path_id: i64, course_id: i64, step: i32) -> ClResult<()>;
	async fn delete_learning_path(&self, path_id: i64) -> ClResult<()>;

	// Course suggestions
	//********************
	/// Ordered by votes, highest first
	async fn list_suggestions(&self) -> ClResult<Vec<CourseSuggestion>>;
	async fn search_suggestions(&self, query: &str) -> ClResult<Vec<CourseSuggestion>>;
	async fn create_suggestion(&self, topic: &str) -> ClResult<CourseSuggestion>;
	async fn add_suggestion_vote(&self, suggestion_id: i64) -> ClResult<CourseSuggestion>;
	async fn update_suggestion_status(
		&self,
		suggestion_id: i64,
		status: SuggestionStatus,
	) -> ClResult<CourseSuggestion>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rating_target_requires_exactly_one() {
		assert_eq!(RatingTarget::from_ids(Some(1), None).unwrap(), RatingTarget::Course(1));
		assert_eq!(RatingTarget::from_ids(None, Some(2)).unwrap(), RatingTarget::Module(2));
		assert!(matches!(RatingTarget::from_ids(Some(1), Some(2)), Err(Error::ValidationError(_))));
		assert!(matches!(RatingTarget::from_ids(None, None), Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_lossy_enum_parsing() {
		assert_eq!(CourseLevel::from_str_lossy("avanzado"), CourseLevel::Avanzado);
		assert_eq!(CourseLevel::from_str_lossy("experto"), CourseLevel::Basico);
		assert_eq!(ProgressStatus::from_str_lossy("completed"), ProgressStatus::Completed);
		assert_eq!(ProgressStatus::from_str_lossy(""), ProgressStatus::NotStarted);
		assert_eq!(EventType::parse("webinar"), None);
	}

	#[test]
	fn test_profile_display_name() {
		let mut profile = Profile {
			user_id: UserId(1),
			username: "ana".into(),
			first_name: None,
			last_name: None,
			bio: None,
		};
		assert_eq!(profile.display_name(), "ana");
		profile.first_name = Some("Ana".into());
		profile.last_name = Some("Ruiz".into());
		assert_eq!(profile.display_name(), "Ana Ruiz");
	}
}

// vim: ts=4
