use axum::{
	Router, middleware,
	routing::{get, post, put},
};

use campus_admin::{dashboard, stats};
use campus_auth::{handler as auth, role, user};
use campus_core::middleware::{optional_auth, require_auth};
use campus_course::{
	category, course, enrollment, learning_path, module, quiz, rating, suggestion,
};
use campus_room::{event, notification, room};

use crate::prelude::*;

fn init_protected(app: &App) -> Router<App> {
	Router::new()
		// Users & roles
		.route("/api/users", get(user::list_users))
		.route("/api/users/me", get(user::get_me))
		.route("/api/users/me/courses", get(user::get_my_taught_courses))
		.route(
			"/api/users/{user_id}",
			get(user::get_user).put(user::put_user).delete(user::delete_user),
		)
		.route("/api/roles", get(role::list_roles))
		// Categories
		.route("/api/categories", post(category::post_category))
		// Courses & modules
		.route("/api/courses", post(course::post_course))
		.route("/api/courses/{course_id}", put(course::put_course).delete(course::delete_course))
		.route("/api/courses/{course_id}/summary", get(course::get_course_summary))
		.route("/api/courses/{course_id}/generate-curriculum", post(course::post_generate_curriculum))
		.route("/api/courses/{course_id}/enroll", post(enrollment::post_enroll))
		.route("/api/courses/modules/{module_id}/complete", post(course::post_complete_module))
		.route("/api/my-courses", get(enrollment::get_my_courses))
		.route("/api/modules/{module_id}", get(module::get_module))
		.route("/api/modules/{module_id}/generate-content", post(module::post_generate_content))
		.route("/api/modules/{module_id}/download", get(module::get_module_download))
		// Quizzes
		.route("/api/quizzes/module/{module_id}/submit", post(quiz::post_submit_quiz))
		.route("/api/quizzes/module/{module_id}/status", get(quiz::get_quiz_status))
		// Ratings
		.route(
			"/api/ratings/course/{course_id}",
			get(rating::get_course_ratings).post(rating::post_course_rating),
		)
		.route(
			"/api/ratings/module/{module_id}",
			get(rating::get_module_ratings).post(rating::post_module_rating),
		)
		// Learning paths
		.route("/api/learning-paths", post(learning_path::post_learning_path))
		.route(
			"/api/learning-paths/{path_id}",
			get(learning_path::get_learning_path).delete(learning_path::delete_learning_path),
		)
		.route("/api/learning-paths/{path_id}/courses", post(learning_path::post_learning_path_course))
		// Rooms
		.route("/api/rooms", get(room::list_rooms).post(room::post_room))
		.route(
			"/api/rooms/{room_id}",
			get(room::get_room).put(room::put_room).delete(room::delete_room),
		)
		.route(
			"/api/rooms/{room_id}/courses/{course_id}",
			post(room::post_room_course).delete(room::delete_room_course),
		)
		.route(
			"/api/rooms/{room_id}/members/{user_id}",
			post(room::post_room_member).delete(room::delete_room_member),
		)
		// Scheduled events & invitations
		.route("/api/scheduled-events", post(event::post_event))
		.route("/api/scheduled-events/user-events", get(event::list_user_events))
		.route("/api/scheduled-events/{event_id}", put(event::put_event).delete(event::delete_event))
		.route("/api/event-invitations/pending", get(event::list_pending_invitations))
		.route("/api/event-invitations/{invitation_id}/accept", post(event::post_accept_invitation))
		.route("/api/event-invitations/{invitation_id}/reject", post(event::post_reject_invitation))
		// Notifications
		.route("/api/notifications", get(notification::list_notifications))
		.route("/api/notifications/{notification_id}/read", post(notification::post_notification_read))
		// Dashboards & admin
		.route("/api/dashboard/student", get(dashboard::get_student_dashboard))
		.route("/api/dashboard/instructor", get(dashboard::get_instructor_dashboard))
		.route("/api/dashboard/instructor/student-progress", get(dashboard::get_student_progress))
		.route("/api/dashboard/instructor/student-alert", post(dashboard::post_student_alert))
		.route("/api/admin/dashboard-stats", get(stats::get_dashboard_stats))
		.route("/api/admin/enrollments", get(stats::get_enrollments))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth))
}

fn init_public(app: &App) -> Router<App> {
	Router::new()
		.route("/api/health", get(async || "ok\n"))
		// Auth
		.route("/api/auth/register", post(auth::post_register))
		.route("/api/auth/verify-email", get(auth::get_verify_email))
		.route("/api/auth/token", post(auth::post_token))
		.route("/api/users", post(user::post_user))
		// Catalog
		.route("/api/categories", get(category::list_categories))
		.route("/api/categories/with-courses", get(category::list_categories_with_courses))
		.route("/api/courses", get(course::list_courses))
		.route("/api/courses/{course_id}", get(course::get_course))
		.route("/api/quizzes/module/{module_id}", get(quiz::get_quiz))
		.route("/api/learning-paths", get(learning_path::list_learning_paths))
		// Ratings
		.route("/api/ratings/course/{course_id}/public", get(rating::get_public_course_ratings))
		.route("/api/ratings/global-counts", get(rating::get_global_ratings))
		// Suggestions
		.route(
			"/api/suggestions",
			get(suggestion::list_suggestions).post(suggestion::post_suggestion),
		)
		.route("/api/suggestions/search", get(suggestion::search_suggestions))
		.route("/api/suggestions/{suggestion_id}/vote", post(suggestion::post_suggestion_vote))
		.route_layer(middleware::from_fn_with_state(app.clone(), optional_auth))
}

/// API router; public routes see the caller when a valid token is sent
pub fn init(app: App) -> axum::Router {
	Router::new().merge(init_public(&app)).merge(init_protected(&app)).with_state(app)
}

// vim: ts=4
