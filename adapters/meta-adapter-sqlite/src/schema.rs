//! Database schema initialization

use sqlx::{Sqlite, SqlitePool, Transaction};

// Current schema version - update this when adding new migrations
const CURRENT_DB_VERSION: i64 = 1;

/// Get the current database version from vars table
async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM vars WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

const TABLES: &[&str] = &[
	// Profiles & subscriptions
	"CREATE TABLE IF NOT EXISTS profiles (
		user_id integer NOT NULL,
		username text NOT NULL,
		first_name text,
		last_name text,
		bio text,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(user_id)
	)",
	"CREATE TABLE IF NOT EXISTS subscriptions (
		user_id integer NOT NULL,
		plan_name text NOT NULL,
		start_date INTEGER NOT NULL DEFAULT (unixepoch()),
		end_date INTEGER,
		PRIMARY KEY(user_id)
	)",
	// Catalog
	"CREATE TABLE IF NOT EXISTS categories (
		id integer NOT NULL,
		name text NOT NULL,
		description text,
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name ON categories (name)",
	"CREATE TABLE IF NOT EXISTS courses (
		id integer NOT NULL,
		title text NOT NULL,
		description text,
		instructor_id integer NOT NULL,
		creator_id integer,
		category_id integer REFERENCES categories(id) ON DELETE SET NULL,
		level text NOT NULL DEFAULT 'basico',
		status text NOT NULL DEFAULT 'published',
		visibility text NOT NULL DEFAULT 'public',
		price real NOT NULL DEFAULT 0,
		is_free integer NOT NULL DEFAULT 1,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE INDEX IF NOT EXISTS idx_courses_instructor ON courses (instructor_id)",
	"CREATE TABLE IF NOT EXISTS modules (
		id integer NOT NULL,
		course_id integer NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
		title text NOT NULL,
		description text,
		order_index integer NOT NULL DEFAULT 0,
		content_data text,
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE INDEX IF NOT EXISTS idx_modules_course ON modules (course_id, order_index)",
	// Enrollments & progress
	"CREATE TABLE IF NOT EXISTS enrollments (
		user_id integer NOT NULL,
		course_id integer NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
		enrolled_at INTEGER NOT NULL DEFAULT (unixepoch()),
		PRIMARY KEY(user_id, course_id)
	)",
	"CREATE INDEX IF NOT EXISTS idx_enrollments_course ON enrollments (course_id)",
	"CREATE TABLE IF NOT EXISTS progress (
		user_id integer NOT NULL,
		module_id integer NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
		status text NOT NULL DEFAULT 'not_started',
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(user_id, module_id)
	)",
	// Quizzes
	"CREATE TABLE IF NOT EXISTS questions (
		id integer NOT NULL,
		module_id integer NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
		question_text text NOT NULL,
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE INDEX IF NOT EXISTS idx_questions_module ON questions (module_id)",
	"CREATE TABLE IF NOT EXISTS options (
		id integer NOT NULL,
		question_id integer NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
		option_text text NOT NULL,
		is_correct integer NOT NULL DEFAULT 0,
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE INDEX IF NOT EXISTS idx_options_question ON options (question_id)",
	"CREATE TABLE IF NOT EXISTS quiz_attempts (
		id integer NOT NULL,
		user_id integer NOT NULL,
		module_id integer NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
		score integer NOT NULL,
		passed integer NOT NULL,
		submitted_at INTEGER NOT NULL DEFAULT (unixepoch()),
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE INDEX IF NOT EXISTS idx_quiz_attempts_user ON quiz_attempts (user_id, module_id)",
	// Ratings: exactly one target
	"CREATE TABLE IF NOT EXISTS ratings (
		id integer NOT NULL,
		user_id integer NOT NULL,
		course_id integer REFERENCES courses(id) ON DELETE CASCADE,
		module_id integer REFERENCES modules(id) ON DELETE CASCADE,
		is_upvote integer NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(id AUTOINCREMENT),
		CHECK ((course_id IS NULL) <> (module_id IS NULL))
	)",
	"CREATE UNIQUE INDEX IF NOT EXISTS idx_ratings_course ON ratings (user_id, course_id)
		WHERE course_id IS NOT NULL",
	"CREATE UNIQUE INDEX IF NOT EXISTS idx_ratings_module ON ratings (user_id, module_id)
		WHERE module_id IS NOT NULL",
	// Rooms
	"CREATE TABLE IF NOT EXISTS rooms (
		id integer NOT NULL,
		name text NOT NULL,
		description text,
		instructor_id integer NOT NULL,
		join_code text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE UNIQUE INDEX IF NOT EXISTS idx_rooms_join_code ON rooms (join_code)",
	"CREATE TABLE IF NOT EXISTS room_courses (
		room_id integer NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
		course_id integer NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
		PRIMARY KEY(room_id, course_id)
	)",
	"CREATE TABLE IF NOT EXISTS room_members (
		room_id integer NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
		user_id integer NOT NULL,
		PRIMARY KEY(room_id, user_id)
	)",
	"CREATE INDEX IF NOT EXISTS idx_room_members_user ON room_members (user_id)",
	// Scheduled events
	"CREATE TABLE IF NOT EXISTS scheduled_events (
		id integer NOT NULL,
		room_id integer NOT NULL REFERENCES rooms(id) ON DELETE CASCADE,
		creator_id integer NOT NULL,
		title text NOT NULL,
		start_time INTEGER NOT NULL,
		end_time INTEGER NOT NULL,
		event_type text NOT NULL,
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE TABLE IF NOT EXISTS event_invitations (
		id integer NOT NULL,
		event_id integer NOT NULL REFERENCES scheduled_events(id) ON DELETE CASCADE,
		user_id integer NOT NULL,
		status text NOT NULL DEFAULT 'pending',
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE UNIQUE INDEX IF NOT EXISTS idx_event_invitations_user ON event_invitations (event_id, user_id)",
	// Notifications
	"CREATE TABLE IF NOT EXISTS notifications (
		id integer NOT NULL,
		user_id integer NOT NULL,
		message text NOT NULL,
		link_url text,
		is_read integer NOT NULL DEFAULT 0,
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications (user_id, created_at)",
	// Learning paths
	"CREATE TABLE IF NOT EXISTS learning_paths (
		id integer NOT NULL,
		title text NOT NULL,
		description text,
		PRIMARY KEY(id AUTOINCREMENT)
	)",
	"CREATE TABLE IF NOT EXISTS learning_path_courses (
		path_id integer NOT NULL REFERENCES learning_paths(id) ON DELETE CASCADE,
		course_id integer NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
		step integer NOT NULL,
		PRIMARY KEY(path_id, course_id)
	)",
	// Course suggestions
	"CREATE TABLE IF NOT EXISTS course_suggestions (
		id integer NOT NULL,
		topic text NOT NULL,
		votes integer NOT NULL DEFAULT 1,
		status text NOT NULL DEFAULT 'open',
		created_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(id AUTOINCREMENT)
	)",
];

/// Initialize the database schema
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
		key text NOT NULL,
		value text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	for stmt in TABLES {
		sqlx::query(stmt).execute(&mut *tx).await?;
	}

	if version < CURRENT_DB_VERSION {
		sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES ('db_version', ?)")
			.bind(CURRENT_DB_VERSION.to_string())
			.execute(&mut *tx)
			.await?;
	}

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
