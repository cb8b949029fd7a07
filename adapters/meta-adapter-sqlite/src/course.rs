//! Courses and their modules

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use campus_types::{meta_adapter::*, prelude::*};

const COURSE_COLUMNS: &str = "SELECT id, title, description, instructor_id, creator_id,
	category_id, level, status, visibility, price, is_free, created_at FROM courses";

fn row_to_course(row: &SqliteRow) -> Result<Course, sqlx::Error> {
	Ok(Course {
		id: row.try_get("id")?,
		title: row.try_get("title")?,
		description: row.try_get("description")?,
		instructor_id: UserId(row.try_get("instructor_id")?),
		creator_id: row.try_get::<Option<i64>, _>("creator_id")?.map(UserId),
		category_id: row.try_get("category_id")?,
		level: CourseLevel::from_str_lossy(row.try_get("level")?),
		status: CourseStatus::from_str_lossy(row.try_get("status")?),
		visibility: Visibility::from_str_lossy(row.try_get("visibility")?),
		price: row.try_get("price")?,
		is_free: row.try_get("is_free")?,
		created_at: Timestamp(row.try_get("created_at")?),
	})
}

pub(crate) async fn list(db: &SqlitePool, opts: &ListCoursesOptions<'_>) -> ClResult<Vec<Course>> {
	let mut query = sqlx::QueryBuilder::new(COURSE_COLUMNS);
	query.push(" WHERE 1=1");

	if let Some(instructor_id) = opts.instructor_id {
		query.push(" AND instructor_id=").push_bind(instructor_id.0);
	}
	if let Some(status) = opts.status {
		query.push(" AND status=").push_bind(status.as_str());
	}
	if let Some(category_id) = opts.category_id {
		query.push(" AND category_id=").push_bind(category_id);
	}
	if let Some(ids) = opts.ids {
		if ids.is_empty() {
			return Ok(Vec::new());
		}
		query.push(" AND id IN ");
		push_in(&mut query, ids);
	}
	query.push(" ORDER BY id");

	let res = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_course))
}

pub(crate) async fn read(db: &SqlitePool, course_id: i64) -> ClResult<Course> {
	let res = sqlx::query(&format!("{} WHERE id=?1", COURSE_COLUMNS))
		.bind(course_id)
		.fetch_one(db)
		.await;
	map_res(res, row_to_course)
}

pub(crate) async fn create(db: &SqlitePool, data: &CreateCourseData<'_>) -> ClResult<Course> {
	let course_id: i64 = sqlx::query_scalar(
		"INSERT INTO courses (title, description, instructor_id, creator_id, category_id,
			level, status, visibility, price, is_free)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) RETURNING id",
	)
	.bind(data.title)
	.bind(data.description)
	.bind(data.instructor_id.0)
	.bind(data.creator_id.map(|id| id.0))
	.bind(data.category_id)
	.bind(data.level.as_str())
	.bind(data.status.as_str())
	.bind(data.visibility.as_str())
	.bind(if data.is_free { 0.0 } else { data.price })
	.bind(data.is_free)
	.fetch_one(db)
	.await
	.map_err(map_write_err)?;

	read(db, course_id).await
}

pub(crate) async fn update(
	db: &SqlitePool,
	course_id: i64,
	data: &UpdateCourseData,
) -> ClResult<Course> {
	let mut query = sqlx::QueryBuilder::new("UPDATE courses SET ");
	let mut has_updates = false;

	has_updates = push_patch!(query, has_updates, "title", &data.title, |v| v.to_string());
	has_updates =
		push_patch!(query, has_updates, "description", &data.description, |v| v.to_string());
	has_updates = push_patch!(query, has_updates, "category_id", &data.category_id);
	has_updates = push_patch!(query, has_updates, "level", &data.level, |v| v.as_str());
	has_updates = push_patch!(query, has_updates, "status", &data.status, |v| v.as_str());
	has_updates =
		push_patch!(query, has_updates, "visibility", &data.visibility, |v| v.as_str());
	has_updates = push_patch!(query, has_updates, "price", &data.price);
	has_updates = push_patch!(query, has_updates, "is_free", &data.is_free);

	if has_updates {
		query.push(" WHERE id=").push_bind(course_id);
		let res = query.build().execute(db).await.map_err(map_write_err)?;
		expect_affected(res)?;
	}

	read(db, course_id).await
}

pub(crate) async fn delete(db: &SqlitePool, course_id: i64) -> ClResult<()> {
	let res = sqlx::query("DELETE FROM courses WHERE id=?1")
		.bind(course_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	expect_affected(res)
}

pub(crate) async fn count(db: &SqlitePool) -> ClResult<u32> {
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM courses")
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(count as u32)
}

// Modules //
//*********//
fn row_to_module(row: &SqliteRow) -> Result<Module, sqlx::Error> {
	Ok(Module {
		id: row.try_get("id")?,
		course_id: row.try_get("course_id")?,
		title: row.try_get("title")?,
		description: row.try_get("description")?,
		order_index: row.try_get("order_index")?,
		content_data: row.try_get("content_data")?,
	})
}

pub(crate) async fn list_modules(db: &SqlitePool, course_id: i64) -> ClResult<Vec<Module>> {
	let res = sqlx::query(
		"SELECT id, course_id, title, description, order_index, content_data
		FROM modules WHERE course_id=?1 ORDER BY order_index, id",
	)
	.bind(course_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	collect_res(res.iter().map(row_to_module))
}

pub(crate) async fn read_module(db: &SqlitePool, module_id: i64) -> ClResult<Module> {
	let res = sqlx::query(
		"SELECT id, course_id, title, description, order_index, content_data
		FROM modules WHERE id=?1",
	)
	.bind(module_id)
	.fetch_one(db)
	.await;
	map_res(res, row_to_module)
}

/// Inserts all modules in one transaction
pub(crate) async fn create_modules(
	db: &SqlitePool,
	course_id: i64,
	modules: &[NewModule],
) -> ClResult<Vec<Module>> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;
	let mut created = Vec::with_capacity(modules.len());

	for module in modules {
		let row = sqlx::query(
			"INSERT INTO modules (course_id, title, description, order_index)
			VALUES (?1, ?2, ?3, ?4)
			RETURNING id, course_id, title, description, order_index, content_data",
		)
		.bind(course_id)
		.bind(&module.title)
		.bind(&module.description)
		.bind(module.order_index)
		.fetch_one(&mut *tx)
		.await
		.map_err(map_write_err)?;
		created.push(row_to_module(&row).inspect_err(inspect).or(Err(Error::DbError))?);
	}

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(created)
}

pub(crate) async fn update_module_content(
	db: &SqlitePool,
	module_id: i64,
	content: &str,
) -> ClResult<Module> {
	let res = sqlx::query(
		"UPDATE modules SET content_data=?2 WHERE id=?1
		RETURNING id, course_id, title, description, order_index, content_data",
	)
	.bind(module_id)
	.bind(content)
	.fetch_one(db)
	.await;
	map_res(res, row_to_module)
}

// vim: ts=4
