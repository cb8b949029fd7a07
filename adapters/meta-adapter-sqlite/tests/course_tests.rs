//! Courses, modules, enrollments, progress and quizzes

use campus_meta_adapter_sqlite::MetaAdapterSqlite;
use campus_types::meta_adapter::*;
use campus_types::prelude::*;
use tempfile::TempDir;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	(adapter, temp_dir)
}

fn course_data(title: &str, instructor: i64) -> CreateCourseData<'_> {
	CreateCourseData {
		title,
		description: Some("Descripción"),
		instructor_id: UserId(instructor),
		creator_id: Some(UserId(instructor)),
		category_id: None,
		level: CourseLevel::Intermedio,
		status: CourseStatus::Published,
		visibility: Visibility::Public,
		price: 0.0,
		is_free: true,
	}
}

fn new_module(title: &str, order_index: i32) -> NewModule {
	NewModule { title: title.into(), description: String::new(), order_index }
}

#[tokio::test]
async fn test_create_update_delete_course() {
	let (adapter, _temp) = create_test_adapter().await;

	let course = adapter.create_course(&course_data("Rust básico", 1)).await.unwrap();
	assert_eq!(course.title.as_ref(), "Rust básico");
	assert_eq!(course.level, CourseLevel::Intermedio);
	assert!(course.is_owned_by(UserId(1)));

	let course = adapter
		.update_course(
			course.id,
			&UpdateCourseData {
				title: Patch::Value("Rust avanzado".into()),
				level: Patch::Value(CourseLevel::Avanzado),
				description: Patch::Null,
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(course.title.as_ref(), "Rust avanzado");
	assert_eq!(course.level, CourseLevel::Avanzado);
	assert!(course.description.is_none());

	adapter.delete_course(course.id).await.unwrap();
	assert!(matches!(adapter.read_course(course.id).await, Err(Error::NotFound)));
	assert!(matches!(adapter.delete_course(course.id).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_list_courses_filters() {
	let (adapter, _temp) = create_test_adapter().await;
	let category = adapter.create_category("Programación", None).await.unwrap();

	let a = adapter.create_course(&course_data("A", 1)).await.unwrap();
	let mut draft = course_data("B", 2);
	draft.status = CourseStatus::Draft;
	draft.category_id = Some(category.id);
	let b = adapter.create_course(&draft).await.unwrap();

	let by_instructor = adapter
		.list_courses(&ListCoursesOptions { instructor_id: Some(UserId(2)), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(by_instructor.len(), 1);
	assert_eq!(by_instructor[0].id, b.id);

	let published = adapter
		.list_courses(&ListCoursesOptions {
			status: Some(CourseStatus::Published),
			..Default::default()
		})
		.await
		.unwrap();
	assert_eq!(published.len(), 1);
	assert_eq!(published[0].id, a.id);

	let by_category = adapter
		.list_courses(&ListCoursesOptions { category_id: Some(category.id), ..Default::default() })
		.await
		.unwrap();
	assert_eq!(by_category.len(), 1);

	let ids = [a.id];
	let by_id =
		adapter.list_courses(&ListCoursesOptions { ids: Some(&ids), ..Default::default() }).await.unwrap();
	assert_eq!(by_id.len(), 1);
	let none = adapter.list_courses(&ListCoursesOptions { ids: Some(&[]), ..Default::default() }).await.unwrap();
	assert!(none.is_empty());
}

#[tokio::test]
async fn test_modules_sorted_by_order_index() {
	let (adapter, _temp) = create_test_adapter().await;
	let course = adapter.create_course(&course_data("A", 1)).await.unwrap();

	adapter
		.create_modules(course.id, &[new_module("Tercero", 3), new_module("Primero", 1), new_module("Segundo", 2)])
		.await
		.unwrap();
	let modules = adapter.list_modules(course.id).await.unwrap();
	let titles: Vec<&str> = modules.iter().map(|m| m.title.as_ref()).collect();
	assert_eq!(titles, vec!["Primero", "Segundo", "Tercero"]);

	let module = adapter.update_module_content(modules[0].id, "# Lección").await.unwrap();
	assert_eq!(module.content_data.as_deref(), Some("# Lección"));

	// Unknown course
	assert!(matches!(adapter.create_modules(999, &[new_module("X", 1)]).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_enrollment_unique() {
	let (adapter, _temp) = create_test_adapter().await;
	let course = adapter.create_course(&course_data("A", 1)).await.unwrap();

	assert!(adapter.read_enrollment(UserId(5), course.id).await.unwrap().is_none());
	adapter.create_enrollment(UserId(5), course.id).await.unwrap();
	assert!(adapter.read_enrollment(UserId(5), course.id).await.unwrap().is_some());
	assert!(matches!(
		adapter.create_enrollment(UserId(5), course.id).await,
		Err(Error::ValidationError(_))
	));
	assert!(matches!(adapter.create_enrollment(UserId(5), 999).await, Err(Error::NotFound)));

	assert_eq!(adapter.list_user_enrollments(UserId(5)).await.unwrap().len(), 1);
	assert_eq!(adapter.list_course_enrollments(course.id).await.unwrap().len(), 1);
	assert_eq!(adapter.count_enrollments().await.unwrap(), 1);
}

#[tokio::test]
async fn test_mark_completed_is_idempotent() {
	let (adapter, _temp) = create_test_adapter().await;
	let course = adapter.create_course(&course_data("A", 1)).await.unwrap();
	let modules =
		adapter.create_modules(course.id, &[new_module("M1", 1), new_module("M2", 2)]).await.unwrap();

	adapter.mark_module_completed(UserId(5), modules[0].id).await.unwrap();
	adapter.mark_module_completed(UserId(5), modules[0].id).await.unwrap();

	let progress = adapter.list_progress(UserId(5), course.id).await.unwrap();
	assert_eq!(progress.get(&modules[0].id), Some(&ProgressStatus::Completed));
	assert_eq!(progress.get(&modules[1].id), None);
	assert_eq!(adapter.count_completed_modules(UserId(5), course.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_questions_with_options() {
	let (adapter, _temp) = create_test_adapter().await;
	let course = adapter.create_course(&course_data("A", 1)).await.unwrap();
	let modules = adapter.create_modules(course.id, &[new_module("M1", 1)]).await.unwrap();
	let module_id = modules[0].id;

	let questions = vec![
		NewQuestion {
			question_text: "¿2+2?".into(),
			options: vec![
				NewOption { option_text: "3".into(), is_correct: false },
				NewOption { option_text: "4".into(), is_correct: true },
			],
		},
		NewQuestion { question_text: "Sin opciones".into(), options: vec![] },
	];
	assert_eq!(adapter.create_questions(module_id, &questions).await.unwrap(), 2);

	let stored = adapter.list_questions(module_id).await.unwrap();
	assert_eq!(stored.len(), 2);
	assert_eq!(stored[0].options.len(), 2);
	assert!(stored[0].options[1].is_correct);
	assert!(stored[1].options.is_empty());
}

#[tokio::test]
async fn test_quiz_attempts_and_average() {
	let (adapter, _temp) = create_test_adapter().await;
	let course = adapter.create_course(&course_data("A", 1)).await.unwrap();
	let modules =
		adapter.create_modules(course.id, &[new_module("M1", 1), new_module("M2", 2)]).await.unwrap();

	assert_eq!(adapter.average_quiz_score(UserId(5), course.id).await.unwrap(), None);

	adapter.create_quiz_attempt(UserId(5), modules[0].id, 100, true).await.unwrap();
	adapter.create_quiz_attempt(UserId(5), modules[0].id, 50, false).await.unwrap();
	adapter.create_quiz_attempt(UserId(5), modules[1].id, 90, true).await.unwrap();
	// Another user does not count
	adapter.create_quiz_attempt(UserId(6), modules[1].id, 0, false).await.unwrap();

	assert_eq!(adapter.count_quiz_attempts(UserId(5), modules[0].id).await.unwrap(), 2);
	let avg = adapter.average_quiz_score(UserId(5), course.id).await.unwrap().unwrap();
	assert!((avg - 80.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_delete_course_cascades() {
	let (adapter, _temp) = create_test_adapter().await;
	let course = adapter.create_course(&course_data("A", 1)).await.unwrap();
	let modules = adapter.create_modules(course.id, &[new_module("M1", 1)]).await.unwrap();
	adapter.create_enrollment(UserId(5), course.id).await.unwrap();
	adapter.mark_module_completed(UserId(5), modules[0].id).await.unwrap();

	adapter.delete_course(course.id).await.unwrap();
	assert!(matches!(adapter.read_module(modules[0].id).await, Err(Error::NotFound)));
	assert!(adapter.list_user_enrollments(UserId(5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_categories() {
	let (adapter, _temp) = create_test_adapter().await;
	adapter.create_category("Diseño", Some("UX y UI")).await.unwrap();
	assert!(matches!(
		adapter.create_category("Diseño", None).await,
		Err(Error::ValidationError(_))
	));
	assert_eq!(adapter.count_categories().await.unwrap(), 1);
	assert_eq!(adapter.list_categories().await.unwrap()[0].name.as_ref(), "Diseño");
}

// vim: ts=4
