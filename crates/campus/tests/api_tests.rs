//! End-to-end API tests over the real SQLite adapters

use async_trait::async_trait;
use axum::{
	Router,
	body::Body,
	http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use campus::ai::TextGenerator;
use campus::auth_adapter::{CreateUserData, ROLE_INSTRUCTOR};
use campus::error::ClResult;
use campus::settings::{QuizPolicy, Settings};
use campus::types::UserId;
use campus::worker::WorkerPool;
use campus::{AppBuilder, routes};
use campus_auth_adapter_sqlite::AuthAdapterSqlite;
use campus_meta_adapter_sqlite::MetaAdapterSqlite;

const CURRICULUM: &str = "```json\n{\"modules\": [\
	{\"title\": \"Introducción\", \"description\": \"Primeros pasos\", \"order_index\": 1},\
	{\"title\": \"Ownership\", \"description\": \"Préstamos\", \"order_index\": 2}\
]}\n```";

const QUIZ: &str = "{\"questions\": [{\"question_text\": \"¿Qué es un crate?\", \"options\": [\
	{\"option_text\": \"Incorrecta\", \"is_correct\": false},\
	{\"option_text\": \"Correcta\", \"is_correct\": true}\
]}]}";

/// Answers by prompt shape
#[derive(Debug)]
struct Canned;

#[async_trait]
impl TextGenerator for Canned {
	async fn generate(&self, prompt: &str) -> ClResult<String> {
		if prompt.contains("\"modules\"") {
			Ok(CURRICULUM.into())
		} else if prompt.contains("\"questions\"") {
			Ok(QUIZ.into())
		} else {
			Ok("¡Muy bien!".into())
		}
	}
}

struct TestApp {
	app: campus::app::App,
	router: Router,
	_tmp: TempDir,
}

async fn test_app() -> TestApp {
	test_app_with(Settings::default()).await
}

async fn test_app_with(settings: Settings) -> TestApp {
	let tmp = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));
	let auth_adapter = AuthAdapterSqlite::new(worker.clone(), tmp.path()).await.unwrap();
	let meta_adapter = MetaAdapterSqlite::new(tmp.path()).await.unwrap();

	let mut builder = AppBuilder::new();
	builder
		.settings(settings)
		.worker(worker)
		.auth_adapter(Arc::new(auth_adapter))
		.meta_adapter(Arc::new(meta_adapter))
		.text_generator(Arc::new(Canned));
	let app = builder.build().unwrap();
	let router = routes::init(app.clone());
	TestApp { app, router, _tmp: tmp }
}

async fn call(
	router: &Router,
	method: &str,
	uri: &str,
	token: Option<&str>,
	body: Option<Value>,
) -> (StatusCode, Value) {
	let mut req = Request::builder().method(method).uri(uri);
	if let Some(token) = token {
		req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
	}
	let req = match body {
		Some(body) => req
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => req.body(Body::empty()).unwrap(),
	};

	let res = router.clone().oneshot(req).await.unwrap();
	let status = res.status();
	let bytes = axum::body::to_bytes(res.into_body(), 1 << 20).await.unwrap();
	let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
	(status, value)
}

async fn login(router: &Router, username: &str, password: &str) -> (StatusCode, Value) {
	let req = Request::builder()
		.method("POST")
		.uri("/api/auth/token")
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
		.body(Body::from(format!("username={}&password={}", username, password)))
		.unwrap();
	let res = router.clone().oneshot(req).await.unwrap();
	let status = res.status();
	let bytes = axum::body::to_bytes(res.into_body(), 1 << 20).await.unwrap();
	(status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn token(router: &Router, username: &str, password: &str) -> String {
	let (status, body) = login(router, username, password).await;
	assert_eq!(status, StatusCode::OK, "login failed: {}", body);
	assert_eq!(body["token_type"], "bearer");
	body["access_token"].as_str().unwrap().to_string()
}

async fn create_instructor(t: &TestApp) -> String {
	t.app
		.auth_adapter
		.create_user(CreateUserData {
			username: "profe",
			email: "profe@example.com",
			password: "secreto",
			role: ROLE_INSTRUCTOR,
			is_active: true,
			verification_token: None,
		})
		.await
		.unwrap();
	token(&t.router, "profe", "secreto").await
}

/// Course with a generated curriculum; returns the course and first module ids
async fn create_course(t: &TestApp, instructor: &str) -> (i64, i64) {
	let (status, body) = call(
		&t.router,
		"POST",
		"/api/courses",
		Some(instructor),
		Some(json!({"title": "Rust", "description": "Programación de sistemas"})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	let course_id = body["data"]["id"].as_i64().unwrap();

	let uri = format!("/api/courses/{}/generate-curriculum", course_id);
	let (status, body) = call(&t.router, "POST", &uri, Some(instructor), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"].as_array().unwrap().len(), 2);
	(course_id, body["data"][0]["id"].as_i64().unwrap())
}

/// Active, enrolled student; returns the user id and a token
async fn enrolled_student(t: &TestApp, course_id: i64) -> (UserId, String) {
	let student = json!({"username": "ana", "email": "ana@example.com", "password": "secreto"});
	let (status, body) = call(&t.router, "POST", "/api/users", None, Some(student)).await;
	assert_eq!(status, StatusCode::CREATED);
	let user_id = UserId(body["data"]["id"].as_i64().unwrap());
	let student = token(&t.router, "ana", "secreto").await;

	let enroll_uri = format!("/api/courses/{}/enroll", course_id);
	let (status, _) = call(&t.router, "POST", &enroll_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::CREATED);
	(user_id, student)
}

/// All-correct answers for the quiz of a module
async fn correct_answers(router: &Router, module_id: i64) -> Value {
	let (status, quiz) =
		call(router, "GET", &format!("/api/quizzes/module/{}", module_id), None, None).await;
	assert_eq!(status, StatusCode::OK);
	let mut answers = serde_json::Map::new();
	for question in quiz["data"]["questions"].as_array().unwrap() {
		let correct = question["options"]
			.as_array()
			.unwrap()
			.iter()
			.find(|o| o["option_text"] == "Correcta")
			.unwrap();
		answers.insert(question["id"].to_string(), correct["id"].clone());
	}
	json!({"answers": answers})
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
	let t = test_app().await;

	let (status, _) = call(&t.router, "GET", "/api/my-courses", None, None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	let (status, _) = call(&t.router, "GET", "/api/my-courses", Some("garbage"), None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	// An invalid token is rejected on public routes as well
	let (status, _) = call(&t.router, "GET", "/api/courses", Some("garbage"), None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, body) = call(&t.router, "GET", "/api/courses", None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_registration_requires_verification() {
	let t = test_app().await;
	let register = json!({"username": "bob", "email": "bob@example.com", "password": "secreto"});

	let (status, first) = call(&t.router, "POST", "/api/auth/register", None, Some(register.clone())).await;
	assert_eq!(status, StatusCode::CREATED);
	let (status, _) = login(&t.router, "bob", "secreto").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	// Same email again: same answer, nothing revealed
	let (status, second) = call(&t.router, "POST", "/api/auth/register", None, Some(register)).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(first["data"], second["data"]);

	let taken = json!({"username": "bob", "email": "other@example.com", "password": "secreto"});
	let (status, _) = call(&t.router, "POST", "/api/auth/register", None, Some(taken)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = call(&t.router, "GET", "/api/auth/verify-email?token=nope", None, None).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let user = t.app.auth_adapter.read_user_by_username("bob").await.unwrap();
	assert!(!user.is_active);
	let subscription = t.app.meta_adapter.read_subscription(user.id).await.unwrap();
	assert_eq!(subscription.plan_name.as_ref(), "Estudiante Básico");
}

#[tokio::test]
async fn test_course_quiz_flow() {
	let t = test_app().await;
	let instructor = create_instructor(&t).await;

	let (status, body) = call(
		&t.router,
		"POST",
		"/api/courses",
		Some(&instructor),
		Some(json!({"title": "Rust", "description": "Programación de sistemas"})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	let course_id = body["data"]["id"].as_i64().unwrap();

	let uri = format!("/api/courses/{}/generate-curriculum", course_id);
	let (status, body) = call(&t.router, "POST", &uri, Some(&instructor), None).await;
	assert_eq!(status, StatusCode::OK);
	let modules = body["data"].as_array().unwrap();
	assert_eq!(modules.len(), 2);
	let first_module = modules[0]["id"].as_i64().unwrap();

	// Students sign up without verification through the users endpoint
	let student = json!({"username": "ana", "email": "ana@example.com", "password": "secreto"});
	let (status, _) = call(&t.router, "POST", "/api/users", None, Some(student)).await;
	assert_eq!(status, StatusCode::CREATED);
	let student = token(&t.router, "ana", "secreto").await;

	let course_uri = format!("/api/courses/{}", course_id);
	let (status, body) = call(&t.router, "GET", &course_uri, None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["total_stars"], 3);
	assert_eq!(body["data"]["earned_stars"], 0);
	assert_eq!(body["data"]["modules"][0]["is_locked"], false);
	assert_eq!(body["data"]["modules"][1]["is_locked"], true);

	let module_uri = format!("/api/modules/{}", first_module);
	let (status, _) = call(&t.router, "GET", &module_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let enroll_uri = format!("/api/courses/{}/enroll", course_id);
	let (status, _) = call(&t.router, "POST", &enroll_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::CREATED);
	let (status, _) = call(&t.router, "POST", &enroll_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let quiz_uri = format!("/api/quizzes/module/{}", first_module);
	let (status, quiz) = call(&t.router, "GET", &quiz_uri, None, None).await;
	assert_eq!(status, StatusCode::OK);
	let question = &quiz["data"]["questions"][0];
	assert!(question["options"][0].get("is_correct").is_none());
	let correct = question["options"]
		.as_array()
		.unwrap()
		.iter()
		.find(|o| o["option_text"] == "Correcta")
		.unwrap();
	let mut answers = serde_json::Map::new();
	answers.insert(question["id"].to_string(), correct["id"].clone());

	let submit_uri = format!("{}/submit", quiz_uri);
	let (status, result) =
		call(&t.router, "POST", &submit_uri, Some(&student), Some(json!({"answers": answers}))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(result["data"]["score"], 100);
	assert_eq!(result["data"]["passed"], true);
	assert_eq!(result["data"]["motivational_phrase"], "¡Muy bien!");

	let (_, body) = call(&t.router, "GET", &course_uri, Some(&student), None).await;
	assert_eq!(body["data"]["is_enrolled"], true);
	assert_eq!(body["data"]["modules"][0]["status"], "completed");
	assert_eq!(body["data"]["modules"][1]["is_locked"], false);

	let (_, body) = call(&t.router, "GET", "/api/my-courses", Some(&student), None).await;
	assert_eq!(body["data"][0]["completion_percentage"], 50);

	// Passing again keeps the module completed and records one more attempt
	let (status, result) =
		call(&t.router, "POST", &submit_uri, Some(&student), Some(json!({"answers": answers}))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(result["data"]["passed"], true);
	assert!(result["data"].get("attempts_remaining").is_none());
	let (_, body) = call(&t.router, "GET", &course_uri, Some(&student), None).await;
	assert_eq!(body["data"]["modules"][0]["status"], "completed");
	let student_id = t.app.auth_adapter.read_user_by_username("ana").await.unwrap().id;
	let attempts = t.app.meta_adapter.count_quiz_attempts(student_id, first_module).await.unwrap();
	assert_eq!(attempts, 2);

	// Students cannot create courses
	let (status, _) = call(
		&t.router,
		"POST",
		"/api/courses",
		Some(&student),
		Some(json!({"title": "Hack"})),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_quiz_attempt_cap() {
	let settings = Settings {
		quiz: QuizPolicy { max_attempts: Some(1), ..QuizPolicy::default() },
		..Settings::default()
	};
	let t = test_app_with(settings).await;
	let instructor = create_instructor(&t).await;
	let (course_id, module_id) = create_course(&t, &instructor).await;
	let (student_id, student) = enrolled_student(&t, course_id).await;

	let status_uri = format!("/api/quizzes/module/{}/status", module_id);
	let (status, body) = call(&t.router, "GET", &status_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"], json!({"can_attempt": true, "attempts_made": 0, "max_attempts": 1}));

	let submit_uri = format!("/api/quizzes/module/{}/submit", module_id);
	let answers = correct_answers(&t.router, module_id).await;
	let (status, result) =
		call(&t.router, "POST", &submit_uri, Some(&student), Some(answers.clone())).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(result["data"]["attempts_remaining"], 0);

	let (status, _) = call(&t.router, "POST", &submit_uri, Some(&student), Some(answers)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let attempts = t.app.meta_adapter.count_quiz_attempts(student_id, module_id).await.unwrap();
	assert_eq!(attempts, 1);

	let (_, body) = call(&t.router, "GET", &status_uri, Some(&student), None).await;
	assert_eq!(body["data"], json!({"can_attempt": false, "attempts_made": 1, "max_attempts": 1}));
}

#[tokio::test]
async fn test_room_membership_notifies() {
	let t = test_app().await;
	let instructor = create_instructor(&t).await;
	let student = json!({"username": "ana", "email": "ana@example.com", "password": "secreto"});
	let (_, body) = call(&t.router, "POST", "/api/users", None, Some(student)).await;
	let student_id = body["data"]["id"].as_i64().unwrap();
	let student = token(&t.router, "ana", "secreto").await;

	let (status, body) =
		call(&t.router, "POST", "/api/rooms", Some(&instructor), Some(json!({"name": "Grupo A"}))).await;
	assert_eq!(status, StatusCode::CREATED);
	let room_id = body["data"]["id"].as_i64().unwrap();
	assert_eq!(body["data"]["join_code"].as_str().unwrap().len(), 8);

	let room_uri = format!("/api/rooms/{}", room_id);
	let (status, _) = call(&t.router, "GET", &room_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let member_uri = format!("/api/rooms/{}/members/{}", room_id, student_id);
	for _ in 0..2 {
		let (status, _) = call(&t.router, "POST", &member_uri, Some(&instructor), None).await;
		assert_eq!(status, StatusCode::OK);
	}
	// Other users do not see the room at all
	let (status, _) = call(&t.router, "POST", &member_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, body) = call(&t.router, "GET", &room_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["members"][0]["username"], "ana");

	let (_, body) = call(&t.router, "GET", "/api/notifications", Some(&student), None).await;
	let notifications = body["data"].as_array().unwrap();
	assert_eq!(notifications.len(), 1);
	assert_eq!(notifications[0]["message"], "Has sido invitado a la sala: 'Grupo A'");

	let read_uri = format!("/api/notifications/{}/read", notifications[0]["id"]);
	let (status, _) = call(&t.router, "POST", &read_uri, Some(&instructor), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = call(&t.router, "POST", &read_uri, Some(&student), None).await;
	assert_eq!(status, StatusCode::NO_CONTENT);
}

// vim: ts=4
