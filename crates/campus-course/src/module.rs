//! Module endpoints

use axum::{
	Json,
	extract::{Path, State},
	http::{HeaderValue, StatusCode, header},
	response::IntoResponse,
};

use campus_ai::AiService;
use campus_core::roles;
use campus_types::auth_adapter::AuthCtx;
use campus_types::meta_adapter::{Course, Module};

use crate::prelude::*;
use crate::service;

/// Loads a module and its course, checking that the user may read it
async fn read_visible_module(app: &App, auth: &AuthCtx, module_id: i64) -> ClResult<(Module, Course)> {
	let module = app.meta_adapter.read_module(module_id).await?;
	let course = app.meta_adapter.read_course(module.course_id).await?;
	let is_enrolled = service::is_enrolled(app, auth.user_id, course.id).await?;
	if !roles::can_view_module(auth, &course, is_enrolled) {
		return Err(Error::PermissionDenied);
	}
	Ok((module, course))
}

fn attachment_name(title: &str) -> String {
	let name: String = title
		.trim()
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
		.collect();
	if name.is_empty() { "module".into() } else { name }
}

/// GET /api/modules/{module_id}
pub async fn get_module(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<Module>>)> {
	let (module, _) = read_visible_module(&app, &auth, module_id).await?;

	let response = ApiResponse::new(module).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/modules/{module_id}/generate-content
pub async fn post_generate_content(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<Module>>)> {
	let module = app.meta_adapter.read_module(module_id).await?;
	let course = app.meta_adapter.read_course(module.course_id).await?;
	if !roles::can_edit_course(&auth, &course) {
		return Err(Error::PermissionDenied);
	}
	let ai = app.ext::<AiService>()?;

	info!(module_id, "Generating module content");
	let module = service::generate_module_content(&app, ai, &module).await?;

	let response = ApiResponse::new(module).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/modules/{module_id}/download
pub async fn get_module_download(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(module_id): Path<i64>,
) -> ClResult<impl IntoResponse> {
	let (module, _) = read_visible_module(&app, &auth, module_id).await?;
	let Some(content) = module.content_data.as_deref().filter(|c| !c.trim().is_empty()) else {
		return Err(Error::NotFound);
	};

	let mut body = format!("# {}\n\n", module.title);
	if let Some(description) = module.description.as_deref() {
		body.push_str(description);
		body.push_str("\n\n---\n\n");
	}
	body.push_str(content);

	let disposition =
		HeaderValue::from_str(&format!("attachment; filename=\"{}.md\"", attachment_name(&module.title)))
			.map_err(|_| Error::Internal("invalid attachment name".into()))?;

	Ok((
		[
			(header::CONTENT_TYPE, HeaderValue::from_static("text/markdown; charset=utf-8")),
			(header::CONTENT_DISPOSITION, disposition),
		],
		body,
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_attachment_name() {
		assert_eq!(attachment_name("Introducción a Rust"), "Introducci_n_a_Rust");
		assert_eq!(attachment_name("  "), "module");
		assert_eq!(attachment_name("a\"b"), "a_b");
	}
}

// vim: ts=4
