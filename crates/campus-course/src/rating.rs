//! Up/down votes on courses and modules

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::Deserialize;

use campus_types::meta_adapter::{Rating, RatingCounts, RatingTarget};

use crate::prelude::*;

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
	pub is_upvote: bool,
	pub course_id: Option<i64>,
	pub module_id: Option<i64>,
}

/// The path decides the target; a body naming the other kind is rejected
fn rating_target(path_target: RatingTarget, req: &RatingRequest) -> ClResult<RatingTarget> {
	match path_target {
		RatingTarget::Course(course_id) => RatingTarget::from_ids(Some(course_id), req.module_id),
		RatingTarget::Module(module_id) => RatingTarget::from_ids(req.course_id, Some(module_id)),
	}
}

async fn rate(
	app: &App,
	user_id: UserId,
	target: RatingTarget,
	req: &RatingRequest,
) -> ClResult<Rating> {
	let target = rating_target(target, req)?;
	match target {
		RatingTarget::Course(course_id) => {
			app.meta_adapter.read_course(course_id).await?;
		}
		RatingTarget::Module(module_id) => {
			app.meta_adapter.read_module(module_id).await?;
		}
	}
	app.meta_adapter.upsert_rating(user_id, target, req.is_upvote).await
}

async fn counts(app: &App, user_id: Option<UserId>, target: RatingTarget) -> ClResult<RatingCounts> {
	let mut counts = app.meta_adapter.rating_counts(Some(target)).await?;
	if let Some(user_id) = user_id {
		counts.user_rating = app.meta_adapter.read_user_rating(user_id, target).await?;
	}
	Ok(counts)
}

/// POST /api/ratings/course/{course_id}
pub async fn post_course_rating(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
	Json(req): Json<RatingRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<Rating>>)> {
	let rating = rate(&app, auth.user_id, RatingTarget::Course(course_id), &req).await?;

	let response = ApiResponse::new(rating).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/ratings/module/{module_id}
pub async fn post_module_rating(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
	Json(req): Json<RatingRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<Rating>>)> {
	let rating = rate(&app, auth.user_id, RatingTarget::Module(module_id), &req).await?;

	let response = ApiResponse::new(rating).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/ratings/course/{course_id}
pub async fn get_course_ratings(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<RatingCounts>>)> {
	let counts = counts(&app, Some(auth.user_id), RatingTarget::Course(course_id)).await?;

	let response = ApiResponse::new(counts).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/ratings/module/{module_id}
pub async fn get_module_ratings(
	State(app): State<App>,
	Auth(auth): Auth,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(module_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<RatingCounts>>)> {
	let counts = counts(&app, Some(auth.user_id), RatingTarget::Module(module_id)).await?;

	let response = ApiResponse::new(counts).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/ratings/course/{course_id}/public
pub async fn get_public_course_ratings(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(course_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<RatingCounts>>)> {
	let counts = counts(&app, None, RatingTarget::Course(course_id)).await?;

	let response = ApiResponse::new(counts).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/ratings/global-counts
pub async fn get_global_ratings(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<RatingCounts>>)> {
	let counts = app.meta_adapter.rating_counts(None).await?;

	let response = ApiResponse::new(counts).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}


// vim: ts=4
