//! Course suggestions voted by visitors

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use campus_types::meta_adapter::{CourseSuggestion, SuggestionStatus};

use crate::prelude::*;

/// Topics at least this similar are merged into one suggestion
pub const MERGE_SIMILARITY: f64 = 0.8;
/// Votes at which a suggestion is turned into a course
pub const COURSE_CREATION_VOTES: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct CreateSuggestionRequest {
	pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
	#[serde(default)]
	pub query: String,
}

/// Most similar existing suggestion above the merge threshold
pub fn find_similar<'a>(topic: &str, existing: &'a [CourseSuggestion]) -> Option<&'a CourseSuggestion> {
	let topic = topic.to_lowercase();
	existing
		.iter()
		.map(|s| (s, strsim::normalized_levenshtein(&topic, &s.topic.to_lowercase())))
		.filter(|(_, similarity)| *similarity >= MERGE_SIMILARITY)
		.max_by(|a, b| a.1.total_cmp(&b.1))
		.map(|(s, _)| s)
}

async fn vote(app: &App, suggestion_id: i64) -> ClResult<CourseSuggestion> {
	let suggestion = app.meta_adapter.add_suggestion_vote(suggestion_id).await?;
	if suggestion.votes >= COURSE_CREATION_VOTES && suggestion.status == SuggestionStatus::Open {
		info!(suggestion_id, topic = %suggestion.topic, "Suggestion reached the vote goal");
		return app
			.meta_adapter
			.update_suggestion_status(suggestion_id, SuggestionStatus::CourseCreated)
			.await;
	}
	Ok(suggestion)
}

/// POST /api/suggestions
pub async fn post_suggestion(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Json(req): Json<CreateSuggestionRequest>,
) -> ClResult<(StatusCode, Json<ApiResponse<CourseSuggestion>>)> {
	let topic = req.topic.trim();
	if topic.is_empty() {
		return Err(Error::ValidationError("Topic is required".into()));
	}

	let existing = app.meta_adapter.list_suggestions().await?;
	let suggestion = if let Some(similar) = find_similar(topic, &existing) {
		debug!("Merging suggestion '{}' into '{}'", topic, similar.topic);
		vote(&app, similar.id).await?
	} else {
		app.meta_adapter.create_suggestion(topic).await?
	};

	let response = ApiResponse::new(suggestion).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/suggestions
pub async fn list_suggestions(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<CourseSuggestion>>>)> {
	let suggestions = app.meta_adapter.list_suggestions().await?;

	let response = ApiResponse::new(suggestions).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// GET /api/suggestions/search?query=
pub async fn search_suggestions(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Query(query): Query<SearchQuery>,
) -> ClResult<(StatusCode, Json<ApiResponse<Vec<CourseSuggestion>>>)> {
	let suggestions = app.meta_adapter.search_suggestions(query.query.trim()).await?;

	let response = ApiResponse::new(suggestions).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

/// POST /api/suggestions/{suggestion_id}/vote
pub async fn post_suggestion_vote(
	State(app): State<App>,
	OptionalRequestId(req_id): OptionalRequestId,
	Path(suggestion_id): Path<i64>,
) -> ClResult<(StatusCode, Json<ApiResponse<CourseSuggestion>>)> {
	let suggestion = vote(&app, suggestion_id).await?;

	let response = ApiResponse::new(suggestion).with_req_id(req_id.unwrap_or_default());
	Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn suggestion(id: i64, topic: &str) -> CourseSuggestion {
		CourseSuggestion {
			id,
			topic: topic.into(),
			votes: 1,
			status: SuggestionStatus::Open,
			created_at: Timestamp(0),
		}
	}

	#[test]
	fn test_find_similar() {
		let existing = vec![suggestion(1, "Machine Learning"), suggestion(2, "Rust avanzado")];
		assert_eq!(find_similar("machine learnin", &existing).map(|s| s.id), Some(1));
		assert_eq!(find_similar("RUST AVANZADO", &existing).map(|s| s.id), Some(2));
		assert!(find_similar("Kubernetes", &existing).is_none());
		assert!(find_similar("Rust", &existing).is_none());
	}
}

// vim: ts=4
