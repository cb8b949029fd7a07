//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{HeaderValue, Request, header, response::Response},
	middleware::Next,
};

use crate::extract::RequestId;
use crate::prelude::*;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn bearer_token(req: &Request<Body>) -> Option<&str> {
	req.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|token| !token.is_empty())
}

pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	let token = bearer_token(&req).ok_or(Error::Unauthorized)?;
	let auth = app.auth_adapter.validate_access_token(token).await?;

	req.extensions_mut().insert(Auth(auth));

	Ok(next.run(req).await)
}

/// Like `require_auth`, but anonymous requests pass through.
/// A present but invalid token is still rejected.
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	if let Some(token) = bearer_token(&req) {
		let auth = app.auth_adapter.validate_access_token(token).await?;
		req.extensions_mut().insert(Auth(auth));
	}

	Ok(next.run(req).await)
}

/// Takes the client's `X-Request-Id` or generates one, and echoes it back
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response<Body> {
	let req_id = req
		.headers()
		.get(REQUEST_ID_HEADER)
		.and_then(|h| h.to_str().ok())
		.filter(|id| !id.is_empty() && id.len() <= 64)
		.map_or_else(|| uuid::Uuid::new_v4().simple().to_string(), ToString::to_string);

	req.extensions_mut().insert(RequestId(req_id.clone()));
	let mut res = next.run(req).await;
	if let Ok(value) = HeaderValue::from_str(&req_id) {
		res.headers_mut().insert(REQUEST_ID_HEADER, value);
	}
	res
}


// vim: ts=4
