//! HTTP server: logging, CORS and request id layers around the API router

use axum::{
	body::Body,
	http::{HeaderValue, Method, Request, header},
	middleware::{self, Next},
	response::Response,
};
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};

use campus_core::middleware::request_id;

use crate::prelude::*;

/// Logs every request with its status and duration
async fn log_request(req: Request<Body>, next: Next) -> Response {
	let start = std::time::Instant::now();
	let method = req.method().clone();
	let path = req.uri().path().to_string();
	info!("REQ {} {}", method, path);

	let res = next.run(req).await;

	let status = res.status();
	if status.is_client_error() || status.is_server_error() {
		warn!("RES: {} {} {} tm:{:?}", status, method, path, start.elapsed().as_millis());
	} else {
		info!("RES: {} {} {} tm:{:?}", status, method, path, start.elapsed().as_millis());
	}
	res
}

/// CORS for the frontend origin; bearer tokens need no credentials mode
pub fn cors_layer(frontend_url: &str) -> CorsLayer {
	let origins: Vec<HeaderValue> = frontend_url
		.split(',')
		.map(|o| o.trim().trim_end_matches('/'))
		.filter(|o| !o.is_empty())
		.filter_map(|o| HeaderValue::from_str(o).ok())
		.collect();
	if origins.is_empty() {
		warn!("No valid CORS origin in {:?}", frontend_url);
	}

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
		.allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
		.expose_headers([header::CONTENT_DISPOSITION])
}

/// Wraps the API router with the cross-cutting layers
pub fn service(app: &App, router: axum::Router) -> axum::Router {
	router
		.layer(middleware::from_fn(log_request))
		.layer(middleware::from_fn(request_id))
		.layer(TraceLayer::new_for_http())
		.layer(cors_layer(&app.settings.frontend_url))
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("Cannot listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutting down");
}

pub async fn serve(app: App, router: axum::Router) -> ClResult<()> {
	let listen = app.settings.listen.clone();
	let listener = tokio::net::TcpListener::bind(listen.as_ref()).await.map_err(|e| {
		error!("FATAL: Cannot listen on {}: {}", listen, e);
		Error::Io(e)
	})?;
	info!("Listening on HTTP {}", listen);

	axum::serve(listener, service(&app, router))
		.with_graceful_shutdown(shutdown_signal())
		.await?;
	Ok(())
}

// vim: ts=4
