//! Error type shared by every Campus crate.

use axum::{Json, http::StatusCode, response::IntoResponse};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	// core errors
	NotFound,
	PermissionDenied,
	Unauthorized,
	DbError,
	Parse,
	Timeout,
	Unknown,
	ValidationError(String),
	Internal(String),
	ConfigError(String),
	ServiceUnavailable(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// Stable error code sent to clients
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-CORE-NOTFOUND",
			Error::PermissionDenied => "E-AUTH-NOPERM",
			Error::Unauthorized => "E-AUTH-UNAUTH",
			Error::ValidationError(_) => "E-VAL-INVALID",
			Error::Timeout => "E-NET-TIMEOUT",
			Error::ServiceUnavailable(_) => "E-SYS-UNAVAIL",
			Error::DbError => "E-CORE-DBERR",
			Error::Parse => "E-CORE-PARSE",
			Error::ConfigError(_) => "E-CONF-CFGERR",
			Error::Internal(_) | Error::Unknown | Error::Io(_) => "E-CORE-INTERNAL",
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
			Error::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
			Error::DbError
			| Error::Parse
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::Unknown
			| Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Message shown to the client. Internal details stay in the logs.
	fn public_message(&self) -> String {
		match self {
			Error::NotFound => "Resource not found".into(),
			Error::PermissionDenied => "You do not have permission to perform this action".into(),
			Error::Unauthorized => "Could not validate credentials".into(),
			Error::ValidationError(msg) | Error::ServiceUnavailable(msg) => msg.clone(),
			Error::Timeout => "Upstream request timed out".into(),
			_ => "Internal server error".into(),
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::Timeout => write!(f, "timeout"),
			Error::Unknown => write!(f, "unknown error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::warn!("JSON error: {}", err);
		Self::Parse
	}
}

#[cfg(feature = "server")]
impl From<jsonwebtoken::errors::Error> for Error {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		tracing::debug!("JWT error: {}", err);
		Self::Unauthorized
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!("{}", self);
		}
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": self.public_message(),
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(Error::NotFound.status(), StatusCode::NOT_FOUND);
		assert_eq!(Error::PermissionDenied.status(), StatusCode::FORBIDDEN);
		assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(Error::ValidationError("x".into()).status(), StatusCode::BAD_REQUEST);
		assert_eq!(Error::DbError.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(
			Error::ServiceUnavailable("ai".into()).status(),
			StatusCode::SERVICE_UNAVAILABLE
		);
	}

	#[test]
	fn test_internal_details_are_hidden() {
		let err = Error::Internal("secret stack trace".into());
		assert_eq!(err.public_message(), "Internal server error");
		let err = Error::ValidationError("Already enrolled".into());
		assert_eq!(err.public_message(), "Already enrolled");
	}
}

// vim: ts=4
