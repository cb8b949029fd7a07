//! Server settings read from the environment
//!
//! Every value has a default except the secrets. Malformed numbers are a
//! configuration error rather than a silent fallback.

use std::path::PathBuf;
use std::str::FromStr;

use crate::prelude::*;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub const DEFAULT_DB_DIR: &str = "./data";
pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_PASS_THRESHOLD: u32 = 55;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmailTls {
	/// Implicit TLS (usually port 465)
	Tls,
	#[default]
	StartTls,
	None,
}

impl FromStr for EmailTls {
	type Err = Error;

	fn from_str(s: &str) -> ClResult<Self> {
		match s.to_ascii_lowercase().as_str() {
			"tls" => Ok(EmailTls::Tls),
			"starttls" => Ok(EmailTls::StartTls),
			"none" => Ok(EmailTls::None),
			_ => Err(Error::ConfigError(format!("EMAIL_TLS: unknown mode '{}'", s))),
		}
	}
}

#[derive(Clone, Default)]
pub struct EmailSettings {
	/// No host means emails are logged and skipped
	pub host: Option<Box<str>>,
	pub port: u16,
	pub user: Option<Box<str>>,
	pub password: Option<Box<str>>,
	pub from: Option<Box<str>>,
	pub tls: EmailTls,
}

impl std::fmt::Debug for EmailSettings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EmailSettings")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("user", &self.user)
			.field("from", &self.from)
			.field("tls", &self.tls)
			.finish_non_exhaustive()
	}
}

/// Quiz grading policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizPolicy {
	pub pass_threshold: u32,
	/// `None` allows unlimited attempts
	pub max_attempts: Option<u32>,
}

impl Default for QuizPolicy {
	fn default() -> Self {
		Self { pass_threshold: DEFAULT_PASS_THRESHOLD, max_attempts: None }
	}
}

#[derive(Clone)]
pub struct Settings {
	pub listen: Box<str>,
	pub db_dir: PathBuf,
	/// JWT secret. When unset the auth adapter generates and stores one.
	pub secret_key: Option<Box<str>>,
	pub access_token_expire_minutes: u32,
	pub google_api_key: Option<Box<str>>,
	pub ai_model: Box<str>,
	pub email: EmailSettings,
	pub frontend_url: Box<str>,
	pub quiz: QuizPolicy,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			listen: DEFAULT_LISTEN.into(),
			db_dir: PathBuf::from(DEFAULT_DB_DIR),
			secret_key: None,
			access_token_expire_minutes: 60,
			google_api_key: None,
			ai_model: DEFAULT_AI_MODEL.into(),
			email: EmailSettings { port: 587, ..EmailSettings::default() },
			frontend_url: DEFAULT_FRONTEND_URL.into(),
			quiz: QuizPolicy::default(),
		}
	}
}

impl std::fmt::Debug for Settings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Settings")
			.field("listen", &self.listen)
			.field("db_dir", &self.db_dir)
			.field("access_token_expire_minutes", &self.access_token_expire_minutes)
			.field("ai_model", &self.ai_model)
			.field("ai_enabled", &self.google_api_key.is_some())
			.field("email", &self.email)
			.field("frontend_url", &self.frontend_url)
			.field("quiz", &self.quiz)
			.finish_non_exhaustive()
	}
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>, default: T) -> ClResult<T> {
	match value {
		Some(v) if !v.trim().is_empty() => v
			.trim()
			.parse()
			.map_err(|_| Error::ConfigError(format!("{}: invalid value '{}'", name, v))),
		_ => Ok(default),
	}
}

impl Settings {
	pub fn from_env() -> ClResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the settings from an arbitrary variable source
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClResult<Self> {
		let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
		let defaults = Settings::default();

		let email_user: Option<Box<str>> = var("EMAIL_USER").map(Into::into);
		let email = EmailSettings {
			host: var("EMAIL_HOST").map(Into::into),
			port: parse_var("EMAIL_PORT", var("EMAIL_PORT"), defaults.email.port)?,
			password: var("EMAIL_PASSWORD").map(Into::into),
			from: var("EMAIL_FROM").map(Into::into).or_else(|| email_user.clone()),
			user: email_user,
			tls: parse_var("EMAIL_TLS", var("EMAIL_TLS"), EmailTls::default())?,
		};

		let pass_threshold =
			parse_var("QUIZ_PASS_THRESHOLD", var("QUIZ_PASS_THRESHOLD"), DEFAULT_PASS_THRESHOLD)?;
		if pass_threshold > 100 {
			return Err(Error::ConfigError(format!(
				"QUIZ_PASS_THRESHOLD: {} is above 100",
				pass_threshold
			)));
		}
		let max_attempts = match var("QUIZ_MAX_ATTEMPTS") {
			Some(v) => Some(parse_var("QUIZ_MAX_ATTEMPTS", Some(v), 0u32)?).filter(|n| *n > 0),
			None => None,
		};

		Ok(Settings {
			listen: var("LISTEN").map_or(defaults.listen, Into::into),
			db_dir: var("DB_DIR").map_or(defaults.db_dir, PathBuf::from),
			secret_key: var("SECRET_KEY").map(Into::into),
			access_token_expire_minutes: parse_var(
				"ACCESS_TOKEN_EXPIRE_MINUTES",
				var("ACCESS_TOKEN_EXPIRE_MINUTES"),
				defaults.access_token_expire_minutes,
			)?,
			google_api_key: var("GOOGLE_API_KEY").map(Into::into),
			ai_model: var("AI_MODEL").map_or(defaults.ai_model, Into::into),
			email,
			frontend_url: var("FRONTEND_URL")
				.map_or(defaults.frontend_url, |url| url.trim_end_matches('/').into()),
			quiz: QuizPolicy { pass_threshold, max_attempts },
		})
	}

	/// Access token lifetime in seconds
	pub fn access_token_ttl(&self) -> i64 {
		i64::from(self.access_token_expire_minutes) * 60
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> =
			vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn test_defaults() {
		let settings = Settings::from_lookup(lookup(&[])).unwrap();
		assert_eq!(settings.listen.as_ref(), DEFAULT_LISTEN);
		assert_eq!(settings.access_token_ttl(), 3600);
		assert_eq!(settings.quiz, QuizPolicy { pass_threshold: 55, max_attempts: None });
		assert_eq!(settings.email.port, 587);
		assert_eq!(settings.email.tls, EmailTls::StartTls);
		assert!(settings.secret_key.is_none());
	}

	#[test]
	fn test_overrides() {
		let settings = Settings::from_lookup(lookup(&[
			("LISTEN", "0.0.0.0:9000"),
			("QUIZ_PASS_THRESHOLD", "70"),
			("QUIZ_MAX_ATTEMPTS", "3"),
			("EMAIL_USER", "noreply@campus.test"),
			("EMAIL_TLS", "TLS"),
			("FRONTEND_URL", "https://campus.test/"),
		]))
		.unwrap();
		assert_eq!(settings.listen.as_ref(), "0.0.0.0:9000");
		assert_eq!(settings.quiz, QuizPolicy { pass_threshold: 70, max_attempts: Some(3) });
		assert_eq!(settings.email.from.as_deref(), Some("noreply@campus.test"));
		assert_eq!(settings.email.tls, EmailTls::Tls);
		assert_eq!(settings.frontend_url.as_ref(), "https://campus.test");
	}

	#[test]
	fn test_invalid_number_is_config_error() {
		let res = Settings::from_lookup(lookup(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "soon")]));
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_pass_threshold_above_100_is_config_error() {
		let res = Settings::from_lookup(lookup(&[("QUIZ_PASS_THRESHOLD", "101")]));
		assert!(matches!(res, Err(Error::ConfigError(_))));
		let settings = Settings::from_lookup(lookup(&[("QUIZ_PASS_THRESHOLD", "100")])).unwrap();
		assert_eq!(settings.quiz.pass_threshold, 100);
	}

	#[test]
	fn test_zero_max_attempts_means_unlimited() {
		let settings = Settings::from_lookup(lookup(&[("QUIZ_MAX_ATTEMPTS", "0")])).unwrap();
		assert_eq!(settings.quiz.max_attempts, None);
	}
}

// vim: ts=4
