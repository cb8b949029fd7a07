//! Outgoing email
//!
//! Templates are rendered in the request task, delivery runs on the slow
//! queue of the worker pool. Delivery failures are logged, never returned to
//! the caller.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod sender;
pub mod template;

mod prelude;

pub use sender::EmailSender;
pub use template::TemplateEngine;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::prelude::*;

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
	pub to: String,
	pub subject: String,
	pub text_body: String,
	pub html_body: Option<String>,
}

/// Registered in the app extensions
#[derive(Debug)]
pub struct EmailModule {
	pub template_engine: TemplateEngine,
	pub sender: Arc<EmailSender>,
	frontend_url: Box<str>,
}

impl EmailModule {
	pub fn new(settings: &campus_core::Settings) -> ClResult<Self> {
		Ok(Self {
			template_engine: TemplateEngine::new()?,
			sender: Arc::new(EmailSender::new(settings.email.clone())),
			frontend_url: settings.frontend_url.clone(),
		})
	}

	pub fn verification_link(&self, token: &str) -> String {
		format!("{}/verify-email?token={}", self.frontend_url, token)
	}

	/// Renders `template_name` and hands delivery to the worker pool
	pub fn send_template(
		&self,
		app: &App,
		to: &str,
		template_name: &str,
		vars: &serde_json::Value,
	) -> ClResult<()> {
		let rendered = self.template_engine.render(template_name, vars)?;
		let message = EmailMessage {
			to: to.to_string(),
			subject: rendered.subject,
			text_body: rendered.text_body,
			html_body: Some(rendered.html_body),
		};

		let sender = self.sender.clone();
		let delivery = app.worker.try_run_slow(move || sender.send(message));
		let to = to.to_string();
		tokio::spawn(async move {
			if let Err(e) = delivery.await {
				error!("Email delivery to {} failed: {}", to, e);
			}
		});
		Ok(())
	}

	pub fn send_verification_email(&self, app: &App, to: &str, username: &str, token: &str) {
		let vars = serde_json::json!({
			"username": username,
			"link": self.verification_link(token),
		});
		if let Err(e) = self.send_template(app, to, "verification", &vars) {
			error!("Cannot send verification email to {}: {}", to, e);
		}
	}
}

/// Builds the module that the app keeps in its extensions
pub fn init(settings: &campus_core::Settings) -> ClResult<EmailModule> {
	let module = EmailModule::new(settings)?;
	info!("Email module initialized (smtp: {})", module.sender.is_configured());
	Ok(module)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_verification_link() {
		let settings = campus_core::Settings {
			frontend_url: "https://campus.test".into(),
			..campus_core::Settings::default()
		};
		let module = EmailModule::new(&settings).unwrap();
		assert_eq!(module.verification_link("abc"), "https://campus.test/verify-email?token=abc");
	}
}

// vim: ts=4
