//! SMTP email sender using lettre
//!
//! `send` blocks on the SMTP dialogue, so it is meant to run on the worker pool.

use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, Transport};
use std::time::Duration;

use campus_core::settings::{EmailSettings, EmailTls};

use crate::EmailMessage;
use crate::prelude::*;

const SMTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct EmailSender {
	settings: EmailSettings,
}

impl EmailSender {
	pub fn new(settings: EmailSettings) -> Self {
		if settings.host.is_none() {
			warn!("EMAIL_HOST not set, emails will be logged and skipped");
		}
		Self { settings }
	}

	pub fn is_configured(&self) -> bool {
		self.settings.host.is_some()
	}

	fn build_message(&self, message: EmailMessage) -> ClResult<Message> {
		let from_address = self
			.settings
			.from
			.as_deref()
			.ok_or_else(|| Error::ConfigError("EMAIL_FROM or EMAIL_USER must be set".into()))?;

		if !message.to.contains('@') {
			return Err(Error::ValidationError("Invalid recipient email address".into()));
		}

		let builder = Message::builder()
			.from(
				format!("Campus <{}>", from_address)
					.parse()
					.map_err(|_| Error::ConfigError("Invalid from email format".into()))?,
			)
			.to(message
				.to
				.parse()
				.map_err(|_| Error::ValidationError("Invalid recipient email format".into()))?)
			.subject(&message.subject);

		let email = if let Some(html_body) = message.html_body {
			builder.multipart(
				MultiPart::alternative()
					.singlepart(SinglePart::plain(message.text_body))
					.singlepart(SinglePart::html(html_body)),
			)
		} else {
			builder.singlepart(SinglePart::plain(message.text_body))
		};
		email.map_err(|e| Error::ValidationError(format!("Failed to build email: {}", e)))
	}

	fn transport(&self, host: &str) -> ClResult<SmtpTransport> {
		let tls_params = || {
			TlsParameters::builder(host.to_string())
				.build()
				.map_err(|e| Error::ConfigError(format!("TLS configuration error: {}", e)))
		};
		let tls = match self.settings.tls {
			EmailTls::Tls => Tls::Wrapper(tls_params()?),
			EmailTls::StartTls => Tls::Opportunistic(tls_params()?),
			EmailTls::None => Tls::None,
		};

		let mut builder = SmtpTransport::builder_dangerous(host)
			.port(self.settings.port)
			.timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
			.tls(tls);
		if let (Some(user), Some(password)) = (&self.settings.user, &self.settings.password) {
			builder = builder.credentials(Credentials::new(user.to_string(), password.to_string()));
		}
		Ok(builder.build())
	}

	/// Sends one message. Without a configured host the message is only logged.
	pub fn send(&self, message: EmailMessage) -> ClResult<()> {
		let Some(host) = self.settings.host.as_deref() else {
			info!("Email disabled, skipping '{}' to {}", message.subject, message.to);
			return Ok(());
		};

		let to = message.to.clone();
		let email = self.build_message(message)?;
		debug!("Sending email to {} via {}:{}", to, host, self.settings.port);

		match self.transport(host)?.send(&email) {
			Ok(response) => {
				info!("Email sent to {} (code: {})", to, response.code());
				Ok(())
			}
			Err(e) => {
				warn!("Failed to send email to {}: {}", to, e);
				Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", e)))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn message(to: &str) -> EmailMessage {
		EmailMessage {
			to: to.to_string(),
			subject: "Test".to_string(),
			text_body: "Hola".to_string(),
			html_body: Some("<p>Hola</p>".to_string()),
		}
	}

	#[test]
	fn test_unconfigured_sender_skips() {
		let sender = EmailSender::new(EmailSettings::default());
		assert!(!sender.is_configured());
		assert!(sender.send(message("ana@campus.test")).is_ok());
	}

	#[test]
	fn test_build_message_validates_addresses() {
		let sender = EmailSender::new(EmailSettings {
			host: Some("smtp.campus.test".into()),
			port: 587,
			from: Some("noreply@campus.test".into()),
			..EmailSettings::default()
		});
		assert!(sender.build_message(message("ana@campus.test")).is_ok());
		assert!(matches!(
			sender.build_message(message("not-an-address")),
			Err(Error::ValidationError(_))
		));
	}

	#[test]
	fn test_build_message_requires_from() {
		let sender = EmailSender::new(EmailSettings {
			host: Some("smtp.campus.test".into()),
			..EmailSettings::default()
		});
		assert!(matches!(sender.build_message(message("ana@campus.test")), Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
