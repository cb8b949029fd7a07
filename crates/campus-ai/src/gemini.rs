//! Google Gemini `generateContent` client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::TextGenerator;
use crate::prelude::*;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const USER_AGENT: &str = concat!("campus/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct Part<'a> {
	text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
	parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
	contents: [Content<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
	#[serde(default)]
	text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
	#[serde(default)]
	parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
	content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
	#[serde(default)]
	candidates: Vec<Candidate>,
}

impl GenerateResponse {
	/// Concatenated text parts of the first candidate
	pub(crate) fn text(&self) -> Option<String> {
		let content = self.candidates.first()?.content.as_ref()?;
		let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
		if text.is_empty() { None } else { Some(text) }
	}
}

pub struct GeminiClient {
	http_client: reqwest::Client,
	api_key: Option<Box<str>>,
	model: Box<str>,
	base_url: Box<str>,
}

impl std::fmt::Debug for GeminiClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GeminiClient")
			.field("model", &self.model)
			.field("configured", &self.api_key.is_some())
			.finish_non_exhaustive()
	}
}

impl GeminiClient {
	/// Without an API key every call fails with `ServiceUnavailable`
	pub fn new(api_key: Option<&str>, model: &str) -> ClResult<Self> {
		let http_client = reqwest::Client::builder()
			.user_agent(USER_AGENT)
			.timeout(Duration::from_secs(TIMEOUT_SECS))
			.build()
			.map_err(|e| Error::ConfigError(format!("AI http client: {}", e)))?;

		if api_key.is_none() {
			warn!("GOOGLE_API_KEY not set, AI features will return fallbacks");
		}

		Ok(Self {
			http_client,
			api_key: api_key.map(Into::into),
			model: model.into(),
			base_url: GEMINI_BASE_URL.into(),
		})
	}

	pub fn with_base_url(mut self, base_url: &str) -> Self {
		self.base_url = base_url.trim_end_matches('/').into();
		self
	}
}

#[async_trait]
impl TextGenerator for GeminiClient {
	async fn generate(&self, prompt: &str) -> ClResult<String> {
		let Some(api_key) = &self.api_key else {
			return Err(Error::ServiceUnavailable("AI provider not configured".into()));
		};

		let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
		let body = GenerateRequest { contents: [Content { parts: [Part { text: prompt }] }] };

		debug!(model = %self.model, prompt_len = prompt.len(), "AI generateContent");
		let response = self
			.http_client
			.post(&url)
			.header("x-goog-api-key", api_key.as_ref())
			.json(&body)
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					Error::Timeout
				} else {
					Error::ServiceUnavailable(format!("AI request failed: {}", e))
				}
			})?;

		let status = response.status();
		if !status.is_success() {
			let error_text = response.text().await.unwrap_or_default();
			warn!("AI provider returned {}: {}", status, error_text);
			return Err(Error::ServiceUnavailable(format!("AI provider returned {}", status)));
		}

		let res: GenerateResponse = response.json().await.map_err(|e| {
			warn!("AI response parse error: {}", e);
			Error::Parse
		})?;

		res.text()
			.map(|text| text.trim().to_string())
			.ok_or_else(|| Error::ServiceUnavailable("AI provider returned no candidates".into()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_response_text_joins_parts() {
		let res: GenerateResponse = serde_json::from_str(
			r#"{"candidates":[{"content":{"parts":[{"text":"Hola "},{"text":"mundo"}],"role":"model"}}]}"#,
		)
		.unwrap();
		assert_eq!(res.text().as_deref(), Some("Hola mundo"));
	}

	#[test]
	fn test_response_without_candidates() {
		let res: GenerateResponse =
			serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
		assert_eq!(res.text(), None);
	}

	#[tokio::test]
	async fn test_unconfigured_client_is_unavailable() {
		let client = GeminiClient::new(None, "gemini-1.5-flash").unwrap();
		let res = client.generate("hola").await;
		assert!(matches!(res, Err(Error::ServiceUnavailable(_))));
	}
}

// vim: ts=4
