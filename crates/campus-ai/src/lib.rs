//! Generative AI integration.
//!
//! `gemini` talks to the provider, `service` turns the platform's needs into
//! prompts and parses the answers. Every AI feature degrades to a fallback
//! (placeholder text or an empty list) when the provider is unavailable.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod gemini;
pub mod parse;
pub mod prelude;
pub mod service;

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

pub use gemini::GeminiClient;
pub use service::AiService;

/// Text completion backend
#[async_trait]
pub trait TextGenerator: Debug + Send + Sync {
	/// Returns the model's answer to a single prompt. No retries.
	async fn generate(&self, prompt: &str) -> ClResult<String>;
}

// vim: ts=4
