//! App builder - constructs and runs the Campus application

use std::sync::Arc;

use campus_ai::{AiService, GeminiClient, TextGenerator};
use campus_core::extensions::Extensions;
pub use campus_core::app::{App, AppState, VERSION};
use campus_core::settings::Settings;
use campus_types::auth_adapter::AuthAdapter;
use campus_types::meta_adapter::MetaAdapter;
use campus_types::worker;

use crate::prelude::*;
use crate::{routes, webserver};

pub struct AppBuilder {
	settings: Option<Settings>,
	worker: Option<Arc<worker::WorkerPool>>,
	auth_adapter: Option<Arc<dyn AuthAdapter>>,
	meta_adapter: Option<Arc<dyn MetaAdapter>>,
	text_generator: Option<Arc<dyn TextGenerator>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A second builder in the same process keeps the first subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			settings: None,
			worker: None,
			auth_adapter: None,
			meta_adapter: None,
			text_generator: None,
		}
	}

	pub fn settings(&mut self, settings: Settings) -> &mut Self {
		self.settings = Some(settings);
		self
	}
	pub fn worker(&mut self, worker: Arc<worker::WorkerPool>) -> &mut Self {
		self.worker = Some(worker);
		self
	}

	// Adapters
	pub fn auth_adapter(&mut self, auth_adapter: Arc<dyn AuthAdapter>) -> &mut Self {
		self.auth_adapter = Some(auth_adapter);
		self
	}
	pub fn meta_adapter(&mut self, meta_adapter: Arc<dyn MetaAdapter>) -> &mut Self {
		self.meta_adapter = Some(meta_adapter);
		self
	}
	/// Replaces the Gemini client, e.g. with a canned generator in tests
	pub fn text_generator(&mut self, text_generator: Arc<dyn TextGenerator>) -> &mut Self {
		self.text_generator = Some(text_generator);
		self
	}

	/// Assembles the application state without starting the server
	pub fn build(self) -> ClResult<App> {
		let settings = match self.settings {
			Some(settings) => settings,
			None => Settings::from_env()?,
		};
		let Some(worker) = self.worker else {
			error!("FATAL: No worker pool defined");
			return Err(Error::Internal("No worker pool defined".to_string()));
		};
		let Some(auth_adapter) = self.auth_adapter else {
			error!("FATAL: No auth adapter configured");
			return Err(Error::Internal("No auth adapter configured".to_string()));
		};
		let Some(meta_adapter) = self.meta_adapter else {
			error!("FATAL: No meta adapter configured");
			return Err(Error::Internal("No meta adapter configured".to_string()));
		};

		let text_generator: Arc<dyn TextGenerator> = match self.text_generator {
			Some(generator) => generator,
			None => Arc::new(GeminiClient::new(settings.google_api_key.as_deref(), &settings.ai_model)?),
		};
		info!("AI text generator: {:?}", text_generator);

		// Build extensions map for feature-specific state
		let mut extensions = Extensions::new();
		extensions.insert(AiService::new(text_generator));
		extensions.insert(campus_email::init(&settings)?);

		Ok(Arc::new(AppState { worker, settings, auth_adapter, meta_adapter, extensions }))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("  ___ __ _ _ __ ___  _ __  _   _ ___");
		info!(" / __/ _` | '_ ` _ \\| '_ \\| | | / __|");
		info!("| (_| (_| | | | | | | |_) | |_| \\__ \\");
		info!(" \\___\\__,_|_| |_| |_| .__/ \\__,_|___/");
		info!("                    |_|");
		info!("V{}", VERSION);
		info!("");

		let app = self.build()?;
		debug!("{:?}", app);
		let router = routes::init(app.clone());

		webserver::serve(app, router).await
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
