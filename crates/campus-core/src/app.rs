//! App state type

use std::sync::Arc;

use crate::extensions::Extensions;
use crate::prelude::*;
use crate::settings::Settings;

use campus_types::auth_adapter::AuthAdapter;
use campus_types::meta_adapter::MetaAdapter;
use campus_types::worker;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub worker: Arc<worker::WorkerPool>,
	pub settings: Settings,

	pub auth_adapter: Arc<dyn AuthAdapter>,
	pub meta_adapter: Arc<dyn MetaAdapter>,

	// Type-erased extension map for feature-specific state (AI client, mailer)
	pub extensions: Extensions,
}

impl AppState {
	/// Get a registered extension by type. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self) -> ClResult<&T> {
		self.extensions.get::<T>().ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", std::any::type_name::<T>()))
		})
	}
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState")
			.field("settings", &self.settings)
			.field("auth_adapter", &self.auth_adapter)
			.field("meta_adapter", &self.meta_adapter)
			.finish_non_exhaustive()
	}
}

pub type App = Arc<AppState>;

// vim: ts=4
