//! Core infrastructure for the Campus platform.
//!
//! Shared by the feature crates (auth, course, room, admin) and the server
//! crate: application state, request extractors, authentication middleware,
//! role checks and environment based settings.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extensions;
pub mod extract;
pub mod middleware;
pub mod prelude;
pub mod roles;
pub mod settings;

// Re-export commonly used types
pub use app::{App, AppState, VERSION};
pub use extract::{Auth, OptionalAuth, OptionalRequestId};
pub use settings::Settings;

// vim: ts=4
