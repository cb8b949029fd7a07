//! Campus is a learning management backend.
//!
//! # Features
//!
//! - Course catalog with categories, levels and learning paths
//! - AI generated curricula, lessons, quizzes and recommendations
//! - Quizzes with scoring, attempt limits and star rewards
//! - Rooms for cohorts, scheduled events with invitations, notifications
//! - Student, instructor and admin dashboards

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from campus-types
pub use campus_types::auth_adapter;
pub use campus_types::error;
pub use campus_types::meta_adapter;
pub use campus_types::types;
pub use campus_types::worker;

// Feature crate re-exports
pub use campus_admin as admin;
pub use campus_ai as ai;
pub use campus_auth as auth;
pub use campus_core::settings;
pub use campus_course as course;
pub use campus_email as email;
pub use campus_room as room;

pub mod app;
pub mod prelude;
pub mod routes;
pub mod webserver;

pub use app::AppBuilder;

// vim: ts=4
