//! Learning catalog: courses, modules, quizzes, enrollments, ratings,
//! categories, learning paths and course suggestions.
//!
//! `domain` holds the pure calculations (stars, quiz scoring, module
//! unlocking), `service` the flows shared with other crates, the remaining
//! modules are request handlers.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod category;
pub mod course;
pub mod domain;
pub mod enrollment;
pub mod learning_path;
pub mod module;
pub mod quiz;
pub mod rating;
pub mod service;
pub mod suggestion;

mod prelude;

// vim: ts=4
