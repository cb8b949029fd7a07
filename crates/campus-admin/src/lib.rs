//! Student, instructor and admin dashboards

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod dashboard;
pub mod stats;

mod prelude;

// vim: ts=4
