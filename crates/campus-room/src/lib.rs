//! Rooms (cohorts of students around a set of courses), scheduled events
//! with invitations, and the per-user notification inbox.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod event;
pub mod notification;
pub mod room;

mod prelude;

// vim: ts=4
