//! Authentication and user management
//!
//! Registration with email verification, token issuance, user and role
//! administration. Credentials and tokens live in the auth adapter, the
//! profile and subscription rows in the meta adapter.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod role;
pub mod user;

mod prelude;

// vim: ts=4
