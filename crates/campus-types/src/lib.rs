//! Shared types, adapter traits, and core utilities for the Campus platform.
//!
//! This crate holds everything the feature crates and the storage adapters
//! have to agree on, so adapters can be built without pulling in axum
//! routing or the feature modules.

pub mod auth_adapter;
pub mod error;
pub mod meta_adapter;
pub mod prelude;
pub mod types;
pub mod utils;
pub mod worker;

// vim: ts=4
