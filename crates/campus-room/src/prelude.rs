pub use campus_core::prelude::*;

// vim: ts=4
