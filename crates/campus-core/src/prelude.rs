pub use crate::app::App;
pub use crate::extract::{Auth, OptionalAuth, OptionalRequestId};
pub use campus_types::error::{ClResult, Error};
pub use campus_types::types::{ApiResponse, Patch, Timestamp, UserId};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
