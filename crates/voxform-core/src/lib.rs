//! Shared building blocks for the voxform crates

mod error;

pub use error::{ErrorBody, HttpError, error_response};
