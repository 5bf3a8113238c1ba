//! Error handling for the backend.

pub mod error_code;

pub use error_code::ErrorCode;
