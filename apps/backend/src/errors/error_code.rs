//! Error codes for the backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! Every code is SCREAMING_SNAKE_CASE and maps 1:1 to the string that
//! appears in HTTP responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Path named a service outside the known set
    UnknownService,

    // Resource Not Found
    NotFound,

    // System Errors
    /// No database manager registered for a service
    ServiceUnavailable,
    /// Database error
    DbError,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownService => "UNKNOWN_SERVICE",
            Self::NotFound => "NOT_FOUND",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DbError => "DB_ERROR",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::UnknownService.as_str(), "UNKNOWN_SERVICE");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(
            ErrorCode::ServiceUnavailable.as_str(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(ErrorCode::DbError.as_str(), "DB_ERROR");
        assert_eq!(ErrorCode::Internal.as_str(), "INTERNAL");
        assert_eq!(ErrorCode::ConfigError.as_str(), "CONFIG_ERROR");
    }

    #[test]
    fn test_display_trait() {
        assert_eq!(
            format!("{}", ErrorCode::ServiceUnavailable),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(format!("{}", ErrorCode::UnknownService), "UNKNOWN_SERVICE");
    }
}
