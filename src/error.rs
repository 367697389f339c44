//! Shared error-code contract.
//!
//! Every error enum that can reach the user implements [`ErrorCode`] so the
//! CLI (and any other front end) can print a grepable code next to the
//! human-readable message and decide whether offering a retry makes sense.

/// Grepable error code and retryable flag for user-facing errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
