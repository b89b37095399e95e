//! Provider types and traits

use super::request::FetchRequest;
use std::fmt;
use std::future::Future;

/// Errors that can occur while fetching an image.
///
/// Acquisition treats every variant the same way: the record is marked
/// failed and the batch moves on.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, DNS, timeout or body read failure
    Transport(String),
    /// The service answered with a non-success status code
    Status(u16),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "Transport error: {}", msg),
            FetchError::Status(code) => write!(f, "HTTP status {}", code),
        }
    }
}

impl std::error::Error for FetchError {}

/// Async trait for imagery providers.
///
/// One call issues at most one outbound request; implementations never retry.
pub trait AsyncProvider: Send + Sync {
    /// Fetches the raw image payload described by `request`.
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;
}
