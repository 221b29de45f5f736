//! CLA signing-status service.
//!
//! ```text
//! SigningService (trait)
//!     |
//!     +-- HttpSigningService  GET <check_url>?email=<email>
//!     |
//!     +-- MockSigningService  (for testing)
//! ```

use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpSigningService;
pub use mock::MockSigningService;

/// Signing-status query failure.
///
/// Any of these aborts the reconciliation pass.
#[derive(Debug, Error)]
pub enum SignatureQueryError {
    /// The request could not be sent or the body could not be read.
    #[error("signing service transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("signing service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response body is not the expected JSON document.
    #[error("signing service response could not be parsed: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SignatureQueryError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for SignatureQueryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

/// Answers whether an email has signed the CLA.
pub trait SigningService: Send + Sync {
    /// Queries the signing status of `email` at `check_url`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an
    /// unparsable body.
    fn is_signed(&self, check_url: &str, email: &str) -> Result<bool, SignatureQueryError>;
}
