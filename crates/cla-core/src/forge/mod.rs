//! Provider-agnostic forge interfaces.
//!
//! The reconciliation pass talks to the hosting platform only through
//! [`PullRequestForge`]. [`GitHubForge`] is the production implementation;
//! [`MockForge`] records calls for tests.

use thiserror::Error;

pub mod github;
pub mod mock;
pub mod types;

pub use github::GitHubForge;
pub use mock::{ForgeCall, MockForge};
pub use types::{Comment, Commit, Identity, PrRef};

/// Errors emitted by forge providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ForgeError {
    /// Invalid provider configuration.
    #[error("forge configuration error: {0}")]
    Configuration(String),

    /// Request transport failed.
    #[error("forge transport error: {0}")]
    Transport(String),

    /// API request failed with a structured status code.
    #[error("forge API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the forge API.
        status: u16,
        /// Error body/message.
        message: String,
    },

    /// API payload parse failed.
    #[error("forge parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ForgeError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

/// The hosting-platform capabilities a reconciliation pass needs.
///
/// Every operation is scoped by organization, repository and pull request
/// number. Calls are synchronous and are never retried by the caller.
pub trait PullRequestForge: Send + Sync {
    /// Returns the provider name.
    fn provider_name(&self) -> &'static str;

    /// Lists the commits of a pull request in forge order.
    ///
    /// # Errors
    ///
    /// Returns an error when the commits cannot be read.
    fn list_commits(&self, pr: &PrRef) -> Result<Vec<Commit>, ForgeError>;

    /// Lists the comments of a pull request.
    ///
    /// # Errors
    ///
    /// Returns an error when comment retrieval fails.
    fn list_comments(&self, pr: &PrRef) -> Result<Vec<Comment>, ForgeError>;

    /// Adds a label to a pull request.
    ///
    /// # Errors
    ///
    /// Returns an error when the label cannot be added.
    fn add_label(&self, pr: &PrRef, label: &str) -> Result<(), ForgeError>;

    /// Removes a label from a pull request.
    ///
    /// # Errors
    ///
    /// Returns an error when the label cannot be removed.
    fn remove_label(&self, pr: &PrRef, label: &str) -> Result<(), ForgeError>;

    /// Posts a comment to a pull request.
    ///
    /// # Errors
    ///
    /// Returns an error when comment publication fails.
    fn create_comment(&self, pr: &PrRef, body: &str) -> Result<(), ForgeError>;

    /// Deletes a comment by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the comment cannot be deleted.
    fn delete_comment(&self, org: &str, repo: &str, comment_id: u64) -> Result<(), ForgeError>;
}
