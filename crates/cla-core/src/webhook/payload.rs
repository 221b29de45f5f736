//! GitHub webhook payloads for `pull_request` and `issue_comment` events.
//!
//! Only the fields the bot reads are modeled:
//!
//! ```json
//! {
//!   "action": "synchronize",
//!   "pull_request": {
//!     "number": 42,
//!     "state": "open",
//!     "user": {"login": "ada"},
//!     "labels": [{"name": "cla/no"}]
//!   },
//!   "repository": {"name": "repo", "owner": {"login": "org"}}
//! }
//! ```
//!
//! `issue_comment` carries an `issue` in place of `pull_request` plus the
//! `comment`. The issue is a pull request when `issue.pull_request` is
//! present.

use std::collections::BTreeSet;

use serde::Deserialize;

/// A GitHub account reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    /// Account login.
    #[serde(default)]
    pub login: String,
}

/// A label attached to an issue or pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
}

/// Repository owner.
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    /// Owner login (organization or user).
    pub login: String,
}

/// The repository an event belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Repository name.
    pub name: String,
    /// Repository owner.
    pub owner: Owner,
}

/// The pull request object on a `pull_request` event.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// `open` or `closed`.
    pub state: String,
    /// Pull request author.
    #[serde(default)]
    pub user: User,
    /// Labels currently attached.
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// `pull_request` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    /// Event action, such as `opened` or `synchronize`.
    pub action: String,
    /// The pull request.
    pub pull_request: PullRequest,
    /// The repository.
    pub repository: Repository,
}

/// Marker present on issues that are pull requests.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuePullRequest {
    /// API URL of the pull request.
    #[serde(default)]
    pub url: Option<String>,
}

/// The issue object on an `issue_comment` event.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    /// Issue or pull request number.
    pub number: u64,
    /// `open` or `closed`.
    pub state: String,
    /// Issue author.
    #[serde(default)]
    pub user: User,
    /// Labels currently attached.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Present when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<IssuePullRequest>,
}

/// A comment on an issue or pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    /// Comment id.
    pub id: u64,
    /// Comment body.
    #[serde(default)]
    pub body: String,
}

/// `issue_comment` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    /// `created`, `edited` or `deleted`.
    pub action: String,
    /// The commented issue.
    pub issue: Issue,
    /// The comment.
    pub comment: IssueComment,
    /// The repository.
    pub repository: Repository,
}

/// A webhook delivery as seen by the bot.
#[derive(Debug, Clone)]
pub enum ClaEvent {
    /// A `pull_request` event.
    PullRequest(PullRequestEvent),
    /// An `issue_comment` event.
    IssueComment(IssueCommentEvent),
    /// Any other event, or a payload that could not be decoded.
    Other {
        /// The `X-GitHub-Event` name.
        event: String,
    },
}

impl ClaEvent {
    /// Decodes a delivery from its event name and raw body.
    ///
    /// Malformed bodies become [`ClaEvent::Other`].
    #[must_use]
    pub fn decode(event: &str, body: &[u8]) -> Self {
        let decoded = match event {
            "pull_request" => serde_json::from_slice(body).map(Self::PullRequest),
            "issue_comment" => serde_json::from_slice(body).map(Self::IssueComment),
            _ => {
                return Self::Other {
                    event: event.to_string(),
                };
            },
        };

        decoded.unwrap_or_else(|e| {
            tracing::debug!(event, error = %e, "undecodable webhook payload");
            Self::Other {
                event: event.to_string(),
            }
        })
    }

    /// Returns the event name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::PullRequest(_) => "pull_request",
            Self::IssueComment(_) => "issue_comment",
            Self::Other { event } => event,
        }
    }
}

/// Collects label names into a set.
#[must_use]
pub fn label_names(labels: &[Label]) -> BTreeSet<String> {
    labels.iter().map(|label| label.name.clone()).collect()
}
