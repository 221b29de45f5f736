//! Provider-agnostic forge data shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one pull request on a forge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrRef {
    /// Organization or owner login.
    pub org: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
}

impl PrRef {
    /// Creates a pull request reference.
    #[must_use]
    pub fn new(org: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.org, self.repo, self.number)
    }
}

/// A git identity attached to a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity email.
    #[serde(default)]
    pub email: String,
    /// Identity display name.
    #[serde(default)]
    pub name: String,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// A commit on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit SHA.
    pub sha: String,
    /// Commit message.
    pub message: String,
    /// Git author, when the forge reports one.
    pub author: Option<Identity>,
    /// Git committer, when the forge reports one.
    pub committer: Option<Identity>,
}

impl Commit {
    /// Creates a commit with the same author and committer.
    #[must_use]
    pub fn authored(sha: impl Into<String>, message: impl Into<String>, author: Identity) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            committer: Some(author.clone()),
            author: Some(author),
        }
    }
}

/// An issue/PR comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: u64,
    /// Comment body.
    pub body: String,
}
