//! GitHub REST implementation of [`PullRequestForge`].
//!
//! Uses the blocking `reqwest` client. Callers running inside an async
//! runtime must invoke it from a blocking context (`spawn_blocking`).

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::types::{Comment, Commit, Identity, PrRef};
use super::{ForgeError, PullRequestForge};

const USER_AGENT: &str = "cla-core/github-forge";
const API_VERSION: &str = "2022-11-28";

/// Page size requested from list endpoints.
pub const PER_PAGE: usize = 100;

/// Upper bound on pages fetched when listing pull request commits.
///
/// GitHub itself stops listing pull request commits at 250. Comment listings
/// are not capped.
pub const MAX_COMMIT_PAGES: u32 = 10;

/// Pull request adapter for the GitHub REST v3 API.
pub struct GitHubForge {
    api_base_url: Url,
    token: SecretString,
    http_client: Client,
}

impl GitHubForge {
    /// Creates a forge client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL or token is invalid, or the HTTP
    /// client cannot be initialized.
    pub fn new(api_base_url: &str, token: SecretString) -> Result<Self, ForgeError> {
        let api_base_url = Url::parse(api_base_url)
            .map_err(|e| ForgeError::Configuration(format!("invalid api base url: {e}")))?;
        if api_base_url.cannot_be_a_base() {
            return Err(ForgeError::Configuration(
                "api base url cannot carry a path".to_string(),
            ));
        }
        if token.expose_secret().trim().is_empty() {
            return Err(ForgeError::Configuration(
                "GitHub token must not be empty".to_string(),
            ));
        }

        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            api_base_url,
            token,
            http_client,
        })
    }

    /// Builds an API URL from path segments, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ForgeError> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ForgeError::Configuration("api base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn issue_endpoint(&self, pr: &PrRef, tail: &[&str]) -> Result<Url, ForgeError> {
        let number = pr.number.to_string();
        let mut segments = vec!["repos", pr.org.as_str(), pr.repo.as_str(), "issues", number.as_str()];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(self.token.expose_secret())
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        let response = self.authorized(request).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .unwrap_or_else(|_| "unable to read response body".to_string());
        Err(ForgeError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetches pages of a list endpoint until a short page.
    ///
    /// With `max_pages` set, stops after that many full pages and logs a
    /// warning, since later items were not listed.
    fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &Url,
        max_pages: Option<u32>,
    ) -> Result<Vec<T>, ForgeError> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_param = page.to_string();
            let response = self.send(
                self.http_client
                    .get(url.clone())
                    .query(&[("per_page", per_page.as_str()), ("page", page_param.as_str())]),
            )?;
            let text = response.text()?;
            let batch: Vec<T> = serde_json::from_str(&text)?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                return Ok(items);
            }
            if max_pages.is_some_and(|max| page >= max) {
                warn!(
                    url = %url,
                    pages = page,
                    items = items.len(),
                    "listing truncated at page limit"
                );
                return Ok(items);
            }
            page += 1;
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireIdentity {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<WireIdentity> for Identity {
    fn from(value: WireIdentity) -> Self {
        Self {
            email: value.email.unwrap_or_default(),
            name: value.name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCommitDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    author: Option<WireIdentity>,
    #[serde(default)]
    committer: Option<WireIdentity>,
}

#[derive(Debug, Deserialize)]
struct WireCommit {
    sha: String,
    #[serde(default)]
    commit: Option<WireCommitDetail>,
}

impl From<WireCommit> for Commit {
    fn from(value: WireCommit) -> Self {
        let detail = value.commit;
        let (message, author, committer) = match detail {
            Some(detail) => (
                detail.message.unwrap_or_default(),
                detail.author.map(Identity::from),
                detail.committer.map(Identity::from),
            ),
            None => (String::new(), None, None),
        };

        Self {
            sha: value.sha,
            message,
            author,
            committer,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
}

impl From<WireComment> for Comment {
    fn from(value: WireComment) -> Self {
        Self {
            id: value.id,
            body: value.body.unwrap_or_default(),
        }
    }
}

impl PullRequestForge for GitHubForge {
    fn provider_name(&self) -> &'static str {
        "github"
    }

    fn list_commits(&self, pr: &PrRef) -> Result<Vec<Commit>, ForgeError> {
        let number = pr.number.to_string();
        let url = self.endpoint(&[
            "repos",
            pr.org.as_str(),
            pr.repo.as_str(),
            "pulls",
            number.as_str(),
            "commits",
        ])?;
        let commits: Vec<WireCommit> = self.get_paginated(&url, Some(MAX_COMMIT_PAGES))?;
        Ok(commits.into_iter().map(Commit::from).collect())
    }

    fn list_comments(&self, pr: &PrRef) -> Result<Vec<Comment>, ForgeError> {
        let url = self.issue_endpoint(pr, &["comments"])?;
        let comments: Vec<WireComment> = self.get_paginated(&url, None)?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    fn add_label(&self, pr: &PrRef, label: &str) -> Result<(), ForgeError> {
        let url = self.issue_endpoint(pr, &["labels"])?;
        let payload = serde_json::json!({ "labels": [label] });
        self.send(self.http_client.post(url).json(&payload))?;
        Ok(())
    }

    fn remove_label(&self, pr: &PrRef, label: &str) -> Result<(), ForgeError> {
        let url = self.issue_endpoint(pr, &["labels", label])?;
        self.send(self.http_client.delete(url))?;
        Ok(())
    }

    fn create_comment(&self, pr: &PrRef, body: &str) -> Result<(), ForgeError> {
        let url = self.issue_endpoint(pr, &["comments"])?;
        let payload = serde_json::json!({ "body": body });
        self.send(self.http_client.post(url).json(&payload))?;
        Ok(())
    }

    fn delete_comment(&self, org: &str, repo: &str, comment_id: u64) -> Result<(), ForgeError> {
        let id = comment_id.to_string();
        let url = self.endpoint(&["repos", org, repo, "issues", "comments", id.as_str()])?;
        self.send(self.http_client.delete(url))?;
        Ok(())
    }
}
