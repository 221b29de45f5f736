//! In-memory forge for tests.
//!
//! [`MockForge`] keeps label and comment state for a single pull request,
//! records every call in order and can be told to fail individual
//! operations.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::{Comment, Commit, PrRef};
use super::{ForgeError, PullRequestForge};

/// A recorded forge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgeCall {
    /// `list_commits`
    ListCommits,
    /// `list_comments`
    ListComments,
    /// `add_label`
    AddLabel(String),
    /// `remove_label`
    RemoveLabel(String),
    /// `create_comment`
    CreateComment(String),
    /// `delete_comment`
    DeleteComment(u64),
}

impl ForgeCall {
    /// Returns whether this call mutates labels.
    #[must_use]
    pub const fn is_label_mutation(&self) -> bool {
        matches!(self, Self::AddLabel(_) | Self::RemoveLabel(_))
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Failures {
    list_commits: bool,
    list_comments: bool,
    labels: bool,
    create_comment: bool,
    delete_comment: bool,
}

/// In-memory [`PullRequestForge`] for one pull request.
#[derive(Debug, Default)]
pub struct MockForge {
    commits: Mutex<Vec<Commit>>,
    labels: Mutex<BTreeSet<String>>,
    comments: Mutex<Vec<Comment>>,
    calls: Mutex<Vec<ForgeCall>>,
    next_comment_id: AtomicU64,
    failures: Mutex<Failures>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(operation: &str) -> ForgeError {
    ForgeError::Api {
        status: 500,
        message: format!("injected {operation} failure"),
    }
}

impl MockForge {
    /// Creates a forge serving the given commits.
    #[must_use]
    pub fn with_commits(commits: Vec<Commit>) -> Self {
        let forge = Self::default();
        *lock(&forge.commits) = commits;
        forge.next_comment_id.store(1, Ordering::SeqCst);
        forge
    }

    /// Replaces the commit listing.
    pub fn set_commits(&self, commits: Vec<Commit>) {
        *lock(&self.commits) = commits;
    }

    /// Seeds the label set.
    #[must_use]
    pub fn with_labels<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.labels).extend(labels.into_iter().map(Into::into));
        self
    }

    /// Seeds an existing comment and returns its id.
    pub fn seed_comment(&self, body: impl Into<String>) -> u64 {
        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.comments).push(Comment {
            id,
            body: body.into(),
        });
        id
    }

    /// Makes `list_commits` fail.
    #[must_use]
    pub fn failing_list_commits(self) -> Self {
        lock(&self.failures).list_commits = true;
        self
    }

    /// Makes `list_comments` fail.
    #[must_use]
    pub fn failing_list_comments(self) -> Self {
        lock(&self.failures).list_comments = true;
        self
    }

    /// Makes `add_label` and `remove_label` fail.
    #[must_use]
    pub fn failing_labels(self) -> Self {
        lock(&self.failures).labels = true;
        self
    }

    /// Makes `create_comment` fail.
    #[must_use]
    pub fn failing_create_comment(self) -> Self {
        lock(&self.failures).create_comment = true;
        self
    }

    /// Makes `delete_comment` fail.
    #[must_use]
    pub fn failing_delete_comment(self) -> Self {
        lock(&self.failures).delete_comment = true;
        self
    }

    /// Returns the current label set.
    #[must_use]
    pub fn labels(&self) -> BTreeSet<String> {
        lock(&self.labels).clone()
    }

    /// Returns the current comments.
    #[must_use]
    pub fn comments(&self) -> Vec<Comment> {
        lock(&self.comments).clone()
    }

    /// Returns every recorded call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ForgeCall> {
        lock(&self.calls).clone()
    }

    /// Returns the recorded calls that mutate labels.
    #[must_use]
    pub fn label_mutations(&self) -> Vec<ForgeCall> {
        self.calls()
            .into_iter()
            .filter(ForgeCall::is_label_mutation)
            .collect()
    }

    /// Returns the bodies of comments created through the forge.
    #[must_use]
    pub fn created_comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ForgeCall::CreateComment(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Clears the call log, keeping label and comment state.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: ForgeCall) {
        lock(&self.calls).push(call);
    }

    fn failures(&self) -> Failures {
        *lock(&self.failures)
    }
}

impl PullRequestForge for MockForge {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn list_commits(&self, _pr: &PrRef) -> Result<Vec<Commit>, ForgeError> {
        self.record(ForgeCall::ListCommits);
        if self.failures().list_commits {
            return Err(injected("list_commits"));
        }
        Ok(lock(&self.commits).clone())
    }

    fn list_comments(&self, _pr: &PrRef) -> Result<Vec<Comment>, ForgeError> {
        self.record(ForgeCall::ListComments);
        if self.failures().list_comments {
            return Err(injected("list_comments"));
        }
        Ok(self.comments())
    }

    fn add_label(&self, _pr: &PrRef, label: &str) -> Result<(), ForgeError> {
        self.record(ForgeCall::AddLabel(label.to_string()));
        if self.failures().labels {
            return Err(injected("add_label"));
        }
        lock(&self.labels).insert(label.to_string());
        Ok(())
    }

    fn remove_label(&self, _pr: &PrRef, label: &str) -> Result<(), ForgeError> {
        self.record(ForgeCall::RemoveLabel(label.to_string()));
        if self.failures().labels {
            return Err(injected("remove_label"));
        }
        if lock(&self.labels).remove(label) {
            Ok(())
        } else {
            Err(ForgeError::Api {
                status: 404,
                message: format!("label {label} not found"),
            })
        }
    }

    fn create_comment(&self, _pr: &PrRef, body: &str) -> Result<(), ForgeError> {
        self.record(ForgeCall::CreateComment(body.to_string()));
        if self.failures().create_comment {
            return Err(injected("create_comment"));
        }
        self.seed_comment(body);
        Ok(())
    }

    fn delete_comment(&self, _org: &str, _repo: &str, comment_id: u64) -> Result<(), ForgeError> {
        self.record(ForgeCall::DeleteComment(comment_id));
        if self.failures().delete_comment {
            return Err(injected("delete_comment"));
        }
        let mut comments = lock(&self.comments);
        let before = comments.len();
        comments.retain(|comment| comment.id != comment_id);
        if comments.len() == before {
            return Err(ForgeError::Api {
                status: 404,
                message: format!("comment {comment_id} not found"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::Identity;

    fn pr() -> PrRef {
        PrRef::new("org", "repo", 1)
    }

    #[test]
    fn test_records_calls_in_order() {
        let forge = MockForge::with_commits(vec![Commit::authored(
            "abc",
            "msg",
            Identity::new("a@example.com", "A"),
        )]);

        assert_eq!(forge.list_commits(&pr()).unwrap().len(), 1);
        forge.add_label(&pr(), "cla/yes").unwrap();
        forge.create_comment(&pr(), "hello").unwrap();

        assert_eq!(
            forge.calls(),
            vec![
                ForgeCall::ListCommits,
                ForgeCall::AddLabel("cla/yes".to_string()),
                ForgeCall::CreateComment("hello".to_string()),
            ]
        );
        assert!(forge.labels().contains("cla/yes"));
        assert_eq!(forge.comments().len(), 1);
    }

    #[test]
    fn test_delete_comment_removes_state() {
        let forge = MockForge::with_commits(vec![]);
        let id = forge.seed_comment("old");

        forge.delete_comment("org", "repo", id).unwrap();
        assert!(forge.comments().is_empty());
        assert!(forge.delete_comment("org", "repo", id).is_err());
    }

    #[test]
    fn test_injected_failures_leave_state_untouched() {
        let forge = MockForge::with_commits(vec![])
            .with_labels(["cla/no"])
            .failing_labels();

        assert!(forge.add_label(&pr(), "cla/yes").is_err());
        assert!(forge.remove_label(&pr(), "cla/no").is_err());
        assert_eq!(forge.labels(), BTreeSet::from(["cla/no".to_string()]));
        assert_eq!(forge.label_mutations().len(), 2);
    }
}
