//! Label and comment reconciliation.
//!
//! [`plan`] turns a verdict and the current labels into an ordered list of
//! [`Mutation`]s without touching the forge. [`apply`] executes that list.
//! Mutation failures are logged and never stop later mutations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::guide::{guidance_comment, is_guidance_comment, signed_comment};
use crate::config::RepoConfig;
use crate::forge::{Commit, PrRef, PullRequestForge};

/// The CLA state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every commit is covered by a signed CLA.
    Signed,
    /// At least one commit is not.
    Unsigned,
}

impl Verdict {
    /// Derives the verdict from the unsigned commits.
    #[must_use]
    pub const fn from_unsigned(unsigned: &[Commit]) -> Self {
        if unsigned.is_empty() {
            Self::Signed
        } else {
            Self::Unsigned
        }
    }

    /// Returns the verdict name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
        }
    }
}

/// One forge-side change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mutation", rename_all = "snake_case")]
pub enum Mutation {
    /// Delete every current or legacy guidance comment.
    PurgeGuidanceComments,
    /// Remove a label.
    RemoveLabel {
        /// Label name.
        label: String,
    },
    /// Add a label.
    AddLabel {
        /// Label name.
        label: String,
    },
    /// Post a comment.
    CreateComment {
        /// Comment body.
        body: String,
    },
}

/// Computes the mutations that bring the pull request in line with the
/// verdict.
///
/// Guidance comments are always purged first. Label changes are emitted only
/// when the current labels disagree with the verdict.
#[must_use]
pub fn plan(
    unsigned: &[Commit],
    labels: &BTreeSet<String>,
    explicitly_triggered: bool,
    author: &str,
    config: &RepoConfig,
) -> Vec<Mutation> {
    let mut mutations = vec![Mutation::PurgeGuidanceComments];

    let (wanted, unwanted) = match Verdict::from_unsigned(unsigned) {
        Verdict::Signed => (&config.cla_label_yes, &config.cla_label_no),
        Verdict::Unsigned => (&config.cla_label_no, &config.cla_label_yes),
    };

    if labels.contains(unwanted) {
        mutations.push(Mutation::RemoveLabel {
            label: unwanted.clone(),
        });
    }

    let adding = !labels.contains(wanted);
    if adding {
        mutations.push(Mutation::AddLabel {
            label: wanted.clone(),
        });
    }

    if unsigned.is_empty() {
        if adding && explicitly_triggered {
            mutations.push(Mutation::CreateComment {
                body: signed_comment(author),
            });
        }
    } else {
        mutations.push(Mutation::CreateComment {
            body: guidance_comment(unsigned, config),
        });
    }

    mutations
}

/// The label set that results from applying `mutations` without failures.
#[must_use]
pub fn labels_after(labels: &BTreeSet<String>, mutations: &[Mutation]) -> BTreeSet<String> {
    let mut result = labels.clone();
    for mutation in mutations {
        match mutation {
            Mutation::RemoveLabel { label } => {
                result.remove(label);
            },
            Mutation::AddLabel { label } => {
                result.insert(label.clone());
            },
            Mutation::PurgeGuidanceComments | Mutation::CreateComment { .. } => {},
        }
    }
    result
}

/// Outcome of [`apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Mutations that completed.
    pub applied: usize,
    /// Mutations that failed and were logged.
    pub failed: usize,
    /// Guidance comments deleted by the purge.
    pub purged_comments: usize,
}

/// Executes `mutations` in order against `forge`.
///
/// A purge counts as failed when listing comments fails or any deletion
/// fails.
pub fn apply(forge: &dyn PullRequestForge, pr: &PrRef, mutations: &[Mutation]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for mutation in mutations {
        let ok = match mutation {
            Mutation::PurgeGuidanceComments => purge_guidance_comments(forge, pr, &mut report),
            Mutation::RemoveLabel { label } => match forge.remove_label(pr, label) {
                Ok(()) => true,
                Err(e) => {
                    warn!(org = %pr.org, repo = %pr.repo, pr = pr.number, label = %label, error = %e, "failed to remove label");
                    false
                },
            },
            Mutation::AddLabel { label } => match forge.add_label(pr, label) {
                Ok(()) => true,
                Err(e) => {
                    warn!(org = %pr.org, repo = %pr.repo, pr = pr.number, label = %label, error = %e, "failed to add label");
                    false
                },
            },
            Mutation::CreateComment { body } => match forge.create_comment(pr, body) {
                Ok(()) => true,
                Err(e) => {
                    warn!(org = %pr.org, repo = %pr.repo, pr = pr.number, error = %e, "failed to create comment");
                    false
                },
            },
        };

        if ok {
            report.applied += 1;
        } else {
            report.failed += 1;
        }
    }

    report
}

fn purge_guidance_comments(
    forge: &dyn PullRequestForge,
    pr: &PrRef,
    report: &mut ApplyReport,
) -> bool {
    let comments = match forge.list_comments(pr) {
        Ok(comments) => comments,
        Err(e) => {
            warn!(org = %pr.org, repo = %pr.repo, pr = pr.number, error = %e, "failed to list comments");
            return false;
        },
    };

    let mut ok = true;
    for comment in comments.iter().filter(|c| is_guidance_comment(&c.body)) {
        match forge.delete_comment(&pr.org, &pr.repo, comment.id) {
            Ok(()) => {
                debug!(pr = pr.number, comment_id = comment.id, "deleted guidance comment");
                report.purged_comments += 1;
            },
            Err(e) => {
                warn!(org = %pr.org, repo = %pr.repo, pr = pr.number, comment_id = comment.id, error = %e, "failed to delete comment");
                ok = false;
            },
        }
    }
    ok
}
