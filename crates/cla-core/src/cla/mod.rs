//! The reconciliation pass.
//!
//! [`ClaBot::handle`] runs one pass for one pull request:
//!
//! 1. look up the repository configuration,
//! 2. list the commits,
//! 3. resolve the unsigned commits ([`resolve`]),
//! 4. plan and apply the label and comment mutations ([`reconcile`]).
//!
//! Steps 1-3 fail the pass before anything is mutated. Failures in step 4
//! are logged and counted in the [`ReconcileOutcome`].

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

pub mod classify;
pub mod guide;
pub mod reconcile;
pub mod resolve;

pub use reconcile::{ApplyReport, Mutation, Verdict};

use crate::config::BotConfiguration;
use crate::forge::{ForgeError, PrRef, PullRequestForge};
use crate::signing::{SignatureQueryError, SigningService};

/// Errors that abort a reconciliation pass.
#[derive(Debug, Error)]
pub enum ClaError {
    /// No configuration entry covers the repository.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The pull request commits could not be listed.
    #[error("failed to list commits: {0}")]
    CommitListing(#[source] ForgeError),

    /// The pull request has no commits.
    #[error("pull request has no commits")]
    NoCommits,

    /// The signing service could not answer.
    #[error(transparent)]
    SignatureQuery(#[from] SignatureQueryError),
}

/// Input to one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    /// The pull request.
    pub pr: PrRef,
    /// Login of the pull request author.
    pub author: String,
    /// Labels currently on the pull request.
    pub labels: BTreeSet<String>,
    /// Whether a `/check-cla` comment started the pass.
    pub explicitly_triggered: bool,
}

/// Result of a completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// The verdict.
    pub verdict: Verdict,
    /// How many commits are unsigned.
    pub unsigned_commits: usize,
    /// The planned mutations, in execution order.
    pub mutations: Vec<Mutation>,
    /// What happened when they were applied.
    pub report: ApplyReport,
}

/// Runs reconciliation passes against a forge and a signing service.
#[derive(Clone)]
pub struct ClaBot {
    forge: Arc<dyn PullRequestForge>,
    signing: Arc<dyn SigningService>,
}

impl ClaBot {
    /// Creates a bot.
    #[must_use]
    pub fn new(forge: Arc<dyn PullRequestForge>, signing: Arc<dyn SigningService>) -> Self {
        Self { forge, signing }
    }

    /// Runs one pass for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error when the repository is not configured, the commits
    /// cannot be listed, there are no commits, or a signature query fails.
    /// No mutation is attempted in any of these cases.
    pub fn handle(
        &self,
        config: &BotConfiguration,
        request: &ReconcileRequest,
    ) -> Result<ReconcileOutcome, ClaError> {
        let pr = &request.pr;
        let repo_config = config.config_for(&pr.org, &pr.repo).ok_or_else(|| {
            ClaError::Configuration(format!("no configuration for {}/{}", pr.org, pr.repo))
        })?;

        let commits = self.forge.list_commits(pr).map_err(ClaError::CommitListing)?;
        let unsigned = resolve::resolve_unsigned(&commits, repo_config, self.signing.as_ref())?;
        let verdict = Verdict::from_unsigned(&unsigned);

        let mutations = reconcile::plan(
            &unsigned,
            &request.labels,
            request.explicitly_triggered,
            &request.author,
            repo_config,
        );
        let report = reconcile::apply(self.forge.as_ref(), pr, &mutations);

        info!(
            org = %pr.org,
            repo = %pr.repo,
            pr = pr.number,
            forge = self.forge.provider_name(),
            verdict = verdict.as_str(),
            commits = commits.len(),
            unsigned = unsigned.len(),
            applied = report.applied,
            failed = report.failed,
            "reconciled pull request"
        );

        Ok(ReconcileOutcome {
            verdict,
            unsigned_commits: unsigned.len(),
            mutations,
            report,
        })
    }
}

impl std::fmt::Debug for ClaBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaBot")
            .field("forge", &self.forge.provider_name())
            .finish_non_exhaustive()
    }
}
