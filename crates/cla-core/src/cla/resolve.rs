//! Resolves which commits lack a signed CLA.

use std::collections::HashMap;

use tracing::debug;

use super::ClaError;
use super::classify::{is_valid_email, resolve_identity};
use crate::config::RepoConfig;
use crate::forge::Commit;
use crate::signing::SigningService;

/// Signature verdicts for one reconciliation pass, keyed by email.
///
/// Created per pass and dropped with it.
#[derive(Debug, Default)]
pub struct SignatureCache {
    verdicts: HashMap<String, bool>,
}

impl SignatureCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the verdict for `email`, querying `signing` on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the query failure. Nothing is cached for a failed email.
    pub fn is_signed(
        &mut self,
        signing: &dyn SigningService,
        check_url: &str,
        email: &str,
    ) -> Result<bool, ClaError> {
        if let Some(&signed) = self.verdicts.get(email) {
            return Ok(signed);
        }
        let signed = signing.is_signed(check_url, email)?;
        self.verdicts.insert(email.to_string(), signed);
        Ok(signed)
    }

    /// Number of distinct emails queried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// Whether no email has been queried yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Returns the commits whose resolved email has not signed, in input order.
///
/// # Errors
///
/// Returns [`ClaError::NoCommits`] for an empty listing and
/// [`ClaError::SignatureQuery`] if any signing-status query fails.
pub fn resolve_unsigned(
    commits: &[Commit],
    config: &RepoConfig,
    signing: &dyn SigningService,
) -> Result<Vec<Commit>, ClaError> {
    if commits.is_empty() {
        return Err(ClaError::NoCommits);
    }

    let lite = &config.lite_pr_committer;
    let mut cache = SignatureCache::new();
    let mut unsigned = Vec::new();

    for commit in commits {
        let email = resolve_identity(commit, config.check_by_committer, |email, name| {
            lite.is_lite_pr(email, name)
        });

        let signed = if is_valid_email(&email) {
            cache.is_signed(signing, &config.check_url, &email)?
        } else {
            debug!(sha = %commit.sha, "commit has no valid email");
            false
        };

        if !signed {
            unsigned.push(commit.clone());
        }
    }

    debug!(email_count = cache.len(), unsigned = unsigned.len(), "resolved signatures");
    Ok(unsigned)
}
