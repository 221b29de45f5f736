//! In-memory signing service for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use super::{SignatureQueryError, SigningService};

/// Answers from a fixed set of signed emails and counts every query.
#[derive(Debug, Default)]
pub struct MockSigningService {
    signed: BTreeSet<String>,
    failing: BTreeSet<String>,
    queries: Mutex<BTreeMap<String, usize>>,
}

impl MockSigningService {
    /// Creates a service where nobody has signed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service where the given emails have signed.
    #[must_use]
    pub fn with_signed<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            signed: emails.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Makes queries for `email` fail with a 503.
    #[must_use]
    pub fn failing_for(mut self, email: impl Into<String>) -> Self {
        self.failing.insert(email.into());
        self
    }

    /// Number of queries made for `email`.
    #[must_use]
    pub fn query_count(&self, email: &str) -> usize {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of queries made.
    #[must_use]
    pub fn total_queries(&self) -> usize {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl SigningService for MockSigningService {
    fn is_signed(&self, _check_url: &str, email: &str) -> Result<bool, SignatureQueryError> {
        *self
            .queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(email.to_string())
            .or_insert(0) += 1;

        if self.failing.contains(email) {
            return Err(SignatureQueryError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(self.signed.contains(email))
    }
}
