//! Picks the email whose CLA status decides a commit.

use std::sync::LazyLock;

use regex::Regex;

use crate::forge::Commit;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Returns the trimmed email that decides `commit`.
///
/// With `check_by_committer` the committer is authoritative unless
/// `is_lite_pr(email, name)` flags it as a platform committer, in which case
/// the author is used. Returns an empty string if no identity applies.
pub fn resolve_identity<P>(commit: &Commit, check_by_committer: bool, is_lite_pr: P) -> String
where
    P: Fn(&str, &str) -> bool,
{
    let authoritative_committer = commit
        .committer
        .as_ref()
        .filter(|committer| check_by_committer && !is_lite_pr(&committer.email, &committer.name));
    if let Some(committer) = authoritative_committer {
        return committer.email.trim().to_string();
    }

    commit
        .author
        .as_ref()
        .map(|author| author.email.trim().to_string())
        .unwrap_or_default()
}

/// Syntactic email check. No lookup is performed.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}
