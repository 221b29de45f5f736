//! Bot comment bodies.

use crate::config::RepoConfig;
use crate::forge::Commit;

/// Title that starts every guidance comment.
pub const GUIDANCE_TITLE: &str = "Thanks for your pull request.\n\nThe authors of the following commits have not signed the Contributor License Agreement (CLA):";

/// Title of guidance comments posted by earlier bot versions.
pub const LEGACY_GUIDANCE_TITLE: &str = "Thanks for your pull request. Before we can look at your pull request, you'll need to sign a Contributor License Agreement (CLA).";

/// Characters of the commit SHA shown in the guidance list.
pub const SHORT_SHA_LEN: usize = 8;

/// Whether `body` is a guidance comment, current or legacy.
#[must_use]
pub fn is_guidance_comment(body: &str) -> bool {
    body.starts_with(GUIDANCE_TITLE) || body.starts_with(LEGACY_GUIDANCE_TITLE)
}

fn short_sha(sha: &str) -> &str {
    sha.char_indices()
        .nth(SHORT_SHA_LEN)
        .map_or(sha, |(end, _)| &sha[..end])
}

/// One `**<sha>** | <message>` line per commit, in order.
#[must_use]
pub fn unsigned_commit_list(unsigned: &[Commit]) -> String {
    unsigned
        .iter()
        .map(|commit| format!("**{}** | {}", short_sha(&commit.sha), commit.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the guidance comment listing `unsigned`.
#[must_use]
pub fn guidance_comment(unsigned: &[Commit], config: &RepoConfig) -> String {
    format!(
        "{GUIDANCE_TITLE}\n\n{}\n\nPlease check the [**FAQs**]({}) first.\nYou can click [**here**]({}) to sign the CLA. After signing the CLA, you must comment \"/check-cla\" to check the CLA status again.",
        unsigned_commit_list(unsigned),
        config.faq_url,
        config.sign_url,
    )
}

/// Builds the comment thanking `author` once every commit is signed.
#[must_use]
pub fn signed_comment(author: &str) -> String {
    format!(
        "***@{author}***, thanks for your pull request. All authors of the commits have signed the CLA. :wave: "
    )
}
