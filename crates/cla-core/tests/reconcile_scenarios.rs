//! End-to-end reconciliation passes against the in-memory forge.
//!
//! ```text
//! ReconcileRequest
//!     |
//!     v
//! ClaBot::handle --> MockForge (labels, comments, call log)
//!     |
//!     +--> MockSigningService (per-email query counts)
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use cla_core::cla::guide::{GUIDANCE_TITLE, LEGACY_GUIDANCE_TITLE, signed_comment};
use cla_core::cla::{ClaBot, ClaError, ReconcileRequest, Verdict};
use cla_core::config::BotConfiguration;
use cla_core::forge::{Commit, ForgeCall, Identity, MockForge, PrRef};
use cla_core::signing::MockSigningService;

const CONFIG: &str = r#"
[[config_items]]
repos = ["org/repo"]
cla_label_yes = "cla/yes"
cla_label_no = "cla/no"
check_url = "https://cla.example.com/check"
sign_url = "https://cla.example.com/sign"
faq_url = "https://cla.example.com/faq"
"#;

fn config() -> BotConfiguration {
    BotConfiguration::from_toml(CONFIG).unwrap()
}

fn request(labels: &[&str], explicitly_triggered: bool) -> ReconcileRequest {
    ReconcileRequest {
        pr: PrRef::new("org", "repo", 17),
        author: "ada".to_string(),
        labels: labels.iter().map(ToString::to_string).collect(),
        explicitly_triggered,
    }
}

fn commit(sha: &str, email: &str, message: &str) -> Commit {
    Commit::authored(sha, message, Identity::new(email, "someone"))
}

fn label_set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(ToString::to_string).collect()
}

struct Harness {
    forge: Arc<MockForge>,
    signing: Arc<MockSigningService>,
    bot: ClaBot,
}

impl Harness {
    fn new(forge: MockForge, signing: MockSigningService) -> Self {
        let forge = Arc::new(forge);
        let signing = Arc::new(signing);
        let bot = ClaBot::new(forge.clone(), signing.clone());
        Self {
            forge,
            signing,
            bot,
        }
    }

    fn current_request(&self, explicitly_triggered: bool) -> ReconcileRequest {
        ReconcileRequest {
            labels: self.forge.labels(),
            ..request(&[], explicitly_triggered)
        }
    }
}

#[test]
fn test_signed_author_swaps_labels_and_deletes_guidance() {
    let forge = MockForge::with_commits(vec![commit("abcdef1234", "a@x.com", "feat")])
        .with_labels(["cla/no"]);
    let stale = forge.seed_comment(format!("{GUIDANCE_TITLE}\n\n**abcdef12** | feat"));
    let h = Harness::new(forge, MockSigningService::with_signed(["a@x.com"]));

    let outcome = h.bot.handle(&config(), &request(&["cla/no"], false)).unwrap();

    assert_eq!(outcome.verdict, Verdict::Signed);
    assert_eq!(
        h.forge.calls(),
        vec![
            ForgeCall::ListCommits,
            ForgeCall::ListComments,
            ForgeCall::DeleteComment(stale),
            ForgeCall::RemoveLabel("cla/no".to_string()),
            ForgeCall::AddLabel("cla/yes".to_string()),
        ]
    );
    assert!(h.forge.created_comments().is_empty());
    assert_eq!(h.forge.labels(), label_set(&["cla/yes"]));
}

#[test]
fn test_missing_email_on_check_command_posts_guidance() {
    let h = Harness::new(
        MockForge::with_commits(vec![commit("1111111111", "", "fix")]),
        MockSigningService::new(),
    );

    let outcome = h.bot.handle(&config(), &request(&[], true)).unwrap();

    assert_eq!(outcome.verdict, Verdict::Unsigned);
    assert_eq!(outcome.unsigned_commits, 1);
    assert_eq!(h.signing.total_queries(), 0);
    assert_eq!(
        h.forge.label_mutations(),
        vec![ForgeCall::AddLabel("cla/no".to_string())]
    );
    let comments = h.forge.created_comments();
    assert_eq!(comments.len(), 1);
    assert!(comments[0].contains("**11111111** | fix"));
}

#[test]
fn test_empty_commit_list_is_fatal_without_mutations() {
    let h = Harness::new(MockForge::with_commits(vec![]), MockSigningService::new());

    let result = h.bot.handle(&config(), &request(&["cla/yes"], true));

    assert!(matches!(result, Err(ClaError::NoCommits)));
    assert_eq!(h.forge.calls(), vec![ForgeCall::ListCommits]);
}

#[test]
fn test_signature_failure_aborts_before_mutations() {
    let h = Harness::new(
        MockForge::with_commits(vec![
            commit("1", "a@x.com", "one"),
            commit("2", "b@x.com", "two"),
        ]),
        MockSigningService::with_signed(["a@x.com"]).failing_for("b@x.com"),
    );

    let result = h.bot.handle(&config(), &request(&["cla/no"], false));

    assert!(matches!(result, Err(ClaError::SignatureQuery(_))));
    assert_eq!(h.forge.calls(), vec![ForgeCall::ListCommits]);
}

#[test]
fn test_shared_email_is_queried_once_per_pass() {
    let commits = (0..6)
        .map(|i| commit(&format!("{i:010}"), "shared@x.com", "wip"))
        .collect();
    let h = Harness::new(MockForge::with_commits(commits), MockSigningService::new());

    h.bot.handle(&config(), &request(&[], false)).unwrap();
    assert_eq!(h.signing.query_count("shared@x.com"), 1);

    // A second pass starts with a fresh cache.
    h.bot.handle(&config(), &h.current_request(false)).unwrap();
    assert_eq!(h.signing.query_count("shared@x.com"), 2);
}

#[test]
fn test_repeated_unsigned_passes_only_regenerate_guidance() {
    let h = Harness::new(
        MockForge::with_commits(vec![commit("1111111111", "nobody@x.com", "fix")]),
        MockSigningService::new(),
    );

    h.bot.handle(&config(), &h.current_request(false)).unwrap();
    h.forge.clear_calls();
    h.bot.handle(&config(), &h.current_request(false)).unwrap();

    assert!(h.forge.label_mutations().is_empty());
    assert_eq!(h.forge.created_comments().len(), 1);
    let guidance: Vec<_> = h
        .forge
        .comments()
        .into_iter()
        .filter(|c| c.body.starts_with(GUIDANCE_TITLE))
        .collect();
    assert_eq!(guidance.len(), 1);
    assert_eq!(h.forge.labels(), label_set(&["cla/no"]));
}

#[test]
fn test_repeated_signed_passes_are_quiet() {
    let h = Harness::new(
        MockForge::with_commits(vec![commit("1", "a@x.com", "feat")]),
        MockSigningService::with_signed(["a@x.com"]),
    );

    h.bot.handle(&config(), &h.current_request(true)).unwrap();
    assert_eq!(h.forge.created_comments(), vec![signed_comment("ada")]);

    h.forge.clear_calls();
    h.bot.handle(&config(), &h.current_request(true)).unwrap();

    assert!(h.forge.label_mutations().is_empty());
    assert!(h.forge.created_comments().is_empty());
}

#[test]
fn test_signing_after_guidance_clears_it() {
    let forge = Arc::new(MockForge::with_commits(vec![commit("1", "a@x.com", "feat")]));
    let before = ClaBot::new(forge.clone(), Arc::new(MockSigningService::new()));
    let after = ClaBot::new(
        forge.clone(),
        Arc::new(MockSigningService::with_signed(["a@x.com"])),
    );

    before.handle(&config(), &request(&[], false)).unwrap();
    assert_eq!(forge.labels(), label_set(&["cla/no"]));

    let current = ReconcileRequest {
        labels: forge.labels(),
        ..request(&[], true)
    };
    let outcome = after.handle(&config(), &current).unwrap();

    assert_eq!(outcome.verdict, Verdict::Signed);
    assert_eq!(forge.labels(), label_set(&["cla/yes"]));
    let bodies: Vec<String> = forge.comments().into_iter().map(|c| c.body).collect();
    assert_eq!(bodies, vec![signed_comment("ada")]);
}

#[test]
fn test_legacy_guidance_is_purged() {
    let forge = MockForge::with_commits(vec![commit("1", "a@x.com", "feat")]);
    forge.seed_comment(format!("{LEGACY_GUIDANCE_TITLE}\n\nold"));
    let h = Harness::new(forge, MockSigningService::new());

    let outcome = h.bot.handle(&config(), &request(&[], false)).unwrap();

    assert_eq!(outcome.report.purged_comments, 1);
    assert!(
        h.forge
            .comments()
            .iter()
            .all(|c| !c.body.starts_with(LEGACY_GUIDANCE_TITLE))
    );
}

#[test]
fn test_guidance_keeps_listing_order() {
    let h = Harness::new(
        MockForge::with_commits(vec![
            commit("cccccccccc", "c@x.com", "third"),
            commit("aaaaaaaaaa", "a@x.com", "first"),
            commit("bbbbbbbbbb", "", "second"),
        ]),
        MockSigningService::with_signed(["a@x.com"]),
    );

    h.bot.handle(&config(), &request(&[], false)).unwrap();

    let body = &h.forge.created_comments()[0];
    let third = body.find("**cccccccc** | third").unwrap();
    let second = body.find("**bbbbbbbb** | second").unwrap();
    assert!(third < second);
    assert!(!body.contains("aaaaaaaa"));
}

#[test]
fn test_mutation_failures_do_not_fail_pass() {
    let h = Harness::new(
        MockForge::with_commits(vec![commit("1", "a@x.com", "feat")])
            .failing_labels()
            .failing_create_comment(),
        MockSigningService::new(),
    );

    let outcome = h.bot.handle(&config(), &request(&["cla/yes"], false)).unwrap();

    assert_eq!(outcome.report.failed, 3);
    assert_eq!(outcome.report.applied, 1);
    assert_eq!(
        h.forge.label_mutations(),
        vec![
            ForgeCall::RemoveLabel("cla/yes".to_string()),
            ForgeCall::AddLabel("cla/no".to_string()),
        ]
    );
}
