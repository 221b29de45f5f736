//! Decides which deliveries start a reconciliation pass.

use std::sync::LazyLock;

use regex::Regex;

use super::payload::{ClaEvent, IssueCommentEvent, PullRequestEvent, label_names};
use crate::cla::ReconcileRequest;
use crate::forge::PrRef;

/// `/check-cla` alone on a line, ignoring case and surrounding blanks.
static TRIGGER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*/check-cla[ \t]*\r?$").expect("trigger regex is valid")
});

/// Whether a comment body asks for a CLA re-check.
#[must_use]
pub fn is_trigger_comment(body: &str) -> bool {
    TRIGGER_REGEX.is_match(body)
}

/// Maps a delivery to a pass request, or `None` when it should be ignored.
#[must_use]
pub fn filter(event: &ClaEvent) -> Option<ReconcileRequest> {
    match event {
        ClaEvent::PullRequest(event) => filter_pull_request(event),
        ClaEvent::IssueComment(event) => filter_comment(event),
        ClaEvent::Other { .. } => None,
    }
}

fn filter_pull_request(event: &PullRequestEvent) -> Option<ReconcileRequest> {
    let pr = &event.pull_request;
    if pr.state != "open" || !matches!(event.action.as_str(), "opened" | "synchronize") {
        return None;
    }

    Some(ReconcileRequest {
        pr: PrRef::new(&event.repository.owner.login, &event.repository.name, pr.number),
        author: pr.user.login.clone(),
        labels: label_names(&pr.labels),
        explicitly_triggered: false,
    })
}

fn filter_comment(event: &IssueCommentEvent) -> Option<ReconcileRequest> {
    let issue = &event.issue;
    if event.action != "created"
        || issue.pull_request.is_none()
        || issue.state != "open"
        || !is_trigger_comment(&event.comment.body)
    {
        return None;
    }

    Some(ReconcileRequest {
        pr: PrRef::new(&event.repository.owner.login, &event.repository.name, issue.number),
        author: issue.user.login.clone(),
        labels: label_names(&issue.labels),
        explicitly_triggered: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pull_request(action: &str, state: &str) -> ClaEvent {
        let body = serde_json::json!({
            "action": action,
            "pull_request": {
                "number": 5,
                "state": state,
                "user": {"login": "ada"},
                "labels": [{"name": "cla/yes"}]
            },
            "repository": {"name": "repo", "owner": {"login": "org"}}
        });
        ClaEvent::decode("pull_request", body.to_string().as_bytes())
    }

    fn comment(action: &str, state: &str, is_pr: bool, text: &str) -> ClaEvent {
        let mut issue = serde_json::json!({
            "number": 9,
            "state": state,
            "user": {"login": "grace"},
            "labels": []
        });
        if is_pr {
            issue["pull_request"] = serde_json::json!({});
        }
        let body = serde_json::json!({
            "action": action,
            "issue": issue,
            "comment": {"id": 1, "body": text},
            "repository": {"name": "repo", "owner": {"login": "org"}}
        });
        ClaEvent::decode("issue_comment", body.to_string().as_bytes())
    }

    #[test]
    fn test_trigger_pattern() {
        assert!(is_trigger_comment("/check-cla"));
        assert!(is_trigger_comment("  /CHECK-CLA  "));
        assert!(is_trigger_comment("thanks!\n/check-cla\n"));
        assert!(is_trigger_comment("thanks!\r\n/check-cla\r\n"));
        assert!(!is_trigger_comment("please /check-cla"));
        assert!(!is_trigger_comment("/check-cla now"));
        assert!(!is_trigger_comment("/check-claa"));
    }

    #[test]
    fn test_pull_request_actions() {
        let opened = filter(&pull_request("opened", "open")).unwrap();
        assert_eq!(opened.pr, PrRef::new("org", "repo", 5));
        assert_eq!(opened.author, "ada");
        assert!(opened.labels.contains("cla/yes"));
        assert!(!opened.explicitly_triggered);

        assert!(filter(&pull_request("synchronize", "open")).is_some());
        assert!(filter(&pull_request("labeled", "open")).is_none());
        assert!(filter(&pull_request("edited", "open")).is_none());
        assert!(filter(&pull_request("synchronize", "closed")).is_none());
    }

    #[test]
    fn test_comment_trigger() {
        let request = filter(&comment("created", "open", true, "/check-cla")).unwrap();
        assert_eq!(request.pr.number, 9);
        assert_eq!(request.author, "grace");
        assert!(request.explicitly_triggered);
    }

    #[test]
    fn test_comment_rejections() {
        assert!(filter(&comment("edited", "open", true, "/check-cla")).is_none());
        assert!(filter(&comment("created", "closed", true, "/check-cla")).is_none());
        assert!(filter(&comment("created", "open", false, "/check-cla")).is_none());
        assert!(filter(&comment("created", "open", true, "lgtm")).is_none());
    }

    #[test]
    fn test_other_events_ignored() {
        assert!(filter(&ClaEvent::Other { event: "push".to_string() }).is_none());
    }
}
