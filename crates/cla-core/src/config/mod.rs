//! Configuration parsing and management.
//!
//! The bot is configured by a single TOML file holding daemon settings and an
//! ordered list of per-repository CLA settings. Each entry carries a repo
//! filter selecting the organizations and repositories it applies to.

use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BotConfiguration {
    /// Daemon configuration.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Per-repository CLA settings, scanned in order.
    #[serde(default)]
    pub config_items: Vec<RepoConfig>,
}

impl BotConfiguration {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or any entry fails
    /// validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validates every configuration entry.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, naming the offending entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.daemon
            .validate()
            .map_err(|reason| ConfigError::Validation(format!("daemon: {reason}")))?;
        for (index, item) in self.config_items.iter().enumerate() {
            item.validate()
                .map_err(|reason| ConfigError::Validation(format!("config_items[{index}]: {reason}")))?;
        }
        Ok(())
    }

    /// Returns the settings for `org/repo`.
    ///
    /// Entries naming the exact repository win over organization-wide
    /// entries. Within each tier the first entry in file order is returned.
    #[must_use]
    pub fn config_for(&self, org: &str, repo: &str) -> Option<&RepoConfig> {
        self.config_items
            .iter()
            .find(|item| item.filter.matches_repo_exactly(org, repo))
            .or_else(|| {
                self.config_items
                    .iter()
                    .find(|item| item.filter.matches_org(org, repo))
            })
    }
}

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Address the webhook server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path the webhook endpoint is mounted on.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// GitHub API base URL (default: `https://api.github.com`).
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// Environment variable holding the GitHub API token.
    ///
    /// The token itself is never stored in the config file.
    #[serde(default = "default_github_token_env")]
    pub github_token_env: String,

    /// Environment variable holding the webhook HMAC secret.
    ///
    /// When the variable is unset the webhook endpoint is disabled.
    #[serde(default = "default_webhook_secret_env")]
    pub webhook_secret_env: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            webhook_path: default_webhook_path(),
            github_api_url: default_github_api_url(),
            github_token_env: default_github_token_env(),
            webhook_secret_env: default_webhook_secret_env(),
        }
    }
}

impl DaemonConfig {
    fn validate(&self) -> Result<(), String> {
        self.listen_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| format!("invalid listen_addr {:?}: {e}", self.listen_addr))?;
        if !self.webhook_path.starts_with('/') || self.webhook_path == "/healthz" {
            return Err(format!("invalid webhook_path {:?}", self.webhook_path));
        }
        // The router would read these as path parameters or wildcards.
        if self.webhook_path.contains(['{', '}', '*']) {
            return Err(format!(
                "webhook_path {:?} must not contain '{{', '}}' or '*'",
                self.webhook_path
            ));
        }
        Url::parse(&self.github_api_url).map_err(|e| format!("github_api_url is not a valid URL: {e}"))?;
        for (field, value) in [
            ("github_token_env", &self.github_token_env),
            ("webhook_secret_env", &self.webhook_secret_env),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        Ok(())
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8888".to_string()
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_webhook_secret_env() -> String {
    "CLA_WEBHOOK_SECRET".to_string()
}

/// Selects the organizations and repositories a [`RepoConfig`] applies to.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RepoFilter {
    /// Entries of the form `org` or `org/repo`.
    #[serde(default)]
    pub repos: Vec<String>,

    /// Repositories (`org/repo`) excluded from organization-wide entries.
    #[serde(default)]
    pub excluded_repos: Vec<String>,
}

impl RepoFilter {
    fn matches_repo_exactly(&self, org: &str, repo: &str) -> bool {
        let full = format!("{org}/{repo}");
        self.repos.iter().any(|entry| *entry == full)
    }

    fn matches_org(&self, org: &str, repo: &str) -> bool {
        let full = format!("{org}/{repo}");
        self.repos.iter().any(|entry| entry == org) && !self.excluded_repos.contains(&full)
    }

    fn validate(&self) -> Result<(), String> {
        if self.repos.is_empty() {
            return Err("repos must not be empty".to_string());
        }
        for entry in &self.repos {
            if !is_valid_repo_entry(entry, true) {
                return Err(format!("invalid repos entry {entry:?}"));
            }
        }
        for entry in &self.excluded_repos {
            if !is_valid_repo_entry(entry, false) {
                return Err(format!(
                    "invalid excluded_repos entry {entry:?} (expected org/repo)"
                ));
            }
        }
        Ok(())
    }
}

fn is_valid_repo_entry(entry: &str, allow_org_only: bool) -> bool {
    let mut parts = entry.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(org), None, None) => allow_org_only && !org.trim().is_empty(),
        (Some(org), Some(repo), None) => !org.trim().is_empty() && !repo.trim().is_empty(),
        _ => false,
    }
}

/// CLA settings for one set of repositories.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RepoConfig {
    /// Repositories this entry applies to.
    #[serde(flatten)]
    pub filter: RepoFilter,

    /// Label indicating every commit author has signed the CLA.
    pub cla_label_yes: String,

    /// Label indicating at least one commit author has not signed the CLA.
    pub cla_label_no: String,

    /// Signing-status endpoint, queried as `<check_url>?email=<email>`.
    pub check_url: String,

    /// Where contributors go to sign the CLA.
    pub sign_url: String,

    /// FAQ describing how the CLA is checked.
    pub faq_url: String,

    /// Check the committer email instead of the author email.
    #[serde(default)]
    pub check_by_committer: bool,

    /// Committer identity used by lite pull requests.
    ///
    /// Required when `check_by_committer` is set.
    #[serde(default)]
    pub lite_pr_committer: LitePrCommitter,
}

impl RepoConfig {
    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("cla_label_yes", &self.cla_label_yes),
            ("cla_label_no", &self.cla_label_no),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        if self.cla_label_yes == self.cla_label_no {
            return Err("cla_label_yes and cla_label_no must differ".to_string());
        }

        for (field, value) in [
            ("check_url", &self.check_url),
            ("sign_url", &self.sign_url),
            ("faq_url", &self.faq_url),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
            Url::parse(value).map_err(|e| format!("{field} is not a valid URL: {e}"))?;
        }

        if self.check_by_committer {
            self.lite_pr_committer
                .validate()
                .map_err(|reason| format!("lite_pr_committer: {reason}"))?;
        }

        self.filter.validate()
    }
}

/// The committer identity a platform stamps on lite pull requests.
///
/// Such a committer is not the real contributor, so the commit author is
/// checked instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LitePrCommitter {
    /// Committer email used for lite pull requests.
    #[serde(default)]
    pub email: String,

    /// Committer name used for lite pull requests.
    #[serde(default)]
    pub name: String,
}

impl LitePrCommitter {
    fn validate(&self) -> Result<(), String> {
        if self.email.is_empty() {
            return Err("missing email".to_string());
        }
        if self.name.is_empty() {
            return Err("missing name".to_string());
        }
        Ok(())
    }

    /// Returns whether a committer is the lite PR committer.
    ///
    /// Either field matching is enough.
    #[must_use]
    pub fn is_lite_pr(&self, email: &str, name: &str) -> bool {
        email == self.email || name == self.name
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
