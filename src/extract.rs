//! GitHub data extraction via the `gh` CLI.
//!
//! All platform access goes through the locally installed `gh` binary, which
//! owns authentication, transport, and its own timeout policy. This module
//! wraps it behind the [`DataExtractor`] capability:
//!
//! - [`GhExtractor`]: real extraction via `gh api` subprocess calls
//! - [`StaticExtractor`]: pre-baked data for tests and embedders
//!
//! One extraction produces a [`RawData`] snapshot (profile record, a single
//! bounded page of repositories, and the contributions aggregate) which the
//! section parsers then slice up independently.

use std::io;
use std::process::Command;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Extraction failures. All of these abort the run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("User or resource not found")]
    NotFound,

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("GitHub CLI command failed: {0}")]
    CommandFailed(String),

    #[error("GitHub CLI not found; install it from https://cli.github.com")]
    GhMissing,

    #[error("Failed to launch gh: {0}")]
    Spawn(#[from] io::Error),
}

/// Raw, unshaped response data for one user, keyed loosely by section.
///
/// Produced once per run and treated as immutable afterwards; parsers
/// borrow it and never mutate it.
#[derive(Debug, Clone)]
pub struct RawData {
    /// Username the extraction was requested for.
    pub username: String,
    /// Raw user-profile records; at most the first entry is meaningful.
    pub profile: Vec<Value>,
    /// Raw repository records in API order.
    pub repos: Vec<Value>,
    /// Raw contributions aggregate (a `contributionsCollection` object).
    pub contributions: Value,
}

impl RawData {
    /// An empty snapshot for `username`; every section parses to defaults.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            profile: Vec::new(),
            repos: Vec::new(),
            contributions: empty_object(),
        }
    }
}

/// Capability that turns a username into a [`RawData`] snapshot.
pub trait DataExtractor {
    /// Extract all data for `username`.
    fn extract(&self, username: &str) -> Result<RawData, ExtractError>;
}

/// Extractor backed by `gh api` subprocess calls.
pub struct GhExtractor {
    /// Token exported as `GH_TOKEN` to the child; `None` defers to the
    /// user's existing `gh auth` state.
    token: Option<String>,
}

const CONTRIBUTIONS_QUERY: &str = "\
query($login: String!) {
  user(login: $login) {
    contributionsCollection {
      totalCommitContributions
      totalIssueContributions
      totalPullRequestContributions
      totalPullRequestReviewContributions
      contributionCalendar {
        totalContributions
      }
    }
  }
}";

impl GhExtractor {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    /// Run one `gh` invocation and decode its stdout as JSON.
    ///
    /// Empty or undecodable stdout yields an empty object rather than an
    /// error; non-zero exit status is classified by stderr content.
    fn run_gh(&self, args: &[&str]) -> Result<Value, ExtractError> {
        debug!("Running gh {}", args.join(" "));

        let mut cmd = Command::new("gh");
        cmd.args(args);
        if let Some(ref token) = self.token {
            cmd.env("GH_TOKEN", token);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ExtractError::GhMissing
            } else {
                ExtractError::Spawn(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }

        Ok(decode_stdout(&output.stdout))
    }

    /// Fetch the profile record. Failure here is fatal for the run.
    fn fetch_profile(&self, username: &str) -> Result<Value, ExtractError> {
        self.run_gh(&["api", &format!("/users/{username}")])
    }

    /// Fetch one page of repositories; degrades to empty on any failure.
    fn fetch_repos(&self, username: &str) -> Vec<Value> {
        match self.run_gh(&["api", &format!("/users/{username}/repos?per_page=100")]) {
            Ok(Value::Array(repos)) => repos,
            Ok(_) => Vec::new(),
            Err(e) => {
                debug!("Repository fetch degraded to empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch the contributions aggregate via GraphQL; degrades to empty.
    fn fetch_contributions(&self, username: &str) -> Value {
        let result = self.run_gh(&[
            "api",
            "graphql",
            "-f",
            &format!("query={CONTRIBUTIONS_QUERY}"),
            "-f",
            &format!("login={username}"),
        ]);

        match result {
            Ok(value) => value
                .pointer("/data/user/contributionsCollection")
                .cloned()
                .unwrap_or_else(empty_object),
            Err(e) => {
                debug!("Contributions fetch degraded to empty: {}", e);
                empty_object()
            }
        }
    }
}

impl DataExtractor for GhExtractor {
    fn extract(&self, username: &str) -> Result<RawData, ExtractError> {
        Ok(RawData {
            username: username.to_string(),
            profile: vec![self.fetch_profile(username)?],
            repos: self.fetch_repos(username),
            contributions: self.fetch_contributions(username),
        })
    }
}

/// Extractor returning a fixed snapshot with the requested username
/// substituted in. The test-double counterpart of [`GhExtractor`].
pub struct StaticExtractor {
    data: RawData,
}

impl StaticExtractor {
    #[must_use]
    pub fn new(data: RawData) -> Self {
        Self { data }
    }
}

impl DataExtractor for StaticExtractor {
    fn extract(&self, username: &str) -> Result<RawData, ExtractError> {
        let mut data = self.data.clone();
        data.username = username.to_string();
        Ok(data)
    }
}

/// Check whether the `gh` CLI is installed and runnable.
#[must_use]
pub fn gh_available() -> bool {
    Command::new("gh")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Resolve the currently authenticated GitHub user, if any.
#[must_use]
pub fn authenticated_user() -> Option<String> {
    let output = Command::new("gh")
        .args(["api", "/user", "--jq", ".login"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let login = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if login.is_empty() {
        None
    } else {
        Some(login)
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Map a failed `gh` invocation's stderr to the error taxonomy.
fn classify_failure(stderr: &str) -> ExtractError {
    let lowered = stderr.to_lowercase();
    if lowered.contains("rate limit") {
        ExtractError::RateLimited
    } else if lowered.contains("not found") {
        ExtractError::NotFound
    } else {
        ExtractError::CommandFailed(stderr.trim().to_string())
    }
}

/// Decode gh stdout, tolerating empty and malformed bodies.
fn decode_stdout(stdout: &[u8]) -> Value {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return empty_object();
    }
    serde_json::from_slice(stdout).unwrap_or_else(|_| empty_object())
}
