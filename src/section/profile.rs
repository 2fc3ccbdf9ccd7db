//! Profile section: identity, bio, and account statistics.
//!
//! # Example
//!
//! ```rust
//! use gh2md::extract::RawData;
//! use gh2md::section::{profile::ProfileParser, SectionData, SectionParser};
//!
//! let mut raw = RawData::new("alice");
//! raw.profile = vec![serde_json::json!({"login": "alice", "name": "Alice"})];
//!
//! match ProfileParser.parse(&raw).unwrap() {
//!     SectionData::Profile(profile) => assert_eq!(profile.username, "alice"),
//!     _ => unreachable!(),
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::{date_only, non_empty, SectionData, SectionFormatter, SectionParser};
use crate::extract::RawData;

/// Normalized user profile. Empty remote strings are folded into `None`,
/// so `Some` always carries renderable text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
    pub public_repos: u64,
    pub public_gists: u64,
    pub followers: u64,
    pub following: u64,
    /// Date-only form of the account creation timestamp.
    pub created_at: Option<String>,
    pub html_url: Option<String>,
}

/// Shapes the first raw profile record into a [`Profile`].
pub struct ProfileParser;

impl SectionParser for ProfileParser {
    fn section_name(&self) -> &'static str {
        "profile"
    }

    fn parse(&self, raw: &RawData) -> Result<SectionData> {
        let record: RawProfile = match raw.profile.first() {
            Some(value) => {
                serde_json::from_value(value.clone()).context("malformed profile record")?
            }
            None => RawProfile::default(),
        };

        // The API login wins; the requested username is the fallback.
        let username = non_empty(record.login).unwrap_or_else(|| raw.username.clone());

        Ok(SectionData::Profile(Profile {
            username,
            name: non_empty(record.name),
            bio: non_empty(record.bio),
            company: non_empty(record.company),
            location: non_empty(record.location),
            blog: non_empty(record.blog),
            email: non_empty(record.email),
            twitter: non_empty(record.twitter_username),
            public_repos: record.public_repos,
            public_gists: record.public_gists,
            followers: record.followers,
            following: record.following,
            created_at: non_empty(record.created_at).and_then(|s| date_only(&s)),
            html_url: non_empty(record.html_url),
        }))
    }
}

/// Renders a [`Profile`] as `profile.md`.
pub struct ProfileFormatter;

impl SectionFormatter for ProfileFormatter {
    fn section_name(&self) -> &'static str {
        "profile"
    }

    fn output_filename(&self) -> &'static str {
        "profile.md"
    }

    fn format(&self, data: &SectionData) -> Result<String> {
        let profile = match data {
            SectionData::Profile(profile) => profile,
            other => bail!("profile formatter received {} data", other.kind()),
        };

        let username = if profile.username.is_empty() {
            "Unknown"
        } else {
            profile.username.as_str()
        };
        let mut lines = vec![format!("# GitHub Profile: {username}\n")];

        if let Some(ref name) = profile.name {
            lines.push(format!("**{name}**\n"));
        }
        if let Some(ref bio) = profile.bio {
            lines.push(format!("> {bio}\n"));
        }

        lines.push("## Info\n".to_string());
        let info = [
            ("Company", profile.company.as_deref()),
            ("Location", profile.location.as_deref()),
            ("Blog", profile.blog.as_deref()),
            ("Twitter", profile.twitter.as_deref()),
            ("Member since", profile.created_at.as_deref()),
        ];
        for (label, value) in info {
            if let Some(value) = value {
                lines.push(format!("- **{label}:** {value}"));
            }
        }

        lines.push("\n## Stats\n".to_string());
        lines.push(format!("- **Public Repos:** {}", profile.public_repos));
        lines.push(format!("- **Followers:** {}", profile.followers));
        lines.push(format!("- **Following:** {}", profile.following));

        if let Some(ref url) = profile.html_url {
            lines.push(format!("\n**Profile:** {url}"));
        }

        Ok(lines.join("\n") + "\n")
    }
}

// ============================================================================
// Raw API Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProfile {
    login: Option<String>,
    name: Option<String>,
    bio: Option<String>,
    company: Option<String>,
    location: Option<String>,
    blog: Option<String>,
    email: Option<String>,
    twitter_username: Option<String>,
    public_repos: u64,
    public_gists: u64,
    followers: u64,
    following: u64,
    created_at: Option<String>,
    html_url: Option<String>,
}
