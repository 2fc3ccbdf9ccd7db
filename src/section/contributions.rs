//! Contributions section: flattened activity counters for the trailing year.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::{SectionData, SectionFormatter, SectionParser};
use crate::extract::RawData;

/// Contribution counters, every missing source counter defaulting to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contributions {
    pub total_commits: u64,
    pub total_issues: u64,
    pub total_prs: u64,
    pub total_reviews: u64,
    /// Calendar-wide total, distinct from the sum of the other counters.
    pub total_contributions: u64,
}

/// Flattens the nested contributions aggregate into [`Contributions`].
pub struct ContributionsParser;

impl SectionParser for ContributionsParser {
    fn section_name(&self) -> &'static str {
        "contributions"
    }

    fn parse(&self, raw: &RawData) -> Result<SectionData> {
        let collection: RawContributions = serde_json::from_value(raw.contributions.clone())
            .context("malformed contributions record")?;

        Ok(SectionData::Contributions(Contributions {
            total_commits: collection.total_commit_contributions,
            total_issues: collection.total_issue_contributions,
            total_prs: collection.total_pull_request_contributions,
            total_reviews: collection.total_pull_request_review_contributions,
            total_contributions: collection.contribution_calendar.total_contributions,
        }))
    }
}

/// Renders [`Contributions`] as `contributions.md`.
pub struct ContributionsFormatter;

impl SectionFormatter for ContributionsFormatter {
    fn section_name(&self) -> &'static str {
        "contributions"
    }

    fn output_filename(&self) -> &'static str {
        "contributions.md"
    }

    fn format(&self, data: &SectionData) -> Result<String> {
        let contributions = match data {
            SectionData::Contributions(contributions) => contributions,
            other => bail!("contributions formatter received {} data", other.kind()),
        };

        let mut lines = vec!["# Contributions\n".to_string()];
        lines.push(format!(
            "**Total Contributions (last year):** {}\n",
            contributions.total_contributions
        ));
        lines.push("## Breakdown\n".to_string());
        lines.push(format!("- **Commits:** {}", contributions.total_commits));
        lines.push(format!("- **Pull Requests:** {}", contributions.total_prs));
        lines.push(format!("- **Issues:** {}", contributions.total_issues));
        lines.push(format!("- **Code Reviews:** {}", contributions.total_reviews));

        Ok(lines.join("\n") + "\n")
    }
}

// ============================================================================
// Raw API Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawContributions {
    total_commit_contributions: u64,
    total_issue_contributions: u64,
    total_pull_request_contributions: u64,
    total_pull_request_review_contributions: u64,
    contribution_calendar: RawCalendar,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawCalendar {
    total_contributions: u64,
}
