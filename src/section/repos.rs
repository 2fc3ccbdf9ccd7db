//! Repository section: per-repo records plus aggregate statistics.
//!
//! Forked repositories are dropped entirely; everything downstream (totals,
//! language tally, rendered list) only ever sees sources the user owns.

use std::cmp::Reverse;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::{date_only, non_empty, SectionData, SectionFormatter, SectionParser};
use crate::extract::RawData;
use crate::markdown;

/// Listing caps applied at render time; the parsed data keeps everything.
const MAX_LISTED_REPOS: usize = 50;
const MAX_LISTED_LANGUAGES: usize = 10;

/// One non-fork repository, normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub topics: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Aggregate view over all non-fork repositories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoSummary {
    /// Kept repositories, star count descending. Ties keep API order.
    pub repos: Vec<Repo>,
    pub total: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    /// Language tally, count descending. Ties keep first-seen order.
    pub languages: Vec<(String, usize)>,
}

/// Shapes the raw repository list into a [`RepoSummary`].
pub struct ReposParser;

impl SectionParser for ReposParser {
    fn section_name(&self) -> &'static str {
        "repos"
    }

    fn parse(&self, raw: &RawData) -> Result<SectionData> {
        let records: Vec<RawRepo> = raw
            .repos
            .iter()
            .map(|value| serde_json::from_value(value.clone()))
            .collect::<Result<_, _>>()
            .context("malformed repository record")?;

        let mut repos = Vec::new();
        let mut languages: Vec<(String, usize)> = Vec::new();
        let mut total_stars = 0u64;
        let mut total_forks = 0u64;

        for record in records {
            if record.fork {
                continue;
            }

            let stars = resolve_count(record.stargazers_count, record.stars);
            let forks = resolve_count(record.forks_count, record.forks);
            let language = non_empty(record.language);
            if let Some(ref lang) = language {
                tally_language(&mut languages, lang);
            }
            total_stars += stars;
            total_forks += forks;

            repos.push(Repo {
                name: non_empty(record.name),
                description: non_empty(record.description),
                url: non_empty(record.html_url),
                language,
                stars,
                forks,
                topics: record.topics,
                created_at: non_empty(record.created_at).and_then(|s| date_only(&s)),
                updated_at: non_empty(record.updated_at).and_then(|s| date_only(&s)),
            });
        }

        // Stable sorts: ties keep API order / first-seen order respectively.
        repos.sort_by_key(|repo| Reverse(repo.stars));
        languages.sort_by_key(|&(_, count)| Reverse(count));

        Ok(SectionData::Repos(RepoSummary {
            total: repos.len(),
            total_stars,
            total_forks,
            languages,
            repos,
        }))
    }
}

/// Renders a [`RepoSummary`] as `repositories.md`.
pub struct ReposFormatter;

impl SectionFormatter for ReposFormatter {
    fn section_name(&self) -> &'static str {
        "repos"
    }

    fn output_filename(&self) -> &'static str {
        "repositories.md"
    }

    fn format(&self, data: &SectionData) -> Result<String> {
        let summary = match data {
            SectionData::Repos(summary) => summary,
            other => bail!("repos formatter received {} data", other.kind()),
        };

        let mut lines = vec![format!("# Repositories ({} total)\n", summary.total)];
        lines.push(format!(
            "**Total Stars:** {} | **Total Forks:** {}\n",
            summary.total_stars, summary.total_forks
        ));

        if !summary.languages.is_empty() {
            lines.push("## Languages\n".to_string());
            for (language, count) in summary.languages.iter().take(MAX_LISTED_LANGUAGES) {
                lines.push(format!("- **{language}:** {count} repos"));
            }
            lines.push(String::new());
        }

        if !summary.repos.is_empty() {
            lines.push("## Top Repositories\n".to_string());
            for repo in summary.repos.iter().take(MAX_LISTED_REPOS) {
                let name = repo.name.as_deref().unwrap_or("Unknown");
                let description = match repo.description.as_deref() {
                    Some(text) => markdown::truncate_default(text),
                    None => "No description".to_string(),
                };
                let language = repo.language.as_deref().unwrap_or("Unknown");

                lines.push(format!("### {}", markdown::link(name, repo.url.as_deref())));
                lines.push(description);
                lines.push(format!(
                    "- **Language:** {language} | **Stars:** {}",
                    repo.stars
                ));
                lines.push(String::new());
            }

            let shown = summary.repos.len().min(MAX_LISTED_REPOS);
            let more = markdown::more_line(shown, summary.total, "repositories");
            if !more.is_empty() {
                lines.push(more);
            }
        }

        Ok(lines.join("\n") + "\n")
    }
}

/// First non-zero count wins; a zero or absent primary falls through to the
/// alternate field name some payloads use.
fn resolve_count(primary: Option<u64>, fallback: Option<u64>) -> u64 {
    primary.filter(|&n| n != 0).or(fallback).unwrap_or(0)
}

fn tally_language(languages: &mut Vec<(String, usize)>, lang: &str) {
    match languages.iter().position(|(name, _)| name == lang) {
        Some(i) => languages[i].1 += 1,
        None => languages.push((lang.to_string(), 1)),
    }
}

// ============================================================================
// Raw API Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRepo {
    name: Option<String>,
    description: Option<String>,
    html_url: Option<String>,
    language: Option<String>,
    fork: bool,
    stargazers_count: Option<u64>,
    stars: Option<u64>,
    forks_count: Option<u64>,
    forks: Option<u64>,
    topics: Vec<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}
