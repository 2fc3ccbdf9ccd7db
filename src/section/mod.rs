//! Section pipeline: typed parsing and markdown formatting.
//!
//! A section is one independent view of the extracted data (profile, repos,
//! contributions). Each section contributes a [`SectionParser`], which shapes
//! raw JSON into a typed [`SectionData`] variant, and a [`SectionFormatter`],
//! which renders that variant to a markdown document. Parsers and formatters
//! for one section share a key and live side by side in the section's module.
//!
//! Registries hold the stages in registration order; iteration order is
//! exactly the order sections were registered, which fixes both parse order
//! and output-file order for a run.

pub mod contributions;
pub mod profile;
pub mod repos;

use anyhow::Result;
use chrono::NaiveDate;

use crate::extract::RawData;

/// Typed result of parsing one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Profile(profile::Profile),
    Repos(repos::RepoSummary),
    Contributions(contributions::Contributions),
}

impl SectionData {
    /// Name of the contained variant, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SectionData::Profile(_) => "profile",
            SectionData::Repos(_) => "repos",
            SectionData::Contributions(_) => "contributions",
        }
    }
}

/// Shapes one section's slice of the raw snapshot into typed data.
pub trait SectionParser: Send + Sync {
    /// Stable key naming this section.
    fn section_name(&self) -> &'static str;

    /// Parse the section out of `raw`. An error here marks the section
    /// absent for the rest of the run; other sections are unaffected.
    fn parse(&self, raw: &RawData) -> Result<SectionData>;
}

/// Renders one section's typed data to a markdown document.
pub trait SectionFormatter: Send + Sync {
    /// Stable key naming this section; pairs the formatter with the parser
    /// output it consumes.
    fn section_name(&self) -> &'static str;

    /// Filename this section is written under, relative to the output
    /// directory.
    fn output_filename(&self) -> &'static str;

    /// Render `data` to markdown. Handed the wrong [`SectionData`] variant,
    /// this fails rather than rendering something misleading.
    fn format(&self, data: &SectionData) -> Result<String>;
}

/// Ordered collection of section parsers.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn SectionParser>>,
}

impl ParserRegistry {
    /// Registry with the standard sections, in render order.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(profile::ProfileParser));
        registry.register(Box::new(repos::ReposParser));
        registry.register(Box::new(contributions::ContributionsParser));
        registry
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Append a parser; it runs after everything registered before it.
    pub fn register(&mut self, parser: Box<dyn SectionParser>) {
        self.parsers.push(parser);
    }

    #[must_use]
    pub fn parsers(&self) -> &[Box<dyn SectionParser>] {
        &self.parsers
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered collection of section formatters.
pub struct FormatterRegistry {
    formatters: Vec<Box<dyn SectionFormatter>>,
}

impl FormatterRegistry {
    /// Registry with the standard sections, in render order.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(profile::ProfileFormatter));
        registry.register(Box::new(repos::ReposFormatter));
        registry.register(Box::new(contributions::ContributionsFormatter));
        registry
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            formatters: Vec::new(),
        }
    }

    /// Append a formatter; it renders after everything registered before it.
    pub fn register(&mut self, formatter: Box<dyn SectionFormatter>) {
        self.formatters.push(formatter);
    }

    #[must_use]
    pub fn formatters(&self) -> &[Box<dyn SectionFormatter>] {
        &self.formatters
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Treat empty remote strings like absent values, so formatters only ever
/// see `Some` with renderable text.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Reduce an RFC 3339 timestamp to its date part.
///
/// Values whose first ten characters are not a calendar date come back as
/// `None`, so formatters skip the line instead of rendering junk.
pub(crate) fn date_only(timestamp: &str) -> Option<String> {
    let prefix: String = timestamp.chars().take(10).collect();
    match NaiveDate::parse_from_str(&prefix, "%Y-%m-%d") {
        Ok(_) => Some(prefix),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeParser(&'static str);

    impl SectionParser for FakeParser {
        fn section_name(&self) -> &'static str {
            self.0
        }

        fn parse(&self, raw: &RawData) -> Result<SectionData> {
            Ok(SectionData::Profile(profile::Profile {
                username: raw.username.clone(),
                ..profile::Profile::default()
            }))
        }
    }

    #[test]
    fn default_parser_registry_order_is_render_order() {
        let registry = ParserRegistry::new();
        let names: Vec<&str> = registry.parsers().iter().map(|p| p.section_name()).collect();
        assert_eq!(names, ["profile", "repos", "contributions"]);
    }

    #[test]
    fn default_formatter_registry_order_matches_parsers() {
        let registry = FormatterRegistry::new();
        let names: Vec<&str> = registry
            .formatters()
            .iter()
            .map(|f| f.section_name())
            .collect();
        assert_eq!(names, ["profile", "repos", "contributions"]);

        let filenames: Vec<&str> = registry
            .formatters()
            .iter()
            .map(|f| f.output_filename())
            .collect();
        assert_eq!(filenames, ["profile.md", "repositories.md", "contributions.md"]);
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = ParserRegistry::empty();
        registry.register(Box::new(FakeParser("zeta")));
        registry.register(Box::new(FakeParser("alpha")));
        registry.register(Box::new(FakeParser("mid")));

        let names: Vec<&str> = registry.parsers().iter().map(|p| p.section_name()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn section_data_kind_names_variant() {
        let data = SectionData::Profile(profile::Profile::default());
        assert_eq!(data.kind(), "profile");
    }

    #[test]
    fn date_only_cuts_rfc3339_timestamps() {
        assert_eq!(date_only("2020-01-15T10:30:00Z").as_deref(), Some("2020-01-15"));
        assert_eq!(date_only("2020-01-15").as_deref(), Some("2020-01-15"));
    }

    #[test]
    fn date_only_rejects_non_dates() {
        assert_eq!(date_only("not-a-date-at-all"), None);
        assert_eq!(date_only("2020"), None);
        assert_eq!(date_only(""), None);
    }
}
