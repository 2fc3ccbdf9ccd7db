//! Pipeline orchestration: extract once, then parse and format per section.
//!
//! The converter is deliberately forgiving in the middle of the pipeline:
//! extraction failures abort the run, but a single section's parser or
//! formatter failing only costs that section's file. Warnings go to the
//! log; the run still reports whatever files it did produce.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::extract::{DataExtractor, RawData};
use crate::section::{FormatterRegistry, ParserRegistry, SectionData};
use crate::writer::OutputWriter;

/// Drives extract → parse → format → write for one username per call.
pub struct Converter<E, W> {
    extractor: E,
    writer: W,
    parsers: ParserRegistry,
    formatters: FormatterRegistry,
}

impl<E: DataExtractor, W: OutputWriter> Converter<E, W> {
    /// Converter over the standard section set.
    pub fn new(extractor: E, writer: W) -> Self {
        Self::with_registries(
            extractor,
            writer,
            ParserRegistry::new(),
            FormatterRegistry::new(),
        )
    }

    /// Converter over custom registries. Sections run in registration
    /// order; registries are fixed for the converter's lifetime.
    pub fn with_registries(
        extractor: E,
        writer: W,
        parsers: ParserRegistry,
        formatters: FormatterRegistry,
    ) -> Self {
        Self {
            extractor,
            writer,
            parsers,
            formatters,
        }
    }

    /// The writer this converter persists sections through.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Convert one user's data to markdown files.
    ///
    /// Returns the written paths in formatter-registration order. Sections
    /// whose parser or formatter failed, or whose output was blank, are
    /// simply missing from the result.
    pub fn convert(&self, username: &str) -> Result<Vec<PathBuf>> {
        let raw = self.extractor.extract(username)?;
        let parsed = self.parse_all(&raw);
        Ok(self.format_and_write_all(&parsed))
    }

    /// Run every parser. A failed section is recorded as absent so its
    /// formatter is skipped later; duplicate section keys keep the last
    /// parser's result.
    fn parse_all(&self, raw: &RawData) -> HashMap<&'static str, Option<SectionData>> {
        let mut parsed = HashMap::new();
        for parser in self.parsers.parsers() {
            let key = parser.section_name();
            match parser.parse(raw) {
                Ok(data) => {
                    parsed.insert(key, Some(data));
                }
                Err(e) => {
                    warn!("Parser '{}' failed: {:#}", key, e);
                    parsed.insert(key, None);
                }
            }
        }
        parsed
    }

    /// Run every formatter whose section parsed, skipping blank output.
    fn format_and_write_all(
        &self,
        parsed: &HashMap<&'static str, Option<SectionData>>,
    ) -> Vec<PathBuf> {
        let mut created = Vec::new();
        for formatter in self.formatters.formatters() {
            let key = formatter.section_name();
            let data = match parsed.get(key) {
                Some(Some(data)) => data,
                _ => continue,
            };

            match formatter.format(data) {
                Ok(markdown) => {
                    if markdown.trim().is_empty() {
                        continue;
                    }
                    match self.writer.write(formatter.output_filename(), &markdown) {
                        Ok(path) => created.push(path),
                        Err(e) => warn!("Formatter '{}' failed: {}", key, e),
                    }
                }
                Err(e) => warn!("Formatter '{}' failed: {:#}", key, e),
            }
        }
        created
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use anyhow::bail;
    use serde_json::json;

    use super::*;
    use crate::extract::{ExtractError, StaticExtractor};
    use crate::section::contributions::Contributions;
    use crate::section::{SectionFormatter, SectionParser};
    use crate::writer::MemoryWriter;

    fn fixture() -> RawData {
        let mut raw = RawData::new("seed");
        raw.profile = vec![json!({"login": "seed", "name": "Seed User", "public_repos": 2})];
        raw.repos = vec![
            json!({"name": "alpha", "stargazers_count": 3, "language": "Rust"}),
            json!({"name": "beta", "fork": true}),
        ];
        raw.contributions = json!({
            "totalCommitContributions": 7,
            "contributionCalendar": {"totalContributions": 40},
        });
        raw
    }

    #[test]
    fn converts_all_sections_in_order() {
        let converter = Converter::new(StaticExtractor::new(fixture()), MemoryWriter::new());

        let paths = converter.convert("alice").unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("profile.md"),
                PathBuf::from("repositories.md"),
                PathBuf::from("contributions.md"),
            ]
        );
    }

    #[test]
    fn rendered_sections_reflect_parsed_data() {
        let converter = Converter::new(StaticExtractor::new(fixture()), MemoryWriter::new());
        converter.convert("alice").unwrap();

        let files = converter.writer.files();
        let profile = files.get("profile.md").expect("profile.md");
        assert!(profile.contains("# GitHub Profile: seed"));
        assert!(profile.contains("**Seed User**"));

        let repos = files.get("repositories.md").expect("repositories.md");
        assert!(repos.contains("# Repositories (1 total)"));
        assert!(repos.contains("- **Rust:** 1 repos"));

        let contributions = files.get("contributions.md").expect("contributions.md");
        assert!(contributions.contains("**Total Contributions (last year):** 40"));
        assert!(contributions.contains("- **Commits:** 7"));
    }

    #[test]
    fn extraction_failure_aborts_the_run() {
        struct FailingExtractor;

        impl DataExtractor for FailingExtractor {
            fn extract(&self, _username: &str) -> Result<RawData, ExtractError> {
                Err(ExtractError::NotFound)
            }
        }

        let converter = Converter::new(FailingExtractor, MemoryWriter::new());
        assert!(converter.convert("alice").is_err());
        assert!(converter.writer.files().is_empty());
    }

    #[test]
    fn failed_parser_costs_only_its_section() {
        let mut raw = fixture();
        raw.contributions = json!([1, 2, 3]);

        let converter = Converter::new(StaticExtractor::new(raw), MemoryWriter::new());
        let paths = converter.convert("alice").unwrap();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("profile.md"),
                PathBuf::from("repositories.md"),
            ]
        );
        assert!(!converter.writer.files().contains_key("contributions.md"));
    }

    struct UnitParser {
        key: &'static str,
        commits: u64,
    }

    impl SectionParser for UnitParser {
        fn section_name(&self) -> &'static str {
            self.key
        }

        fn parse(&self, _raw: &RawData) -> Result<SectionData> {
            Ok(SectionData::Contributions(Contributions {
                total_commits: self.commits,
                ..Contributions::default()
            }))
        }
    }

    struct FailingParser(&'static str);

    impl SectionParser for FailingParser {
        fn section_name(&self) -> &'static str {
            self.0
        }

        fn parse(&self, _raw: &RawData) -> Result<SectionData> {
            bail!("boom")
        }
    }

    struct CommitsFormatter(&'static str);

    impl SectionFormatter for CommitsFormatter {
        fn section_name(&self) -> &'static str {
            self.0
        }

        fn output_filename(&self) -> &'static str {
            "commits.md"
        }

        fn format(&self, data: &SectionData) -> Result<String> {
            match data {
                SectionData::Contributions(c) => Ok(format!("commits={}\n", c.total_commits)),
                other => bail!("unexpected {} data", other.kind()),
            }
        }
    }

    #[test]
    fn formatter_is_not_invoked_for_absent_section() {
        struct ProbeFormatter {
            invoked: Arc<AtomicBool>,
        }

        impl SectionFormatter for ProbeFormatter {
            fn section_name(&self) -> &'static str {
                "probe"
            }

            fn output_filename(&self) -> &'static str {
                "probe.md"
            }

            fn format(&self, _data: &SectionData) -> Result<String> {
                self.invoked.store(true, Ordering::SeqCst);
                Ok("never".to_string())
            }
        }

        let invoked = Arc::new(AtomicBool::new(false));
        let mut parsers = ParserRegistry::empty();
        parsers.register(Box::new(FailingParser("probe")));
        let mut formatters = FormatterRegistry::empty();
        formatters.register(Box::new(ProbeFormatter {
            invoked: Arc::clone(&invoked),
        }));

        let converter = Converter::with_registries(
            StaticExtractor::new(RawData::new("seed")),
            MemoryWriter::new(),
            parsers,
            formatters,
        );

        let paths = converter.convert("alice").unwrap();
        assert!(paths.is_empty());
        assert!(!invoked.load(Ordering::SeqCst));
        assert!(converter.writer.files().is_empty());
    }

    #[test]
    fn duplicate_section_keys_keep_last_parser_result() {
        let mut parsers = ParserRegistry::empty();
        parsers.register(Box::new(UnitParser {
            key: "dup",
            commits: 1,
        }));
        parsers.register(Box::new(UnitParser {
            key: "dup",
            commits: 2,
        }));
        let mut formatters = FormatterRegistry::empty();
        formatters.register(Box::new(CommitsFormatter("dup")));

        let converter = Converter::with_registries(
            StaticExtractor::new(RawData::new("seed")),
            MemoryWriter::new(),
            parsers,
            formatters,
        );

        converter.convert("alice").unwrap();
        let files = converter.writer.files();
        assert_eq!(files.get("commits.md").map(String::as_str), Some("commits=2\n"));
    }

    #[test]
    fn late_parser_failure_masks_earlier_success() {
        let mut parsers = ParserRegistry::empty();
        parsers.register(Box::new(UnitParser {
            key: "dup",
            commits: 1,
        }));
        parsers.register(Box::new(FailingParser("dup")));
        let mut formatters = FormatterRegistry::empty();
        formatters.register(Box::new(CommitsFormatter("dup")));

        let converter = Converter::with_registries(
            StaticExtractor::new(RawData::new("seed")),
            MemoryWriter::new(),
            parsers,
            formatters,
        );

        let paths = converter.convert("alice").unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn duplicate_formatters_both_write_last_content_wins() {
        struct LabelFormatter {
            label: &'static str,
        }

        impl SectionFormatter for LabelFormatter {
            fn section_name(&self) -> &'static str {
                "dup"
            }

            fn output_filename(&self) -> &'static str {
                "dup.md"
            }

            fn format(&self, _data: &SectionData) -> Result<String> {
                Ok(format!("{}\n", self.label))
            }
        }

        let mut parsers = ParserRegistry::empty();
        parsers.register(Box::new(UnitParser {
            key: "dup",
            commits: 0,
        }));
        let mut formatters = FormatterRegistry::empty();
        formatters.register(Box::new(LabelFormatter { label: "first" }));
        formatters.register(Box::new(LabelFormatter { label: "second" }));

        let converter = Converter::with_registries(
            StaticExtractor::new(RawData::new("seed")),
            MemoryWriter::new(),
            parsers,
            formatters,
        );

        let paths = converter.convert("alice").unwrap();
        assert_eq!(paths, vec![PathBuf::from("dup.md"), PathBuf::from("dup.md")]);
        assert_eq!(
            converter.writer.files().get("dup.md").map(String::as_str),
            Some("second\n")
        );
    }

    #[test]
    fn blank_formatter_output_is_skipped_silently() {
        struct BlankFormatter;

        impl SectionFormatter for BlankFormatter {
            fn section_name(&self) -> &'static str {
                "dup"
            }

            fn output_filename(&self) -> &'static str {
                "blank.md"
            }

            fn format(&self, _data: &SectionData) -> Result<String> {
                Ok("   \n\t".to_string())
            }
        }

        let mut parsers = ParserRegistry::empty();
        parsers.register(Box::new(UnitParser {
            key: "dup",
            commits: 0,
        }));
        let mut formatters = FormatterRegistry::empty();
        formatters.register(Box::new(BlankFormatter));

        let converter = Converter::with_registries(
            StaticExtractor::new(RawData::new("seed")),
            MemoryWriter::new(),
            parsers,
            formatters,
        );

        let paths = converter.convert("alice").unwrap();
        assert!(paths.is_empty());
        assert!(converter.writer.files().is_empty());
    }
}
