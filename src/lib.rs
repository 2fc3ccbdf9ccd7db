//! `gh2md` - GitHub profile to Markdown exporter
//!
//! # Features
//!
//! - **Sectioned pipeline**: profile, repositories, and contributions are
//!   parsed and rendered independently, so one bad section never costs the rest
//! - **`gh` CLI extraction**: all platform access goes through the locally
//!   installed GitHub CLI, which owns authentication and transport
//! - **Injection hardening**: URL scheme allow-listing and markdown escaping
//!   for untrusted remote text
//! - **Traversal-safe output**: filename validation plus canonical-path
//!   containment before anything touches the filesystem
//!
//! # Example
//!
//! ```rust
//! use gh2md::{Converter, MemoryWriter, RawData, StaticExtractor};
//!
//! # fn main() -> anyhow::Result<()> {
//! let extractor = StaticExtractor::new(RawData::new("octocat"));
//! let converter = Converter::new(extractor, MemoryWriter::new());
//!
//! let files = converter.convert("octocat")?;
//! assert_eq!(files.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod extract;
pub mod markdown;
pub mod section;
pub mod writer;

pub use convert::Converter;
pub use extract::{DataExtractor, ExtractError, GhExtractor, RawData, StaticExtractor};
pub use section::{
    FormatterRegistry, ParserRegistry, SectionData, SectionFormatter, SectionParser,
};
pub use writer::{MarkdownWriter, MemoryWriter, OutputWriter, WriteError};

/// Version of gh2md
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
