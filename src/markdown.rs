//! Markdown text-safety helpers shared by every section formatter.
//!
//! All section output is assembled from remote-controlled text (names, bios,
//! repository descriptions, URLs), so the formatters route display text
//! through the helpers here instead of interpolating it raw:
//!
//! - [`escape`] keeps pipes and newlines from corrupting table-like output
//! - [`sanitize_url`] rejects everything but `http`/`https`/`mailto` links,
//!   which blocks `javascript:`/`data:`/`file:` injection outright
//! - [`link`] degrades to bare text whenever a URL fails sanitization
//! - [`truncate`] caps display text at a fixed width

use url::Url;

/// Default display width for truncated text.
pub const DEFAULT_TRUNCATE_LEN: usize = 100;

/// URL schemes allowed to appear in generated markdown links.
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Escape text destined for markdown prose or table cells.
///
/// Pipes become `\|`, newlines collapse to spaces, carriage returns are
/// dropped.
pub fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

/// Sanitize a URL for inclusion in a markdown link.
///
/// Returns the empty string when the URL does not parse or its scheme is
/// outside the allow-list. Survivors get `)`, `[`, and `]` percent-encoded
/// so they cannot break out of `[text](url)` syntax. The original spelling
/// is preserved otherwise; no normalization is applied.
pub fn sanitize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return String::new(),
    };
    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return String::new();
    }

    url.replace(')', "%29").replace('[', "%5B").replace(']', "%5D")
}

/// Build a markdown link, falling back to bare text when the URL is absent
/// or fails sanitization. Never fails.
pub fn link(text: &str, url: Option<&str>) -> String {
    let url = match url {
        Some(url) if !url.is_empty() => url,
        _ => return text.to_string(),
    };

    let safe = sanitize_url(url);
    if safe.is_empty() {
        text.to_string()
    } else {
        format!("[{text}]({safe})")
    }
}

/// Truncate display text to `max_len` characters, ellipsis included.
///
/// Counts `char`s rather than bytes so multibyte text cannot panic a slice.
/// A string at or under the limit comes back unchanged; a truncated result
/// is exactly `max_len` characters ending in `...`.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let mut out: String = text.chars().take(max_len.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// [`truncate`] at [`DEFAULT_TRUNCATE_LEN`].
pub fn truncate_default(text: &str) -> String {
    truncate(text, DEFAULT_TRUNCATE_LEN)
}

/// Icon for a pull-request state; unknown states render as `?`.
pub fn pr_state_icon(state: &str) -> &'static str {
    match state {
        "MERGED" => "\u{2705}",
        "OPEN" => "\u{1F504}",
        "CLOSED" => "\u{274C}",
        _ => "?",
    }
}

/// Icon for an issue state; unknown states render as `?`.
pub fn issue_state_icon(state: &str) -> &'static str {
    match state {
        "OPEN" => "\u{1F7E2}",
        "CLOSED" => "\u{1F7E3}",
        _ => "?",
    }
}

/// Trailer line for capped lists: `*...and N more repositories*`.
///
/// Empty when nothing was elided.
pub fn more_line(shown: usize, total: usize, noun: &str) -> String {
    let remaining = total.saturating_sub(shown);
    if remaining == 0 {
        return String::new();
    }
    format!("\n*...and {remaining} more {noun}*\n")
}
