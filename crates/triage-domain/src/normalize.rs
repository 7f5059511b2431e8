//! Ingestion normalization
//!
//! Canonical forms for the free-text pieces of a Signal Set. Every function
//! here is idempotent: normalizing an already-normalized value is a no-op.

use regex::Regex;
use std::sync::LazyLock;

static LINE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[,\s]*\bline\s+\d+\b").unwrap());

/// `:line[:column]` right after a file extension; `host:port` has none
static LINE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.[A-Za-z][A-Za-z0-9]{0,5}):\d+(?::\d+)?\b").unwrap());

static TRAILING_LINE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\d+(?::\d+)?$").unwrap());

static STEP_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?:step\s+)?\d+\s*[.):-]|[-*•>])\s*").unwrap());

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical label form: trimmed, lower-cased, inner whitespace collapsed
pub fn normalize_label(label: &str) -> String {
    collapse_whitespace(&label.to_lowercase())
}

/// Canonical error signature: lower-cased with line and column numbers removed
///
/// `"NullPointerException at Foo.bar(Foo.java:42)"` and
/// `"NullPointerException at Foo.bar(Foo.java:57)"` normalize to the same value.
pub fn normalize_error_signature(signature: &str) -> String {
    let without_words = LINE_WORD.replace_all(signature, "");
    let without_suffixes = LINE_SUFFIX.replace_all(&without_words, "$1");
    collapse_whitespace(&without_suffixes.to_lowercase())
}

/// Strip a trailing `:line` or `:line:column` from a file reference
pub fn strip_line_suffix(file: &str) -> String {
    TRAILING_LINE_SUFFIX.replace(file.trim(), "").into_owned()
}

/// Canonical reproduction step: numbering and bullets removed, lower-cased
pub fn normalize_step(step: &str) -> String {
    let lowered = collapse_whitespace(&step.to_lowercase());
    let stripped = STEP_BULLET.replace(&lowered, "");
    stripped.trim_end_matches(['.', ';', ':']).trim().to_string()
}

/// The action keyword of a normalized step (its leading word)
pub fn action_keyword(step: &str) -> Option<&str> {
    step.split_whitespace().next()
}

/// Lower-cased word tokens of a text, punctuation removed
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Canonical release identifier: trimmed, lower-cased, leading `v` dropped
pub fn normalize_version(version: &str) -> String {
    let lowered = version.trim().to_lowercase();
    match lowered.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest.to_string(),
        _ => lowered,
    }
}
