//! Structured-data validation with line/column diagnostics

use crate::attachment::has_suffix;
use regex::Regex;
use serde::de::IgnoredAny;
use std::borrow::Cow;
use std::sync::LazyLock;

static LINE_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)//.*$").unwrap());
static BLOCK_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Number of context lines shown on each side of the offending line
const CONTEXT_LINES: usize = 2;

/// Outcome of validating one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(err) => Some(err),
        }
    }
}

/// Parser failure, optionally located in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Parser diagnostic
    pub message: String,
    /// Byte offset of the failure in the parsed text
    pub position: Option<usize>,
    /// Surrounding lines; present iff `position` is
    pub context: Option<ErrorContext>,
}

/// Location of a parse failure with surrounding lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    pub line_content: String,
    /// Up to two lines before the offending one, in document order
    pub prev_lines: Vec<String>,
    /// Up to two lines after the offending one, in document order
    pub next_lines: Vec<String>,
}

/// Validate `content` as JSON, or JSON with comments when `name` ends in `.json5`.
///
/// Comments are removed by plain text substitution before parsing, and the
/// reported location refers to the stripped text.
pub fn validate(name: &str, content: &str) -> ValidationResult {
    let processed = if has_suffix(name, ".json5") {
        Cow::Owned(strip_comments(content))
    } else {
        Cow::Borrowed(content)
    };

    match serde_json::from_str::<IgnoredAny>(&processed) {
        Ok(_) => ValidationResult::Valid,
        Err(err) => {
            let position = error_offset(&processed, err.line(), err.column());
            let context = position.map(|pos| error_context(&processed, pos));
            ValidationResult::Invalid(ValidationError {
                message: err.to_string(),
                position,
                context,
            })
        }
    }
}

/// Remove `//` line comments, then `/* */` block comments
pub fn strip_comments(content: &str) -> String {
    let without_lines = LINE_COMMENT_RE.replace_all(content, "");
    BLOCK_COMMENT_RE.replace_all(&without_lines, "").into_owned()
}

/// Translate the parser's 1-based line/column into a byte offset.
///
/// Column 0 means the parser stopped on the line break ending the previous line.
fn error_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let mut line_start = 0;
    for _ in 1..line {
        match text[line_start..].find('\n') {
            Some(i) => line_start += i + 1,
            None => return Some(text.len()),
        }
    }

    if column == 0 {
        return Some(line_start.saturating_sub(1));
    }
    Some((line_start + column - 1).min(text.len()))
}

/// Locate `position` in `text` and collect the surrounding lines
pub fn error_context(text: &str, position: usize) -> ErrorContext {
    let mut position = position.min(text.len());
    while !text.is_char_boundary(position) {
        position -= 1;
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut line_start = 0;
    let mut index = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        let span = line.len() + 1;
        if line_start + span > position {
            index = i;
            break;
        }
        line_start += span;
    }

    let column = text[line_start..position].chars().count() + 1;
    let clean = |line: &str| line.trim_end_matches('\r').to_string();

    let prev_lines = lines[index.saturating_sub(CONTEXT_LINES)..index]
        .iter()
        .map(|l| clean(l))
        .collect();
    let next_end = (index + 1 + CONTEXT_LINES).min(lines.len());
    let next_lines = lines[index + 1..next_end].iter().map(|l| clean(l)).collect();

    ErrorContext {
        line: index + 1,
        column,
        line_content: clean(lines[index]),
        prev_lines,
        next_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json() {
        assert_eq!(validate("config.json", r#"{"a":1}"#), ValidationResult::Valid);
    }

    #[test]
    fn test_trailing_comma_is_located() {
        let result = validate("config.json", r#"{"a":1,}"#);
        let err = result.error().expect("trailing comma must be rejected");
        let context = err.context.as_ref().expect("serde reports a location");
        assert_eq!(context.line, 1);
        // the comma sits in column 7, the parser stops on the brace after it
        assert!((7..=8).contains(&context.column), "column {}", context.column);
        assert_eq!(context.line_content, r#"{"a":1,}"#);
        assert!(context.prev_lines.is_empty());
        assert!(context.next_lines.is_empty());
    }

    #[test]
    fn test_json5_comments_are_stripped() {
        let result = validate("config.json5", "{ // comment\n \"a\": 1 }");
        assert!(result.is_valid());

        let block = validate("CONFIG.JSON5", "/* header\n spans lines */ {\"a\": [1, 2]}");
        assert!(block.is_valid());
    }

    #[test]
    fn test_json5_trailing_comma_is_rejected() {
        let result = validate("mod.json5", "{\n  // comment\n  \"enabled\": true,\n}");
        let err = result.error().expect("trailing comma must be rejected");
        let context = err.context.as_ref().expect("serde reports a location");
        assert_eq!(context.line, 4);
        assert_eq!(context.line_content, "}");
    }

    #[test]
    fn test_comments_rejected_in_plain_json() {
        let result = validate("config.json", "{ // comment\n \"a\": 1 }");
        assert!(!result.is_valid());
    }

    #[test]
    fn test_context_lines_clip_at_document_edges() {
        let doc = "{\n  \"a\": 1,\n  \"b\": 2\n  \"c\": 3,\n  \"d\": 4\n}";
        let result = validate("pack.json", doc);
        let context = result.error().unwrap().context.clone().unwrap();
        assert_eq!(context.line, 4);
        assert_eq!(context.line_content, "  \"c\": 3,");
        assert_eq!(context.prev_lines, vec!["  \"a\": 1,", "  \"b\": 2"]);
        assert_eq!(context.next_lines, vec!["  \"d\": 4", "}"]);
    }

    #[test]
    fn test_error_on_first_line_has_no_previous_lines() {
        let result = validate("a.json", "{x}\n\n");
        let context = result.error().unwrap().context.clone().unwrap();
        assert_eq!(context.line, 1);
        assert!(context.prev_lines.is_empty());
        assert_eq!(context.next_lines, vec!["", ""]);
    }

    #[test]
    fn test_position_is_consistent_with_context() {
        let doc = "{\n  \"a\": tru\n}";
        let err = validate("a.json", doc).error().cloned().unwrap();
        let position = err.position.unwrap();
        let context = err.context.unwrap();
        assert_eq!(context, error_context(doc, position));
        assert_eq!(context.line, 2);
    }

    #[test]
    fn test_location_refers_to_stripped_text() {
        // the block comment spans two lines which are gone after stripping
        let doc = "/* one\n two */\n{\n  \"a\": ,\n}";
        let context = validate("a.json5", doc)
            .error()
            .and_then(|e| e.context.clone())
            .unwrap();
        assert_eq!(context.line, 3);
        assert_eq!(context.line_content, "  \"a\": ,");
    }

    #[test]
    fn test_error_context_counts_characters() {
        let text = "{\"ä\": x}";
        let position = text.find('x').unwrap();
        let context = error_context(text, position);
        assert_eq!(context.column, 7);
    }

    #[test]
    fn test_error_context_at_end_of_document() {
        let text = "{\n\"a\": 1";
        let context = error_context(text, text.len());
        assert_eq!(context.line, 2);
        assert_eq!(context.column, 7);
        assert_eq!(context.prev_lines, vec!["{"]);
    }

    #[test]
    fn test_crlf_is_trimmed_from_context() {
        let result = validate("a.json", "{\r\n  \"a\": 1,\r\n}");
        let context = result.error().unwrap().context.clone().unwrap();
        assert!(!context.line_content.ends_with('\r'));
        assert!(context.prev_lines.iter().all(|l| !l.ends_with('\r')));
    }

    #[test]
    fn test_empty_document_is_invalid() {
        let result = validate("a.json", "");
        assert!(!result.is_valid());
    }
}
