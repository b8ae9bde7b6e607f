//! Chat rendering of validation results

use super::validator::{ErrorContext, ValidationError, ValidationResult};

/// Discord's per-message character limit
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Widest slice of a source line shown in a diagnostic
const MAX_CONTEXT_WIDTH: usize = 80;

/// Render the reply posted for a validated attachment
pub fn render(name: &str, result: &ValidationResult) -> String {
    match result {
        ValidationResult::Valid => truncate_chars(
            &format!(":white_check_mark: `{}` is valid", name),
            MAX_MESSAGE_LENGTH,
        ),
        ValidationResult::Invalid(err) => render_error(name, err),
    }
}

/// Fences around the parser message
const MESSAGE_FENCES: &str = "```\n\n```\n";

fn render_error(name: &str, error: &ValidationError) -> String {
    let header = format!(":x: `{}` is invalid\n", name);
    let mut location = error
        .context
        .as_ref()
        .map(|context| {
            format!(
                "**Error at line {}, column {}:**\n```json\n{}```",
                context.line,
                context.column,
                render_context(context)
            )
        })
        .unwrap_or_default();

    // the parser message gives way first so every fence stays closed
    let fixed = |location: &str| {
        header.chars().count() + MESSAGE_FENCES.chars().count() + location.chars().count()
    };
    if fixed(&location) >= MAX_MESSAGE_LENGTH {
        location.clear();
    }
    let budget = MAX_MESSAGE_LENGTH.saturating_sub(fixed(&location));
    let message = truncate_chars(&error.message, budget);

    format!("{}```\n{}\n```\n{}", header, message, location)
}

/// Numbered source excerpt with a caret under the offending column
pub fn render_context(context: &ErrorContext) -> String {
    let max_line = context.line + context.next_lines.len();
    let width = max_line.to_string().len();

    let shown = context
        .prev_lines
        .iter()
        .chain(std::iter::once(&context.line_content))
        .chain(context.next_lines.iter());
    let start = window_start(shown, context.column);

    let mut out = String::new();
    let first_prev = context.line - context.prev_lines.len();
    for (i, line) in context.prev_lines.iter().enumerate() {
        push_line(&mut out, first_prev + i, width, line, start);
    }

    push_line(&mut out, context.line, width, &context.line_content, start);
    let caret = width + 3 + context.column.saturating_sub(1 + start);
    out.push_str(&format!("{}^ Error occurs here\n", " ".repeat(caret)));

    for (i, line) in context.next_lines.iter().enumerate() {
        push_line(&mut out, context.line + i + 1, width, line, start);
    }

    out
}

fn push_line(out: &mut String, number: usize, width: usize, line: &str, start: usize) {
    let visible: String = line.chars().skip(start).take(MAX_CONTEXT_WIDTH).collect();
    out.push_str(&format!("{:>width$} | {}\n", number, visible, width = width));
}

/// First visible character so that the column stays on screen
fn window_start<'a>(lines: impl Iterator<Item = &'a String>, column: usize) -> usize {
    let longest = lines.map(|l| l.chars().count()).max().unwrap_or(0);
    if longest <= MAX_CONTEXT_WIDTH {
        return 0;
    }
    let start = column.saturating_sub(1 + MAX_CONTEXT_WIDTH / 2);
    start.min(longest - MAX_CONTEXT_WIDTH)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}
