//! Best-effort pretty printing of pasted files

use crate::attachment::has_suffix;
use serde_json::Value;

/// Pretty-print `.json` files with two-space indentation.
///
/// Anything else, and any JSON that fails to parse, is returned unchanged.
pub fn format(name: &str, content: &str) -> String {
    if !has_suffix(name, ".json") {
        return content.to_string();
    }

    serde_json::from_str::<Value>(content)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| content.to_string())
}
