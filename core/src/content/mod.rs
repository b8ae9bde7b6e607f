//! Content inspection for attachments: validation, formatting and reports

pub mod formatter;
pub mod report;
pub mod validator;

pub use formatter::format;
pub use report::render as render_report;
pub use validator::{ErrorContext, ValidationError, ValidationResult, strip_comments, validate};
