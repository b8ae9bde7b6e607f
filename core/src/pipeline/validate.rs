//! "Validate Config": attachment to validation report

use super::{PipelineFailure, chosen, download};
use crate::attachment::{
    AttachmentCandidate, AttachmentFetcher, SelectionPolicy, SelectionPrompt, select,
};
use crate::content::{self, ValidationResult};
use crate::error::Result;
use tracing::debug;

/// How a validation invocation ended
#[derive(Debug, Clone, PartialEq)]
pub enum ValidateOutcome {
    Checked {
        file_name: String,
        result: ValidationResult,
    },
    Failed(PipelineFailure),
}

impl ValidateOutcome {
    /// Reply posted under the source message, if the file was checked
    pub fn report(&self) -> Option<String> {
        match self {
            ValidateOutcome::Checked { file_name, result } => {
                Some(content::render_report(file_name, result))
            }
            ValidateOutcome::Failed(_) => None,
        }
    }
}

/// Select a config attachment and validate it
pub async fn validate_attachment<P, F>(
    candidates: &[AttachmentCandidate],
    policy: &SelectionPolicy,
    prompt: &mut P,
    fetcher: &F,
) -> Result<ValidateOutcome>
where
    P: SelectionPrompt + ?Sized,
    F: AttachmentFetcher + ?Sized,
{
    let candidate = match chosen(select(candidates, policy, prompt).await?) {
        Ok(candidate) => candidate,
        Err(failure) => return Ok(ValidateOutcome::Failed(failure)),
    };

    let text = match download(fetcher, &candidate).await {
        Ok(text) => text,
        Err(failure) => return Ok(ValidateOutcome::Failed(failure)),
    };

    let result = content::validate(&candidate.file_name, &text);
    debug!(
        "validated {}: {}",
        candidate.file_name,
        if result.is_valid() { "valid" } else { "invalid" }
    );

    Ok(ValidateOutcome::Checked {
        file_name: candidate.file_name,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::SelectionControl;
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoPrompt;

    #[async_trait]
    impl SelectionPrompt for NoPrompt {
        async fn present(&mut self, _controls: &[SelectionControl]) -> Result<()> {
            Ok(())
        }
        async fn await_choice(&mut self, _timeout: Duration) -> Result<Option<String>> {
            Ok(None)
        }
        async fn acknowledge(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
        async fn expire(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl AttachmentFetcher for StaticFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn policy() -> SelectionPolicy {
        SelectionPolicy::config(Duration::from_secs(30))
    }

    fn config_file(name: &str) -> AttachmentCandidate {
        AttachmentCandidate::new("1", name, format!("https://cdn.example/{}", name), 10)
    }

    #[tokio::test]
    async fn test_valid_config() {
        let outcome = validate_attachment(
            &[config_file("mod.json")],
            &policy(),
            &mut NoPrompt,
            &StaticFetcher("{\"a\": 1}"),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome.report().as_deref(),
            Some(":white_check_mark: `mod.json` is valid")
        );
    }

    #[tokio::test]
    async fn test_json5_comments_are_accepted() {
        let outcome = validate_attachment(
            &[config_file("mod.json5")],
            &policy(),
            &mut NoPrompt,
            &StaticFetcher("{ // comment\n \"a\": 1 }"),
        )
        .await
        .unwrap();

        let ValidateOutcome::Checked { result, .. } = outcome else {
            panic!("expected a checked file");
        };
        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn test_invalid_config_report() {
        let outcome = validate_attachment(
            &[config_file("mod.json")],
            &policy(),
            &mut NoPrompt,
            &StaticFetcher("{\n  \"a\": 1,\n}"),
        )
        .await
        .unwrap();

        let report = outcome.report().unwrap();
        assert!(report.starts_with(":x: `mod.json` is invalid\n"));
        assert!(report.contains("**Error at line 3, column "));
        assert!(report.contains("^ Error occurs here"));
    }

    #[tokio::test]
    async fn test_wrong_type_is_not_checked() {
        let outcome = validate_attachment(
            &[config_file("mod.toml")],
            &policy(),
            &mut NoPrompt,
            &StaticFetcher("a = 1"),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ValidateOutcome::Failed(PipelineFailure::NoneEligible));
        assert!(outcome.report().is_none());
    }
}
