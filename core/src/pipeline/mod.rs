//! Per-feature pipelines run by the message context-menu commands
//!
//! Each pipeline goes from a message's attachments to a user-facing result.
//! Everything a user can cause (no attachment, wrong type, no click, a remote
//! service being down) ends as a [`PipelineFailure`] value with its own text.
//! Only platform faults surface as errors.

pub mod paste;
pub mod support;
pub mod validate;

pub use paste::{PasteOutcome, create_paste};
pub use support::{SupportThread, plan_support_thread};
pub use validate::{ValidateOutcome, validate_attachment};

use crate::attachment::{AttachmentCandidate, AttachmentFetcher, SelectionOutcome};
use crate::types::MessageAction;
use tracing::warn;

/// Reply when "Open Support Thread" is used outside the GitHub channel
pub const WRONG_GITHUB_CHANNEL: &str = "You're not in the correct GitHub channel.";

/// Terminal, user-caused or remote-caused end of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineFailure {
    NoneEligible,
    OversizedOnly,
    TooManyCandidates,
    TimedOut,
    FetchFailed,
    PublishFailed,
}

impl PipelineFailure {
    /// Text shown to the invoker
    pub fn message(self, action: MessageAction) -> String {
        match self {
            PipelineFailure::NoneEligible => {
                format!("Can't {}: No suitable attachment found.", action.verb())
            }
            PipelineFailure::OversizedOnly => {
                format!("Can't {}: The attachment is too large.", action.verb())
            }
            PipelineFailure::TooManyCandidates => {
                "Too many files. Unable to create buttons for selection. Please do it yourself, sorry <3"
                    .to_string()
            }
            PipelineFailure::TimedOut => "No file was selected in time. Please try again.".to_string(),
            PipelineFailure::FetchFailed => {
                format!("Can't {}: Failed to download the attachment.", action.verb())
            }
            PipelineFailure::PublishFailed => "Failed to create paste.".to_string(),
        }
    }
}

/// The chosen attachment, or why there is none
pub fn chosen(outcome: SelectionOutcome) -> Result<AttachmentCandidate, PipelineFailure> {
    match outcome {
        SelectionOutcome::Chosen(candidate) => Ok(candidate),
        SelectionOutcome::NoneEligible => Err(PipelineFailure::NoneEligible),
        SelectionOutcome::OversizedOnly => Err(PipelineFailure::OversizedOnly),
        SelectionOutcome::TooManyCandidates => Err(PipelineFailure::TooManyCandidates),
        SelectionOutcome::TimedOut => Err(PipelineFailure::TimedOut),
    }
}

/// Download an attachment's text, mapping any failure to [`PipelineFailure::FetchFailed`]
async fn download<F>(fetcher: &F, candidate: &AttachmentCandidate) -> Result<String, PipelineFailure>
where
    F: AttachmentFetcher + ?Sized,
{
    fetcher.fetch_text(&candidate.source_url).await.map_err(|e| {
        warn!("failed to download {}: {}", candidate.file_name, e);
        PipelineFailure::FetchFailed
    })
}
