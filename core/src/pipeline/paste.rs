//! "Create Paste": attachment to hosted paste

use super::{PipelineFailure, chosen, download};
use crate::attachment::{
    AttachmentCandidate, AttachmentFetcher, SelectionPolicy, SelectionPrompt, select,
};
use crate::content;
use crate::error::Result;
use crate::paste::{PasteArtifact, PastePublisher};
use tracing::{info, warn};

/// How a paste invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    Published {
        file_name: String,
        artifact: PasteArtifact,
    },
    Failed(PipelineFailure),
}

impl PasteOutcome {
    /// Public reply posted under the source message
    pub fn public_reply(artifact: &PasteArtifact) -> String {
        format!(":page_facing_up: <{}>", artifact.view_url)
    }

    /// Private notice carrying the deletion link
    pub fn delete_notice(artifact: &PasteArtifact) -> String {
        format!("**Delete paste**: <{}>", artifact.delete_url)
    }
}

/// Select an attachment, format it and publish it
pub async fn create_paste<P, F, B>(
    candidates: &[AttachmentCandidate],
    policy: &SelectionPolicy,
    prompt: &mut P,
    fetcher: &F,
    publisher: &B,
) -> Result<PasteOutcome>
where
    P: SelectionPrompt + ?Sized,
    F: AttachmentFetcher + ?Sized,
    B: PastePublisher + ?Sized,
{
    let candidate = match chosen(select(candidates, policy, prompt).await?) {
        Ok(candidate) => candidate,
        Err(failure) => return Ok(PasteOutcome::Failed(failure)),
    };

    let text = match download(fetcher, &candidate).await {
        Ok(text) => text,
        Err(failure) => return Ok(PasteOutcome::Failed(failure)),
    };

    let formatted = content::format(&candidate.file_name, &text);

    match publisher.publish(Some(&candidate.file_name), &formatted).await {
        Ok(artifact) => {
            info!("pasted {} as {}", candidate.file_name, artifact.view_url);
            Ok(PasteOutcome::Published {
                file_name: candidate.file_name,
                artifact,
            })
        }
        Err(e) => {
            warn!("failed to create paste for {}: {}", candidate.file_name, e);
            Ok(PasteOutcome::Failed(PipelineFailure::PublishFailed))
        }
    }
}
