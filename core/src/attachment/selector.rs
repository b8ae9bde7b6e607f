//! Resolve which attachment of a message a command should work on

use super::{AttachmentCandidate, SelectionOutcome, SelectionPolicy};
use crate::error::{EndermiteError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// One choice offered to the invoking user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionControl {
    /// Attachment id
    pub key: String,
    pub label: String,
    /// Disabled controls only explain why an attachment was skipped
    pub enabled: bool,
}

/// Transient UI used to ask the invoker which attachment they meant.
///
/// Implementations only report activations from the invoking user on an
/// enabled control; everything else is filtered out before `await_choice`
/// returns.
#[async_trait]
pub trait SelectionPrompt: Send {
    /// Show the controls
    async fn present(&mut self, controls: &[SelectionControl]) -> Result<()>;

    /// Wait for the invoker to pick an enabled control, `None` on timeout
    async fn await_choice(&mut self, timeout: Duration) -> Result<Option<String>>;

    /// Replace the prompt once a choice has been made
    async fn acknowledge(&mut self, key: &str) -> Result<()>;

    /// Tear the prompt down after the timeout elapsed
    async fn expire(&mut self) -> Result<()>;
}

/// Pick the attachment to work on, asking the invoker when it is ambiguous
pub async fn select<P>(
    candidates: &[AttachmentCandidate],
    policy: &SelectionPolicy,
    prompt: &mut P,
) -> Result<SelectionOutcome>
where
    P: SelectionPrompt + ?Sized,
{
    let partition = policy.partition(candidates);

    match partition.eligible.len() {
        0 if partition.has_oversized() => return Ok(SelectionOutcome::OversizedOnly),
        0 => return Ok(SelectionOutcome::NoneEligible),
        1 => return Ok(SelectionOutcome::Chosen(partition.eligible[0].clone())),
        n if n > policy.max_candidates => {
            debug!("{} eligible attachments, not offering a choice", n);
            return Ok(SelectionOutcome::TooManyCandidates);
        }
        n => debug!("asking invoker to choose between {} attachments", n),
    }

    prompt.present(&partition.controls()).await?;

    let Some(key) = prompt.await_choice(policy.timeout).await? else {
        prompt.expire().await?;
        return Ok(SelectionOutcome::TimedOut);
    };

    let chosen = partition
        .eligible
        .into_iter()
        .find(|c| c.id == key)
        .ok_or_else(|| EndermiteError::Other(format!("selection returned unknown attachment {}", key)))?;

    prompt.acknowledge(&key).await?;
    Ok(SelectionOutcome::Chosen(chosen))
}
