//! channel and message lookup helpers

use crate::attachment::AttachmentCandidate;
use crate::error::ChannelError;
use crate::types::ChannelKind;
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

/// Reply when a thread cannot be joined
pub const CANT_JOIN: &str = "I can't join here.";

/// Map a discord channel type onto the kinds the bot distinguishes
pub fn channel_kind(kind: serenity::ChannelType) -> ChannelKind {
    match kind {
        serenity::ChannelType::Text => ChannelKind::Text,
        serenity::ChannelType::PublicThread => ChannelKind::Thread,
        serenity::ChannelType::Forum => ChannelKind::Forum,
        _ => ChannelKind::Other,
    }
}

fn describe_kinds(allowed: &[ChannelKind]) -> String {
    allowed
        .iter()
        .map(ChannelKind::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Fetch a guild channel and check it is one of `allowed`
pub async fn resolve_channel(
    ctx: &serenity::Context,
    id: u64,
    allowed: &[ChannelKind],
) -> Result<serenity::GuildChannel, ChannelError> {
    if id == 0 {
        return Err(ChannelError::NotProvided);
    }

    let channel = serenity::ChannelId::new(id).to_channel(ctx).await.map_err(|e| {
        debug!("channel {} lookup failed: {}", id, e);
        ChannelError::NotFound(id)
    })?;

    let serenity::Channel::Guild(channel) = channel else {
        return Err(ChannelError::WrongKind {
            id,
            expected: describe_kinds(allowed),
            actual: ChannelKind::Other,
        });
    };

    let actual = channel_kind(channel.kind);
    if !allowed.contains(&actual) {
        return Err(ChannelError::WrongKind {
            id,
            expected: describe_kinds(allowed),
            actual,
        });
    }
    Ok(channel)
}

/// Fetch a message by id within `channel`
pub async fn resolve_message(
    ctx: &serenity::Context,
    channel: &serenity::GuildChannel,
    id: serenity::MessageId,
) -> Result<serenity::Message, ChannelError> {
    channel.id.message(ctx, id).await.map_err(|e| {
        debug!("message {} lookup failed: {}", id, e);
        ChannelError::MessageNotFound(id.get())
    })
}

/// Join `channel` if it is a thread; false when that fails
pub async fn join_thread(ctx: &serenity::Context, channel: &serenity::GuildChannel) -> bool {
    if channel_kind(channel.kind) != ChannelKind::Thread {
        return true;
    }
    match channel.id.join_thread(ctx).await {
        Ok(()) => true,
        Err(e) => {
            warn!("failed to join thread {}: {}", channel.id, e);
            false
        }
    }
}

/// Snapshot a message's attachments
pub fn candidates(message: &serenity::Message) -> Vec<AttachmentCandidate> {
    message
        .attachments
        .iter()
        .map(|a| {
            AttachmentCandidate::new(
                a.id.to_string(),
                a.filename.clone(),
                a.url.clone(),
                u64::from(a.size),
            )
        })
        .collect()
}
