//! message context-menu commands

use super::components::AttachmentPrompt;
use super::util::{CANT_JOIN, candidates, join_thread, resolve_channel, resolve_message};
use super::{Data, DiscordError};
use crate::attachment::SelectionPolicy;
use crate::error::{ChannelError, Result};
use crate::pipeline::support::{NOT_AN_ISSUE, linked_issue};
use crate::pipeline::{
    self, PasteOutcome, SupportThread, ValidateOutcome, WRONG_GITHUB_CHANNEL, plan_support_thread,
};
use crate::types::{ChannelKind, MessageAction};
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

type Context<'a> = poise::Context<'a, Data, DiscordError>;

/// Channels the commands may be used in
const MESSAGE_CHANNELS: &[ChannelKind] = &[ChannelKind::Text, ChannelKind::Thread];

/// Immediate ephemeral reply, before anything was deferred
async fn reply_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::CommandInteraction,
    text: &str,
) -> Result<()> {
    interaction
        .create_response(
            ctx,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Replace the deferred reply, dropping any buttons
async fn edit_reply(
    ctx: &serenity::Context,
    interaction: &serenity::CommandInteraction,
    text: &str,
) -> Result<()> {
    interaction
        .edit_response(
            ctx,
            serenity::EditInteractionResponse::new()
                .content(text)
                .components(vec![]),
        )
        .await?;
    Ok(())
}

/// Public reply under `message` that does not ping its author
async fn reply_public(
    ctx: &serenity::Context,
    channel: &serenity::GuildChannel,
    message: &serenity::Message,
    text: &str,
) -> Result<()> {
    channel
        .id
        .send_message(
            ctx,
            serenity::CreateMessage::new()
                .content(text)
                .reference_message(message)
                .allowed_mentions(serenity::CreateAllowedMentions::new().replied_user(false)),
        )
        .await?;
    Ok(())
}

/// Resolve the invoking channel and the target message within it
async fn target(
    ctx: &serenity::Context,
    interaction: &serenity::CommandInteraction,
    message_id: serenity::MessageId,
) -> std::result::Result<(serenity::GuildChannel, serenity::Message), ChannelError> {
    let channel = resolve_channel(ctx, interaction.channel_id.get(), MESSAGE_CHANNELS).await?;
    let message = resolve_message(ctx, &channel, message_id).await?;
    Ok((channel, message))
}

/// create a paste from an attachment of the message
#[poise::command(context_menu_command = "Create Paste", guild_only)]
pub async fn create_paste(
    ctx: Context<'_>,
    msg: serenity::Message,
) -> std::result::Result<(), DiscordError> {
    let poise::Context::Application(app) = ctx else {
        return Ok(());
    };
    let interaction = app.interaction;
    let sctx = ctx.serenity_context();
    let data = ctx.data();
    let action = MessageAction::CreatePaste;

    let (channel, message) = match target(sctx, interaction, msg.id).await {
        Ok(found) => found,
        Err(e) => {
            let text = format!("Can't {}: No message selected: {}", action.verb(), e);
            return reply_ephemeral(sctx, interaction, &text).await;
        }
    };

    interaction.defer_ephemeral(sctx).await?;
    if !join_thread(sctx, &channel).await {
        return edit_reply(sctx, interaction, CANT_JOIN).await;
    }

    let policy = SelectionPolicy::paste(
        data.config.paste.max_size_bytes,
        data.config.selection_timeout(),
    );
    let mut prompt = AttachmentPrompt::new(sctx, interaction, &data.selections, action);

    let outcome = pipeline::create_paste(
        &candidates(&message),
        &policy,
        &mut prompt,
        data.fetcher.as_ref(),
        data.publisher.as_ref(),
    )
    .await?;

    match outcome {
        PasteOutcome::Published { file_name, artifact } => {
            info!("{} pasted {} from message {}", interaction.user.name, file_name, message.id);
            reply_public(sctx, &channel, &message, &PasteOutcome::public_reply(&artifact)).await?;
            edit_reply(sctx, interaction, &PasteOutcome::delete_notice(&artifact)).await
        }
        PasteOutcome::Failed(failure) => {
            debug!("paste from message {} ended with {:?}", message.id, failure);
            edit_reply(sctx, interaction, &failure.message(action)).await
        }
    }
}

/// validate a json or json5 attachment of the message
#[poise::command(context_menu_command = "Validate Config", guild_only)]
pub async fn validate_config(
    ctx: Context<'_>,
    msg: serenity::Message,
) -> std::result::Result<(), DiscordError> {
    let poise::Context::Application(app) = ctx else {
        return Ok(());
    };
    let interaction = app.interaction;
    let sctx = ctx.serenity_context();
    let data = ctx.data();
    let action = MessageAction::ValidateConfig;

    let (channel, message) = match target(sctx, interaction, msg.id).await {
        Ok(found) => found,
        Err(e) => {
            let text = format!("Can't {}: No message selected: {}", action.verb(), e);
            return reply_ephemeral(sctx, interaction, &text).await;
        }
    };

    interaction.defer_ephemeral(sctx).await?;
    if !join_thread(sctx, &channel).await {
        return edit_reply(sctx, interaction, CANT_JOIN).await;
    }

    let policy = SelectionPolicy::config(data.config.selection_timeout());
    let mut prompt = AttachmentPrompt::new(sctx, interaction, &data.selections, action);

    let outcome = pipeline::validate_attachment(
        &candidates(&message),
        &policy,
        &mut prompt,
        data.fetcher.as_ref(),
    )
    .await?;

    match outcome.report() {
        Some(report) => {
            reply_public(sctx, &channel, &message, &report).await?;
            interaction.delete_response(sctx).await?;
            Ok(())
        }
        None => {
            let ValidateOutcome::Failed(failure) = outcome else {
                return Ok(());
            };
            edit_reply(sctx, interaction, &failure.message(action)).await
        }
    }
}

/// open a support thread for the github issue linked by the message
#[poise::command(context_menu_command = "Open Support Thread", guild_only)]
pub async fn open_support_thread(
    ctx: Context<'_>,
    msg: serenity::Message,
) -> std::result::Result<(), DiscordError> {
    let poise::Context::Application(app) = ctx else {
        return Ok(());
    };
    let interaction = app.interaction;
    let sctx = ctx.serenity_context();
    let data = ctx.data();
    let action = MessageAction::OpenSupportThread;

    if interaction.channel_id.get() != data.config.github_channel {
        return reply_ephemeral(sctx, interaction, WRONG_GITHUB_CHANNEL).await;
    }

    let (_, message) = match target(sctx, interaction, msg.id).await {
        Ok(found) => found,
        Err(e) => {
            let text = format!("Can't {}: No message selected: {}", action.verb(), e);
            return reply_ephemeral(sctx, interaction, &text).await;
        }
    };

    let embed_url = message.embeds.first().and_then(|embed| embed.url.as_deref());
    let Some((issue, issue_url)) = linked_issue(embed_url) else {
        return reply_ephemeral(sctx, interaction, NOT_AN_ISSUE).await;
    };

    interaction.defer_ephemeral(sctx).await?;

    let forum = match resolve_channel(sctx, data.config.support_forum, &[ChannelKind::Forum]).await {
        Ok(forum) => forum,
        Err(e) => {
            return edit_reply(sctx, interaction, &format!("Can't {}: {}", action.verb(), e)).await;
        }
    };

    let thread = plan_support_thread(
        &issue,
        &issue_url,
        interaction.user.id.get(),
        &message.link(),
        data.github.as_ref(),
    )
    .await;

    let post = forum
        .id
        .create_forum_post(
            sctx,
            serenity::CreateForumPost::new(
                thread.title,
                serenity::CreateMessage::new().content(thread.opening_message),
            ),
        )
        .await?;
    info!("opened support thread {} for {}", post.id, issue);

    edit_reply(sctx, interaction, &SupportThread::notice(post.id.get())).await
}
