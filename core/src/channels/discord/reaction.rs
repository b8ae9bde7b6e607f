//! role message setup and role updates for reaction roles

use super::util::resolve_channel;
use crate::config::{BotConfig, save_config};
use crate::error::{ChannelError, Result};
use crate::roles::{
    ROLE_EMBED_COLOR, ROLE_EMBED_FOOTER, ROLE_EMBED_TITLE, ReactionRoles, RoleGateway,
    describe_binding,
};
use crate::types::ChannelKind;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Placeholder content of a freshly created role message
const PLACEHOLDER: &str = "Setting up reaction roles...";

/// Audit log reason for role updates
const AUDIT_REASON: &str = "Reaction role";

/// Grants and revokes roles over the discord REST API
pub struct SerenityRoleGateway {
    http: Arc<serenity::Http>,
}

impl SerenityRoleGateway {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RoleGateway for SerenityRoleGateway {
    async fn grant(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<()> {
        self.http
            .add_member_role(
                serenity::GuildId::new(guild_id),
                serenity::UserId::new(user_id),
                serenity::RoleId::new(role_id),
                Some(AUDIT_REASON),
            )
            .await?;
        Ok(())
    }

    async fn revoke(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<()> {
        self.http
            .remove_member_role(
                serenity::GuildId::new(guild_id),
                serenity::UserId::new(user_id),
                serenity::RoleId::new(role_id),
                Some(AUDIT_REASON),
            )
            .await?;
        Ok(())
    }
}

/// Fetch the role message, creating it and saving its id when the config has none
async fn role_message(
    ctx: &serenity::Context,
    config: &mut BotConfig,
    config_path: &Path,
) -> Result<serenity::Message> {
    let channel = resolve_channel(ctx, config.role_channel, &[ChannelKind::Text]).await?;

    if let Some(id) = config.role_message.filter(|id| *id != 0) {
        return channel
            .id
            .message(ctx, serenity::MessageId::new(id))
            .await
            .map_err(|_| ChannelError::MessageNotFound(id).into());
    }

    let message = channel
        .id
        .send_message(ctx, serenity::CreateMessage::new().content(PLACEHOLDER))
        .await?;
    config.role_message = Some(message.id.get());
    save_config(config_path, config).await?;
    info!("created role message {} and saved it to {}", message.id, config_path.display());
    Ok(message)
}

/// Run `react` for every item, keeping only those it succeeded for
async fn keep_reacted<T, F, Fut>(items: Vec<T>, mut react: F) -> Vec<T>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        match react(&item).await {
            Ok(()) => kept.push(item),
            Err(e) => warn!("failed to react to role message: {}", e),
        }
    }
    kept
}

/// Prepare the role message: react with every bound emoji and rewrite its embed.
///
/// Bindings whose role or emoji cannot be found, or whose reaction fails,
/// are skipped with a warning.
pub async fn setup_role_message(
    ctx: &serenity::Context,
    config: &mut BotConfig,
    config_path: &Path,
    bot_user: serenity::UserId,
) -> Result<ReactionRoles> {
    let mut message = role_message(ctx, config, config_path).await?;
    let guild = serenity::GuildId::new(config.guild);

    if config.emote_configs.is_empty() {
        info!("no emotes to react");
        return Ok(ReactionRoles::new(
            config.guild,
            message.id.get(),
            Vec::new(),
            Some(bot_user.get()),
        ));
    }

    let roles = guild.roles(ctx).await?;
    let mut embed = serenity::CreateEmbed::new()
        .title(ROLE_EMBED_TITLE)
        .color(ROLE_EMBED_COLOR)
        .timestamp(serenity::Timestamp::now())
        .footer(serenity::CreateEmbedFooter::new(ROLE_EMBED_FOOTER));
    let mut resolved = Vec::new();

    for binding in &config.emote_configs {
        if binding.emote == 0 || binding.role == 0 {
            warn!("skipping emote config with empty id: {:?}", binding);
            continue;
        }

        let role_id = serenity::RoleId::new(binding.role);
        if !roles.contains_key(&role_id) {
            warn!("Role not found: {}", binding.role);
            continue;
        }

        match guild.emoji(ctx, serenity::EmojiId::new(binding.emote)).await {
            Ok(emoji) => resolved.push((emoji, binding)),
            Err(e) => warn!("Emoji not found: {} ({})", binding.emote, e),
        }
    }

    let reacted = keep_reacted(resolved, |(emoji, _)| {
        let emoji = emoji.clone();
        let message = &message;
        async move {
            message.react(ctx, emoji).await?;
            Ok(())
        }
    })
    .await;

    let mut bindings = Vec::with_capacity(reacted.len());
    for (emoji, binding) in reacted {
        embed = embed.field(
            emoji.to_string(),
            describe_binding(binding.role, &binding.description),
            false,
        );
        bindings.push((binding.emote, binding.role));
    }

    message
        .edit(ctx, serenity::EditMessage::new().content("").embed(embed))
        .await?;
    info!("role message {} updated with {} bindings", message.id, bindings.len());

    Ok(ReactionRoles::new(
        config.guild,
        message.id.get(),
        bindings,
        Some(bot_user.get()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EndermiteError;

    #[tokio::test]
    async fn test_failed_reaction_skips_only_that_binding() {
        let mut attempted = Vec::new();
        let kept = keep_reacted(vec![1u64, 2, 3], |id| {
            attempted.push(*id);
            let id = *id;
            async move {
                if id == 2 {
                    Err(EndermiteError::Other("Unknown Emoji".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(attempted, vec![1, 2, 3]);
        assert_eq!(kept, vec![1, 3]);
    }
}
