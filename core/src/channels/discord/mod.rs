//! discord channel using serenity and poise
//!
//! The poise framework serves the three message context-menu commands. A
//! plain serenity event handler sits next to it and turns gateway payloads
//! into typed values: button clicks are routed to pending file selections,
//! reactions are published on the [`EventBus`].

pub mod commands;
pub mod components;
pub mod reaction;
pub mod util;

use super::base::Channel;
use crate::attachment::{AttachmentFetcher, HttpFetcher, PendingSelections, Resolution};
use crate::bus::EventBus;
use crate::config::BotConfig;
use crate::error::{EndermiteError, Result};
use crate::events::{EmojiKey, ReactionEvent, ReactionKind};
use crate::github::{GithubClient, IssueLookup};
use crate::paste::{PasteClient, PastePublisher};
use async_trait::async_trait;
use components::parse_selection_id;
use poise::serenity_prelude as serenity;
use reaction::{SerenityRoleGateway, setup_role_message};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// poise data
pub struct Data {
    /// bot configuration
    pub config: BotConfig,
    /// file selection prompts waiting for a click
    pub selections: PendingSelections<serenity::ComponentInteraction>,
    pub fetcher: Arc<dyn AttachmentFetcher>,
    pub publisher: Arc<dyn PastePublisher>,
    pub github: Arc<dyn IssueLookup>,
}

/// poise error type
pub type DiscordError = EndermiteError;

/// discord channel using serenity and poise
pub struct DiscordChannel {
    config: BotConfig,
    /// where the role message id is saved once created
    config_path: PathBuf,
    bus: EventBus,
    shard_manager: Arc<RwLock<Option<Arc<serenity::ShardManager>>>>,
}

impl DiscordChannel {
    /// create new discord channel
    pub fn new(config: BotConfig, config_path: PathBuf, bus: EventBus) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            config_path,
            bus,
            shard_manager: Arc::new(RwLock::new(None)),
        })
    }

    fn data(config: BotConfig, selections: PendingSelections<serenity::ComponentInteraction>) -> Data {
        let client = reqwest::Client::new();
        Data {
            fetcher: Arc::new(HttpFetcher::new(client.clone())),
            publisher: Arc::new(PasteClient::new(client.clone(), &config.paste)),
            github: Arc::new(GithubClient::new(client, &config.github)),
            config,
            selections,
        }
    }
}

/// configured application id; zero leaves it to be fetched on ready
fn application_id(config: &BotConfig) -> Option<serenity::ApplicationId> {
    (config.discord.application_id != 0)
        .then(|| serenity::ApplicationId::new(config.discord.application_id))
}

/// gateway events outside the command framework
struct GatewayHandler {
    bus: EventBus,
    selections: PendingSelections<serenity::ComponentInteraction>,
}

impl GatewayHandler {
    fn publish_reaction(&self, kind: ReactionKind, reaction: &serenity::Reaction) {
        if self.bus.reaction_subscriber_count() == 0 {
            return;
        }

        let emoji = match &reaction.emoji {
            serenity::ReactionType::Custom { id, .. } => EmojiKey::Custom(id.get()),
            serenity::ReactionType::Unicode(s) => EmojiKey::Unicode(s.clone()),
            _ => return,
        };
        let event = ReactionEvent::new(
            kind,
            reaction.guild_id.map(|g| g.get()),
            reaction.channel_id.get(),
            reaction.message_id.get(),
            emoji,
            reaction.user_id.map(|u| u.get()),
        );

        if let Err(e) = self.bus.publish_reaction(event) {
            error!("failed to publish reaction to bus: {}", e);
        }
    }
}

#[serenity::async_trait]
impl serenity::EventHandler for GatewayHandler {
    async fn ready(&self, _ctx: serenity::Context, ready: serenity::Ready) {
        info!("discord bot connected as {}", ready.user.name);
    }

    async fn interaction_create(&self, ctx: serenity::Context, interaction: serenity::Interaction) {
        let serenity::Interaction::Component(component) = interaction else {
            return;
        };
        let Some((prompt_id, key)) = parse_selection_id(&component.data.custom_id) else {
            return;
        };
        let (prompt_id, key) = (prompt_id.to_string(), key.to_string());

        let unresolved = match self
            .selections
            .resolve(component.user.id.get(), &prompt_id, &key, component)
        {
            Resolution::Resolved => {
                debug!("selection {} resolved with {}", prompt_id, key);
                return;
            }
            Resolution::UnknownPrompt(component) | Resolution::RejectedKey(component) => component,
        };

        debug!(
            "ignoring click on {} by {}",
            unresolved.data.custom_id, unresolved.user.id
        );
        if let Err(e) = unresolved
            .create_response(&ctx, serenity::CreateInteractionResponse::Acknowledge)
            .await
        {
            error!("failed to acknowledge button click: {}", e);
        }
    }

    async fn reaction_add(&self, _ctx: serenity::Context, add_reaction: serenity::Reaction) {
        self.publish_reaction(ReactionKind::Added, &add_reaction);
    }

    async fn reaction_remove(&self, _ctx: serenity::Context, removed_reaction: serenity::Reaction) {
        self.publish_reaction(ReactionKind::Removed, &removed_reaction);
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, DiscordError>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("failed to set up discord bot: {}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("command {} failed: {}", ctx.command().name, error);
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("error while handling discord error: {}", e);
            }
        }
    }
}

/// set up the role message and run reaction roles until the bus closes
async fn run_reaction_roles(
    ctx: serenity::Context,
    mut config: BotConfig,
    config_path: PathBuf,
    bot_user: serenity::UserId,
    bus: EventBus,
) {
    if config.role_channel == 0 {
        info!("no role channel configured, reaction roles disabled");
        return;
    }

    let rx = bus.subscribe_reactions();
    match setup_role_message(&ctx, &mut config, &config_path, bot_user).await {
        Ok(roles) if roles.is_empty() => {
            info!("no reaction role bindings active");
        }
        Ok(roles) => {
            let gateway = Arc::new(SerenityRoleGateway::new(ctx.http.clone()));
            roles.run(rx, gateway).await;
        }
        Err(e) => {
            error!("failed to set up reaction roles: {}", e);
        }
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> Result<()> {
        let config = self.config.clone();
        config.validate()?;

        info!("starting discord bot");

        let intents =
            serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;
        let selections = PendingSelections::new();

        let setup_config = config.clone();
        let setup_selections = selections.clone();
        let config_path = self.config_path.clone();
        let bus = self.bus.clone();

        let framework = poise::Framework::builder()
            .options(poise::FrameworkOptions {
                commands: vec![
                    commands::create_paste(),
                    commands::validate_config(),
                    commands::open_support_thread(),
                ],
                on_error: |error| Box::pin(on_error(error)),
                ..Default::default()
            })
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    let guild_id = serenity::GuildId::new(setup_config.guild);
                    match poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        guild_id,
                    )
                    .await
                    {
                        Ok(()) => info!("registered context menu commands in guild {}", guild_id),
                        Err(e) => error!(
                            "failed to register discord commands in guild {}: {}",
                            guild_id, e
                        ),
                    }

                    tokio::spawn(run_reaction_roles(
                        ctx.clone(),
                        setup_config.clone(),
                        config_path,
                        ready.user.id,
                        bus,
                    ));

                    Ok(DiscordChannel::data(setup_config, setup_selections))
                })
            })
            .build();

        let handler = GatewayHandler {
            bus: self.bus.clone(),
            selections,
        };

        let mut builder = serenity::ClientBuilder::new(&config.discord.token, intents)
            .framework(framework)
            .event_handler(handler);
        if let Some(application_id) = application_id(&config) {
            builder = builder.application_id(application_id);
        }
        let mut client = builder.await?;

        *self.shard_manager.write().await = Some(client.shard_manager.clone());

        info!("discord bot started, waiting for events...");
        client.start().await.map_err(|e| {
            error!("discord client error: {}", e);
            EndermiteError::from(e)
        })?;

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!("stopping discord bot");
        if let Some(shard_manager) = self.shard_manager.write().await.take() {
            shard_manager.shutdown_all().await;
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        !self.config.discord.token.is_empty()
    }
}
