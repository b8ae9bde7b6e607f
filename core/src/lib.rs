//! Endermite Core Library
//!
//! This library contains the core functionality of the Endermite community
//! bot: attachment selection, config validation and formatting, paste and
//! issue-tracker clients, reaction roles, and the Discord channel serving
//! the message context-menu commands.

pub mod attachment;
pub mod bus;
pub mod channels;
pub mod config;
pub mod content;
pub mod error;
pub mod events;
pub mod github;
pub mod paste;
pub mod pipeline;
pub mod roles;
pub mod types;

// Re-exports for convenience
pub use attachment::{
    AttachmentCandidate, AttachmentFetcher, HttpFetcher, PendingSelections, Resolution,
    SelectionOutcome, SelectionPolicy, SelectionPrompt,
};
pub use bus::EventBus;
pub use channels::{Channel, DiscordChannel};
pub use config::{
    BotConfig, DiscordConfig, GithubConfig, PasteConfig, ReactEmoteConfig, get_config_dir,
    get_config_path, load_config, save_config,
};
pub use content::{ValidationResult, format, render_report, validate};
pub use error::*;
pub use events::{EmojiKey, ReactionEvent, ReactionKind};
pub use github::{GithubClient, IssueLookup, IssueRef};
pub use paste::{PasteArtifact, PasteClient, PastePublisher};
pub use pipeline::PipelineFailure;
pub use roles::{ReactionRoles, RoleGateway};
pub use types::*;
