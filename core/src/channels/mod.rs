//! Channel implementations for chat platforms

pub mod base;
pub mod discord;

pub use base::Channel;
pub use discord::DiscordChannel;
