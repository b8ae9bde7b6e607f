//! Error types for Endermite

use crate::types::ChannelKind;
use poise::serenity_prelude as serenity;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Endermite operations
pub type Result<T> = std::result::Result<T, EndermiteError>;

/// Main error type for Endermite
#[derive(Error, Debug)]
pub enum EndermiteError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Channel/message resolution errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Paste service errors
    #[error("Paste error: {0}")]
    Paste(#[from] PasteError),

    /// Issue tracker errors
    #[error("GitHub error: {0}")]
    Github(#[from] GithubError),

    /// Discord API errors
    #[error("Discord error: {0}")]
    Discord(#[from] Box<serenity::Error>),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required configuration: {0}")]
    Missing(String),
}

/// Resolution errors for channels and messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("No channel given.")]
    NotProvided,

    #[error("Discord channel not found: {0}")]
    NotFound(u64),

    #[error("Discord channel is not of type {expected}: {id} ({actual})")]
    WrongKind {
        id: u64,
        expected: String,
        actual: ChannelKind,
    },

    #[error("Message not found: {0}")]
    MessageNotFound(u64),

    #[error("Failed to send event: {0}")]
    SendFailed(String),
}

/// Paste service errors
#[derive(Error, Debug)]
pub enum PasteError {
    #[error("Paste service returned status {0}")]
    Status(u16),

    #[error("Paste request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid paste response: {0}")]
    InvalidResponse(String),
}

/// Issue tracker errors
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Not a GitHub issue link: {0}")]
    NotAnIssue(String),

    #[error("GitHub API returned status {0}")]
    Status(u16),

    #[error("GitHub request failed: {0}")]
    RequestFailed(String),
}

impl From<serenity::Error> for EndermiteError {
    fn from(err: serenity::Error) -> Self {
        EndermiteError::Discord(Box::new(err))
    }
}

impl From<anyhow::Error> for EndermiteError {
    fn from(err: anyhow::Error) -> Self {
        EndermiteError::Other(err.to_string())
    }
}

impl From<serde_json::Error> for EndermiteError {
    fn from(err: serde_json::Error) -> Self {
        EndermiteError::Other(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for PasteError {
    fn from(err: reqwest::Error) -> Self {
        PasteError::RequestFailed(err.to_string())
    }
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::RequestFailed(err.to_string())
    }
}
