//! Core types for Endermite

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of channel kinds the bot cares about.
///
/// Resolved once at the platform boundary; the pipelines never inspect the
/// platform's own channel representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Thread,
    Forum,
    Other,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelKind::Text => "text",
            ChannelKind::Thread => "thread",
            ChannelKind::Forum => "forum",
            ChannelKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Context-menu actions offered on a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    CreatePaste,
    ValidateConfig,
    OpenSupportThread,
}

impl MessageAction {
    /// Name shown in the message context menu
    pub fn menu_name(self) -> &'static str {
        match self {
            MessageAction::CreatePaste => "Create Paste",
            MessageAction::ValidateConfig => "Validate Config",
            MessageAction::OpenSupportThread => "Open Support Thread",
        }
    }

    /// Verb phrase used in failure messages ("Can't <verb>: ...")
    pub fn verb(self) -> &'static str {
        match self {
            MessageAction::CreatePaste => "create paste",
            MessageAction::ValidateConfig => "validate config",
            MessageAction::OpenSupportThread => "process",
        }
    }

    /// Text above the file selection buttons
    pub fn selection_prompt(self) -> &'static str {
        match self {
            MessageAction::ValidateConfig => "Please select the file you would like to validate:",
            _ => "Please select the file you would like to upload:",
        }
    }

    /// Text replacing the buttons once a file was picked
    pub fn selection_ack(self) -> &'static str {
        match self {
            MessageAction::ValidateConfig => "Validating...",
            _ => "Uploading...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_names() {
        assert_eq!(MessageAction::CreatePaste.menu_name(), "Create Paste");
        assert_eq!(MessageAction::ValidateConfig.menu_name(), "Validate Config");
        assert_eq!(
            MessageAction::OpenSupportThread.menu_name(),
            "Open Support Thread"
        );
    }

    #[test]
    fn test_selection_texts() {
        assert_eq!(MessageAction::CreatePaste.selection_ack(), "Uploading...");
        assert_eq!(MessageAction::ValidateConfig.selection_ack(), "Validating...");
        assert!(
            MessageAction::ValidateConfig
                .selection_prompt()
                .ends_with("validate:")
        );
    }
}
