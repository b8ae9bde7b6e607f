//! Platform event types carried on the event bus

use serde::{Deserialize, Serialize};

/// Whether a reaction was put on or taken off a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Added,
    Removed,
}

/// Emoji used in a reaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmojiKey {
    /// Guild emoji, by id
    Custom(u64),
    /// Plain unicode emoji
    Unicode(String),
}

/// A reaction added to or removed from a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub kind: ReactionKind,
    /// Absent for reactions in direct messages
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    pub emoji: EmojiKey,
    /// Absent when the platform did not say who reacted
    pub user_id: Option<u64>,
}

impl ReactionEvent {
    pub fn new(
        kind: ReactionKind,
        guild_id: Option<u64>,
        channel_id: u64,
        message_id: u64,
        emoji: EmojiKey,
        user_id: Option<u64>,
    ) -> Self {
        Self {
            kind,
            guild_id,
            channel_id,
            message_id,
            emoji,
            user_id,
        }
    }

    /// Custom emoji id, if this is a guild emoji
    pub fn custom_emoji(&self) -> Option<u64> {
        match self.emoji {
            EmojiKey::Custom(id) => Some(id),
            EmojiKey::Unicode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_emoji() {
        let event = ReactionEvent::new(
            ReactionKind::Added,
            Some(1),
            2,
            3,
            EmojiKey::Custom(44),
            Some(5),
        );
        assert_eq!(event.custom_emoji(), Some(44));

        let unicode = ReactionEvent {
            emoji: EmojiKey::Unicode("👍".to_string()),
            ..event
        };
        assert_eq!(unicode.custom_emoji(), None);
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&ReactionKind::Removed).unwrap(), "\"removed\"");
    }
}
