//! Reaction roles: grant a role while a member's reaction is on the role message

use crate::error::Result;
use crate::events::{ReactionEvent, ReactionKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Title of the role message embed
pub const ROLE_EMBED_TITLE: &str = "By reacting to this message, you'll get the corresponding role.";

/// Accent colour of the role message embed
pub const ROLE_EMBED_COLOR: u32 = 0x46325B;

/// Footer of the role message embed
pub const ROLE_EMBED_FOOTER: &str = "Endermite";

/// Embed field value describing one binding
pub fn describe_binding(role_id: u64, description: &str) -> String {
    format!("Role: <@&{}>\nDescription: {}", role_id, description)
}

/// Grants and revokes guild roles
#[async_trait]
pub trait RoleGateway: Send + Sync {
    async fn grant(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<()>;
    async fn revoke(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<()>;
}

/// Emote to role bindings on one message
#[derive(Debug, Clone)]
pub struct ReactionRoles {
    guild_id: u64,
    message_id: u64,
    /// emote id -> role id
    bindings: HashMap<u64, u64>,
    /// Reactions by this user are ignored
    bot_user: Option<u64>,
}

impl ReactionRoles {
    pub fn new<I>(guild_id: u64, message_id: u64, bindings: I, bot_user: Option<u64>) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        Self {
            guild_id,
            message_id,
            bindings: bindings.into_iter().collect(),
            bot_user,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Role bound to this reaction, if it concerns the role message
    pub fn role_for(&self, event: &ReactionEvent) -> Option<u64> {
        if event.message_id != self.message_id || event.guild_id != Some(self.guild_id) {
            return None;
        }
        if event.user_id.is_none() || event.user_id == self.bot_user {
            return None;
        }
        self.bindings.get(&event.custom_emoji()?).copied()
    }

    /// Apply one reaction event. Platform failures are logged, never returned.
    pub async fn handle<G>(&self, event: &ReactionEvent, gateway: &G) -> bool
    where
        G: RoleGateway + ?Sized,
    {
        let Some(role_id) = self.role_for(event) else {
            return false;
        };
        let Some(user_id) = event.user_id else {
            return false;
        };

        let result = match event.kind {
            ReactionKind::Added => gateway.grant(self.guild_id, user_id, role_id).await,
            ReactionKind::Removed => gateway.revoke(self.guild_id, user_id, role_id).await,
        };

        match result {
            Ok(()) => {
                debug!("{:?} role {} for user {}", event.kind, role_id, user_id);
                true
            }
            Err(e) => {
                error!("Failed to update role {} for user {}: {}", role_id, user_id, e);
                false
            }
        }
    }

    /// Consume reaction events until the bus closes
    pub async fn run<G>(self, mut rx: broadcast::Receiver<ReactionEvent>, gateway: Arc<G>)
    where
        G: RoleGateway + ?Sized,
    {
        info!(
            "reaction roles active on message {} ({} bindings)",
            self.message_id,
            self.bindings.len()
        );

        loop {
            match rx.recv().await {
                Ok(event) => {
                    self.handle(&event, gateway.as_ref()).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Reaction receiver lagged, missed {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Reaction event bus closed");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::error::EndermiteError;
    use crate::events::EmojiKey;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        fail: bool,
        calls: Mutex<Vec<(&'static str, u64, u64, u64)>>,
    }

    #[async_trait]
    impl RoleGateway for RecordingGateway {
        async fn grant(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<()> {
            self.calls.lock().unwrap().push(("grant", guild_id, user_id, role_id));
            if self.fail {
                return Err(EndermiteError::Other("missing permissions".to_string()));
            }
            Ok(())
        }

        async fn revoke(&self, guild_id: u64, user_id: u64, role_id: u64) -> Result<()> {
            self.calls.lock().unwrap().push(("revoke", guild_id, user_id, role_id));
            Ok(())
        }
    }

    fn roles() -> ReactionRoles {
        ReactionRoles::new(1, 100, [(10, 1000), (11, 1100)], Some(99))
    }

    fn reaction(kind: ReactionKind, message: u64, emoji: EmojiKey, user: u64) -> ReactionEvent {
        ReactionEvent::new(kind, Some(1), 5, message, emoji, Some(user))
    }

    #[test]
    fn test_describe_binding() {
        assert_eq!(
            describe_binding(7, "Modders"),
            "Role: <@&7>\nDescription: Modders"
        );
    }

    #[test]
    fn test_role_for_matching_reaction() {
        let roles = roles();
        let event = reaction(ReactionKind::Added, 100, EmojiKey::Custom(11), 3);
        assert_eq!(roles.role_for(&event), Some(1100));
    }

    #[test]
    fn test_role_for_ignores_unrelated_reactions() {
        let roles = roles();
        assert_eq!(
            roles.role_for(&reaction(ReactionKind::Added, 101, EmojiKey::Custom(10), 3)),
            None
        );
        assert_eq!(
            roles.role_for(&reaction(ReactionKind::Added, 100, EmojiKey::Custom(12), 3)),
            None
        );
        assert_eq!(
            roles.role_for(&reaction(
                ReactionKind::Added,
                100,
                EmojiKey::Unicode("👍".to_string()),
                3
            )),
            None
        );
        assert_eq!(
            roles.role_for(&reaction(ReactionKind::Added, 100, EmojiKey::Custom(10), 99)),
            None
        );

        let mut other_guild = reaction(ReactionKind::Added, 100, EmojiKey::Custom(10), 3);
        other_guild.guild_id = Some(2);
        assert_eq!(roles.role_for(&other_guild), None);
    }

    #[tokio::test]
    async fn test_handle_grants_and_revokes() {
        let roles = roles();
        let gateway = RecordingGateway::default();

        assert!(
            roles
                .handle(&reaction(ReactionKind::Added, 100, EmojiKey::Custom(10), 3), &gateway)
                .await
        );
        assert!(
            roles
                .handle(&reaction(ReactionKind::Removed, 100, EmojiKey::Custom(10), 3), &gateway)
                .await
        );

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(*calls, vec![("grant", 1, 3, 1000), ("revoke", 1, 3, 1000)]);
    }

    #[tokio::test]
    async fn test_handle_swallows_platform_errors() {
        let roles = roles();
        let gateway = RecordingGateway {
            fail: true,
            ..Default::default()
        };

        let handled = roles
            .handle(&reaction(ReactionKind::Added, 100, EmojiKey::Custom(10), 3), &gateway)
            .await;
        assert!(!handled);
        assert_eq!(gateway.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_consumes_bus_until_closed() {
        let bus = EventBus::new();
        let rx = bus.subscribe_reactions();
        let gateway = Arc::new(RecordingGateway::default());

        let task = tokio::spawn(roles().run(rx, Arc::clone(&gateway)));

        bus.publish_reaction(reaction(ReactionKind::Added, 100, EmojiKey::Custom(11), 4))
            .unwrap();
        bus.publish_reaction(reaction(ReactionKind::Added, 555, EmojiKey::Custom(11), 4))
            .unwrap();
        drop(bus);

        task.await.unwrap();
        let calls = gateway.calls.lock().unwrap();
        assert_eq!(*calls, vec![("grant", 1, 4, 1100)]);
    }
}
