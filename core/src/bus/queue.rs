//! Async event queue between the gateway handler and feature services

use crate::error::{ChannelError, Result};
use crate::events::ReactionEvent;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Async event bus that decouples the gateway connection from feature services
///
/// The gateway handler converts platform payloads into typed events and
/// publishes them here; services such as reaction roles subscribe and react.
#[derive(Clone)]
pub struct EventBus {
    reactions: broadcast::Sender<ReactionEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (reactions_tx, _) = broadcast::channel(100);

        Self {
            reactions: reactions_tx,
        }
    }

    /// Publish a reaction event to all subscribers
    pub fn publish_reaction(&self, event: ReactionEvent) -> Result<()> {
        match self.reactions.send(event) {
            Ok(n) => {
                debug!("reaction event delivered to {} subscribers", n);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to publish reaction event: no subscribers");
                Err(ChannelError::SendFailed(e.to_string()).into())
            }
        }
    }

    /// Subscribe to reaction events
    pub fn subscribe_reactions(&self) -> broadcast::Receiver<ReactionEvent> {
        self.reactions.subscribe()
    }

    /// Get the number of reaction subscribers
    pub fn reaction_subscriber_count(&self) -> usize {
        self.reactions.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
