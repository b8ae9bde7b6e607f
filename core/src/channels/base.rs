//! Base channel trait

use crate::error::Result;
use async_trait::async_trait;

/// Base trait for chat platform connections
///
/// A channel owns the gateway connection to one platform, serves the
/// commands registered there and feeds platform events into the event bus.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the name of this channel
    fn name(&self) -> &str;

    /// Start the channel; returns when the connection ends
    async fn start(&self) -> Result<()>;

    /// Stop the channel
    async fn stop(&self) -> Result<()>;

    /// Check if the channel has what it needs to start
    fn is_enabled(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct DummyChannel {
        enabled: bool,
        running: AtomicBool,
    }

    #[async_trait]
    impl Channel for DummyChannel {
        fn name(&self) -> &str {
            "dummy"
        }

        async fn start(&self) -> Result<()> {
            self.running.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<()> {
            self.running.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[tokio::test]
    async fn test_start_and_stop_through_trait_object() {
        let dummy = DummyChannel {
            enabled: true,
            running: AtomicBool::new(false),
        };

        let channel: &dyn Channel = &dummy;
        assert_eq!(channel.name(), "dummy");
        assert!(channel.is_enabled());

        channel.start().await.unwrap();
        assert!(dummy.running.load(Ordering::SeqCst));
        channel.stop().await.unwrap();
        assert!(!dummy.running.load(Ordering::SeqCst));
    }
}
