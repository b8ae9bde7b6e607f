//! Async event bus for decoupled gateway-service communication

pub mod queue;

pub use queue::EventBus;
pub use crate::events::{EmojiKey, ReactionEvent, ReactionKind};
