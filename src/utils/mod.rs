//! This module aggregates the service adapters the command handlers depend on.

/// In-memory experience and currency counters.
pub mod counters;
/// OpenAI chat-completion client.
pub mod openai;
/// Chat platform actions (messages, moderation, reactions).
pub mod platform;
/// Voice connections and playback.
pub mod voice;
/// YouTube link validation.
pub mod youtube;
