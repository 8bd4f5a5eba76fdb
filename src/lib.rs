//! Ghostbot: a small community bot with counters, moderation, a shop,
//! giveaways, an AI assistant and single-track voice playback.

pub mod assistant;
pub mod bot;
pub mod commands;
pub mod config;
pub mod events;
pub mod message;
pub mod utils;

pub use bot::{Bot, BotSettings};
pub use message::{IncomingMessage, Mentioned};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// User data shared with every poise event invocation.
pub struct Data {
    pub bot: std::sync::Arc<Bot>,
}
