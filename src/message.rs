use poise::serenity_prelude::{ChannelId, GuildId, MessageId, Permissions, UserId};
use std::time::Duration;

/// A user tagged in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mentioned {
    pub id: UserId,
    pub tag: String,
}

/// Platform-neutral view of a received chat message.
///
/// The gateway adapter in [`crate::events`] fills this in from serenity's
/// `Message` plus the guild cache, so every handler downstream can be driven
/// from tests without a live connection.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: UserId,
    pub author_is_bot: bool,
    pub content: String,
    /// Users tagged in the message, in the order the platform reports them.
    pub mentions: Vec<Mentioned>,
    /// Effective guild permissions of the author. Empty outside guilds.
    pub permissions: Permissions,
    /// Voice channel the author is currently connected to, if any.
    pub voice_channel: Option<ChannelId>,
    /// Heartbeat latency of the shard that delivered the message.
    pub latency: Option<Duration>,
}

impl IncomingMessage {
    pub fn mentions_user(&self, user_id: UserId) -> bool {
        self.mentions.iter().any(|m| m.id == user_id)
    }

    /// Whether the author holds `required`. Administrators hold everything.
    pub fn has_capability(&self, required: Permissions) -> bool {
        self.permissions.administrator() || self.permissions.contains(required)
    }
}
