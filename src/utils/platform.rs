//! Chat platform actions used by the command handlers.
//!
//! Handlers only talk to the [`Platform`] trait; [`SerenityPlatform`] is the
//! production implementation on top of serenity's HTTP client.

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{
    ChannelId, CreateMessage, EditMember, GuildId, Http, MessageId, ReactionType, Timestamp, UserId,
};
use serenity::async_trait;
use thiserror::Error;
use tracing::debug;

/// Discord's page size for the reaction-users endpoint.
const REACTION_PAGE_SIZE: u8 = 100;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Discord request failed: {0}")]
    Discord(#[from] serenity::Error),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Platform rejected the request: {0}")]
    Rejected(String),
}

/// A user that reacted to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reactor {
    pub id: UserId,
    pub bot: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Platform: Send + Sync {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: String,
    ) -> Result<MessageId, PlatformError>;

    async fn reply(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: String,
    ) -> Result<(), PlatformError>;

    async fn start_typing(&self, channel_id: ChannelId) -> Result<(), PlatformError>;

    async fn kick(&self, guild_id: GuildId, user_id: UserId) -> Result<(), PlatformError>;

    async fn ban(&self, guild_id: GuildId, user_id: UserId) -> Result<(), PlatformError>;

    async fn timeout(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        duration: Duration,
    ) -> Result<(), PlatformError>;

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: String,
    ) -> Result<(), PlatformError>;

    /// Every user currently reacting with `emoji`, each listed once.
    async fn reactors(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: String,
    ) -> Result<Vec<Reactor>, PlatformError>;
}

pub struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Platform for SerenityPlatform {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: String,
    ) -> Result<MessageId, PlatformError> {
        let message = channel_id
            .send_message(&self.http, CreateMessage::new().content(content))
            .await?;
        Ok(message.id)
    }

    async fn reply(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: String,
    ) -> Result<(), PlatformError> {
        let reply = CreateMessage::new()
            .content(content)
            .reference_message((channel_id, message_id));
        channel_id.send_message(&self.http, reply).await?;
        Ok(())
    }

    async fn start_typing(&self, channel_id: ChannelId) -> Result<(), PlatformError> {
        channel_id.broadcast_typing(&self.http).await?;
        Ok(())
    }

    async fn kick(&self, guild_id: GuildId, user_id: UserId) -> Result<(), PlatformError> {
        guild_id.kick(&self.http, user_id).await?;
        Ok(())
    }

    async fn ban(&self, guild_id: GuildId, user_id: UserId) -> Result<(), PlatformError> {
        guild_id.ban(&self.http, user_id, 0).await?;
        Ok(())
    }

    async fn timeout(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        duration: Duration,
    ) -> Result<(), PlatformError> {
        let until = chrono::Utc::now().timestamp() + duration.as_secs() as i64;
        let until = Timestamp::from_unix_timestamp(until)
            .map_err(|e| PlatformError::InvalidTimeout(e.to_string()))?;

        guild_id
            .edit_member(
                &self.http,
                user_id,
                EditMember::new().disable_communication_until_datetime(until),
            )
            .await?;
        Ok(())
    }

    async fn react(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: String,
    ) -> Result<(), PlatformError> {
        channel_id
            .create_reaction(&self.http, message_id, ReactionType::Unicode(emoji))
            .await?;
        Ok(())
    }

    async fn reactors(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: String,
    ) -> Result<Vec<Reactor>, PlatformError> {
        let mut reactors = Vec::new();
        let mut after = None;

        loop {
            let page = channel_id
                .reaction_users(
                    &self.http,
                    message_id,
                    ReactionType::Unicode(emoji.clone()),
                    Some(REACTION_PAGE_SIZE),
                    after,
                )
                .await?;

            let full_page = page.len() == REACTION_PAGE_SIZE as usize;
            after = page.last().map(|user| user.id);
            reactors.extend(page.into_iter().map(|user| Reactor {
                id: user.id,
                bot: user.bot,
            }));

            if !full_page || after.is_none() {
                break;
            }
        }

        debug!(
            "Fetched {} reactors for message {} in channel {}",
            reactors.len(),
            message_id,
            channel_id
        );
        Ok(reactors)
    }
}
