//! Voice connections and single-track playback.

use serenity::all::{ChannelId, GuildId};
use serenity::async_trait;
use thiserror::Error;

/// Errors that can occur during voice operations
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("Failed to join voice channel: {0}")]
    Join(String),

    #[error("Failed to leave voice channel: {0}")]
    Leave(String),

    #[error("Voice support is not compiled in")]
    Disabled,
}

/// What happened to the guild's playback when `play` was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Started,
    /// A track was already playing and has been stopped in favour of the new one.
    Replaced,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Voice: Send + Sync {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), VoiceError>;

    /// Connect (or reuse the connection) and stream the audio of `url`. The
    /// connection is dropped once the track finishes.
    async fn play(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        url: String,
    ) -> Result<PlayOutcome, VoiceError>;

    /// Disconnect from the guild. Returns `false` when there was nothing to leave.
    async fn leave(&self, guild_id: GuildId) -> Result<bool, VoiceError>;
}

/// Stand-in used when the `music` feature is disabled.
pub struct NoVoice;

#[async_trait]
impl Voice for NoVoice {
    async fn join(&self, _guild_id: GuildId, _channel_id: ChannelId) -> Result<(), VoiceError> {
        Err(VoiceError::Disabled)
    }

    async fn play(
        &self,
        _guild_id: GuildId,
        _channel_id: ChannelId,
        _url: String,
    ) -> Result<PlayOutcome, VoiceError> {
        Err(VoiceError::Disabled)
    }

    async fn leave(&self, _guild_id: GuildId) -> Result<bool, VoiceError> {
        Ok(false)
    }
}

#[cfg(feature = "music")]
pub use songbird_voice::SongbirdVoice;

#[cfg(feature = "music")]
mod songbird_voice {
    use std::sync::Arc;

    use dashmap::DashMap;
    use serenity::all::{ChannelId, GuildId};
    use serenity::async_trait;
    use songbird::input::YoutubeDl;
    use songbird::tracks::TrackHandle;
    use songbird::{Event, EventContext, Songbird, TrackEvent};
    use tracing::{error, info, warn};

    use super::{PlayOutcome, Voice, VoiceError};

    /// Songbird-backed voice client. Remembers the active track per guild so a
    /// replaced track ending does not disconnect its successor.
    pub struct SongbirdVoice {
        manager: Arc<Songbird>,
        http_client: reqwest::Client,
        active: Arc<DashMap<GuildId, TrackHandle>>,
    }

    impl SongbirdVoice {
        pub fn new(manager: Arc<Songbird>, http_client: reqwest::Client) -> Self {
            Self {
                manager,
                http_client,
                active: Arc::new(DashMap::new()),
            }
        }
    }

    #[async_trait]
    impl Voice for SongbirdVoice {
        async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), VoiceError> {
            self.manager
                .join(guild_id, channel_id)
                .await
                .map_err(|e| VoiceError::Join(e.to_string()))?;
            info!("Joined voice channel {} in guild {}", channel_id, guild_id);
            Ok(())
        }

        async fn play(
            &self,
            guild_id: GuildId,
            channel_id: ChannelId,
            url: String,
        ) -> Result<PlayOutcome, VoiceError> {
            let call = self
                .manager
                .join(guild_id, channel_id)
                .await
                .map_err(|e| VoiceError::Join(e.to_string()))?;

            // yt-dlp picks the best audio-only format.
            let source = YoutubeDl::new(self.http_client.clone(), url.clone());

            let track = {
                let mut handler = call.lock().await;
                handler.play_only_input(source.into())
            };

            let outcome = match self.active.insert(guild_id, track.clone()) {
                Some(_) => PlayOutcome::Replaced,
                None => PlayOutcome::Started,
            };

            let notifier = DisconnectOnEnd {
                manager: Arc::clone(&self.manager),
                active: Arc::clone(&self.active),
                guild_id,
            };
            let registered = [TrackEvent::End, TrackEvent::Error].into_iter().all(|event| {
                match track.add_event(Event::Track(event), notifier.clone()) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Failed to register track event for guild {}: {}", guild_id, e);
                        false
                    }
                }
            });
            if !registered {
                // The track stopped before its end handlers were attached.
                notifier.release(&track).await;
            }

            info!("Streaming {} in guild {} ({:?})", url, guild_id, outcome);
            Ok(outcome)
        }

        async fn leave(&self, guild_id: GuildId) -> Result<bool, VoiceError> {
            if self.manager.get(guild_id).is_none() {
                return Ok(false);
            }

            self.active.remove(&guild_id);
            self.manager
                .remove(guild_id)
                .await
                .map_err(|e| VoiceError::Leave(e.to_string()))?;
            info!("Left voice in guild {}", guild_id);
            Ok(true)
        }
    }

    /// Drops the guild's voice connection when its active track stops.
    #[derive(Clone)]
    struct DisconnectOnEnd {
        manager: Arc<Songbird>,
        active: Arc<DashMap<GuildId, TrackHandle>>,
        guild_id: GuildId,
    }

    impl DisconnectOnEnd {
        /// Disconnect if `ended` is still the guild's active track.
        async fn release(&self, ended: &TrackHandle) {
            if !release_if_current(&self.active, self.guild_id, |active| {
                active.uuid() == ended.uuid()
            }) {
                return;
            }

            info!("Playback finished in guild {}, disconnecting", self.guild_id);
            if let Err(e) = self.manager.remove(self.guild_id).await {
                error!("Failed to leave voice in guild {}: {}", self.guild_id, e);
            }
        }
    }

    #[async_trait]
    impl songbird::EventHandler for DisconnectOnEnd {
        async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
            let EventContext::Track(tracks) = ctx else {
                return None;
            };

            for (_, handle) in tracks.iter() {
                self.release(handle).await;
            }

            None
        }
    }

    /// Drop the guild's active entry if `is_current` holds for it. Returns
    /// whether anything was removed.
    fn release_if_current<V>(
        active: &DashMap<GuildId, V>,
        guild_id: GuildId,
        is_current: impl Fn(&V) -> bool,
    ) -> bool {
        active
            .remove_if(&guild_id, |_, current| is_current(current))
            .is_some()
    }

}
