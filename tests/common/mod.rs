//! Recording fakes for the bot's external services, shared by the
//! integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fake::Fake;
use fake::faker::internet::en::Username;
use rstest::fixture;
use serenity::all::{ChannelId, GuildId, MessageId, Permissions, UserId};

use ghostbot::utils::counters::MemoryCounterStore;
use ghostbot::utils::openai::{Completion, CompletionRequest, OpenAiError};
use ghostbot::utils::platform::{Platform, PlatformError, Reactor};
use ghostbot::utils::voice::{PlayOutcome, Voice, VoiceError};
use ghostbot::{Bot, IncomingMessage, Mentioned};

pub const BOT_ID: u64 = 900;
pub const GUILD_ID: u64 = 10;
pub const CHANNEL_ID: u64 = 20;
pub const VOICE_CHANNEL_ID: u64 = 30;

/// One outbound platform call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message(String),
    Reply(String),
    Typing,
    Kick(UserId),
    Ban(UserId),
    Timeout(UserId, Duration),
    React(MessageId, String),
}

#[derive(Default)]
pub struct RecordingPlatform {
    sent: Mutex<Vec<Sent>>,
    reactors: Mutex<Vec<Reactor>>,
    next_message: AtomicU64,
}

impl RecordingPlatform {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Reply(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn set_reactors(&self, reactors: Vec<Reactor>) {
        *self.reactors.lock().unwrap() = reactors;
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn send_message(
        &self,
        _channel_id: ChannelId,
        content: String,
    ) -> Result<MessageId, PlatformError> {
        self.record(Sent::Message(content));
        let id = 1000 + self.next_message.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId::new(id))
    }

    async fn reply(
        &self,
        _channel_id: ChannelId,
        _message_id: MessageId,
        content: String,
    ) -> Result<(), PlatformError> {
        self.record(Sent::Reply(content));
        Ok(())
    }

    async fn start_typing(&self, _channel_id: ChannelId) -> Result<(), PlatformError> {
        self.record(Sent::Typing);
        Ok(())
    }

    async fn kick(&self, _guild_id: GuildId, user_id: UserId) -> Result<(), PlatformError> {
        self.record(Sent::Kick(user_id));
        Ok(())
    }

    async fn ban(&self, _guild_id: GuildId, user_id: UserId) -> Result<(), PlatformError> {
        self.record(Sent::Ban(user_id));
        Ok(())
    }

    async fn timeout(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        duration: Duration,
    ) -> Result<(), PlatformError> {
        self.record(Sent::Timeout(user_id, duration));
        Ok(())
    }

    async fn react(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        emoji: String,
    ) -> Result<(), PlatformError> {
        self.record(Sent::React(message_id, emoji));
        Ok(())
    }

    async fn reactors(
        &self,
        _channel_id: ChannelId,
        _message_id: MessageId,
        _emoji: String,
    ) -> Result<Vec<Reactor>, PlatformError> {
        Ok(self.reactors.lock().unwrap().clone())
    }
}

/// Voice fake that tracks which guilds hold a connection and what is playing.
#[derive(Default)]
pub struct RecordingVoice {
    playing: Mutex<Vec<(GuildId, String)>>,
    connected: Mutex<Vec<GuildId>>,
}

impl RecordingVoice {
    pub fn now_playing(&self, guild_id: GuildId) -> Option<String> {
        self.playing
            .lock()
            .unwrap()
            .iter()
            .find(|(guild, _)| *guild == guild_id)
            .map(|(_, url)| url.clone())
    }

    pub fn is_connected(&self, guild_id: GuildId) -> bool {
        self.connected.lock().unwrap().contains(&guild_id)
    }

    fn connect(&self, guild_id: GuildId) {
        let mut connected = self.connected.lock().unwrap();
        if !connected.contains(&guild_id) {
            connected.push(guild_id);
        }
    }
}

#[async_trait]
impl Voice for RecordingVoice {
    async fn join(&self, guild_id: GuildId, _channel_id: ChannelId) -> Result<(), VoiceError> {
        self.connect(guild_id);
        Ok(())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        _channel_id: ChannelId,
        url: String,
    ) -> Result<PlayOutcome, VoiceError> {
        self.connect(guild_id);
        let mut playing = self.playing.lock().unwrap();
        let replaced = playing.iter().any(|(guild, _)| *guild == guild_id);
        playing.retain(|(guild, _)| *guild != guild_id);
        playing.push((guild_id, url));
        Ok(if replaced {
            PlayOutcome::Replaced
        } else {
            PlayOutcome::Started
        })
    }

    async fn leave(&self, guild_id: GuildId) -> Result<bool, VoiceError> {
        self.playing.lock().unwrap().retain(|(guild, _)| *guild != guild_id);
        let mut connected = self.connected.lock().unwrap();
        let was_connected = connected.contains(&guild_id);
        connected.retain(|guild| *guild != guild_id);
        Ok(was_connected)
    }
}

/// Completion fake returning a canned answer (or failure) and recording
/// every request.
pub struct ScriptedCompletion {
    answer: Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            answer: Err(reason.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, OpenAiError> {
        self.requests.lock().unwrap().push(request);
        self.answer.clone().map_err(OpenAiError::Refusal)
    }
}

/// A bot wired to recording fakes, with handles to inspect them.
pub struct Harness {
    pub bot: Bot,
    pub platform: Arc<RecordingPlatform>,
    pub voice: Arc<RecordingVoice>,
    pub completion: Arc<ScriptedCompletion>,
    pub counters: Arc<MemoryCounterStore>,
}

impl Harness {
    pub fn with_completion(completion: ScriptedCompletion) -> Self {
        let platform = Arc::new(RecordingPlatform::default());
        let voice = Arc::new(RecordingVoice::default());
        let completion = Arc::new(completion);
        let counters = Arc::new(MemoryCounterStore::new());

        let bot = Bot::new(
            UserId::new(BOT_ID),
            platform.clone(),
            voice.clone(),
            completion.clone(),
        )
        .with_counters(counters.clone())
        .with_rng_seed(5);

        Self {
            bot,
            platform,
            voice,
            completion,
            counters,
        }
    }
}

#[fixture]
pub fn harness() -> Harness {
    Harness::with_completion(ScriptedCompletion::answering("Hello there!"))
}

pub fn guild() -> GuildId {
    GuildId::new(GUILD_ID)
}

pub fn user(id: u64) -> Mentioned {
    Mentioned {
        id: UserId::new(id),
        tag: Username().fake(),
    }
}

pub fn bot_user() -> Mentioned {
    Mentioned {
        id: UserId::new(BOT_ID),
        tag: "Ghostbot#0000".to_string(),
    }
}

/// Builder for a guild message from a regular member.
pub struct MessageBuilder {
    message: IncomingMessage,
}

pub fn message(author: u64, content: &str) -> MessageBuilder {
    MessageBuilder {
        message: IncomingMessage {
            id: MessageId::new(1),
            channel_id: ChannelId::new(CHANNEL_ID),
            guild_id: Some(guild()),
            author: UserId::new(author),
            author_is_bot: false,
            content: content.to_string(),
            mentions: Vec::new(),
            permissions: Permissions::SEND_MESSAGES,
            voice_channel: None,
            latency: None,
        },
    }
}

impl MessageBuilder {
    pub fn mentioning(mut self, mentioned: Mentioned) -> Self {
        self.message.mentions.push(mentioned);
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.message.permissions = permissions;
        self
    }

    pub fn in_voice(mut self) -> Self {
        self.message.voice_channel = Some(ChannelId::new(VOICE_CHANNEL_ID));
        self
    }

    pub fn from_bot(mut self) -> Self {
        self.message.author_is_bot = true;
        self
    }

    pub fn direct(mut self) -> Self {
        self.message.guild_id = None;
        self.message.permissions = Permissions::empty();
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.message.latency = Some(latency);
        self
    }

    pub fn build(self) -> IncomingMessage {
        self.message
    }
}
