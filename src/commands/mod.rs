//! This module aggregates all the command modules for the bot, plus the
//! prefix parser and the dispatcher that routes a message to its handler.

/// Moderation and giveaway commands (kick, ban, mute, giveaway).
pub mod admins;
/// Shop and purchases.
pub mod economy;
/// General purpose commands (help, ping, level, balance).
pub mod general;
/// Voice commands (join, play, stop).
pub mod music;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::utils::counters::InsufficientFunds;
use crate::utils::openai::OpenAiError;
use crate::utils::platform::PlatformError;
use crate::utils::voice::VoiceError;
use crate::{Bot, IncomingMessage};

/// Reply sent when a handler panics.
const GENERIC_FAILURE: &str = "❌ Something went wrong";

/// Failures a command reports back to its caller. The `Display` text is the
/// reply the user sees.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("❌ No permission")]
    PermissionDenied,

    #[error("Tag a user")]
    MissingTarget,

    #[error("Usage: {0}")]
    InvalidArguments(String),

    #[error("❌ Not enough coins")]
    InsufficientFunds(#[from] InsufficientFunds),

    #[error("Join a voice channel first")]
    NotInVoice,

    #[error("Invalid YouTube link")]
    InvalidSource,

    #[error("❌ AI error")]
    AssistantServiceError(#[from] OpenAiError),

    #[error("❌ This command only works in a server")]
    NotInGuild,

    #[error("❌ Something went wrong")]
    Platform(#[from] PlatformError),

    #[error("❌ Voice connection failed")]
    Voice(#[from] VoiceError),
}

/// `Some(text)` replies to the invoking message, `None` stays silent.
pub type CommandResult = Result<Option<String>, CommandError>;

pub type Action = for<'a> fn(&'a Invocation<'a>, &'a Bot) -> BoxFuture<'a, CommandResult>;

/// A parsed prefix command.
#[derive(Debug)]
pub struct Invocation<'a> {
    pub message: &'a IncomingMessage,
    /// Lower-cased command name, prefix stripped.
    pub name: String,
    pub args: Vec<String>,
}

impl<'a> Invocation<'a> {
    /// Split `message` into a command name and positional arguments. Returns
    /// `None` unless the text starts with `prefix` directly followed by a name.
    pub fn parse(prefix: char, message: &'a IncomingMessage) -> Option<Self> {
        let rest = message.content.strip_prefix(prefix)?;
        if rest.starts_with(char::is_whitespace) {
            return None;
        }

        let mut tokens = rest.split_whitespace();
        let name = tokens.next()?.to_lowercase();
        let args = tokens.map(str::to_owned).collect();

        Some(Self {
            message,
            name,
            args,
        })
    }
}

pub struct Command {
    pub name: &'static str,
    /// Argument synopsis shown by `help`, without the prefix.
    pub usage: &'static str,
    pub description: &'static str,
    pub action: Action,
}

/// Builds a [`Command`] from an `async fn(&Invocation, &Bot) -> CommandResult`.
macro_rules! command {
    ($name:literal, $usage:literal, $description:literal, $handler:path) => {{
        fn action<'a>(
            invocation: &'a Invocation<'a>,
            bot: &'a Bot,
        ) -> BoxFuture<'a, CommandResult> {
            Box::pin($handler(invocation, bot))
        }

        Command {
            name: $name,
            usage: $usage,
            description: $description,
            action,
        }
    }};
}

/// Name → handler lookup, kept in registration order for `help`.
pub struct CommandTable {
    commands: Vec<Command>,
    index: HashMap<&'static str, usize>,
}

impl CommandTable {
    pub fn new(commands: Vec<Command>) -> Self {
        let index = commands
            .iter()
            .enumerate()
            .map(|(i, command)| (command.name, i))
            .collect();
        Self { commands, index }
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new(vec![
            command!("help", "help", "Show this list", general::help::help),
            command!("ping", "ping", "Check gateway latency", general::ping::ping),
            command!("level", "level", "Show your XP", general::level::level),
            command!("balance", "balance", "Show your coins", general::level::balance),
            command!("kick", "kick @user", "Kick a member", admins::moderation::kick),
            command!("ban", "ban @user", "Ban a member", admins::moderation::ban),
            command!("mute", "mute @user", "Time a member out for 10 minutes", admins::moderation::mute),
            command!("shop", "shop", "List the shop items", economy::shop::shop),
            command!("buy", "buy <item>", "Buy a shop item", economy::shop::buy),
            command!("giveaway", "giveaway <minutes> <prize>", "Start a giveaway", admins::giveaway::giveaway),
            command!("join", "join", "Join your voice channel", music::join::join),
            command!("play", "play <youtube link>", "Play a YouTube video's audio", music::play::play),
            command!("stop", "stop", "Leave the voice channel", music::stop::stop),
        ])
    }
}

/// Route a prefixed message to its command and reply with the outcome.
///
/// Unknown commands are ignored. Errors and panics inside a handler are turned
/// into a reply here so they never escape into the event loop. Returns the
/// reply text, if one was sent.
pub async fn dispatch(bot: &Bot, message: &IncomingMessage) -> Option<String> {
    let invocation = Invocation::parse(bot.settings().prefix, message)?;

    let Some(command) = bot.commands().get(&invocation.name) else {
        debug!("Ignoring unknown command '{}'", invocation.name);
        return None;
    };

    info!(
        "Running command '{}' for user {} with {} argument(s)",
        command.name,
        message.author,
        invocation.args.len()
    );

    let outcome = AssertUnwindSafe((command.action)(&invocation, bot))
        .catch_unwind()
        .await;

    let reply = match outcome {
        Ok(Ok(Some(reply))) => reply,
        Ok(Ok(None)) => return None,
        Ok(Err(err)) => {
            warn!("Command '{}' failed: {:?}", command.name, err);
            err.to_string()
        }
        Err(_) => {
            error!("Command '{}' panicked", command.name);
            GENERIC_FAILURE.to_string()
        }
    };

    if let Err(e) = bot
        .platform()
        .reply(message.channel_id, message.id, reply.clone())
        .await
    {
        error!("Failed to reply to command '{}': {}", command.name, e);
    }

    Some(reply)
}
