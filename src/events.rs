use std::time::Duration;

use poise::serenity_prelude::{self as serenity, ChannelId, Permissions};
use tracing::{debug, info};

use crate::commands::Invocation;
use crate::{Data, Error, IncomingMessage, Mentioned};

pub async fn handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("{} is connected!", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            let mut incoming = incoming_message(ctx, new_message);
            if needs_latency(data.bot.settings().prefix, &incoming) {
                incoming.latency = shard_latency(ctx, framework).await;
            }
            data.bot.on_message(&incoming).await;
        }
        _ => {}
    }
    Ok(())
}

/// Translate a gateway message into the bot's own view of it, resolving the
/// author's permissions and voice channel from the guild cache.
fn incoming_message(ctx: &serenity::Context, msg: &serenity::Message) -> IncomingMessage {
    let (permissions, voice_channel) = author_guild_state(ctx, msg);

    IncomingMessage {
        id: msg.id,
        channel_id: msg.channel_id,
        guild_id: msg.guild_id,
        author: msg.author.id,
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
        mentions: msg
            .mentions
            .iter()
            .map(|user| Mentioned {
                id: user.id,
                tag: user.tag(),
            })
            .collect(),
        permissions,
        voice_channel,
        latency: None,
    }
}

fn author_guild_state(
    ctx: &serenity::Context,
    msg: &serenity::Message,
) -> (Permissions, Option<ChannelId>) {
    let Some(guild) = msg.guild(&ctx.cache) else {
        if msg.guild_id.is_some() {
            debug!("Guild {:?} not cached yet", msg.guild_id);
        }
        return (Permissions::empty(), None);
    };

    let permissions = msg
        .member
        .as_deref()
        .map(|member| guild.partial_member_permissions(msg.author.id, member))
        .unwrap_or_else(Permissions::empty);

    let voice_channel = guild
        .voice_states
        .get(&msg.author.id)
        .and_then(|voice_state| voice_state.channel_id);

    (permissions, voice_channel)
}

async fn shard_latency(
    ctx: &serenity::Context,
    framework: poise::FrameworkContext<'_, Data, Error>,
) -> Option<Duration> {
    let manager = framework.shard_manager();
    let runners = manager.runners.lock().await;
    runners.get(&ctx.shard_id)?.latency
}

/// Only `ping` reads the shard latency, so the runner lock is taken for that
/// command alone.
fn needs_latency(prefix: char, message: &IncomingMessage) -> bool {
    Invocation::parse(prefix, message).is_some_and(|invocation| invocation.name == "ping")
}
