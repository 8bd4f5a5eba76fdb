//! Answers messages that mention the bot using the completion service.

use poise::serenity_prelude::UserId;
use tracing::{debug, error, info, warn};

use crate::commands::CommandError;
use crate::utils::openai::{CompletionRequest, OpenAiError};
use crate::{Bot, IncomingMessage};

/// The maximum character length allowed for a single Discord message.
const MAX_MESSAGE_LENGTH: usize = 2000;

pub fn system_prompt(persona: &str) -> String {
    format!("You are {persona}, a helpful Discord assistant.")
}

/// Remove the first mention of `bot_id` (either `<@id>` or the nickname form
/// `<@!id>`) and trim what is left.
pub fn strip_mention(content: &str, bot_id: UserId) -> String {
    let plain = format!("<@{bot_id}>");
    let nickname = format!("<@!{bot_id}>");

    let first = [plain, nickname]
        .into_iter()
        .filter_map(|token| content.find(&token).map(|at| (at, token.len())))
        .min_by_key(|(at, _)| *at);

    match first {
        Some((at, len)) => format!("{}{}", &content[..at], &content[at + len..])
            .trim()
            .to_string(),
        None => content.trim().to_string(),
    }
}

/// Split a response into pieces that respect Discord's message length limit,
/// never cutting inside a character.
pub fn chunk_response(response: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut iter = response.chars();
    let mut pos = 0;
    while pos < response.len() {
        let len: usize = iter
            .by_ref()
            .take(MAX_MESSAGE_LENGTH)
            .map(char::len_utf8)
            .sum();
        chunks.push(&response[pos..pos + len]);
        pos += len;
    }
    chunks
}

/// Forward the text of a mention to the completion service and reply with
/// the answer. Returns the reply text, or `None` when the mention carried no
/// question.
pub async fn respond(bot: &Bot, message: &IncomingMessage) -> Option<String> {
    let prompt = strip_mention(&message.content, bot.id());
    if prompt.is_empty() {
        debug!("Mention from {} carried no prompt, ignoring", message.author);
        return None;
    }

    if let Err(e) = bot.platform().start_typing(message.channel_id).await {
        warn!("Failed to show typing indicator: {}", e);
    }

    let request = CompletionRequest {
        system: system_prompt(&bot.settings().persona),
        user: prompt,
        max_tokens: bot.settings().max_tokens,
    };

    info!("Forwarding mention from {} to the assistant", message.author);
    let reply = match bot.completion().complete(request).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            error!("Assistant returned an empty reply");
            CommandError::from(OpenAiError::Unknown).to_string()
        }
        Err(e) => {
            error!("Assistant request failed: {}", e);
            CommandError::from(e).to_string()
        }
    };

    for chunk in chunk_response(&reply) {
        if let Err(e) = bot
            .platform()
            .reply(message.channel_id, message.id, chunk.to_string())
            .await
        {
            error!("Failed to send assistant reply: {}", e);
            break;
        }
    }

    Some(reply)
}
