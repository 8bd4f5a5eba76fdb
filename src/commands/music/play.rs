use super::*;
use crate::utils::voice::PlayOutcome;
use crate::utils::youtube;

/// Play the audio of a YouTube video in the caller's voice channel.
///
/// A track that is already playing in the guild is replaced; there is no queue.
pub async fn play(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let message = invocation.message;
    let channel_id = message.voice_channel.ok_or(CommandError::NotInVoice)?;
    let guild_id = message.guild_id.ok_or(CommandError::NotInGuild)?;

    let url = invocation
        .args
        .first()
        .filter(|url| youtube::is_youtube_url(url))
        .ok_or(CommandError::InvalidSource)?;

    info!("Received play command with url: {}", url);
    let reply = match bot.voice().play(guild_id, channel_id, url.clone()).await? {
        PlayOutcome::Started => "▶️ Playing",
        PlayOutcome::Replaced => "▶️ Playing (replaced the previous track)",
    };

    Ok(Some(reply.to_string()))
}
