use super::*;

/// Stop playback and leave the voice channel. Silent when not connected.
pub async fn stop(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let guild_id = invocation.message.guild_id.ok_or(CommandError::NotInGuild)?;

    if !bot.voice().leave(guild_id).await? {
        return Ok(None);
    }

    info!("Stopped playback in guild {}", guild_id);
    Ok(Some("⏹️ Stopped".to_string()))
}
