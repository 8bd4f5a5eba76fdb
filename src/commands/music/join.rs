use super::*;

/// Join the caller's voice channel
pub async fn join(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let message = invocation.message;
    let channel_id = message.voice_channel.ok_or(CommandError::NotInVoice)?;
    let guild_id = message.guild_id.ok_or(CommandError::NotInGuild)?;

    bot.voice().join(guild_id, channel_id).await?;
    info!("Joined voice channel {} for {}", channel_id, message.author);

    Ok(Some("🎵 Joined VC".to_string()))
}
