use std::time::Duration;

use super::*;
use crate::Mentioned;
use tracing::info;

/// How long `mute` silences a member.
pub const MUTE_DURATION: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sanction {
    Kick,
    Ban,
    Timeout(Duration),
}

impl Sanction {
    fn required(self) -> Permissions {
        match self {
            Sanction::Kick => Permissions::KICK_MEMBERS,
            Sanction::Ban => Permissions::BAN_MEMBERS,
            Sanction::Timeout(_) => Permissions::MODERATE_MEMBERS,
        }
    }

    fn confirmation(self, target: &Mentioned) -> String {
        match self {
            Sanction::Kick => format!("✅ Kicked {}", target.tag),
            Sanction::Ban => format!("✅ Banned {}", target.tag),
            Sanction::Timeout(duration) => format!(
                "🔇 Muted {} for {} minutes",
                target.tag,
                duration.as_secs() / 60
            ),
        }
    }
}

pub async fn kick(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    moderate(invocation, bot, Sanction::Kick).await
}

pub async fn ban(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    moderate(invocation, bot, Sanction::Ban).await
}

pub async fn mute(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    moderate(invocation, bot, Sanction::Timeout(MUTE_DURATION)).await
}

/// Check the caller's capability, find the tagged member and apply the
/// sanction exactly once.
async fn moderate(invocation: &Invocation<'_>, bot: &Bot, sanction: Sanction) -> CommandResult {
    let message = invocation.message;
    if !message.has_capability(sanction.required()) {
        return Err(CommandError::PermissionDenied);
    }

    let guild_id = message.guild_id.ok_or(CommandError::NotInGuild)?;
    let target = message
        .mentions
        .iter()
        .find(|m| m.id != bot.id())
        .ok_or(CommandError::MissingTarget)?;

    let platform = bot.platform();
    match sanction {
        Sanction::Kick => platform.kick(guild_id, target.id).await?,
        Sanction::Ban => platform.ban(guild_id, target.id).await?,
        Sanction::Timeout(duration) => platform.timeout(guild_id, target.id, duration).await?,
    }

    info!(
        "{:?} applied to {} in guild {} by {}",
        sanction, target.id, guild_id, message.author
    );
    Ok(Some(sanction.confirmation(target)))
}
