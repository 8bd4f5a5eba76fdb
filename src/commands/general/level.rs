use super::*;

pub async fn level(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let counters = bot.counters().read(invocation.message.author);
    Ok(Some(format!("⭐ XP: {}", counters.experience)))
}

pub async fn balance(invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let counters = bot.counters().read(invocation.message.author);
    Ok(Some(format!("💰 Coins: {}", counters.currency)))
}
