use super::*;

/// List every registered command, generated from the command table.
pub async fn help(_invocation: &Invocation<'_>, bot: &Bot) -> CommandResult {
    let prefix = bot.settings().prefix;
    let mut text = format!(
        "📖 {} Commands:\n\nAI: @{} <question>\n",
        bot.settings().persona,
        bot.settings().persona
    );

    for command in bot.commands().iter() {
        text.push_str(&format!(
            "`{prefix}{}` · {}\n",
            command.usage, command.description
        ));
    }

    Ok(Some(text))
}
