use super::*;

/// Ping the bot to check its latency
pub async fn ping(invocation: &Invocation<'_>, _bot: &Bot) -> CommandResult {
    // Latency is unknown until the shard has completed its first heartbeat.
    let reply = match invocation.message.latency {
        Some(latency) => format!("🏓 Pong! {}ms", latency.as_millis()),
        None => "🏓 Pong!".to_string(),
    };

    Ok(Some(reply))
}
