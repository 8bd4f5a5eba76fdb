use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ghostbot::config::Config;
use ghostbot::utils::openai::OpenAiClient;
use ghostbot::utils::platform::SerenityPlatform;
use ghostbot::utils::voice::Voice;
use ghostbot::{Bot, BotSettings, Data, Error, events};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ghostbot=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = Config::from_env()?;
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set, mentions will be answered with an error");
    }

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![],
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                let http_client = reqwest::Client::new();

                let completion = OpenAiClient::new(
                    http_client.clone(),
                    config.openai_base_url.clone(),
                    config.openai_api_key.clone(),
                    config.openai_model.clone(),
                );

                let settings = BotSettings {
                    prefix: config.prefix,
                    persona: ready.user.name.clone(),
                    max_tokens: config.max_tokens,
                };

                let bot = Bot::new(
                    ready.user.id,
                    Arc::new(SerenityPlatform::new(ctx.http.clone())),
                    voice_client(ctx, http_client).await?,
                    Arc::new(completion),
                )
                .with_settings(settings);

                info!("Bot state ready, listening for '{}' commands", config.prefix);
                Ok(Data { bot: Arc::new(bot) })
            })
        });

    let client_builder = ClientBuilder::new(token, intents).framework(framework.build());

    // Create and run client
    build_and_start_client(client_builder).await
}

#[cfg(feature = "music")]
async fn voice_client(
    ctx: &serenity::Context,
    http_client: reqwest::Client,
) -> Result<Arc<dyn Voice>, Error> {
    use ghostbot::utils::voice::{SongbirdVoice, VoiceError};

    let manager = songbird::get(ctx).await.ok_or(VoiceError::NoVoiceManager)?;
    Ok(Arc::new(SongbirdVoice::new(manager, http_client)))
}

#[cfg(not(feature = "music"))]
async fn voice_client(
    _ctx: &serenity::Context,
    _http_client: reqwest::Client,
) -> Result<Arc<dyn Voice>, Error> {
    Ok(Arc::new(ghostbot::utils::voice::NoVoice))
}

async fn build_and_start_client(client_builder: ClientBuilder) -> Result<(), Error> {
    #[cfg(feature = "music")]
    {
        use songbird::SerenityInit;

        let mut client = client_builder.register_songbird().await?;
        shutdown_on_ctrl_c(&client);
        client.start().await.map_err(Into::into)
    }

    #[cfg(not(feature = "music"))]
    {
        let mut client = client_builder.await?;
        shutdown_on_ctrl_c(&client);
        client.start().await.map_err(Into::into)
    }
}

/// Close every shard cleanly when the process receives Ctrl-C. Pending
/// giveaways are dropped with the runtime.
fn shutdown_on_ctrl_c(client: &serenity::Client) {
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
