use anyhow::Context as AnyhowContext;
use serenity::{Client, model::prelude::*};
use tracing::{error, info};

mod commands;
mod config;
mod confirmation;
mod constant;
mod destruction;
mod disclosure;
mod feedback;
mod gateway;
mod handler;
mod invocation;
mod marker;
mod util;

use config::Configuration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Configuration::load()?;
    init_logging(&config.logging);

    let token = config
        .authentication
        .discord_token
        .as_deref()
        .context("Expected authentication.discord_token to be filled in config")?;

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    let mut client = Client::builder(token, intents)
        .event_handler(handler::Handler::new(
            &config,
            commands::CommandRegistry::with_builtins(),
        ))
        .await
        .context("Error creating client")?;

    info!("Connecting...");
    if let Err(why) = client.start().await {
        error!("Client error: {why:?}");
    }

    Ok(())
}

fn init_logging(config: &config::Logging) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
