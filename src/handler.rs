use std::sync::{Arc, OnceLock};

use serenity::{
    all::{ActivityData, Context, EventHandler, Message, Reaction, Ready},
    async_trait,
};
use tracing::{debug, info, warn};

use crate::{
    commands::CommandRegistry,
    config::{self, Configuration},
    confirmation::ReactionEvent,
    feedback::Feedback,
    gateway::{DiscordGateway, Gateway},
    invocation::CommandInvocation,
};

/// Everything that needs the HTTP client, built once we are connected.
struct Connected {
    gateway: Arc<dyn Gateway>,
    feedback: Feedback,
}

pub struct Handler {
    discord_config: config::Discord,
    feedback_config: config::Feedback,
    commands: CommandRegistry,
    connected: OnceLock<Connected>,
}

impl Handler {
    pub fn new(config: &Configuration, commands: CommandRegistry) -> Self {
        Self {
            discord_config: config.discord.clone(),
            feedback_config: config.feedback.clone(),
            commands,
            connected: OnceLock::new(),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);

        self.connected.get_or_init(|| {
            let gateway: Arc<dyn Gateway> = Arc::new(DiscordGateway::new(ctx.http.clone()));
            Connected {
                feedback: Feedback::new(gateway.clone(), &self.feedback_config),
                gateway,
            }
        });

        if let Some(activity) = &self.discord_config.activity {
            ctx.set_activity(Some(ActivityData::watching(activity)));
        }

        let commands = self.commands.names().collect::<Vec<_>>().join(", ");
        info!(
            "{} is good to go! Listening for `{}` with: {commands}",
            ready.user.name, self.discord_config.prefix
        );
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(invocation) = CommandInvocation::from_message(&self.discord_config.prefix, &msg)
        else {
            return;
        };
        let Some(connected) = self.connected.get() else {
            warn!("Ignoring command received before the bot was ready");
            return;
        };

        let outcome = self
            .commands
            .execute(connected.gateway.as_ref(), &invocation)
            .await;
        connected
            .feedback
            .on_command_completed(&invocation, outcome)
            .await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(connected) = self.connected.get() else {
            return;
        };
        let Some(event) = ReactionEvent::from_reaction(&reaction) else {
            return;
        };

        if connected.feedback.on_reaction(&event) {
            debug!(message_id = %event.message_id, "Error disclosure confirmed");
        }
    }
}
