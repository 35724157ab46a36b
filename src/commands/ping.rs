use crate::{constant, gateway::Gateway, invocation::CommandInvocation};

use super::{CommandError, CommandHandler};

pub struct Handler;
#[serenity::async_trait]
impl CommandHandler for Handler {
    fn name(&self) -> &str {
        constant::commands::PING
    }

    fn description(&self) -> &str {
        "Checks that the bot is listening."
    }

    async fn run(
        &self,
        gateway: &dyn Gateway,
        invocation: &CommandInvocation,
    ) -> Result<(), CommandError> {
        gateway.say(invocation.channel_id, "Pong!").await?;
        Ok(())
    }
}
