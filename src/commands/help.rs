use crate::{constant, gateway::Gateway, invocation::CommandInvocation};

use super::{CommandError, CommandHandler};

pub struct Handler {
    listing: Vec<(String, String)>,
}

impl Handler {
    pub fn new(listing: Vec<(String, String)>) -> Self {
        Self { listing }
    }
}

#[serenity::async_trait]
impl CommandHandler for Handler {
    fn name(&self) -> &str {
        constant::commands::HELP
    }

    fn description(&self) -> &str {
        "Lists the available commands."
    }

    async fn run(
        &self,
        gateway: &dyn Gateway,
        invocation: &CommandInvocation,
    ) -> Result<(), CommandError> {
        let mut text = String::from("**Commands**");
        for (name, description) in &self.listing {
            text += &format!("\n`{name}`: {description}");
        }
        text += &format!("\n`{}`: {}", self.name(), self.description());

        gateway.say(invocation.channel_id, &text).await?;
        Ok(())
    }
}
