use std::{any::Any, panic::AssertUnwindSafe};

use serenity::futures::FutureExt as _;
use tracing::debug;

use crate::{
    gateway::Gateway,
    invocation::{CommandInvocation, Outcome},
};

pub mod help;
pub mod ping;
pub mod roll;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The user called the command wrong; only worth a usage hint.
    #[error("bad arguments: {0}")]
    BadArguments(String),
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl CommandError {
    pub fn bad_arguments(reason: impl Into<String>) -> Self {
        Self::BadArguments(reason.into())
    }
}

#[serenity::async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(
        &self,
        gateway: &dyn Gateway,
        invocation: &CommandInvocation,
    ) -> Result<(), CommandError>;
}

pub struct CommandRegistry {
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Registers `handlers` along with a `help` command that lists them.
    pub fn new(mut handlers: Vec<Box<dyn CommandHandler>>) -> Self {
        let listing = handlers
            .iter()
            .map(|h| (h.name().to_string(), h.description().to_string()))
            .collect();
        handlers.push(Box::new(help::Handler::new(listing)));
        Self { handlers }
    }

    pub fn with_builtins() -> Self {
        Self::new(vec![Box::new(ping::Handler), Box::new(roll::Handler)])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|h| h.name())
    }

    /// Runs the invoked command and folds however it ended into an [`Outcome`].
    pub async fn execute(&self, gateway: &dyn Gateway, invocation: &CommandInvocation) -> Outcome {
        let Some(handler) = self.handlers.iter().find(|h| h.name() == invocation.name) else {
            return Outcome::NotFound;
        };

        match AssertUnwindSafe(handler.run(gateway, invocation))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => Outcome::Success,
            Ok(Err(CommandError::BadArguments(reason))) => {
                debug!("Bad arguments for {} >> {reason}", invocation.name);
                Outcome::BadArguments
            }
            Ok(Err(CommandError::Failed(err))) => Outcome::Failure(format!("{err:?}")),
            Err(panic) => Outcome::Failure(format!(
                "command `{}` panicked: {}",
                invocation.name,
                panic_message(panic.as_ref())
            )),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
