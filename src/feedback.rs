use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    config,
    confirmation::{Confirmations, ReactionEvent, WaitKey},
    destruction::DestructionScheduler,
    disclosure::{Disclosure, Discloser},
    gateway::Gateway,
    invocation::{CommandInvocation, Outcome},
    marker::{self, MarkerSymbols},
};

/// Reports finished commands back into their channel.
pub struct Feedback {
    gateway: Arc<dyn Gateway>,
    symbols: MarkerSymbols,
    confirmations: Arc<Confirmations>,
    confirmation_timeout: Duration,
    discloser: Arc<Discloser>,
}

impl Feedback {
    pub fn new(gateway: Arc<dyn Gateway>, config: &config::Feedback) -> Self {
        let scheduler = DestructionScheduler::new(gateway.clone(), config.destruction_delay());
        let discloser = Discloser::new(
            gateway.clone(),
            scheduler,
            config.disclosure_caption.as_str(),
            config.attachment_name.as_str(),
        );

        Self {
            gateway,
            symbols: MarkerSymbols::from(config),
            confirmations: Confirmations::new(),
            confirmation_timeout: config.confirmation_timeout(),
            discloser: Arc::new(discloser),
        }
    }

    /// Marks the invocation's message with the outcome's marker.
    ///
    /// For errors, also starts waiting for the invoker to react with the same
    /// marker; the returned task resolves once that wait does.
    pub async fn on_command_completed(
        &self,
        invocation: &CommandInvocation,
        outcome: Outcome,
    ) -> Option<JoinHandle<Disclosure>> {
        let marker = marker::classify(&outcome);
        match &outcome {
            Outcome::Success => {
                debug!("Command successfully executed >> {}", invocation.content)
            }
            Outcome::NotFound => debug!("Command not found >> {}", invocation.name),
            Outcome::BadArguments => debug!("Command rejected its arguments >> {}", invocation.content),
            Outcome::Failure(detail) => {
                debug!("Command errored >> {}", detail.lines().next().unwrap_or_default())
            }
        }

        let symbol = self.symbols.symbol(marker);
        match self.gateway.react(invocation.source(), symbol).await {
            Ok(()) => debug!(message_id = %invocation.message_id, "Posted {marker:?} marker"),
            Err(err) => warn!(message_id = %invocation.message_id, "Failed to post {marker:?} marker: {err:?}"),
        }

        let Outcome::Failure(detail) = outcome else {
            return None;
        };
        let key = WaitKey {
            message_id: invocation.message_id,
            symbol: symbol.to_string(),
            user_id: invocation.user_id,
        };
        let Some(pending) = self.confirmations.register(key, self.confirmation_timeout) else {
            debug!(message_id = %invocation.message_id, "Already awaiting confirmation");
            return None;
        };
        debug!(
            message_id = %invocation.message_id,
            pending = self.confirmations.active(),
            "Awaiting error disclosure confirmation"
        );

        let discloser = self.discloser.clone();
        let source = invocation.source();
        Some(tokio::spawn(async move {
            discloser.run(pending, source, detail).await
        }))
    }

    /// Offers a reaction to the pending confirmations.
    pub fn on_reaction(&self, event: &ReactionEvent) -> bool {
        self.confirmations.offer(event)
    }
}
