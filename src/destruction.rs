use std::{sync::Arc, time::Duration};

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{
    gateway::{Gateway, MessageRef},
    util,
};

/// A deletion that has been arranged. There is no way to call it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDestruction {
    pub message: MessageRef,
    pub due: Instant,
}

/// Deletes messages some time after they were sent.
#[derive(Clone)]
pub struct DestructionScheduler {
    gateway: Arc<dyn Gateway>,
    delay: Duration,
}

impl DestructionScheduler {
    pub fn new(gateway: Arc<dyn Gateway>, delay: Duration) -> Self {
        Self { gateway, delay }
    }

    pub fn schedule(&self, message: MessageRef) -> ScheduledDestruction {
        self.schedule_after(message, self.delay)
    }

    pub fn schedule_after(&self, message: MessageRef, delay: Duration) -> ScheduledDestruction {
        let due = util::deadline_after(delay);
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(due).await;
            match gateway.delete(message).await {
                Ok(()) => debug!(message_id = %message.message_id, "Destroyed message"),
                Err(err) => warn!(message_id = %message.message_id, "Failed to destroy message: {err:?}"),
            }
        });

        ScheduledDestruction { message, due }
    }
}
