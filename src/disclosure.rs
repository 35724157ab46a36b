use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    confirmation::{PendingConfirmation, Resolution},
    destruction::{DestructionScheduler, ScheduledDestruction},
    gateway::{Gateway, MessageRef},
};

/// How a disclosure ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disclosure {
    /// The invoker confirmed in time. `sent` is `None` if the error could not
    /// be posted.
    Disclosed { sent: Option<ScheduledDestruction> },
    /// Nobody confirmed before the deadline; nothing was posted.
    TimedOut,
}

/// Publishes error details once the invoker has asked for them.
pub struct Discloser {
    gateway: Arc<dyn Gateway>,
    scheduler: DestructionScheduler,
    caption: String,
    attachment_name: String,
}

impl Discloser {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        scheduler: DestructionScheduler,
        caption: impl Into<String>,
        attachment_name: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            scheduler,
            caption: caption.into(),
            attachment_name: attachment_name.into(),
        }
    }

    /// Waits on `pending`, and if it is confirmed, replies to `source` with
    /// `detail` as a file that later destroys itself.
    pub async fn run(
        &self,
        pending: PendingConfirmation,
        source: MessageRef,
        detail: String,
    ) -> Disclosure {
        match pending.wait().await {
            Resolution::TimedOut => {
                debug!(message_id = %source.message_id, "Error disclosure was not requested");
                Disclosure::TimedOut
            }
            Resolution::Confirmed => Disclosure::Disclosed {
                sent: self.disclose(source, detail).await,
            },
        }
    }

    async fn disclose(&self, source: MessageRef, detail: String) -> Option<ScheduledDestruction> {
        let sent = self
            .gateway
            .send_attachment(
                source,
                &self.caption,
                &self.attachment_name,
                detail.into_bytes(),
            )
            .await;

        match sent {
            Ok(message) => {
                info!(message_id = %source.message_id, "Disclosed command error");
                Some(self.scheduler.schedule(message))
            }
            Err(err) => {
                warn!(message_id = %source.message_id, "Failed to disclose command error: {err:?}");
                None
            }
        }
    }
}
