use std::sync::Arc;

use anyhow::Context as _;
use serenity::{
    all::{ChannelId, CreateAttachment, CreateMessage, Http, MessageId, ReactionType},
    http::HttpError,
};

/// Points at a message somewhere the bot can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

impl MessageRef {
    pub fn new(channel_id: ChannelId, message_id: MessageId) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

/// The messaging operations the bot needs from the chat service.
#[serenity::async_trait]
pub trait Gateway: Send + Sync {
    async fn react(&self, message: MessageRef, symbol: &str) -> anyhow::Result<()>;
    async fn say(&self, channel_id: ChannelId, content: &str) -> anyhow::Result<MessageRef>;
    /// Replies to `reply_to` with a caption and a single file.
    async fn send_attachment(
        &self,
        reply_to: MessageRef,
        caption: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> anyhow::Result<MessageRef>;
    /// Deletes a message. A message that is already gone is not an error.
    async fn delete(&self, message: MessageRef) -> anyhow::Result<()>;
}

pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[serenity::async_trait]
impl Gateway for DiscordGateway {
    async fn react(&self, message: MessageRef, symbol: &str) -> anyhow::Result<()> {
        let reaction = ReactionType::try_from(symbol)
            .map_err(|_| anyhow::anyhow!("`{symbol}` is not a valid reaction"))?;
        Ok(message
            .channel_id
            .create_reaction(self.http.as_ref(), message.message_id, reaction)
            .await?)
    }

    async fn say(&self, channel_id: ChannelId, content: &str) -> anyhow::Result<MessageRef> {
        let msg = channel_id.say(self.http.as_ref(), content).await?;
        Ok(MessageRef::new(msg.channel_id, msg.id))
    }

    async fn send_attachment(
        &self,
        reply_to: MessageRef,
        caption: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> anyhow::Result<MessageRef> {
        let msg = reply_to
            .channel_id
            .send_message(
                self.http.as_ref(),
                CreateMessage::new()
                    .content(caption)
                    .reference_message((reply_to.channel_id, reply_to.message_id))
                    .add_file(CreateAttachment::bytes(data, filename)),
            )
            .await
            .context("failed to send attachment")?;
        Ok(MessageRef::new(msg.channel_id, msg.id))
    }

    async fn delete(&self, message: MessageRef) -> anyhow::Result<()> {
        match message
            .channel_id
            .delete_message(self.http.as_ref(), message.message_id)
            .await
        {
            Ok(()) => Ok(()),
            Err(serenity::Error::Http(HttpError::UnsuccessfulRequest(response)))
                if response.status_code.as_u16() == 404 =>
            {
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    };

    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        React(MessageRef, String),
        Say(ChannelId, String),
        SendAttachment {
            reply_to: MessageRef,
            sent: MessageRef,
            caption: String,
            filename: String,
            data: Vec<u8>,
        },
        Delete(MessageRef),
    }

    /// Records every call along with the (possibly paused) clock reading.
    pub struct RecordingGateway {
        calls: Mutex<Vec<(Instant, Call)>>,
        calls_tx: flume::Sender<(Instant, Call)>,
        pub calls_rx: flume::Receiver<(Instant, Call)>,
        next_id: AtomicU64,
        pub fail_reactions: AtomicBool,
    }

    impl RecordingGateway {
        pub fn new() -> Self {
            let (calls_tx, calls_rx) = flume::unbounded();
            Self {
                calls: Mutex::new(vec![]),
                calls_tx,
                calls_rx,
                next_id: AtomicU64::new(1000),
                fail_reactions: AtomicBool::new(false),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, c)| c.clone())
                .collect()
        }

        pub fn reactions(&self) -> Vec<(MessageRef, String)> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::React(m, s) => Some((m, s)),
                    _ => None,
                })
                .collect()
        }

        pub fn attachments(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, Call::SendAttachment { .. }))
                .collect()
        }

        fn record(&self, call: Call) {
            let entry = (Instant::now(), call);
            self.calls.lock().unwrap().push(entry.clone());
            self.calls_tx.send(entry).ok();
        }

        fn next_message(&self, channel_id: ChannelId) -> MessageRef {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            MessageRef::new(channel_id, MessageId::new(id))
        }
    }

    #[serenity::async_trait]
    impl Gateway for RecordingGateway {
        async fn react(&self, message: MessageRef, symbol: &str) -> anyhow::Result<()> {
            self.record(Call::React(message, symbol.to_string()));
            if self.fail_reactions.load(Ordering::SeqCst) {
                anyhow::bail!("missing permissions");
            }
            Ok(())
        }

        async fn say(&self, channel_id: ChannelId, content: &str) -> anyhow::Result<MessageRef> {
            self.record(Call::Say(channel_id, content.to_string()));
            Ok(self.next_message(channel_id))
        }

        async fn send_attachment(
            &self,
            reply_to: MessageRef,
            caption: &str,
            filename: &str,
            data: Vec<u8>,
        ) -> anyhow::Result<MessageRef> {
            let sent = self.next_message(reply_to.channel_id);
            self.record(Call::SendAttachment {
                reply_to,
                sent,
                caption: caption.to_string(),
                filename: filename.to_string(),
                data,
            });
            Ok(sent)
        }

        async fn delete(&self, message: MessageRef) -> anyhow::Result<()> {
            self.record(Call::Delete(message));
            Ok(())
        }
    }
}
