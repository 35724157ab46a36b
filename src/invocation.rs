use serenity::all::{ChannelId, Message, MessageId, UserId};

use crate::gateway::MessageRef;

/// A single command issued by a user, as parsed from their message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub user_id: UserId,
    /// The full message text, prefix included
    pub content: String,
    pub name: String,
    pub arguments: String,
}

impl CommandInvocation {
    /// Parses `content` as `{prefix}{name} {arguments}`.
    ///
    /// Returns `None` if the prefix is missing or nothing follows it.
    pub fn parse(
        prefix: &str,
        channel_id: ChannelId,
        message_id: MessageId,
        user_id: UserId,
        content: &str,
    ) -> Option<Self> {
        let rest = content.strip_prefix(prefix)?.trim_start();
        let (name, arguments) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if name.is_empty() {
            return None;
        }

        Some(Self {
            channel_id,
            message_id,
            user_id,
            content: content.to_string(),
            name: name.to_lowercase(),
            arguments: arguments.trim().to_string(),
        })
    }

    pub fn from_message(prefix: &str, msg: &Message) -> Option<Self> {
        if msg.author.bot {
            return None;
        }
        Self::parse(prefix, msg.channel_id, msg.id, msg.author.id, &msg.content)
    }

    /// The message that issued this command.
    pub fn source(&self) -> MessageRef {
        MessageRef::new(self.channel_id, self.message_id)
    }
}

/// How a command invocation ended. Produced exactly once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// No command is registered under the invoked name
    NotFound,
    /// The command exists but rejected its arguments
    BadArguments,
    /// Anything else; carries the full error text for disclosure
    Failure(String),
}
