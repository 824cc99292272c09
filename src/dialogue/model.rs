//! Transcript messages and the events the engine emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::script::NodeId;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Bot,
    User,
}

/// One entry of the transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// 1-based position in the transcript.
    pub id: u64,
    /// Display text; may contain line breaks.
    pub text: String,
    pub author: Author,
    /// Selectable options, empty when the message offers none.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub sent_at: DateTime<Utc>,
    /// The node whose reply this is (bot messages only).
    #[serde(skip)]
    pub(crate) node: Option<NodeId>,
}

impl Message {
    /// The bot reply of `node`, carrying its options.
    pub(crate) fn bot(id: u64, node: NodeId) -> Self {
        Self {
            id,
            text: node.reply().to_string(),
            author: Author::Bot,
            options: node.option_labels(),
            sent_at: Utc::now(),
            node: Some(node),
        }
    }

    /// The user's echoed choice leading into `node`.
    pub(crate) fn echo(id: u64, node: NodeId) -> Self {
        Self {
            id,
            text: node.echo().unwrap_or_default().to_string(),
            author: Author::User,
            options: Vec::new(),
            sent_at: Utc::now(),
            node: None,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.author == Author::Bot
    }
}

/// Something the engine did, broadcast to every subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueEvent {
    /// The typing indicator appeared or disappeared.
    Typing { active: bool },
    /// A message was appended to the transcript.
    Message { message: Message },
    /// The transcript was reset to the greeting.
    Reset { messages: Vec<Message> },
    /// The visitor should be sent to an external URL.
    OpenExternal { url: String },
}

/// Outcome of picking an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Selection {
    /// A scenario started playing.
    Scheduled,
    /// The transcript went back to the greeting.
    Restarted,
    /// An external URL should be opened; the transcript is untouched.
    OpenExternal { url: String },
    /// Nothing happened.
    Ignored,
}

/// Point-in-time view of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub typing: bool,
    /// Options that can be picked right now (hidden while a scenario plays).
    pub options: Vec<String>,
}
