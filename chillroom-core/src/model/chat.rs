use crate::model::credential::Credential;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed chat frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("message content is empty")]
    EmptyContent,

    #[error("malformed session description: {0}")]
    InvalidSdp(&'static str),
}

/// One chat message as broadcast by the server.
///
/// Both `senderIdentity` and `content` are required; anything else on the
/// wire is ignored. Older servers name the sender field `tokenString`; when
/// a record carries both keys, `senderIdentity` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireChatEvent")]
pub struct ChatEvent {
    #[serde(rename = "senderIdentity")]
    sender_identity: String,
    content: String,
    #[serde(rename = "username", default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct WireChatEvent {
    #[serde(rename = "senderIdentity")]
    sender_identity: Option<String>,
    #[serde(rename = "tokenString")]
    token_string: Option<String>,
    content: String,
    #[serde(rename = "username", default)]
    display_name: Option<String>,
}

impl TryFrom<WireChatEvent> for ChatEvent {
    type Error = &'static str;

    fn try_from(wire: WireChatEvent) -> Result<Self, Self::Error> {
        let sender_identity = wire
            .sender_identity
            .or(wire.token_string)
            .ok_or("missing field `senderIdentity`")?;

        Ok(Self {
            sender_identity,
            content: wire.content,
            display_name: wire.display_name,
        })
    }
}

impl ChatEvent {
    pub fn new(sender_identity: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender_identity: sender_identity.into(),
            content: content.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Decode a textual frame. Fails on invalid JSON and on missing or
    /// non-string required fields.
    pub fn decode(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn sender_identity(&self) -> &str {
        &self.sender_identity
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Name to show next to the message; the raw identity when the server
    /// did not attach one.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.sender_identity)
    }

    /// Exact, case-sensitive comparison against the caller's credential.
    pub fn is_from(&self, identity: &Credential) -> bool {
        self.sender_identity == identity.as_str()
    }
}

/// A chat message on its way to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    #[serde(rename = "senderIdentity")]
    sender_identity: Credential,
    content: String,
}

impl OutgoingMessage {
    /// Rejects content that is blank after trimming. The content itself is
    /// sent as typed.
    pub fn new(sender: &Credential, content: impl Into<String>) -> Result<Self, ModelError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ModelError::EmptyContent);
        }

        Ok(Self {
            sender_identity: sender.clone(),
            content,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn encode(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }
}
