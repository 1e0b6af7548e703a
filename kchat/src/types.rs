//! Transcript message, attachment, mode, and snapshot types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use kprovider::{CapabilitySet, Message, ModelDescriptor, Role};

use crate::ChatError;

/// Image attached to a user message, held as a `data:` URL.
///
/// ```rust
/// use kchat::ImageAttachment;
///
/// let image = ImageAttachment::from_bytes("image/png", b"hi");
/// assert_eq!(image.data_url(), "data:image/png;base64,aGk=");
/// assert_eq!(image.payload(), "aGk=");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    data_url: String,
}

impl ImageAttachment {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::new(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Transport form: everything after the first comma, or the whole value.
    pub fn payload(&self) -> &str {
        self.data_url
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or(&self.data_url)
    }

    /// Decodes the payload, failing when it is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, ChatError> {
        STANDARD
            .decode(self.payload())
            .map_err(|err| ChatError::invalid_request(format!("image is not valid base64: {err}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub image: Option<ImageAttachment>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, image: Option<ImageAttachment>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            image,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            image: None,
            timestamp: Utc::now(),
        }
    }

    pub fn to_wire(&self) -> Message {
        let message = Message::new(self.role, self.content.clone());
        match &self.image {
            Some(image) => message.with_image(image.payload()),
            None => message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// No probe has completed yet.
    #[default]
    Unprobed,
    Connected,
    Simulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerPhase {
    #[default]
    Idle,
    AwaitingConnectionProbe,
    Sending,
    Streaming,
    WholeReceive,
    ToolDispatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A precondition was not met; nothing changed.
    Skipped,
    Completed,
    /// Transport failure. The transcript keeps whatever was appended.
    Failed(ChatError),
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Read-only copy of controller state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    pub messages: Vec<ChatMessage>,
    pub models: Vec<ModelDescriptor>,
    pub selected_model: Option<String>,
    pub capabilities: CapabilitySet,
    pub mode: ConnectionMode,
    pub phase: ControllerPhase,
    pub input: String,
    pub image: Option<ImageAttachment>,
    pub streaming_enabled: bool,
    pub tools_enabled: bool,
    pub busy: bool,
    /// True while the last message is still receiving streamed text.
    pub streaming_in_progress: bool,
}
