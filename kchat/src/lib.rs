//! Conversation state machine for the kiln local chat client.
//!
//! A [`ConversationController`] probes the backend for models, owns the
//! transcript, and runs turns against either the live backend or the offline
//! simulator, folding tool results back into the transcript.

mod controller;
mod error;
mod intent;
mod notify;
mod transcript;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatMessage, ConnectionMode, ControllerPhase,
        ConversationController, ConversationControllerBuilder, ConversationSnapshot,
        ImageAttachment, Notification, NotificationLevel, NotificationSink, TurnOutcome,
    };
    pub use ktooling::{DefaultToolRuntime, ToolExecutionResult, ToolRegistry, ToolRuntime};
}

pub use controller::{
    ConversationController, ConversationControllerBuilder, DEFAULT_TEMPERATURE,
    EMPTY_REPLY_PLACEHOLDER,
};
pub use error::{ChatError, ChatErrorKind};
pub use intent::detect_tool_intent;
pub use notify::{Notification, NotificationLevel, NotificationSink, TracingNotificationSink};
pub use transcript::Transcript;
pub use types::{
    ChatMessage, ConnectionMode, ControllerPhase, ConversationSnapshot, ImageAttachment,
    TurnOutcome,
};
