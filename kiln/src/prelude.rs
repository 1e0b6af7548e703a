//! Common imports for most kiln applications.

pub use crate::{KilnConfig, build_controller, build_controller_with, init_tracing};
pub use crate::{
    CapabilitySet, ChatError, ChatErrorKind, ChatMessage, ConnectionMode, ControllerPhase,
    ConversationController, ConversationSnapshot, ImageAttachment, ModelDescriptor,
    ModelProvider, Notification, NotificationLevel, NotificationSink, ProviderError, Role,
    StreamEvent, ToolCall, ToolDefinition, ToolExecutionResult, ToolRegistry, ToolRuntime,
    TurnOutcome,
};
