//! Unified facade over the kiln workspace crates.
//!
//! Most applications only need this crate: it re-exports the backend, tooling,
//! chat and observability layers and wires them into a ready-to-use
//! [`ConversationController`].
//!
//! ```rust
//! use std::time::Duration;
//!
//! use kiln::KilnConfig;
//!
//! let config = KilnConfig::default()
//!     .with_base_url("http://gpu-box:11434")
//!     .with_stream_chunk_delay(Duration::ZERO);
//! assert_eq!(config.temperature, 0.7);
//! assert!(config.streaming_enabled);
//! ```

mod logging;

pub mod prelude;
pub mod runtime;

pub use kchat;
pub use kcommon;
pub use kobserve;
pub use kprovider;
pub use ktooling;

pub use kchat::{
    ChatError, ChatErrorKind, ChatMessage, ConnectionMode, ControllerPhase,
    ConversationController, ConversationControllerBuilder, ConversationSnapshot, ImageAttachment,
    Notification, NotificationLevel, NotificationSink, Transcript, TracingNotificationSink,
    TurnOutcome, detect_tool_intent,
};
pub use kcommon::{BoxFuture, GenerationOptions, Registry};
pub use kobserve::{
    MetricsObservabilityHooks, SafeProviderHooks, SafeToolHooks, TracingObservabilityHooks,
};
pub use kprovider::{
    BoxedEventStream, CapabilityDetector, CapabilitySet, ChatRequest, ChatRequestBuilder,
    ChatResponse, FixedRandom, Message, ModelDescriptor, ModelDetails, ModelEventStream,
    ModelProvider, NoopOperationHooks, ParameterSchema, ParameterSpec, ParameterType,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderOperationHooks, RandomSource,
    ResponseSimulator, Role, StreamEvent, SystemRandom, ToolCall, ToolDefinition, VecEventStream,
    fixture_models,
};
pub use ktooling::{
    Clock, DefaultToolRuntime, FixedClock, FsNode, FunctionTool, MockFileSystem,
    NoopToolRuntimeHooks, SystemClock, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
    ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
    builtin_registry, parse_json_object, required_string,
};

pub use logging::init_tracing;
pub use runtime::{KilnConfig, build_controller, build_controller_with, builtin_tool_runtime};
