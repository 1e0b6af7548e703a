//! Chat backends for the kiln client: wire model, the Ollama adapter, the
//! offline response simulator, and name-based capability detection.
//!
//! ```rust
//! use kprovider::{CapabilityDetector, fixture_models};
//!
//! let detector = CapabilityDetector::default();
//! let models = fixture_models();
//! let vision = models
//!     .iter()
//!     .filter(|model| detector.detect(&model.name).vision)
//!     .count();
//! assert_eq!(vision, 1);
//! ```

pub mod adapters;
mod capabilities;
mod error;
mod fixtures;
mod hooks;
mod model;
mod provider;
mod simulator;
mod stream;

pub mod prelude {
    pub use crate::{
        CapabilityDetector, CapabilitySet, ChatRequest, ChatResponse, Message, ModelDescriptor,
        ModelProvider, ProviderError, ProviderErrorKind, ResponseSimulator, Role, StreamEvent,
        ToolCall, ToolDefinition,
    };
}

pub use capabilities::{
    CapabilityDetector, CapabilitySet, DEFAULT_TOOL_KEYWORDS, DEFAULT_VISION_KEYWORDS,
};
pub use error::{ProviderError, ProviderErrorKind};
pub use fixtures::fixture_models;
pub use hooks::{NoopOperationHooks, ProviderOperationHooks, observe_operation};
pub use model::{
    ChatRequest, ChatRequestBuilder, ChatResponse, Message, ModelDescriptor, ModelDetails,
    ParameterSchema, ParameterSpec, ParameterType, Role, ToolCall, ToolDefinition,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use simulator::{
    ChunkStream, DEFAULT_CHUNK_DELAY, FixedRandom, RandomSource, ResponseSimulator, SystemRandom,
    split_into_chunks,
};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};
