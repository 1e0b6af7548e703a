//! Controller wiring for facade consumers.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    ConversationController, DefaultToolRuntime, MockFileSystem, ModelProvider, ProviderError,
    ResponseSimulator, SafeProviderHooks, SafeToolHooks, SystemClock, TracingObservabilityHooks,
    builtin_registry,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, PartialEq)]
pub struct KilnConfig {
    pub base_url: String,
    pub temperature: f32,
    /// Pause before each simulated chunk.
    pub stream_chunk_delay: Duration,
    pub streaming_enabled: bool,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: kchat::DEFAULT_TEMPERATURE,
            stream_chunk_delay: kprovider::DEFAULT_CHUNK_DELAY,
            streaming_enabled: true,
        }
    }
}

impl KilnConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_stream_chunk_delay(mut self, delay: Duration) -> Self {
        self.stream_chunk_delay = delay;
        self
    }

    pub fn with_streaming_enabled(mut self, enabled: bool) -> Self {
        self.streaming_enabled = enabled;
        self
    }
}

/// The six built-in tools over the demo filesystem, reporting through tracing.
pub fn builtin_tool_runtime() -> DefaultToolRuntime {
    let registry = builtin_registry(Arc::new(MockFileSystem::default()), Arc::new(SystemClock));
    DefaultToolRuntime::new(Arc::new(registry))
        .with_hooks(Arc::new(SafeToolHooks::new(TracingObservabilityHooks)))
}

/// Controller talking to an Ollama server at `config.base_url`.
#[cfg(feature = "provider-ollama")]
pub fn build_controller(config: KilnConfig) -> Result<ConversationController, ProviderError> {
    let http = reqwest::Client::builder()
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;
    let provider = kprovider::adapters::ollama::OllamaProvider::http(http, config.base_url.clone());

    Ok(build_controller_with(config, Arc::new(provider)))
}

#[cfg(not(feature = "provider-ollama"))]
pub fn build_controller(_config: KilnConfig) -> Result<ConversationController, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-ollama feature is not enabled on kiln",
    ))
}

/// Controller over any backend, with the default tools and tracing hooks.
pub fn build_controller_with(
    config: KilnConfig,
    provider: Arc<dyn ModelProvider>,
) -> ConversationController {
    tracing::debug!(
        base_url = %config.base_url,
        temperature = config.temperature,
        streaming = config.streaming_enabled,
        "building conversation controller"
    );

    ConversationController::builder(provider)
        .tool_runtime(Arc::new(builtin_tool_runtime()))
        .simulator(ResponseSimulator::default().with_chunk_delay(config.stream_chunk_delay))
        .provider_hooks(Arc::new(SafeProviderHooks::new(TracingObservabilityHooks)))
        .temperature(config.temperature)
        .streaming_enabled(config.streaming_enabled)
        .build()
}
