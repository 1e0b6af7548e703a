//! Conversation controller: probe, model selection, and turn execution.
//!
//! All state lives behind one mutex that is never held across an `.await`.
//! A turn marks the controller busy before its first suspension point, so a
//! second `send_message` issued while one is in flight is a no-op.
//!
//! Selecting a model starts a new conversation epoch. A turn only writes to
//! the transcript of the epoch it started in and stops once that epoch ends.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures_util::StreamExt;
use kprovider::{
    CapabilityDetector, CapabilitySet, ChatRequest, Message, ModelDescriptor, ModelProvider,
    NoopOperationHooks, ProviderOperationHooks, ResponseSimulator, StreamEvent, ToolDefinition,
    fixture_models, observe_operation,
};
use ktooling::{DefaultToolRuntime, ToolRuntime};

use crate::intent::detect_tool_intent;
use crate::{
    ChatError, ChatMessage, ConnectionMode, ControllerPhase, ConversationSnapshot,
    ImageAttachment, Notification, NotificationSink, Transcript, TracingNotificationSink,
    TurnOutcome,
};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Reply used when a backend answers without content.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No response";

#[derive(Debug, Clone, Default)]
struct ConversationState {
    transcript: Transcript,
    models: Vec<ModelDescriptor>,
    selected: Option<ModelDescriptor>,
    capabilities: CapabilitySet,
    input: String,
    image: Option<ImageAttachment>,
    streaming_enabled: bool,
    tools_enabled: bool,
    mode: ConnectionMode,
    phase: ControllerPhase,
    busy: bool,
    epoch: u64,
}

/// Everything a turn needs, captured under the lock before the first await.
struct TurnPlan {
    model: String,
    user_text: String,
    history: Vec<Message>,
    stream: bool,
    tools_active: bool,
    mode: ConnectionMode,
    epoch: u64,
}

pub struct ConversationControllerBuilder {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    detector: CapabilityDetector,
    simulator: ResponseSimulator,
    notifier: Arc<dyn NotificationSink>,
    hooks: Arc<dyn ProviderOperationHooks>,
    temperature: f32,
    streaming_enabled: bool,
}

impl ConversationControllerBuilder {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            tools: Arc::new(DefaultToolRuntime::default()),
            detector: CapabilityDetector::default(),
            simulator: ResponseSimulator::default(),
            notifier: Arc::new(TracingNotificationSink),
            hooks: Arc::new(NoopOperationHooks),
            temperature: DEFAULT_TEMPERATURE,
            streaming_enabled: true,
        }
    }

    pub fn tool_runtime(mut self, tools: Arc<dyn ToolRuntime>) -> Self {
        self.tools = tools;
        self
    }

    pub fn capability_detector(mut self, detector: CapabilityDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn simulator(mut self, simulator: ResponseSimulator) -> Self {
        self.simulator = simulator;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn provider_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn streaming_enabled(mut self, enabled: bool) -> Self {
        self.streaming_enabled = enabled;
        self
    }

    pub fn build(self) -> ConversationController {
        ConversationController {
            provider: self.provider,
            tools: self.tools,
            detector: self.detector,
            simulator: self.simulator,
            notifier: self.notifier,
            hooks: self.hooks,
            temperature: self.temperature,
            state: Mutex::new(ConversationState {
                streaming_enabled: self.streaming_enabled,
                ..ConversationState::default()
            }),
        }
    }
}

pub struct ConversationController {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    detector: CapabilityDetector,
    simulator: ResponseSimulator,
    notifier: Arc<dyn NotificationSink>,
    hooks: Arc<dyn ProviderOperationHooks>,
    temperature: f32,
    state: Mutex<ConversationState>,
}

/// Releases the busy flag when a turn ends, however it ends. The transcript
/// and pending image are only touched if the turn's conversation is current.
struct TurnGuard<'a> {
    controller: &'a ConversationController,
    epoch: u64,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.state();
        if state.epoch == self.epoch {
            state.transcript.seal();
            state.image = None;
        }
        state.busy = false;
        state.phase = ControllerPhase::Idle;
    }
}

impl ConversationController {
    pub fn builder(provider: Arc<dyn ModelProvider>) -> ConversationControllerBuilder {
        ConversationControllerBuilder::new(provider)
    }

    fn state(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: ControllerPhase) {
        self.state().phase = phase;
    }

    /// Applies a turn's write if its conversation is still current. Returns
    /// false once the model was switched, and the turn should stop.
    fn update_turn(&self, epoch: u64, write: impl FnOnce(&mut ConversationState)) -> bool {
        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!(
                turn_epoch = epoch,
                current_epoch = state.epoch,
                "conversation replaced; dropping turn output"
            );
            return false;
        }
        write(&mut *state);
        true
    }

    /// Queries the backend for models. Success switches to live mode; any
    /// failure switches to simulation over the fixture model list.
    pub async fn refresh_models(&self) -> ConnectionMode {
        {
            let mut state = self.state();
            if !state.busy {
                state.phase = ControllerPhase::AwaitingConnectionProbe;
            }
        }

        let provider = self.provider.name();
        let outcome = observe_operation(
            provider,
            "list_models",
            self.hooks.as_ref(),
            self.provider.list_models(),
        )
        .await;

        let (mode, notification) = match outcome {
            Ok(models) => {
                tracing::info!(provider, models = models.len(), "connected to backend");
                let notification = Notification::info(
                    "Connected to Ollama",
                    format!("Found {} models", models.len()),
                );
                self.finish_probe(ConnectionMode::Connected, models);
                (ConnectionMode::Connected, notification)
            }
            Err(error) => {
                tracing::warn!(provider, error = %error, "backend unreachable; using simulation");
                self.finish_probe(ConnectionMode::Simulated, fixture_models());
                (
                    ConnectionMode::Simulated,
                    Notification::warning(
                        "Connection Failed",
                        "Cannot connect to Ollama. Running in simulation mode.",
                    ),
                )
            }
        };

        self.notifier.notify(notification);
        mode
    }

    fn finish_probe(&self, mode: ConnectionMode, models: Vec<ModelDescriptor>) {
        let mut state = self.state();
        state.mode = mode;
        state.models = models;
        if !state.busy {
            state.phase = ControllerPhase::Idle;
        }
    }

    /// Selects a listed model, resetting the conversation. A turn still in
    /// flight keeps running but no longer writes to the transcript.
    pub fn select_model(&self, name: &str) -> Result<CapabilitySet, ChatError> {
        let mut state = self.state();
        let model = state
            .models
            .iter()
            .find(|model| model.name == name)
            .cloned()
            .ok_or_else(|| ChatError::invalid_request(format!("unknown model: {name}")))?;

        let capabilities = self.detector.detect(&model.name);
        tracing::debug!(model = %model.name, ?capabilities, "model selected");

        state.selected = Some(model);
        state.capabilities = capabilities;
        state.transcript.clear();
        state.image = None;
        state.tools_enabled = capabilities.tools;
        state.epoch = state.epoch.wrapping_add(1);
        Ok(capabilities)
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state().input = text.into();
    }

    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    /// Attaches an image to the next user message. Requires a vision model
    /// and a base64 payload.
    pub fn attach_image(&self, image: ImageAttachment) -> Result<(), ChatError> {
        let mut state = self.state();
        if !state.capabilities.vision {
            return Err(ChatError::invalid_request(
                "the selected model does not accept images",
            ));
        }
        image.decode()?;
        state.image = Some(image);
        Ok(())
    }

    pub fn clear_image(&self) {
        self.state().image = None;
    }

    pub fn set_streaming_enabled(&self, enabled: bool) {
        self.state().streaming_enabled = enabled;
    }

    /// User override of the tool toggle. Tools are only offered to the
    /// backend while the selected model also supports them.
    pub fn set_tools_enabled(&self, enabled: bool) {
        self.state().tools_enabled = enabled;
    }

    pub fn tool_manifest(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state().transcript.messages().to_vec()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        let state = self.state();
        ConversationSnapshot {
            messages: state.transcript.messages().to_vec(),
            models: state.models.clone(),
            selected_model: state.selected.as_ref().map(|model| model.name.clone()),
            capabilities: state.capabilities,
            mode: state.mode,
            phase: state.phase,
            input: state.input.clone(),
            image: state.image.clone(),
            streaming_enabled: state.streaming_enabled,
            tools_enabled: state.tools_enabled,
            busy: state.busy,
            streaming_in_progress: state.transcript.in_progress(),
        }
    }

    /// Runs one turn from the buffered input.
    ///
    /// Returns [`TurnOutcome::Skipped`] without side effects when the input is
    /// blank, no model is selected, or another turn is in flight. A turn cut
    /// short by a model switch still reports [`TurnOutcome::Completed`].
    pub async fn send_message(&self) -> TurnOutcome {
        let Some(plan) = self.begin_turn() else {
            return TurnOutcome::Skipped;
        };
        let _guard = TurnGuard {
            controller: self,
            epoch: plan.epoch,
        };

        tracing::info!(model = %plan.model, mode = ?plan.mode, stream = plan.stream, "turn started");

        let mode = plan.mode;
        let result = match mode {
            ConnectionMode::Connected => self.run_live(plan).await,
            ConnectionMode::Simulated | ConnectionMode::Unprobed => {
                self.run_simulated(plan).await;
                Ok(())
            }
        };

        match result {
            Ok(()) => TurnOutcome::Completed,
            Err(error) => {
                tracing::warn!(error = %error, "turn failed");
                self.notifier.notify(Notification::error(
                    "Error",
                    "Failed to send message. Check your Ollama connection.",
                ));
                TurnOutcome::Failed(error)
            }
        }
    }

    fn begin_turn(&self) -> Option<TurnPlan> {
        let mut state = self.state();
        if state.busy || state.input.trim().is_empty() {
            return None;
        }
        let model = state.selected.as_ref()?.name.clone();

        let user_text = std::mem::take(&mut state.input);
        let image = state.image.clone();
        state
            .transcript
            .push(ChatMessage::user(user_text.clone(), image));
        state.busy = true;
        state.phase = ControllerPhase::Sending;

        Some(TurnPlan {
            model,
            history: state
                .transcript
                .messages()
                .iter()
                .map(ChatMessage::to_wire)
                .collect(),
            user_text,
            stream: state.streaming_enabled,
            tools_active: state.tools_enabled && state.capabilities.tools,
            mode: state.mode,
            epoch: state.epoch,
        })
    }

    async fn run_live(&self, plan: TurnPlan) -> Result<(), ChatError> {
        let tools = if plan.tools_active {
            self.tools.definitions()
        } else {
            Vec::new()
        };
        let request = ChatRequest::builder(plan.model)
            .messages(plan.history)
            .temperature(self.temperature)
            .tools(tools)
            .streaming(plan.stream)
            .build()?;

        if plan.stream {
            self.stream_live(request, plan.epoch).await
        } else {
            self.complete_live(request, plan.epoch).await
        }
    }

    async fn stream_live(&self, request: ChatRequest, epoch: u64) -> Result<(), ChatError> {
        let provider = self.provider.name();
        let started = Instant::now();
        let mut stream = observe_operation(
            provider,
            "chat_stream",
            self.hooks.as_ref(),
            self.provider.stream(request),
        )
        .await?;

        let opened = self.update_turn(epoch, |state| {
            state.phase = ControllerPhase::Streaming;
            state.transcript.begin_placeholder();
        });
        if !opened {
            return Ok(());
        }

        while let Some(item) = stream.next().await {
            let event = match item {
                Ok(event) => event,
                Err(error) => {
                    self.hooks
                        .on_failure(provider, "chat_stream", started.elapsed(), &error);
                    return Err(error.into());
                }
            };

            match event {
                StreamEvent::TextDelta(delta) => {
                    if !self.update_turn(epoch, |state| state.transcript.append_delta(&delta)) {
                        return Ok(());
                    }
                }
                StreamEvent::ToolCall(call) => {
                    let dispatching = self.update_turn(epoch, |state| {
                        state.transcript.seal();
                        state.phase = ControllerPhase::ToolDispatch;
                    });
                    if !dispatching {
                        return Ok(());
                    }

                    let block = self.tools.execute(call).await.transcript_block();
                    let recorded = self.update_turn(epoch, |state| {
                        state.transcript.push(ChatMessage::assistant(block));
                        state.phase = ControllerPhase::Streaming;
                    });
                    if !recorded {
                        return Ok(());
                    }
                }
                StreamEvent::Done => break,
            }
        }

        Ok(())
    }

    async fn complete_live(&self, request: ChatRequest, epoch: u64) -> Result<(), ChatError> {
        self.set_phase(ControllerPhase::WholeReceive);

        let response = observe_operation(
            self.provider.name(),
            "chat",
            self.hooks.as_ref(),
            self.provider.complete(request),
        )
        .await?;

        for call in response.tool_calls {
            if !self.update_turn(epoch, |state| state.phase = ControllerPhase::ToolDispatch) {
                return Ok(());
            }
            let block = self.tools.execute(call).await.transcript_block();
            if !self.update_turn(epoch, |state| {
                state.transcript.push(ChatMessage::assistant(block))
            }) {
                return Ok(());
            }
        }

        let content = if response.content.is_empty() {
            EMPTY_REPLY_PLACEHOLDER.to_string()
        } else {
            response.content
        };
        self.update_turn(epoch, |state| {
            state.transcript.push(ChatMessage::assistant(content))
        });
        Ok(())
    }

    async fn run_simulated(&self, plan: TurnPlan) {
        let intent = if plan.tools_active {
            detect_tool_intent(&plan.user_text)
        } else {
            None
        };

        let reply = match intent {
            Some(call) => {
                self.set_phase(ControllerPhase::ToolDispatch);
                self.tools.execute(call).await.simulated_text()
            }
            None => self.simulator.generate(&plan.user_text, &plan.model),
        };

        let epoch = plan.epoch;
        if !plan.stream {
            self.update_turn(epoch, |state| {
                state.transcript.push(ChatMessage::assistant(reply))
            });
            return;
        }

        let opened = self.update_turn(epoch, |state| {
            state.phase = ControllerPhase::Streaming;
            state.transcript.begin_placeholder();
        });
        if !opened {
            return;
        }

        let mut chunks = self.simulator.stream_text(reply);
        while let Some(chunk) = chunks.next().await {
            if !self.update_turn(epoch, |state| state.transcript.append_delta(&chunk)) {
                return;
            }
        }
    }
}
