//! Tool runtime trait and default registry-backed executor.
//!
//! Execution never fails at the call boundary: unknown tools, bad arguments
//! and handler errors all come back as a [`ToolExecutionResult`] with its
//! `error` field set.

use std::sync::Arc;
use std::time::Instant;

use kprovider::{ToolCall, ToolDefinition};

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    /// Manifest of every executable tool, in registration order.
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(&'a self, tool_call: ToolCall) -> ToolFuture<'a, ToolExecutionResult>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    async fn try_execute(&self, tool_call: &ToolCall) -> Result<ToolExecutionResult, ToolError> {
        let tool = self.registry.get(&tool_call.name).ok_or_else(|| {
            ToolError::not_found(format!("Unknown tool: {}", tool_call.name))
                .with_tool_name(&tool_call.name)
        })?;

        let context = ToolExecutionContext::new(self.registry.names());
        let output = tool
            .invoke(&tool_call.arguments, &context)
            .await
            .map_err(|error| error.with_tool_name(&tool_call.name))?;

        Ok(ToolExecutionResult::from_call(tool_call, output))
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    fn execute<'a>(&'a self, tool_call: ToolCall) -> ToolFuture<'a, ToolExecutionResult> {
        Box::pin(async move {
            tracing::debug!(tool_name = %tool_call.name, arguments = %tool_call.arguments, "executing tool");
            self.hooks.on_execution_start(&tool_call);
            let started = Instant::now();

            match self.try_execute(&tool_call).await {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&tool_call, &result, started.elapsed());
                    result
                }
                Err(error) => {
                    tracing::debug!(tool_name = %tool_call.name, error = %error, "tool execution failed");
                    self.hooks
                        .on_execution_failure(&tool_call, &error, started.elapsed());
                    ToolExecutionResult::failure(tool_call.name, error.message)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use kprovider::{ParameterSchema, ToolDefinition};
    use serde_json::{Value, json};

    use super::*;
    use crate::Tool;

    #[derive(Debug)]
    struct EchoTool;

    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("echo", "Echoes arguments", ParameterSchema::new())
        }

        fn invoke<'a>(
            &'a self,
            arguments: &'a Value,
            context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async move {
                Ok(format!(
                    "tools={} args={}",
                    context.registered_tools.join(","),
                    arguments
                ))
            })
        }
    }

    #[derive(Debug)]
    struct BrokenTool;

    impl Tool for BrokenTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("broken", "Always fails", ParameterSchema::new())
        }

        fn invoke<'a>(
            &'a self,
            _arguments: &'a Value,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async move { Err(ToolError::execution("tool exploded")) })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.name));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _result: &ToolExecutionResult,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", tool_call.name));
        }

        fn on_execution_failure(&self, tool_call: &ToolCall, error: &ToolError, _elapsed: Duration) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{:?}", tool_call.name, error.kind));
        }
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool_with_registry_context() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        registry.register(BrokenTool);
        let runtime = DefaultToolRuntime::new(Arc::new(registry));

        let result = runtime
            .execute(ToolCall::new("echo", json!({"x": 1})))
            .await;

        assert_eq!(result.tool_name, "echo");
        assert_eq!(result.result, "tools=echo,broken args={\"x\":1}");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_data() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(ToolRegistry::new())).with_hooks(hooks.clone());

        let result = runtime.execute(ToolCall::new("missing", json!({}))).await;

        assert_eq!(result.error.as_deref(), Some("Unknown tool: missing"));
        assert!(result.result.is_empty());
        assert_eq!(
            hooks.events.lock().expect("events lock").clone(),
            vec!["start:missing", "failure:missing:NotFound"]
        );
    }

    #[tokio::test]
    async fn handler_error_is_normalized_into_result() {
        let mut registry = ToolRegistry::new();
        registry.register(BrokenTool);
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(registry)).with_hooks(hooks.clone());

        let result = runtime.execute(ToolCall::new("broken", Value::Null)).await;

        assert_eq!(result.error.as_deref(), Some("tool exploded"));
        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(events.last().map(String::as_str), Some("failure:broken:Execution"));
    }

    #[test]
    fn registry_tracks_registered_tools_in_order() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(BrokenTool);
        registry.register(EchoTool);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("echo"));
        assert_eq!(registry.names(), vec!["broken", "echo"]);

        let runtime = DefaultToolRuntime::new(Arc::new(registry));
        let names = runtime
            .definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["broken", "echo"]);

        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        assert!(registry.remove("echo").is_some());
        assert!(registry.is_empty());
    }
}
