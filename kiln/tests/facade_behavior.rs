use std::sync::Arc;
use std::time::Duration;

use kiln::prelude::*;
use kiln::{BoxedEventStream, ChatRequest, ChatResponse, ProviderFuture, builtin_tool_runtime};

// Every call fails like a refused connection.
struct OfflineProvider;

impl ModelProvider for OfflineProvider {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
        Box::pin(async { Err(ProviderError::transport("connection refused")) })
    }

    fn complete<'a>(
        &'a self,
        _request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async { Err(ProviderError::transport("connection refused")) })
    }

    fn stream<'a>(
        &'a self,
        _request: ChatRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async { Err(ProviderError::transport("connection refused")) })
    }
}

fn offline_controller(config: KilnConfig) -> ConversationController {
    build_controller_with(
        config.with_stream_chunk_delay(Duration::ZERO),
        Arc::new(OfflineProvider),
    )
}

#[test]
fn config_defaults_match_local_ollama() {
    let config = KilnConfig::default();

    assert_eq!(config.base_url, "http://localhost:11434");
    assert_eq!(config.temperature, 0.7);
    assert_eq!(config.stream_chunk_delay, Duration::from_millis(50));
    assert!(config.streaming_enabled);

    let tuned = config
        .with_temperature(0.2)
        .with_streaming_enabled(false)
        .with_base_url("http://10.0.0.5:11434");
    assert_eq!(tuned.temperature, 0.2);
    assert!(!tuned.streaming_enabled);
    assert_eq!(tuned.base_url, "http://10.0.0.5:11434");
}

#[test]
fn build_controller_wires_builtin_tools_without_network() {
    let controller = build_controller(KilnConfig::default().with_streaming_enabled(false))
        .expect("http client builds");

    let names = controller
        .tool_manifest()
        .into_iter()
        .map(|definition| definition.name)
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "read_file",
            "read_directory",
            "search_files",
            "get_current_time",
            "get_current_date",
            "get_agent_info",
        ]
    );

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.mode, ConnectionMode::Unprobed);
    assert!(!snapshot.streaming_enabled);
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn offline_controller_answers_agent_questions_through_tools() {
    let controller = offline_controller(KilnConfig::default());

    assert_eq!(controller.refresh_models().await, ConnectionMode::Simulated);
    controller.select_model("llama3.1:8b").expect("fixture model");
    controller.set_input("who are you?");

    assert_eq!(controller.send_message().await, TurnOutcome::Completed);

    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert!(messages[1].content.contains("\"name\": \"Ollama Agent\""));
    assert!(messages[1].content.contains("\"search_files\""));
}

#[tokio::test]
async fn offline_controller_reads_the_demo_filesystem() {
    let controller = offline_controller(KilnConfig::default().with_streaming_enabled(false));
    controller.refresh_models().await;
    controller.select_model("mistral:7b").expect("fixture model");

    controller.set_input("list the src/ folder");
    controller.send_message().await;

    let reply = controller.messages().pop().expect("assistant reply");
    assert_eq!(reply.content, "FILE: main.ts\nDIR: utils/");
}

#[tokio::test]
async fn builtin_tool_runtime_reports_unknown_tools_as_results() {
    let runtime = builtin_tool_runtime();

    let result = runtime
        .execute(ToolCall::new("delete_everything", Default::default()))
        .await;

    assert_eq!(
        result.error.as_deref(),
        Some("Unknown tool: delete_everything")
    );
}

#[test]
fn init_tracing_is_idempotent() {
    init_tracing();
    assert!(!init_tracing());
}
