#![cfg(feature = "provider-ollama")]

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use kprovider::adapters::ollama::{OllamaByteStream, OllamaProvider, OllamaTransport};
use kprovider::{
    ChatRequest, Message, ModelProvider, ParameterSchema, ParameterSpec, ProviderError,
    ProviderErrorKind, ProviderFuture, Role, StreamEvent, ToolDefinition,
};
use serde_json::Value;

#[derive(Debug, Default)]
struct FakeTransport {
    tags_body: Option<String>,
    chat_chunks: Vec<Result<Vec<u8>, ProviderError>>,
    fail_with: Option<ProviderError>,
    captured_paths: Mutex<Vec<String>>,
    captured_body: Mutex<Option<Value>>,
}

impl FakeTransport {
    fn with_chat_chunks(chunks: Vec<&str>) -> Self {
        Self {
            chat_chunks: chunks
                .into_iter()
                .map(|chunk| Ok(chunk.as_bytes().to_vec()))
                .collect(),
            ..Self::default()
        }
    }
}

impl OllamaTransport for FakeTransport {
    fn get<'a>(&'a self, path: &'a str) -> ProviderFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            self.captured_paths
                .lock()
                .expect("paths lock")
                .push(path.to_string());

            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }

            Ok(self.tags_body.clone().unwrap_or_default().into_bytes())
        })
    }

    fn post_json<'a>(
        &'a self,
        path: &'a str,
        body: Value,
    ) -> ProviderFuture<'a, Result<OllamaByteStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.captured_paths
                .lock()
                .expect("paths lock")
                .push(path.to_string());
            *self.captured_body.lock().expect("body lock") = Some(body);

            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }

            let chunks = futures_util::stream::iter(self.chat_chunks.clone());
            Ok(Box::pin(chunks) as OllamaByteStream<'a>)
        })
    }
}

fn time_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_current_time",
        "Get the current time",
        ParameterSchema::new().property(
            "format",
            ParameterSpec::string("Time format (12h or 24h)")
                .with_enum(["12h", "24h"])
                .with_default("24h"),
        ),
    )
}

#[tokio::test]
async fn list_models_reads_tags_and_defaults_missing_or_null_field_to_empty() {
    let transport = Arc::new(FakeTransport {
        tags_body: Some(
            r#"{"models":[{"name":"llama3.1:8b","size":4661224676,"digest":"sha256:4218","modified_at":"2024-01-15T10:30:00Z","details":{"family":"llama"}}]}"#
                .to_string(),
        ),
        ..FakeTransport::default()
    });
    let provider = OllamaProvider::new(transport.clone());

    let models = provider.list_models().await.expect("listing should succeed");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "llama3.1:8b");
    assert_eq!(
        models[0].details.as_ref().and_then(|d| d.family.as_deref()),
        Some("llama")
    );
    assert_eq!(
        transport.captured_paths.lock().expect("paths lock").as_slice(),
        ["api/tags"]
    );

    let empty = OllamaProvider::new(Arc::new(FakeTransport {
        tags_body: Some("{}".to_string()),
        ..FakeTransport::default()
    }));
    assert!(empty.list_models().await.expect("empty listing").is_empty());

    let null = OllamaProvider::new(Arc::new(FakeTransport {
        tags_body: Some(r#"{"models":null}"#.to_string()),
        ..FakeTransport::default()
    }));
    assert!(null.list_models().await.expect("null listing").is_empty());
}

#[tokio::test]
async fn list_models_propagates_transport_failure() {
    let provider = OllamaProvider::new(Arc::new(FakeTransport {
        fail_with: Some(ProviderError::transport("connection refused")),
        ..FakeTransport::default()
    }));

    let error = provider.list_models().await.expect_err("listing should fail");
    assert_eq!(error.kind, ProviderErrorKind::Transport);
}

#[tokio::test]
async fn complete_sends_typed_body_and_maps_reply() {
    let transport = Arc::new(FakeTransport::with_chat_chunks(vec![
        r#"{"model":"llava:7b","message":{"role":"assistant","#,
        r#""content":"A cat on a mat."},"done":true}"#,
    ]));
    let provider = OllamaProvider::new(transport.clone());
    let request = ChatRequest::builder("llava:7b")
        .message(Message::new(Role::User, "describe this image").with_image("aGVsbG8="))
        .temperature(0.7)
        .tools(vec![time_tool()])
        .build()
        .expect("request should build");

    let response = provider.complete(request).await.expect("complete should work");
    assert_eq!(response.model, "llava:7b");
    assert_eq!(response.content, "A cat on a mat.");
    assert!(response.tool_calls.is_empty());

    let body = transport
        .captured_body
        .lock()
        .expect("body lock")
        .clone()
        .expect("body should be captured");
    assert_eq!(body["model"], "llava:7b");
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["images"][0], "aGVsbG8=");
    assert!((body["options"]["temperature"].as_f64().expect("temperature") - 0.7).abs() < 1e-6);
    assert_eq!(body["options"]["tools"][0]["type"], "function");
    assert_eq!(
        body["options"]["tools"][0]["function"]["name"],
        "get_current_time"
    );
}

#[tokio::test]
async fn complete_without_tools_or_images_omits_optional_fields() {
    let transport = Arc::new(FakeTransport::with_chat_chunks(vec![
        r#"{"model":"mistral:7b","message":{"role":"assistant","content":"ok"},"done":true}"#,
    ]));
    let provider = OllamaProvider::new(transport.clone());

    provider
        .complete(ChatRequest::new(
            "mistral:7b",
            vec![Message::new(Role::User, "hi")],
        ))
        .await
        .expect("complete should work");

    let body = transport
        .captured_body
        .lock()
        .expect("body lock")
        .clone()
        .expect("body should be captured");
    assert!(body["options"].get("tools").is_none());
    assert!(body["messages"][0].get("images").is_none());
}

#[tokio::test]
async fn complete_surfaces_tool_calls_in_declared_order() {
    let transport = Arc::new(FakeTransport::with_chat_chunks(vec![
        r#"{"model":"llama3.1:8b","message":{"role":"assistant","content":"","tool_calls":[{"function":{"name":"read_file","arguments":{"path":"README.md"}}},{"function":{"name":"get_current_date","arguments":{"format":"us"}}}]},"done":true}"#,
    ]));
    let provider = OllamaProvider::new(transport);

    let response = provider
        .complete(ChatRequest::new(
            "llama3.1:8b",
            vec![Message::new(Role::User, "go")],
        ))
        .await
        .expect("complete should work");

    let names = response
        .tool_calls
        .iter()
        .map(|call| call.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["read_file", "get_current_date"]);
    assert_eq!(response.content, "");
}

#[tokio::test]
async fn stream_decodes_split_lines_and_skips_noise() {
    let transport = Arc::new(FakeTransport::with_chat_chunks(vec![
        "{\"message\":{\"content\":\"Hel\"}}\n{\"message\":{\"con",
        "tent\":\"lo\"}}\nthis is not json\n",
        "{\"message\":{\"tool_calls\":[{\"function\":{\"name\":\"get_agent_info\",\"arguments\":{}}}]}}\n",
        "{\"message\":{\"content\":\"!\"},\"done\":true}",
    ]));
    let provider = OllamaProvider::new(transport.clone());

    let mut stream = provider
        .stream(ChatRequest::new("llama3.1:8b", vec![Message::new(Role::User, "hi")]).enable_streaming())
        .await
        .expect("stream should start");

    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(item.expect("event should be ok"));
    }

    assert_eq!(events.len(), 5);
    assert_eq!(events[0], StreamEvent::TextDelta("Hel".to_string()));
    assert_eq!(events[1], StreamEvent::TextDelta("lo".to_string()));
    assert!(matches!(&events[2], StreamEvent::ToolCall(call) if call.name == "get_agent_info"));
    assert_eq!(events[3], StreamEvent::TextDelta("!".to_string()));
    assert_eq!(events[4], StreamEvent::Done);

    let body = transport
        .captured_body
        .lock()
        .expect("body lock")
        .clone()
        .expect("body should be captured");
    assert_eq!(body["stream"], true);
}

#[tokio::test]
async fn stream_reports_mid_stream_transport_failure() {
    let transport = Arc::new(FakeTransport {
        chat_chunks: vec![
            Ok(b"{\"message\":{\"content\":\"partial\"}}\n".to_vec()),
            Err(ProviderError::transport("connection reset")),
        ],
        ..FakeTransport::default()
    });
    let provider = OllamaProvider::new(transport);

    let mut stream = provider
        .stream(ChatRequest::new("m", vec![Message::new(Role::User, "hi")]))
        .await
        .expect("stream should start");

    let first = stream.next().await.expect("first item");
    assert_eq!(first, Ok(StreamEvent::TextDelta("partial".to_string())));

    let second = stream.next().await.expect("second item");
    assert_eq!(
        second.expect_err("second item should fail").kind,
        ProviderErrorKind::Transport
    );
}

#[tokio::test]
async fn invalid_request_is_rejected_before_transport() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OllamaProvider::new(transport.clone());

    let error = provider
        .complete(ChatRequest::new("", vec![Message::new(Role::User, "hi")]))
        .await
        .expect_err("empty model should fail");

    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    assert!(transport.captured_paths.lock().expect("paths lock").is_empty());
}
