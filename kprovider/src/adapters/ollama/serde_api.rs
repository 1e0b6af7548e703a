//! Ollama HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ChatRequest, ChatResponse, Message, ModelDescriptor, ToolCall};

pub(crate) fn build_api_request(request: ChatRequest) -> OllamaApiRequest {
    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .iter()
                .map(|tool| tool.manifest_entry())
                .collect::<Vec<_>>(),
        )
    };

    OllamaApiRequest {
        model: request.model,
        messages: request
            .messages
            .into_iter()
            .map(OllamaApiMessage::from)
            .collect(),
        stream: request.options.stream,
        options: OllamaApiOptions {
            temperature: request.options.temperature,
            tools,
        },
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OllamaApiErrorEnvelope>(body).ok()?;
    Some(parsed.error)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaApiErrorEnvelope {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaApiRequest {
    pub model: String,
    pub messages: Vec<OllamaApiMessage>,
    pub stream: bool,
    pub options: OllamaApiOptions,
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaApiOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaApiMessage {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl From<Message> for OllamaApiMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.as_str(),
            content: value.content,
            images: value.images,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaTagsResponse {
    /// Absent and `null` both mean no models.
    #[serde(default)]
    pub models: Option<Vec<ModelDescriptor>>,
}

/// One NDJSON line of a streamed reply, or the whole non-streamed reply.
#[derive(Debug, Deserialize)]
pub(crate) struct OllamaApiChatChunk {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub message: Option<OllamaApiAssistantMessage>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaApiAssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OllamaApiToolCall>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaApiToolCall {
    pub function: OllamaApiFunctionCall,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaApiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl From<OllamaApiToolCall> for ToolCall {
    fn from(value: OllamaApiToolCall) -> Self {
        ToolCall::new(value.function.name, value.function.arguments)
    }
}

impl From<OllamaApiChatChunk> for ChatResponse {
    fn from(value: OllamaApiChatChunk) -> Self {
        let (content, tool_calls) = match value.message {
            Some(message) => (
                message.content.unwrap_or_default(),
                message
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(ToolCall::from)
                    .collect(),
            ),
            None => (String::new(), Vec::new()),
        };

        ChatResponse {
            model: value.model,
            content,
            tool_calls,
        }
    }
}
