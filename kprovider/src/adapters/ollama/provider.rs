//! Ollama provider over a pluggable transport.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use reqwest::Client;

use crate::{
    BoxedEventStream, ChatRequest, ChatResponse, ModelDescriptor, ModelProvider, ProviderError,
    ProviderFuture,
};

use super::ndjson::{NdjsonDecoder, decode_line};
use super::serde_api::{OllamaApiChatChunk, OllamaTagsResponse, build_api_request};
use super::transport::{OllamaHttpTransport, OllamaTransport};

pub const OLLAMA_HOST_URL: &str = "http://localhost:11434";

const TAGS_PATH: &str = "api/tags";
const CHAT_PATH: &str = "api/chat";

#[derive(Clone)]
pub struct OllamaProvider {
    transport: Arc<dyn OllamaTransport>,
}

impl OllamaProvider {
    pub fn new(transport: Arc<dyn OllamaTransport>) -> Self {
        Self { transport }
    }

    /// HTTP provider rooted at `base_url`.
    pub fn http(client: Client, base_url: impl Into<String>) -> Self {
        Self::new(Arc::new(
            OllamaHttpTransport::new(client).with_base_url(base_url),
        ))
    }

    fn request_body(request: ChatRequest, stream: bool) -> Result<serde_json::Value, ProviderError> {
        let mut api_request = build_api_request(request);
        api_request.stream = stream;
        Ok(serde_json::to_value(api_request)?)
    }
}

impl ModelProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>> {
        Box::pin(async move {
            let body = self.transport.get(TAGS_PATH).await?;
            let parsed = serde_json::from_slice::<OllamaTagsResponse>(&body)?;
            Ok(parsed.models.unwrap_or_default())
        })
    }

    fn complete<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let body = Self::request_body(request, false)?;
            let mut chunks = self.transport.post_json(CHAT_PATH, body).await?;

            let mut payload = Vec::new();
            while let Some(chunk) = chunks.next().await {
                payload.extend_from_slice(&chunk?);
            }

            let parsed = serde_json::from_slice::<OllamaApiChatChunk>(&payload)?;
            Ok(ChatResponse::from(parsed))
        })
    }

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let body = Self::request_body(request, true)?;
            let mut chunks = self.transport.post_json(CHAT_PATH, body).await?;

            let stream = try_stream! {
                let mut decoder = NdjsonDecoder::default();

                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk?;
                    for line in decoder.push(&chunk) {
                        for event in decode_line(&line) {
                            yield event;
                        }
                    }
                }

                if let Some(line) = decoder.finish() {
                    for event in decode_line(&line) {
                        yield event;
                    }
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}
