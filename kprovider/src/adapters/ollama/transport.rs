//! Ollama transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::{ProviderError, ProviderFuture};

use super::serde_api::extract_error_message;

pub type OllamaByteStream<'a> =
    Pin<Box<dyn Stream<Item = Result<Vec<u8>, ProviderError>> + Send + 'a>>;

/// Raw HTTP exchange with an Ollama server. Paths are relative to the base URL.
pub trait OllamaTransport: Send + Sync + std::fmt::Debug {
    fn get<'a>(&'a self, path: &'a str) -> ProviderFuture<'a, Result<Vec<u8>, ProviderError>>;

    fn post_json<'a>(
        &'a self,
        path: &'a str,
        body: Value,
    ) -> ProviderFuture<'a, Result<OllamaByteStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OllamaHttpTransport {
    client: Client,
    base_url: String,
}

impl OllamaHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: super::OLLAMA_HOST_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Ollama request failed with status {status}"));

        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

impl OllamaTransport for OllamaHttpTransport {
    fn get<'a>(&'a self, path: &'a str) -> ProviderFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.endpoint(path))
                .send()
                .await
                .map_err(map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let bytes = response.bytes().await.map_err(map_send_error)?;
            Ok(bytes.to_vec())
        })
    }

    fn post_json<'a>(
        &'a self,
        path: &'a str,
        body: Value,
    ) -> ProviderFuture<'a, Result<OllamaByteStream<'a>, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.endpoint(path))
                .json(&body)
                .send()
                .await
                .map_err(map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let chunks = response
                .bytes_stream()
                .map(|item| item.map(|bytes| bytes.to_vec()).map_err(map_send_error));

            Ok(Box::pin(chunks) as OllamaByteStream<'a>)
        })
    }
}
