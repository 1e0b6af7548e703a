use std::future::Future;
use std::pin::Pin;

use crate::{BoxedEventStream, ChatRequest, ChatResponse, ModelDescriptor, ProviderError};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A chat backend reachable over some transport.
pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn list_models<'a>(&'a self) -> ProviderFuture<'a, Result<Vec<ModelDescriptor>, ProviderError>>;

    fn complete<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>>;
}
