//! Operational hook contracts around backend calls.
//!
//! The client never retries and imposes no timeout of its own; hooks only
//! observe each operation once.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::ProviderError;

pub trait ProviderOperationHooks: Send + Sync {
    fn on_operation_start(&self, _provider: &str, _operation: &str) {}

    fn on_success(&self, _provider: &str, _operation: &str, _elapsed: Duration) {}

    fn on_failure(
        &self,
        _provider: &str,
        _operation: &str,
        _elapsed: Duration,
        _error: &ProviderError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Runs one backend operation, reporting start and outcome to `hooks`.
pub async fn observe_operation<T, Fut>(
    provider: &str,
    operation: &str,
    hooks: &dyn ProviderOperationHooks,
    execute: Fut,
) -> Result<T, ProviderError>
where
    Fut: Future<Output = Result<T, ProviderError>>,
{
    hooks.on_operation_start(provider, operation);
    let started = Instant::now();

    match execute.await {
        Ok(value) => {
            hooks.on_success(provider, operation, started.elapsed());
            Ok(value)
        }
        Err(error) => {
            hooks.on_failure(provider, operation, started.elapsed(), &error);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ProviderErrorKind;

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ProviderOperationHooks for RecordingHooks {
        fn on_operation_start(&self, provider: &str, operation: &str) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{provider}:{operation}"));
        }

        fn on_success(&self, provider: &str, operation: &str, _elapsed: Duration) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{provider}:{operation}"));
        }

        fn on_failure(
            &self,
            provider: &str,
            operation: &str,
            _elapsed: Duration,
            error: &ProviderError,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{provider}:{operation}:{:?}", error.kind));
        }
    }

    #[tokio::test]
    async fn observe_operation_reports_success() {
        let hooks = RecordingHooks::default();

        let value = observe_operation("ollama", "list_models", &hooks, async { Ok(3_u32) })
            .await
            .expect("operation should succeed");

        assert_eq!(value, 3);
        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec!["start:ollama:list_models", "success:ollama:list_models"]
        );
    }

    #[tokio::test]
    async fn observe_operation_reports_failure_and_passes_error_through() {
        let hooks = RecordingHooks::default();

        let error = observe_operation::<(), _>("ollama", "chat", &hooks, async {
            Err(ProviderError::transport("connection refused"))
        })
        .await
        .expect_err("operation should fail");

        assert_eq!(error.kind, ProviderErrorKind::Transport);
        let events = hooks.events.lock().expect("events lock").clone();
        assert!(events.contains(&"failure:ollama:chat:Transport".to_string()));
    }
}
