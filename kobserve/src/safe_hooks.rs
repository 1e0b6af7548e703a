//! Wrappers that keep a panicking hook from unwinding into a turn.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use kprovider::{ProviderError, ProviderOperationHooks, ToolCall};
use ktooling::{ToolError, ToolExecutionResult, ToolRuntimeHooks};

pub struct SafeProviderHooks<H> {
    inner: H,
}

impl<H> SafeProviderHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ProviderOperationHooks for SafeProviderHooks<H>
where
    H: ProviderOperationHooks,
{
    fn on_operation_start(&self, provider: &str, operation: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_operation_start(provider, operation)
        }));
    }

    fn on_success(&self, provider: &str, operation: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(provider, operation, elapsed)
        }));
    }

    fn on_failure(
        &self,
        provider: &str,
        operation: &str,
        elapsed: Duration,
        error: &ProviderError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(provider, operation, elapsed, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_execution_start(tool_call)));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_success(tool_call, result, elapsed)
        }));
    }

    fn on_execution_failure(&self, tool_call: &ToolCall, error: &ToolError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_failure(tool_call, error, elapsed)
        }));
    }
}
